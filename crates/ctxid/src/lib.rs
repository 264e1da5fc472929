//! Request correlation-ID propagation for tower and axum services.
//!
//! Each request gets one correlation ID: taken from the configured header
//! (default `X-Correlation-ID`) when the caller sent one, otherwise produced
//! by a [`Generator`]. The ID is echoed on the response header and bound into
//! request scope, where downstream code reads it with [`get`].
//!
//! Two scope strategies are offered as separate middleware:
//!
//! - [`CorrelationLayer`]: immutable [`Context`], shareable with spawned tasks.
//! - [`middleware::locals`]: the request's own extensions slot, valid only
//!   while the request is alive.
//!
//! IDs come from [`Generator::secure`] (random v4 UUIDs) unless the caller
//! opts into [`Generator::fast`], which is cheaper but reveals request volume.

pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod middleware;
pub mod store;

pub use config::{resolve, Config, Settings, DEFAULT_HEADER};
pub use context::{Context, ContextKey};
pub use error::{Error, Result};
pub use generator::{fast_id, secure_id, Generator, GeneratorKind};
pub use middleware::context::{CorrelationLayer, CorrelationService};
pub use middleware::extract::{request_context, Correlation, MissingCorrelationId};
pub use middleware::locals::Locals;
pub use store::{bind, get, get_or_default, CorrelationScope};
