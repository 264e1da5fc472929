//! Tracing setup shared by ctxid services: fmt logging, optional OTLP export,
//! and span helpers that carry the request correlation ID.

pub mod config;
pub mod otlp;
pub mod spans;

pub use config::{OtlpProtocol, TracingConfig};
pub use otlp::{init_tracing, TracingGuard};
