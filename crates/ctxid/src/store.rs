//! Binding and reading the correlation ID on a request scope.
//!
//! Two scope strategies implement [`CorrelationScope`]:
//!
//! - [`Context`]: immutable. Binding derives a new context; clones taken
//!   before the bind are unaffected. A clone can be moved into a spawned task
//!   and read after the request is gone.
//! - [`http::Extensions`] (and [`http::Request`], through its extensions):
//!   a mutable slot map owned by the request. The slot only exists while the
//!   request does, so code that must outlive the handler has to copy the
//!   `String` out (`get(&req).map(str::to_owned)`) before returning.

use http::{Extensions, Request};

use crate::context::{Context, ContextKey};

/// Private key under which the ID is stored in a [`Context`].
struct CorrelationKey;

impl ContextKey for CorrelationKey {}

/// Private slot type under which the ID is stored in [`Extensions`].
#[derive(Clone)]
struct CorrelationSlot(String);

/// A request scope that can carry a correlation ID.
pub trait CorrelationScope: Sized {
    /// Return the scope with `id` bound. Last write wins.
    fn bind_correlation_id(self, id: String) -> Self;

    /// The bound ID, or `None` if nothing (or something that is not a
    /// string) is bound.
    fn correlation_id(&self) -> Option<&str>;
}

impl CorrelationScope for Context {
    fn bind_correlation_id(self, id: String) -> Self {
        self.with_value::<CorrelationKey, _>(id)
    }

    fn correlation_id(&self) -> Option<&str> {
        self.get::<CorrelationKey, String>().map(String::as_str)
    }
}

impl CorrelationScope for Extensions {
    fn bind_correlation_id(mut self, id: String) -> Self {
        self.insert(CorrelationSlot(id));
        self
    }

    fn correlation_id(&self) -> Option<&str> {
        self.get::<CorrelationSlot>().map(|slot| slot.0.as_str())
    }
}

impl<B> CorrelationScope for Request<B> {
    fn bind_correlation_id(mut self, id: String) -> Self {
        self.extensions_mut().insert(CorrelationSlot(id));
        self
    }

    fn correlation_id(&self) -> Option<&str> {
        self.extensions().correlation_id()
    }
}

/// Bind `id` onto `scope`.
pub fn bind<S: CorrelationScope>(scope: S, id: impl Into<String>) -> S {
    scope.bind_correlation_id(id.into())
}

/// Look up the correlation ID bound on `scope`.
pub fn get<S: CorrelationScope>(scope: &S) -> Option<&str> {
    scope.correlation_id()
}

/// Like [`get`], but an unbound scope yields `""`.
pub fn get_or_default<S: CorrelationScope>(scope: &S) -> &str {
    scope.correlation_id().unwrap_or_default()
}
