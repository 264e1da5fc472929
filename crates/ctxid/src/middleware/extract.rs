//! Axum extractors for the correlation ID and the request [`Context`].

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::context::Context;
use crate::store::CorrelationScope;

/// The correlation ID of the current request, copied out of request scope.
///
/// Works behind either adapter: the locals slot is checked first, then the
/// request [`Context`]. Owning the `String` makes it safe to move into tasks
/// that outlive the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation(pub String);

impl Correlation {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rejection used when no correlation middleware ran for the request.
#[derive(Debug, Error)]
#[error("correlation ID middleware is not installed for this route")]
pub struct MissingCorrelationId;

impl IntoResponse for MissingCorrelationId {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

fn lookup(parts: &Parts) -> Option<Correlation> {
    parts
        .extensions
        .correlation_id()
        .or_else(|| parts.extensions.get::<Context>()?.correlation_id())
        .map(|id| Correlation(id.to_owned()))
}

impl<S: Send + Sync> FromRequestParts<S> for Correlation {
    type Rejection = MissingCorrelationId;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        lookup(parts).ok_or(MissingCorrelationId)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for Correlation {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(lookup(parts))
    }
}

/// The request's [`Context`]; empty when no context layer ran.
impl<S: Send + Sync> FromRequestParts<S> for Context {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Context>().cloned().unwrap_or_default())
    }
}

/// Clone the [`Context`] out of a request, or an empty one.
pub fn request_context<B>(request: &Request<B>) -> Context {
    request
        .extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_default()
}
