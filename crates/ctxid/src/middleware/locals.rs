//! Axum middleware storing the ID in the request's extensions slot map.
//!
//! No [`Context`](crate::Context) is created; the ID sits in a private slot
//! of the request's [`Extensions`](http::Extensions) and dies with the
//! request. Handlers read it through [`Correlation`](super::extract::Correlation)
//! (which copies it) or [`get`](crate::get) on the request. Anything spawned
//! from a handler must take an owned copy, never the request itself.
//!
//! ```no_run
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use ctxid::middleware::locals::{self, Locals};
//! use ctxid::Correlation;
//!
//! # fn main() {
//! let app: Router = Router::new()
//!     .route("/", get(|Correlation(id): Correlation| async move { id }))
//!     .layer(from_fn_with_state(Locals::default(), locals::middleware));
//! # drop(app);
//! # }
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::request::Parts;
use tracing::Instrument;

use super::{apply_header, request_span, Assigner};
use crate::config::Settings;
use crate::store::CorrelationScope;

/// Shared state for [`middleware`]. Cheap to clone (Arc).
#[derive(Debug, Clone)]
pub struct Locals {
    assigner: Arc<Assigner>,
}

impl Locals {
    pub fn new(settings: Settings) -> Self {
        Self {
            assigner: Arc::new(Assigner::new(settings)),
        }
    }

    /// Bypass the middleware for requests matching `skip`.
    pub fn skip_if<F>(self, skip: F) -> Self
    where
        F: Fn(&Parts) -> bool + Send + Sync + 'static,
    {
        let assigner = Assigner::clone(&self.assigner).with_skip(Arc::new(skip));
        Self {
            assigner: Arc::new(assigner),
        }
    }
}

impl Default for Locals {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// Middleware function; install with `axum::middleware::from_fn_with_state`.
pub async fn middleware(State(locals): State<Locals>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    if locals.assigner.skips(&parts) {
        return next.run(Request::from_parts(parts, body)).await;
    }

    let assignment = locals.assigner.assign(&parts.headers);
    let span = request_span(&assignment, &parts);

    let request = Request::from_parts(parts, body).bind_correlation_id(assignment.id);
    let mut response = next.run(request).instrument(span).await;
    apply_header(response.headers_mut(), assignment.header);
    response
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::generator::{is_uuid_shaped, Generator};
    use crate::middleware::extract::Correlation;
    use crate::store;

    fn app(locals: Locals) -> Router {
        Router::new()
            .route(
                "/id",
                get(|Correlation(id): Correlation| async move { id }),
            )
            .route(
                "/raw",
                get(|request: Request| async move {
                    store::get(&request).unwrap_or("<none>").to_owned()
                }),
            )
            .route(
                "/health",
                get(|id: Option<Correlation>| async move {
                    if id.is_some() { "has-id" } else { "no-id" }
                }),
            )
            .layer(from_fn_with_state(locals, middleware))
    }

    async fn call(app: Router, uri: &str, id: Option<&str>) -> (Option<String>, String) {
        let mut request = http::Request::get(uri);
        if let Some(id) = id {
            request = request.header("x-correlation-id", id);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let header = response
            .headers()
            .get("x-correlation-id")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (header, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_echoes_inbound_id() {
        let (header, body) = call(app(Locals::default()), "/id", Some("abc-123")).await;
        assert_eq!(header.as_deref(), Some("abc-123"));
        assert_eq!(body, "abc-123");
    }

    #[tokio::test]
    async fn test_generates_when_missing() {
        let (header, body) = call(app(Locals::default()), "/raw", None).await;
        let header = header.unwrap();
        assert!(is_uuid_shaped(&header), "{header}");
        assert_eq!(body, header);
    }

    #[tokio::test]
    async fn test_fast_generator_opt_in() {
        let settings = Config::new().generator(Generator::fast()).resolve().unwrap();
        let (first, _) = call(app(Locals::new(settings.clone())), "/id", None).await;
        let (second, _) = call(app(Locals::new(settings)), "/id", None).await;
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(is_uuid_shaped(&first));
        assert_ne!(first, second);
        assert_eq!(first[19..], second[19..]);
    }

    #[tokio::test]
    async fn test_skip_leaves_request_untouched() {
        let locals = Locals::default().skip_if(|parts| parts.uri.path() == "/health");
        let (header, body) = call(app(locals), "/health", Some("abc")).await;
        assert!(header.is_none());
        assert_eq!(body, "no-id");
    }

    #[tokio::test]
    async fn test_optional_extractor_sees_id() {
        let (_, body) = call(app(Locals::default()), "/health", None).await;
        assert_eq!(body, "has-id");
    }
}
