//! Tower middleware propagating the ID through an immutable [`Context`].
//!
//! The request's [`Context`] lives in its extensions. If an outer layer
//! already put one there, the ID is bound on a child of it, so values the
//! outer layer stored remain visible.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use ctxid::{Config, CorrelationLayer, Generator};
//!
//! # fn main() -> ctxid::Result<()> {
//! let app: Router = Router::new()
//!     .route("/", get(|ctx: ctxid::Context| async move { ctxid::get_or_default(&ctx).to_owned() }))
//!     .layer(CorrelationLayer::new(Config::new().generator(Generator::fast()).resolve()?));
//! # drop(app);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use http::request::Parts;
use http::{HeaderName, HeaderValue, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::instrument::Instrumented;
use tracing::{Instrument, Span};

use super::{apply_header, request_span, Assigner};
use crate::config::Settings;
use crate::context::Context;
use crate::store::CorrelationScope;

/// Layer installing [`CorrelationService`].
#[derive(Debug, Clone)]
pub struct CorrelationLayer {
    assigner: Arc<Assigner>,
}

impl CorrelationLayer {
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

impl Default for CorrelationLayer {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService {
            inner,
            assigner: self.assigner.clone(),
        }
    }
}

/// Service assigning a correlation ID and binding it into the request's
/// [`Context`].
#[derive(Debug, Clone)]
pub struct CorrelationService<S> {
    inner: S,
    assigner: Arc<Assigner>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorrelationService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let (mut parts, body) = request.into_parts();

        if self.assigner.skips(&parts) {
            let request = Request::from_parts(parts, body);
            return ResponseFuture {
                inner: self.inner.call(request).instrument(Span::none()),
                header: None,
            };
        }

        let assignment = self.assigner.assign(&parts.headers);
        let span = request_span(&assignment, &parts);

        let context = parts
            .extensions
            .remove::<Context>()
            .unwrap_or_default()
            .bind_correlation_id(assignment.id);
        parts.extensions.insert(context);

        let request = Request::from_parts(parts, body);
        ResponseFuture {
            inner: self.inner.call(request).instrument(span),
            header: assignment.header,
        }
    }
}

pin_project! {
    /// Response future of [`CorrelationService`].
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct ResponseFuture<F> {
        #[pin]
        inner: Instrumented<F>,
        header: Option<(HeaderName, HeaderValue)>,
    }
}

impl<F, ResBody, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response = match this.inner.poll(cx) {
            Poll::Ready(Ok(response)) => response,
            other => return other,
        };
        apply_header(response.headers_mut(), this.header.take());
        Poll::Ready(Ok(response))
    }
}
