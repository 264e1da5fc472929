//! HTTP middleware adapters.
//!
//! Both adapters run the same procedure per request: read the configured
//! header, generate an ID if it is missing, bind the ID into request scope,
//! call the inner service, then set the header on the response.
//!
//! - [`context::CorrelationLayer`] binds into an immutable [`Context`]
//!   stored in request extensions. Handlers may clone that context into
//!   spawned tasks that outlive the request.
//! - [`locals::middleware`] binds into the request's own extensions slot.
//!   It is readable only while the request is alive; copy the `String` out
//!   before handing it to anything longer-lived.
//!
//! [`Context`]: crate::Context

pub mod context;
pub mod extract;
pub mod locals;

use std::fmt;
use std::sync::Arc;

use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::Span;

use crate::config::Settings;

/// Per-request predicate; returning `true` bypasses the middleware entirely.
pub(crate) type SkipFn = Arc<dyn Fn(&Parts) -> bool + Send + Sync>;

/// Resolved settings plus the optional skip predicate.
#[derive(Clone)]
pub(crate) struct Assigner {
    settings: Settings,
    skip: Option<SkipFn>,
}

/// Outcome of assigning an ID to one request.
pub(crate) struct Assignment {
    pub(crate) id: String,
    pub(crate) generated: bool,
    /// `None` when the ID cannot be encoded as a header value.
    pub(crate) header: Option<(HeaderName, HeaderValue)>,
}

impl Assigner {
    pub(crate) fn new(settings: Settings) -> Self {
        Self {
            settings,
            skip: None,
        }
    }

    pub(crate) fn with_skip(mut self, skip: SkipFn) -> Self {
        self.skip = Some(skip);
        self
    }

    pub(crate) fn skips(&self, parts: &Parts) -> bool {
        self.skip.as_ref().is_some_and(|skip| skip(parts))
    }

    pub(crate) fn assign(&self, headers: &HeaderMap) -> Assignment {
        let name = self.settings.header_name();
        let inbound = headers.get(name).and_then(|value| {
            let id = std::str::from_utf8(value.as_bytes()).ok()?;
            (!id.is_empty()).then(|| (id.to_owned(), value.clone()))
        });

        if let Some((id, value)) = inbound {
            return Assignment {
                id,
                generated: false,
                header: Some((name.clone(), value)),
            };
        }

        let id = self.settings.generator().generate();
        let header = match HeaderValue::from_str(&id) {
            Ok(value) => Some((name.clone(), value)),
            Err(_) => {
                tracing::warn!(
                    correlation_id = %id,
                    generator = self.settings.generator().name(),
                    "Correlation ID is not a valid header value, response header omitted"
                );
                None
            }
        };

        Assignment {
            id,
            generated: true,
            header,
        }
    }
}

impl fmt::Debug for Assigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assigner")
            .field("settings", &self.settings)
            .field("skip", &self.skip.is_some())
            .finish()
    }
}

/// Span wrapping one correlated request.
pub(crate) fn request_span(assignment: &Assignment, parts: &Parts) -> Span {
    tracing::info_span!(
        "request",
        correlation_id = %assignment.id,
        method = %parts.method,
        path = %parts.uri.path(),
        generated = assignment.generated,
    )
}

/// Set the correlation header unless the handler already set one.
pub(crate) fn apply_header(headers: &mut HeaderMap, header: Option<(HeaderName, HeaderValue)>) {
    if let Some((name, value)) = header {
        headers.entry(name).or_insert(value);
    }
}
