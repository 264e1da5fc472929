//! Error types.

use thiserror::Error;

/// Errors raised while building middleware settings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid correlation header name {name:?}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
