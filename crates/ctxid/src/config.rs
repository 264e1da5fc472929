//! Middleware configuration and its resolution into effective settings.

use http::HeaderName;

use crate::error::{Error, Result};
use crate::generator::Generator;

/// Header read from requests and written to responses unless overridden.
pub const DEFAULT_HEADER: &str = "X-Correlation-ID";

/// Caller-supplied configuration. Unset fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Header carrying the ID. `None` or `""` means [`DEFAULT_HEADER`].
    pub header_name: Option<String>,

    /// Generator used when the request has no ID. `None` means
    /// [`Generator::secure`]. Must tolerate unbounded concurrent calls.
    pub generator: Option<Generator>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = Some(name.into());
        self
    }

    pub fn generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Fill in defaults and validate the header name.
    pub fn resolve(self) -> Result<Settings> {
        let header_name = match self.header_name.as_deref() {
            None | Some("") => HeaderName::from_static("x-correlation-id"),
            Some(name) => {
                HeaderName::try_from(name).map_err(|source| Error::InvalidHeaderName {
                    name: name.to_string(),
                    source,
                })?
            }
        };

        Ok(Settings {
            header_name,
            generator: self.generator.unwrap_or_default(),
        })
    }
}

/// Resolve an optional caller config into effective settings.
pub fn resolve(config: Option<Config>) -> Result<Settings> {
    config.unwrap_or_default().resolve()
}

/// Effective, read-only settings shared by every request of one middleware.
#[derive(Debug, Clone)]
pub struct Settings {
    header_name: HeaderName,
    generator: Generator,
}

impl Settings {
    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header_name: HeaderName::from_static("x-correlation-id"),
            generator: Generator::secure(),
        }
    }
}
