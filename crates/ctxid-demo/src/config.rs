//! Configuration types and loading logic.

use ctxid::{Config, Generator, GeneratorKind};
use ctxid_tracing::TracingConfig;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Top-level demo configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub correlation: CorrelationConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

/// Correlation middleware configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationConfig {
    /// Header carrying the ID. Unset means `X-Correlation-ID`.
    #[serde(default)]
    pub header_name: Option<String>,

    /// `secure` (random UUIDs) or `fast` (counter-based, leaks request volume).
    #[serde(default)]
    pub generator: GeneratorKind,

    /// Exact paths that bypass the middleware.
    #[serde(default = "default_skip_paths")]
    pub skip_paths: Vec<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0:3080".to_string()
}

fn default_skip_paths() -> Vec<String> {
    vec!["/health".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            header_name: None,
            generator: GeneratorKind::default(),
            skip_paths: default_skip_paths(),
        }
    }
}

impl CorrelationConfig {
    /// Core middleware config for this section.
    pub fn middleware_config(&self) -> Config {
        Config {
            header_name: self.header_name.clone(),
            generator: Some(Generator::from(self.generator)),
        }
    }
}

impl DemoConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CTXID_ prefix, __ for nesting)
    /// 2. TOML config file
    /// 3. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config: DemoConfig = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("CTXID_").split("__"))
            .extract()?;

        Ok(config)
    }
}
