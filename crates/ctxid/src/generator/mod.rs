//! Correlation ID generators.
//!
//! [`Generator::secure`] (the default) produces random v4 UUIDs.
//! [`Generator::fast`] is cheaper per call but embeds a process-wide counter
//! in every ID; see [`fast`] for what that reveals before opting in.

pub mod fast;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

pub use fast::fast_id;

/// Generate a random v4 UUID in canonical hyphenated form.
pub fn secure_id() -> String {
    Uuid::new_v4().to_string()
}

/// Built-in strategy selector, for configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    #[default]
    Secure,
    Fast,
}

/// Shared handle to an ID generator.
///
/// Called concurrently from every in-flight request, so custom closures must
/// be `Send + Sync` and must not rely on external locking by the caller.
#[derive(Clone)]
pub struct Generator {
    name: &'static str,
    make: Arc<dyn Fn() -> String + Send + Sync>,
}

impl Generator {
    /// Cryptographically random v4 UUIDs.
    pub fn secure() -> Self {
        Self {
            name: "secure",
            make: Arc::new(secure_id),
        }
    }

    /// Counter-based IDs. Leaks request volume; never the default.
    pub fn fast() -> Self {
        Self {
            name: "fast",
            make: Arc::new(fast_id),
        }
    }

    /// Wrap a custom generator.
    pub fn from_fn<F>(make: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            name: "custom",
            make: Arc::new(make),
        }
    }

    pub fn generate(&self) -> String {
        (self.make)()
    }

    /// Short label used in logs: `secure`, `fast` or `custom`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::secure()
    }
}

impl From<GeneratorKind> for Generator {
    fn from(kind: GeneratorKind) -> Self {
        match kind {
            GeneratorKind::Secure => Generator::secure(),
            GeneratorKind::Fast => Generator::fast(),
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Generator").field(&self.name).finish()
    }
}

/// Whether `id` has the 36-character `8-4-4-4-12` lowercase-hex shape.
pub fn is_uuid_shaped(id: &str) -> bool {
    id.len() == 36 && !id.bytes().any(|b| b.is_ascii_uppercase()) && Uuid::try_parse(id).is_ok()
}
