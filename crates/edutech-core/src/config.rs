//! Environment-backed configuration.
//!
//! Settings come from key/value pairs in the process environment (after a
//! `.env` file has been merged in by the binary). Lookups go through [`Env`] so
//! tests can feed a plain map instead of mutating the process environment.

use std::collections::HashMap;

/// Configuration could not be assembled from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    Missing(&'static str),
}

/// Source of environment-style key/value settings.
pub trait Env {
    /// Raw lookup. Implementations return `None` for absent keys.
    fn var(&self, key: &str) -> Option<String>;

    /// Present, non-empty value or [`ConfigError::Missing`].
    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    /// Present, non-empty value. Empty strings count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_owned())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Env for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Env for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| (*v).to_owned())
    }
}

/// Trait for configuration sections loaded from the environment.
///
/// Implementors check presence of everything they need in `from_lookup`, so a
/// missing key fails before any remote call is made.
pub trait Config: Sized {
    fn from_lookup(env: &dyn Env) -> Result<Self, ConfigError>;

    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&ProcessEnv)
    }
}
