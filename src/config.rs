//! Container configuration.
//!
//! Options are fixed when the container is created. They can be built in
//! code, read from the process environment, or (with the `config` feature)
//! parsed from JSON.

use std::env;

#[cfg(feature = "config")]
use serde::Deserialize;

/// Environment variable enabling strict constructor resolution.
pub const ENV_STRICT: &str = "PICNIC_IOC_STRICT";
/// Environment variable overriding the maximum resolution depth.
pub const ENV_MAX_DEPTH: &str = "PICNIC_IOC_MAX_DEPTH";

const DEFAULT_MAX_DEPTH: usize = 1024;

/// Behavioural switches for a [`Container`](crate::Container).
///
/// # Examples
///
/// ```rust
/// use picnic_ioc::{Container, ContainerOptions};
///
/// let options = ContainerOptions::default().strict(true).max_depth(64);
/// let container = Container::with_options(options);
/// assert!(container.options().is_strict());
/// assert_eq!(container.options().depth_limit(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// When set, a constructor parameter with no registration fails
    /// construction with `DiError::Unresolved` instead of receiving `None`.
    pub strict: bool,
    /// Nesting limit for a single resolution chain.
    pub max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerOptions {
    /// Enable or disable strict constructor resolution.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the maximum resolution depth. Zero is clamped to one.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// Defaults overridden by `PICNIC_IOC_STRICT` and `PICNIC_IOC_MAX_DEPTH`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(raw) = env::var(ENV_STRICT) {
            match parse_bool(&raw) {
                Some(strict) => options.strict = strict,
                None => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_STRICT),
            }
        }

        if let Ok(raw) = env::var(ENV_MAX_DEPTH) {
            match raw.trim().parse::<usize>() {
                Ok(depth) => options = options.max_depth(depth),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {}", ENV_MAX_DEPTH),
            }
        }

        options
    }

    /// Parse options from a JSON document; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let options: Self = serde_json::from_str(json)?;
        let depth = options.max_depth;
        Ok(options.max_depth(depth))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(ENV_STRICT);
        env::remove_var(ENV_MAX_DEPTH);
    }

    #[test]
    fn defaults_are_permissive() {
        let options = ContainerOptions::default();
        assert!(!options.is_strict());
        assert_eq!(options.depth_limit(), 1024);
    }

    #[test]
    fn zero_depth_is_clamped() {
        assert_eq!(ContainerOptions::default().max_depth(0).depth_limit(), 1);
    }

    #[test]
    #[serial]
    fn env_overrides_defaults() {
        clear_env();
        env::set_var(ENV_STRICT, "yes");
        env::set_var(ENV_MAX_DEPTH, "32");

        let options = ContainerOptions::from_env();
        assert!(options.is_strict());
        assert_eq!(options.depth_limit(), 32);
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_env_values_are_ignored() {
        clear_env();
        env::set_var(ENV_STRICT, "maybe");
        env::set_var(ENV_MAX_DEPTH, "deep");

        assert_eq!(ContainerOptions::from_env(), ContainerOptions::default());
        clear_env();
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_fills_missing_fields() {
        let options = ContainerOptions::from_json(r#"{ "strict": true }"#).unwrap();
        assert!(options.is_strict());
        assert_eq!(options.depth_limit(), 1024);
    }
}
