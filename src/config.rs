//! Session configuration.
//!
//! Values come from three layers, later ones winning:
//! 1. built-in defaults,
//! 2. shell variables (`SHELL_MAX_INCLUDE_DEPTH`, `SHELL_PROMPT`),
//! 3. command-line flags (applied by the binary).

use crate::env::Environment;
use thiserror::Error;

/// How many files may be included inside one another before `include` gives up.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

/// Prompt shown by the REPL when no other prompt is configured.
pub const DEFAULT_PROMPT: &str = "🐒$ ";

/// Shell variable overriding [`ShellConfig::max_include_depth`].
pub const MAX_INCLUDE_DEPTH_VAR: &str = "SHELL_MAX_INCLUDE_DEPTH";

/// Shell variable overriding [`ShellConfig::prompt`].
pub const PROMPT_VAR: &str = "SHELL_PROMPT";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Tunables of a shell session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Maximum number of scripts that may be active at once (nested includes).
    pub max_include_depth: usize,
    /// Prompt printed by the REPL.
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl ShellConfig {
    /// Defaults overridden by whatever the environment sets.
    pub fn from_env(env: &Environment) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = env.get_var(MAX_INCLUDE_DEPTH_VAR) {
            config = config.with_max_include_depth_str(MAX_INCLUDE_DEPTH_VAR, &raw)?;
        }
        if let Some(prompt) = env.get_var(PROMPT_VAR) {
            config.prompt = prompt;
        }
        Ok(config)
    }

    /// Override the include depth limit. Zero is rejected: it would forbid every script.
    pub fn with_max_include_depth(mut self, depth: usize) -> Result<Self, ConfigError> {
        if depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_include_depth".to_string(),
                value: depth.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        self.max_include_depth = depth;
        Ok(self)
    }

    fn with_max_include_depth_str(self, key: &str, raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason,
        };
        let depth = raw
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(e.to_string()))?;
        self.with_max_include_depth(depth)
            .map_err(|_| invalid("must be at least 1".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_variables() {
        let env = Environment::empty("/");
        assert_eq!(ShellConfig::from_env(&env).unwrap(), ShellConfig::default());
    }

    #[test]
    fn variables_override_defaults() {
        let mut env = Environment::empty("/");
        env.set_var(MAX_INCLUDE_DEPTH_VAR, " 8 ");
        env.set_var(PROMPT_VAR, "> ");

        let config = ShellConfig::from_env(&env).unwrap();
        assert_eq!(config.max_include_depth, 8);
        assert_eq!(config.prompt, "> ");
    }

    #[test]
    fn garbage_depth_is_rejected() {
        let mut env = Environment::empty("/");
        env.set_var(MAX_INCLUDE_DEPTH_VAR, "deep");

        let err = ShellConfig::from_env(&env).unwrap_err();
        let ConfigError::InvalidValue { key, value, .. } = err;
        assert_eq!(key, MAX_INCLUDE_DEPTH_VAR);
        assert_eq!(value, "deep");
    }

    #[test]
    fn zero_depth_is_rejected() {
        assert!(ShellConfig::default().with_max_include_depth(0).is_err());

        let mut env = Environment::empty("/");
        env.set_var(MAX_INCLUDE_DEPTH_VAR, "0");
        assert!(ShellConfig::from_env(&env).is_err());
    }
}
