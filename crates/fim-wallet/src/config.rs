//! # Wallet Configuration
//!
//! [`WalletConfig`] is deserializable from JSON and loadable from the
//! environment. Unset variables fall back to the defaults; set but
//! unparseable variables are errors.
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `FIM_MAX_AGENTS` | `max_agents` | `8` |
//! | `FIM_LOG` | `log_filter` | `info` |
//! | `FIM_JSON_LOGS` | `json_logs` | `false` |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of agents the aggregated flexibility circuit accepts.
pub const DEFAULT_MAX_AGENTS: usize = 8;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Wallet settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WalletConfig {
    /// Maximum number of agents in one aggregated presentation.
    pub max_agents: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            max_agents: DEFAULT_MAX_AGENTS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            json_logs: false,
        }
    }
}

impl WalletConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a variable that is set but does
    /// not parse, and [`ConfigError::NoAgents`] for `FIM_MAX_AGENTS=0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_agents: match lookup("FIM_MAX_AGENTS") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::invalid("FIM_MAX_AGENTS", &raw))?,
                None => defaults.max_agents,
            },
            log_filter: lookup("FIM_LOG")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            json_logs: match lookup("FIM_JSON_LOGS") {
                Some(raw) => parse_flag(&raw)
                    .ok_or_else(|| ConfigError::invalid("FIM_JSON_LOGS", &raw))?,
                None => defaults.json_logs,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; absent keys take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_agents == 0 {
            return Err(ConfigError::NoAgents);
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Errors loading a [`WalletConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable is set to a value that does not parse.
    #[error("invalid value {value:?} for {var}")]
    Invalid {
        /// The variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A presentation must cover at least one agent.
    #[error("max_agents must be at least 1")]
    NoAgents,

    /// The JSON document is malformed.
    #[error("invalid wallet configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = WalletConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WalletConfig::default());
        assert_eq!(config.max_agents, 8);
        assert_eq!(config.log_filter, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn reads_variables() {
        let config = WalletConfig::from_lookup(lookup(&[
            ("FIM_MAX_AGENTS", " 32 "),
            ("FIM_LOG", "fim_zkp=debug"),
            ("FIM_JSON_LOGS", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.max_agents, 32);
        assert_eq!(config.log_filter, "fim_zkp=debug");
        assert!(config.json_logs);
    }

    #[test]
    fn blank_log_filter_keeps_default() {
        let config = WalletConfig::from_lookup(lookup(&[("FIM_LOG", "  ")])).unwrap();
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = WalletConfig::from_lookup(lookup(&[("FIM_MAX_AGENTS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "FIM_MAX_AGENTS", .. }));

        let err = WalletConfig::from_lookup(lookup(&[("FIM_JSON_LOGS", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "FIM_JSON_LOGS", .. }));
    }

    #[test]
    fn rejects_zero_agents() {
        let err = WalletConfig::from_lookup(lookup(&[("FIM_MAX_AGENTS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::NoAgents));
    }

    #[test]
    fn json_fills_defaults() {
        let config = WalletConfig::from_json_str(r#"{"maxAgents": 3}"#).unwrap();
        assert_eq!(config.max_agents, 3);
        assert_eq!(config.log_filter, "info");

        assert!(WalletConfig::from_json_str(r#"{"maxAgent": 3}"#).is_err());
        assert!(matches!(
            WalletConfig::from_json_str(r#"{"maxAgents": 0}"#),
            Err(ConfigError::NoAgents)
        ));
    }
}
