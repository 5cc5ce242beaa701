//! Workflow configuration
//!
//! Loaded from TOML; every section and key is optional.
//!
//! ```toml
//! [transitions]
//! unknown_id = "reject"
//! allow_requirement_reset = true
//!
//! [gate]
//! min_confidence = 0.8
//! require_signature = false
//!
//! [suggestion]
//! timeout_ms = 30000
//! simulated_delay_ms = 1500
//!
//! [logging]
//! filter = "regflow=info"
//! json = false
//! ```

use crate::error::ConfigError;
use regflow_records::{TransitionPolicy, UnknownIdPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Workflow configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Transition handling
    pub transitions: TransitionConfig,
    /// Approval gates
    pub gate: GateConfig,
    /// Suggestion tasks
    pub suggestion: SuggestionConfig,
    /// Tracing output
    pub logging: LoggingConfig,
}

/// Transition handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    /// What to do with transitions naming an unknown record
    pub unknown_id: UnknownIdPolicy,
    /// Whether requirement lines may be reset to pending
    pub allow_requirement_reset: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            unknown_id: UnknownIdPolicy::Reject,
            allow_requirement_reset: true,
        }
    }
}

/// Approval gate behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// AI items below this confidence are flagged for review
    pub min_confidence: f64,
    /// Approvals must carry a signature
    pub require_signature: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.8,
            require_signature: false,
        }
    }
}

/// Suggestion task timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestionConfig {
    /// Give up after this many milliseconds
    pub timeout_ms: u64,
    /// Delay of the built-in template provider
    pub simulated_delay_ms: u64,
}

impl SuggestionConfig {
    /// Timeout as a duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Template provider delay as a duration
    #[inline]
    #[must_use]
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            simulated_delay_ms: 1_500,
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of the human format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "regflow=info".to_string(),
            json: false,
        }
    }
}

impl WorkflowConfig {
    /// Default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `Parse` for malformed TOML or unknown keys, `Invalid` for out of range
    /// values.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `Io` when the file cannot be read, otherwise as
    /// [`WorkflowConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded workflow config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let confidence = self.gate.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ConfigError::Invalid {
                key: "gate.min_confidence",
                reason: format!("{confidence} is outside [0, 1]"),
            });
        }
        if self.suggestion.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "suggestion.timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "logging.filter",
                reason: "filter is empty".to_string(),
            });
        }
        Ok(())
    }

    /// Policy for boards that never reset
    #[must_use]
    pub fn transition_policy(&self) -> TransitionPolicy {
        TransitionPolicy::new().with_unknown_id(self.transitions.unknown_id)
    }

    /// Policy for the requirements board
    #[must_use]
    pub fn requirement_policy(&self) -> TransitionPolicy {
        self.transition_policy()
            .with_reset(self.transitions.allow_requirement_reset)
    }

    /// Builder: set unknown id policy
    #[must_use]
    pub fn with_unknown_id(mut self, policy: UnknownIdPolicy) -> Self {
        self.transitions.unknown_id = policy;
        self
    }

    /// Builder: set requirement reset
    #[must_use]
    pub fn with_requirement_reset(mut self, allow: bool) -> Self {
        self.transitions.allow_requirement_reset = allow;
        self
    }

    /// Builder: set gate confidence threshold
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.gate.min_confidence = min_confidence;
        self
    }

    /// Builder: require signatures on approvals
    #[must_use]
    pub fn with_require_signature(mut self, require: bool) -> Self {
        self.gate.require_signature = require;
        self
    }

    /// Builder: set suggestion timeout
    #[must_use]
    pub fn with_suggestion_timeout(mut self, timeout: Duration) -> Self {
        self.suggestion.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_gives_defaults() {
        let config = WorkflowConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorkflowConfig::default());
        assert_eq!(config.transitions.unknown_id, UnknownIdPolicy::Reject);
        assert!(config.transitions.allow_requirement_reset);
        assert_eq!(config.logging.filter, "regflow=info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = WorkflowConfig::from_toml_str(
            r#"
            [transitions]
            unknown_id = "ignore"

            [gate]
            require_signature = true
            "#,
        )
        .unwrap();
        assert_eq!(config.transitions.unknown_id, UnknownIdPolicy::Ignore);
        assert!(config.transitions.allow_requirement_reset);
        assert!(config.gate.require_signature);
        assert!((config.gate.min_confidence - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.suggestion.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let err = WorkflowConfig::from_toml_str("[gate]\nmin_confidence = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "gate.min_confidence",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = WorkflowConfig::from_toml_str("[suggestion]\ntimeout_ms = 0").unwrap_err();
        assert!(err.to_string().contains("suggestion.timeout_ms"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = WorkflowConfig::from_toml_str("[gate]\nminimum = 0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn policies_follow_config() {
        let config = WorkflowConfig::new()
            .with_unknown_id(UnknownIdPolicy::Ignore)
            .with_requirement_reset(false);
        assert_eq!(config.transition_policy().unknown_id, UnknownIdPolicy::Ignore);
        assert!(!config.transition_policy().allow_reset);
        assert!(!config.requirement_policy().allow_reset);

        let config = WorkflowConfig::new();
        assert!(config.requirement_policy().allow_reset);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regflow.toml");
        std::fs::write(&path, "[logging]\njson = true\n").unwrap();
        let config = WorkflowConfig::load(&path).unwrap();
        assert!(config.logging.json);

        let err = WorkflowConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
