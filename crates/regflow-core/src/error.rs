//! Error types for regflow Core
//!
//! Provides the umbrella [`WorkflowError`] over:
//! - Record and transition failures
//! - Summary and checklist failures
//! - Approval gate misuse
//! - Configuration loading
//! - Suggestion task failures

use crate::phase::Phase;
use regflow_records::RecordError;
use regflow_summary::SummaryError;

/// Main workflow error type
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Record collection rejected a change
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Summary or checklist rejected an operation
    #[error("summary error: {0}")]
    Summary(#[from] SummaryError),

    /// Approval gate misuse
    #[error("gate error: {0}")]
    Gate(#[from] GateError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Suggestion task failed
    #[error("suggestion failed: {0}")]
    Suggestion(#[from] SuggestionError),

    /// Activation requested with no accepted rules
    #[error("cannot activate 0 rules")]
    NothingToActivate,

    /// Gate submitted before a decision was made
    #[error("gate for {0} is still undecided")]
    GateUndecided(Phase),

    /// Completion requested before attestation
    #[error("workflow has not been attested")]
    NotAttested,
}

impl WorkflowError {
    /// Check if the error came from a missing precondition the user can fix
    #[inline]
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NothingToActivate
                | Self::GateUndecided(_)
                | Self::NotAttested
                | Self::Summary(SummaryError::IncompleteChecklist { .. })
                | Self::Record(RecordError::MissingSatelliteData { .. })
        )
    }
}

/// Approval gate errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateError {
    /// Confidence score outside `[0, 1]`
    #[error("item {id}: confidence {value} is outside [0, 1]")]
    InvalidConfidence {
        /// Item id
        id: String,
        /// Offending value
        value: f64,
    },

    /// Two items share an id
    #[error("duplicate gate item: {0}")]
    DuplicateItem(String),

    /// Approval without rationale
    #[error("approval rationale is empty")]
    EmptyRationale,

    /// Rejection without reason
    #[error("rejection reason is empty")]
    EmptyReason,

    /// Configuration demands a signature
    #[error("approval requires a signature")]
    SignatureRequired,

    /// Gate was already approved or rejected
    #[error("gate already decided")]
    AlreadyDecided,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML did not parse
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config value for {key}: {reason}")]
    Invalid {
        /// Dotted key
        key: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Tracing subscriber could not be installed
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Suggestion task errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestionError {
    /// Provider reported a failure
    #[error("provider failed: {0}")]
    Provider(String),

    /// Task panicked or was aborted
    #[error("task aborted: {0}")]
    Aborted(String),
}
