//! Error types for status parsing and transitions

/// Status errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// Value is not a member of the domain's enumeration
    #[error("invalid {domain} status: {value:?}")]
    InvalidStatus {
        /// Domain the value was parsed for
        domain: &'static str,
        /// Offending value
        value: String,
    },

    /// Edge is not part of the domain's transition graph
    #[error("illegal {domain} transition: {from} -> {to}")]
    IllegalTransition {
        /// Domain of the status pair
        domain: &'static str,
        /// Current status
        from: &'static str,
        /// Requested status
        to: &'static str,
    },
}

impl StatusError {
    /// Create invalid status error
    #[inline]
    pub fn invalid(domain: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidStatus {
            domain,
            value: value.into(),
        }
    }
}
