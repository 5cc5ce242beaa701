//! Error types for record collections
//!
//! Covers:
//! - Unknown record ids
//! - Status changes missing their required satellite data
//! - Malformed satellite or domain field values
//! - Graph violations bubbled up from `regflow-status`

use crate::record::RecordId;
use regflow_status::{SatelliteKind, StatusError};

/// Record collection errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// No record with this id exists in the collection
    #[error("unknown record: {0}")]
    UnknownRecord(RecordId),

    /// Status requires a satellite that is neither supplied nor attached
    #[error("record {id} cannot be {status} without {required}")]
    MissingSatelliteData {
        /// Target record
        id: RecordId,
        /// Status that was requested (or is held)
        status: &'static str,
        /// Satellite the status requires
        required: SatelliteKind,
    },

    /// Satellite content failed validation
    #[error("invalid {kind} on record {id}: {reason}")]
    InvalidSatellite {
        /// Target record
        id: RecordId,
        /// Satellite kind
        kind: SatelliteKind,
        /// What was wrong
        reason: String,
    },

    /// Transition carried a satellite of a kind already attached
    #[error("record {id} already has {kind}, amend it instead")]
    SatelliteAttached {
        /// Target record
        id: RecordId,
        /// Satellite kind
        kind: SatelliteKind,
    },

    /// Reset requested on a collection whose policy forbids it
    #[error("reset not allowed for {domain} record {id}")]
    ResetNotAllowed {
        /// Status domain
        domain: &'static str,
        /// Target record
        id: RecordId,
    },

    /// Two entries share an id
    #[error("duplicate record id: {0}")]
    DuplicateId(RecordId),

    /// Domain field out of range
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Status graph violation or unknown status value
    #[error(transparent)]
    Status(#[from] StatusError),
}

impl RecordError {
    /// Create invalid field error
    #[inline]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Check if the error names a record that does not exist
    #[inline]
    #[must_use]
    pub fn is_unknown_record(&self) -> bool {
        matches!(self, Self::UnknownRecord(_))
    }
}
