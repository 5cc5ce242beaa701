//! Error types for summaries and checklists

/// Summary errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    /// Required checklist items are not acknowledged
    #[error("checklist incomplete, unacknowledged: {}", missing.join(", "))]
    IncompleteChecklist {
        /// Ids of the unacknowledged required items
        missing: Vec<String>,
    },

    /// Checklist has no item with this id
    #[error("unknown checklist item: {0}")]
    UnknownChecklistItem(String),

    /// Two checklist items share an id
    #[error("duplicate checklist item: {0}")]
    DuplicateChecklistItem(String),

    /// Coverage matrix has no such CDE
    #[error("unknown CDE: {0}")]
    UnknownCde(String),

    /// Attestation inputs are unusable
    #[error("invalid attestation: {0}")]
    InvalidAttestation(String),
}
