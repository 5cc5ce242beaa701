//! Lifecycle trait and transition validation
//!
//! Every workflow domain defines a closed status enumeration and a directed
//! graph over it. The graph is the only source of truth for which status
//! changes are legal; resets back to the initial status are an explicit
//! action layered on top by the record handler.

use crate::error::StatusError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

/// Kind of satellite record a status can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatelliteKind {
    /// Source system mapping for a data element
    SourceMapping,
    /// Resolution text for an annotation
    Resolution,
    /// Evidence backing a compliance assessment
    Evidence,
    /// Signed attestation
    Attestation,
}

impl SatelliteKind {
    /// Stable name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SatelliteKind::SourceMapping => "source_mapping",
            SatelliteKind::Resolution => "resolution",
            SatelliteKind::Evidence => "evidence",
            SatelliteKind::Attestation => "attestation",
        }
    }
}

impl Display for SatelliteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed status enumeration with its transition graph
///
/// # Contract
/// - `ALL` lists every variant exactly once, in display order
/// - `INITIAL` is the status new records are created in
/// - `successors` never contains `self`
pub trait Lifecycle:
    Copy
    + Eq
    + Hash
    + Debug
    + Display
    + FromStr<Err = StatusError>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Domain name used in errors and logs
    const DOMAIN: &'static str;

    /// Every variant, in declaration order
    const ALL: &'static [Self];

    /// Status assigned at creation
    const INITIAL: Self;

    /// Stable wire name
    fn as_str(self) -> &'static str;

    /// Statuses reachable in one step
    fn successors(self) -> &'static [Self];

    /// Whether this status counts towards completion
    fn is_complete(self) -> bool;

    /// Whether this status is the domain's problem state
    fn is_gap(self) -> bool {
        false
    }

    /// Satellite record that must exist while in this status
    fn required_satellite(self) -> Option<SatelliteKind> {
        None
    }
}

/// Validates a single status change against the domain graph.
pub fn validate_transition<S: Lifecycle>(from: S, to: S) -> Result<(), StatusError> {
    if from.successors().contains(&to) {
        Ok(())
    } else {
        Err(StatusError::IllegalTransition {
            domain: S::DOMAIN,
            from: from.as_str(),
            to: to.as_str(),
        })
    }
}

/// Statuses reachable from `from` in one step.
#[must_use]
pub fn allowed_transitions<S: Lifecycle>(from: S) -> Vec<S> {
    from.successors().to_vec()
}

/// Whether `status` has no outgoing edges.
#[inline]
#[must_use]
pub fn is_terminal<S: Lifecycle>(status: S) -> bool {
    status.successors().is_empty()
}

/// Parses a wire name into a status, rejecting anything outside `S::ALL`.
pub fn parse_status<S: Lifecycle>(value: &str) -> Result<S, StatusError> {
    S::ALL
        .iter()
        .copied()
        .find(|s| s.as_str() == value)
        .ok_or_else(|| StatusError::invalid(S::DOMAIN, value))
}
