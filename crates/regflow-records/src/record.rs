//! Records and transition metadata

use crate::satellite::Satellite;
use chrono::{DateTime, Utc};
use regflow_status::{Lifecycle, SatelliteKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record identifier, unique within a collection
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create id
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Who changed a record, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionMeta {
    /// Acting user
    pub actor: String,
    /// Time of change
    pub at: DateTime<Utc>,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TransitionMeta {
    /// Metadata stamped now
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            at: Utc::now(),
            note: None,
        }
    }

    /// With fixed time
    #[inline]
    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }

    /// With note
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// One applied status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange<S> {
    /// Previous status
    pub from: S,
    /// New status
    pub to: S,
    /// When, if metadata was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    /// By whom, if metadata was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
}

/// A domain entity with one lifecycle status
///
/// Records are only created in `S::INITIAL`; every later status comes from
/// the transition handler, which is why the mutators are crate-private.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, T: Serialize",
    deserialize = "S: Deserialize<'de>, T: Deserialize<'de>"
))]
pub struct Record<S, T> {
    id: RecordId,
    status: S,
    fields: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    satellites: Vec<Satellite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    history: Vec<StatusChange<S>>,
}

impl<S, T> Record<S, T> {
    /// Record id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Domain fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &T {
        &self.fields
    }

    /// Attached satellites
    #[inline]
    #[must_use]
    pub fn satellites(&self) -> &[Satellite] {
        &self.satellites
    }

    /// Satellite of a given kind
    #[must_use]
    pub fn satellite(&self, kind: SatelliteKind) -> Option<&Satellite> {
        self.satellites.iter().find(|s| s.kind() == kind)
    }

    /// Last modification time
    #[inline]
    #[must_use]
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// Last modifying actor
    #[inline]
    #[must_use]
    pub fn modified_by(&self) -> Option<&str> {
        self.modified_by.as_deref()
    }

    /// Applied status changes, oldest first
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[StatusChange<S>] {
        &self.history
    }

}

impl<S: Lifecycle, T> Record<S, T> {
    /// Create record in the domain's initial status
    pub fn new(id: impl Into<RecordId>, fields: T) -> Self {
        Self {
            id: id.into(),
            status: S::INITIAL,
            fields,
            satellites: Vec::new(),
            modified_at: None,
            modified_by: None,
            history: Vec::new(),
        }
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> S {
        self.status
    }

    /// Satellite required by the current status but not attached
    #[must_use]
    pub fn missing_satellite(&self) -> Option<SatelliteKind> {
        self.status
            .required_satellite()
            .filter(|kind| self.satellite(*kind).is_none())
    }

    /// Attach or replace the satellite of the same kind
    pub(crate) fn put_satellite(&mut self, satellite: Satellite) {
        let kind = satellite.kind();
        match self.satellites.iter_mut().find(|s| s.kind() == kind) {
            Some(slot) => *slot = satellite,
            None => self.satellites.push(satellite),
        }
    }

    pub(crate) fn set_status(&mut self, to: S, meta: Option<&TransitionMeta>) {
        self.history.push(StatusChange {
            from: self.status,
            to,
            at: meta.map(|m| m.at),
            by: meta.map(|m| m.actor.clone()),
        });
        self.status = to;
        self.stamp(meta);
    }

    pub(crate) fn stamp(&mut self, meta: Option<&TransitionMeta>) {
        if let Some(meta) = meta {
            self.modified_at = Some(meta.at);
            self.modified_by = Some(meta.actor.clone());
        }
    }
}
