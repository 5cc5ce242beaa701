//! Transition handler
//!
//! Applies one status change to one record and returns a new collection.
//! The input collection is never touched.
//!
//! # Workflow
//! 1. Locate the record (nested sections included)
//! 2. Validate the edge against the domain graph
//! 3. Validate and attach the supplied satellite
//! 4. Check the target status has its required satellite
//! 5. Stamp metadata and append to the record's history

use crate::error::RecordError;
use crate::record::{Record, RecordId, TransitionMeta};
use crate::satellite::Satellite;
use crate::tree::RecordSet;
use regflow_status::{validate_transition, Lifecycle};
use serde::{Deserialize, Serialize};

/// What to do when a request names a record that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIdPolicy {
    /// Fail with [`RecordError::UnknownRecord`]
    #[default]
    Reject,
    /// Return the collection unchanged
    Ignore,
}

/// Per-collection transition rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransitionPolicy {
    /// Unknown id handling
    #[serde(default)]
    pub unknown_id: UnknownIdPolicy,
    /// Whether the explicit reset action is available
    #[serde(default)]
    pub allow_reset: bool,
}

impl TransitionPolicy {
    /// Default policy: reject unknown ids, no resets
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With unknown id handling
    #[inline]
    #[must_use]
    pub fn with_unknown_id(mut self, policy: UnknownIdPolicy) -> Self {
        self.unknown_id = policy;
        self
    }

    /// With reset allowed or not
    #[inline]
    #[must_use]
    pub fn with_reset(mut self, allow: bool) -> Self {
        self.allow_reset = allow;
        self
    }
}

/// A requested status change
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest<S> {
    /// Target record
    pub id: RecordId,
    /// Requested status
    pub to: S,
    /// Satellite to attach alongside the change
    pub satellite: Option<Satellite>,
    /// Who and when
    pub meta: Option<TransitionMeta>,
}

impl<S: Lifecycle> TransitionRequest<S> {
    /// Request moving `id` to `to`
    pub fn new(id: impl Into<RecordId>, to: S) -> Self {
        Self {
            id: id.into(),
            to,
            satellite: None,
            meta: None,
        }
    }

    /// With satellite
    #[must_use]
    pub fn with_satellite(mut self, satellite: impl Into<Satellite>) -> Self {
        self.satellite = Some(satellite.into());
        self
    }

    /// With metadata
    #[must_use]
    pub fn with_meta(mut self, meta: TransitionMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Applies transitions under a [`TransitionPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionHandler {
    policy: TransitionPolicy,
}

impl TransitionHandler {
    /// Create handler
    #[inline]
    #[must_use]
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Apply a status change
    ///
    /// Re-requesting the current status returns an equal collection without
    /// restamping; a satellite carried by such a request is ignored, use
    /// [`TransitionHandler::amend`] to change satellite data.
    ///
    /// # Errors
    /// - `UnknownRecord` when the id is missing and the policy rejects
    /// - `Status(IllegalTransition)` for edges outside the graph
    /// - `InvalidSatellite` for malformed satellite content
    /// - `SatelliteAttached` when the request carries a different satellite
    ///   of a kind the record already holds
    /// - `MissingSatelliteData` when the target status needs a satellite
    pub fn apply<S: Lifecycle, T: Clone>(
        &self,
        records: &RecordSet<S, T>,
        request: TransitionRequest<S>,
    ) -> Result<RecordSet<S, T>, RecordError> {
        let Some(current) = records.find(&request.id) else {
            return self.unknown(records, request.id);
        };

        if current.status() == request.to {
            return Ok(records.clone());
        }

        validate_transition(current.status(), request.to)?;

        let mut updated = current.clone();
        if let Some(satellite) = request.satellite {
            match current.satellite(satellite.kind()) {
                Some(attached) if *attached == satellite => {}
                Some(_) => {
                    return Err(RecordError::SatelliteAttached {
                        id: request.id,
                        kind: satellite.kind(),
                    });
                }
                None => {
                    check_satellite(&request.id, &satellite)?;
                    updated.put_satellite(satellite);
                }
            }
        }
        if let Some(required) = request.to.required_satellite() {
            if updated.satellite(required).is_none() {
                return Err(RecordError::MissingSatelliteData {
                    id: request.id,
                    status: request.to.as_str(),
                    required,
                });
            }
        }
        updated.set_status(request.to, request.meta.as_ref());

        tracing::debug!(
            domain = S::DOMAIN,
            id = %request.id,
            from = %current.status(),
            to = %request.to,
            "applied transition"
        );

        Ok(replace(records, &request.id, updated))
    }

    /// Move a record back to the initial status
    ///
    /// Satellites stay attached; the initial status of every domain requires
    /// none, so the collection invariants still hold.
    ///
    /// # Errors
    /// - `ResetNotAllowed` when the policy forbids resets
    /// - `UnknownRecord` when the id is missing and the policy rejects
    pub fn reset<S: Lifecycle, T: Clone>(
        &self,
        records: &RecordSet<S, T>,
        id: &RecordId,
        meta: Option<TransitionMeta>,
    ) -> Result<RecordSet<S, T>, RecordError> {
        if !self.policy.allow_reset {
            return Err(RecordError::ResetNotAllowed {
                domain: S::DOMAIN,
                id: id.clone(),
            });
        }
        let Some(current) = records.find(id) else {
            return self.unknown(records, id.clone());
        };
        if current.status() == S::INITIAL {
            return Ok(records.clone());
        }

        let mut updated = current.clone();
        updated.set_status(S::INITIAL, meta.as_ref());
        tracing::debug!(domain = S::DOMAIN, id = %id, from = %current.status(), "reset record");

        Ok(replace(records, id, updated))
    }

    /// Replace an attached satellite with a new one of the same kind
    ///
    /// # Errors
    /// - `MissingSatelliteData` when nothing of that kind is attached
    /// - `InvalidSatellite` for malformed content
    /// - `UnknownRecord` when the id is missing and the policy rejects
    pub fn amend<S: Lifecycle, T: Clone>(
        &self,
        records: &RecordSet<S, T>,
        id: &RecordId,
        satellite: impl Into<Satellite>,
        meta: Option<TransitionMeta>,
    ) -> Result<RecordSet<S, T>, RecordError> {
        let satellite = satellite.into();
        let Some(current) = records.find(id) else {
            return self.unknown(records, id.clone());
        };
        let kind = satellite.kind();
        if current.satellite(kind).is_none() {
            return Err(RecordError::MissingSatelliteData {
                id: id.clone(),
                status: current.status().as_str(),
                required: kind,
            });
        }
        check_satellite(id, &satellite)?;

        let mut updated = current.clone();
        updated.put_satellite(satellite);
        updated.stamp(meta.as_ref());
        tracing::debug!(domain = S::DOMAIN, id = %id, %kind, "amended satellite");

        Ok(replace(records, id, updated))
    }

    fn unknown<S: Lifecycle, T: Clone>(
        &self,
        records: &RecordSet<S, T>,
        id: RecordId,
    ) -> Result<RecordSet<S, T>, RecordError> {
        match self.policy.unknown_id {
            UnknownIdPolicy::Reject => Err(RecordError::UnknownRecord(id)),
            UnknownIdPolicy::Ignore => {
                tracing::warn!(domain = S::DOMAIN, id = %id, "ignoring transition for unknown record");
                Ok(records.clone())
            }
        }
    }
}

/// Apply a bare status change with the default policy
///
/// # Errors
/// See [`TransitionHandler::apply`].
pub fn apply_transition<S: Lifecycle, T: Clone>(
    records: &RecordSet<S, T>,
    id: &RecordId,
    new_status: S,
    meta: Option<TransitionMeta>,
) -> Result<RecordSet<S, T>, RecordError> {
    let mut request = TransitionRequest::new(id.clone(), new_status);
    request.meta = meta;
    TransitionHandler::default().apply(records, request)
}

fn check_satellite(id: &RecordId, satellite: &Satellite) -> Result<(), RecordError> {
    satellite
        .validate()
        .map_err(|reason| RecordError::InvalidSatellite {
            id: id.clone(),
            kind: satellite.kind(),
            reason,
        })
}

fn replace<S: Lifecycle, T: Clone>(
    records: &RecordSet<S, T>,
    id: &RecordId,
    updated: Record<S, T>,
) -> RecordSet<S, T> {
    // the id was found a moment ago in the same immutable collection
    records
        .map_record(id, move |_| updated)
        .unwrap_or_else(|| records.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::satellite::{Resolution, SourceMapping};
    use crate::tree::Section;
    use pretty_assertions::assert_eq;
    use regflow_status::{
        AnnotationStatus, ElementStatus, RuleReviewStatus, SatelliteKind, StatusError,
    };

    fn elements() -> RecordSet<ElementStatus, ()> {
        RecordSet::from_entries(vec![
            Section::new("sec", "Exposure")
                .with_child(Record::new("a", ()))
                .with_child(Record::new("b", ()))
                .into(),
            Record::new("c", ()).into(),
        ])
        .unwrap()
    }

    fn mapping() -> SourceMapping {
        SourceMapping::new("GL", "ledger", "balance")
    }

    fn id(s: &str) -> RecordId {
        RecordId::from(s)
    }

    #[test]
    fn apply_nested_record() {
        let set = elements();
        let out = TransitionHandler::default()
            .apply(
                &set,
                TransitionRequest::new("b", ElementStatus::Mapped).with_satellite(mapping()),
            )
            .unwrap();

        assert_eq!(out.find(&id("b")).unwrap().status(), ElementStatus::Mapped);
        assert_eq!(set.find(&id("b")).unwrap().status(), ElementStatus::Pending);
        assert_ne!(out, set);
    }

    #[test]
    fn mapped_without_mapping_is_rejected() {
        let err = apply_transition(&elements(), &id("a"), ElementStatus::Mapped, None).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingSatelliteData {
                id: id("a"),
                status: "mapped",
                required: SatelliteKind::SourceMapping,
            }
        );
    }

    #[test]
    fn validated_reuses_existing_mapping() {
        let handler = TransitionHandler::default();
        let mapped = handler
            .apply(
                &elements(),
                TransitionRequest::new("a", ElementStatus::Mapped).with_satellite(mapping()),
            )
            .unwrap();
        let validated =
            apply_transition(&mapped, &id("a"), ElementStatus::Validated, None).unwrap();
        assert_eq!(
            validated.find(&id("a")).unwrap().status(),
            ElementStatus::Validated
        );
    }

    #[test]
    fn illegal_edge_is_rejected() {
        let err =
            apply_transition(&elements(), &id("a"), ElementStatus::Validated, None).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Status(StatusError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn unknown_id_rejected_by_default() {
        let err = apply_transition(&elements(), &id("zz"), ElementStatus::Gap, None).unwrap_err();
        assert!(err.is_unknown_record());
    }

    #[test]
    fn unknown_id_ignored_when_configured() {
        let set = elements();
        let handler =
            TransitionHandler::new(TransitionPolicy::new().with_unknown_id(UnknownIdPolicy::Ignore));
        let out = handler
            .apply(&set, TransitionRequest::new("zz", ElementStatus::Gap))
            .unwrap();
        assert_eq!(out, set);
    }

    #[test]
    fn same_status_is_noop() {
        let set = apply_transition(&elements(), &id("c"), ElementStatus::Gap, None).unwrap();
        let again = apply_transition(
            &set,
            &id("c"),
            ElementStatus::Gap,
            Some(TransitionMeta::new("someone-else")),
        )
        .unwrap();
        assert_eq!(again, set);
        assert_eq!(again.find(&id("c")).unwrap().history().len(), 1);
    }

    #[test]
    fn meta_is_stamped() {
        let meta = TransitionMeta::new("analyst").with_note("no source system");
        let at = meta.at;
        let set = apply_transition(&elements(), &id("c"), ElementStatus::Gap, Some(meta)).unwrap();
        let rec = set.find(&id("c")).unwrap();
        assert_eq!(rec.modified_by(), Some("analyst"));
        assert_eq!(rec.modified_at(), Some(at));
    }

    #[test]
    fn empty_resolution_rejected() {
        let set: RecordSet<AnnotationStatus, ()> =
            RecordSet::from_records(vec![Record::new("n1", ())]).unwrap();
        let err = TransitionHandler::default()
            .apply(
                &set,
                TransitionRequest::new("n1", AnnotationStatus::Resolved)
                    .with_satellite(Resolution::new("", "reviewer")),
            )
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidSatellite { .. }));
    }

    #[test]
    fn reset_requires_policy() {
        let set: RecordSet<RuleReviewStatus, ()> =
            RecordSet::from_records(vec![Record::new("r1", ())]).unwrap();
        let accepted = apply_transition(&set, &id("r1"), RuleReviewStatus::Accepted, None).unwrap();

        let err = TransitionHandler::default()
            .reset(&accepted, &id("r1"), None)
            .unwrap_err();
        assert!(matches!(err, RecordError::ResetNotAllowed { .. }));

        let handler = TransitionHandler::new(TransitionPolicy::new().with_reset(true));
        let reset = handler.reset(&accepted, &id("r1"), None).unwrap();
        let rec = reset.find(&id("r1")).unwrap();
        assert_eq!(rec.status(), RuleReviewStatus::Pending);
        assert_eq!(rec.history().len(), 2);
    }

    #[test]
    fn amend_replaces_mapping() {
        let handler = TransitionHandler::default();
        let mapped = handler
            .apply(
                &elements(),
                TransitionRequest::new("a", ElementStatus::Mapped).with_satellite(mapping()),
            )
            .unwrap();
        let amended = handler
            .amend(
                &mapped,
                &id("a"),
                SourceMapping::new("GL", "ledger", "closing_balance"),
                Some(TransitionMeta::new("analyst")),
            )
            .unwrap();

        let rec = amended.find(&id("a")).unwrap();
        assert_eq!(rec.status(), ElementStatus::Mapped);
        assert_eq!(rec.satellites().len(), 1);
        assert_eq!(rec.modified_by(), Some("analyst"));
        match rec.satellite(SatelliteKind::SourceMapping) {
            Some(Satellite::SourceMapping(m)) => assert_eq!(m.field, "closing_balance"),
            other => panic!("unexpected satellite: {other:?}"),
        }
    }

    #[test]
    fn apply_does_not_replace_attached_satellite() {
        let handler = TransitionHandler::default();
        let mapped = handler
            .apply(
                &elements(),
                TransitionRequest::new("a", ElementStatus::Mapped).with_satellite(mapping()),
            )
            .unwrap();
        let err = handler
            .apply(
                &mapped,
                TransitionRequest::new("a", ElementStatus::Gap)
                    .with_satellite(SourceMapping::new("GL", "ledger", "other")),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::SatelliteAttached {
                id: id("a"),
                kind: SatelliteKind::SourceMapping,
            }
        );

        // the same mapping again is accepted and changes nothing
        let validated = handler
            .apply(
                &mapped,
                TransitionRequest::new("a", ElementStatus::Validated).with_satellite(mapping()),
            )
            .unwrap();
        assert_eq!(
            validated.find(&id("a")).unwrap().satellites(),
            mapped.find(&id("a")).unwrap().satellites()
        );
    }

    #[test]
    fn amend_without_existing_satellite_fails() {
        let err = TransitionHandler::default()
            .amend(&elements(), &id("a"), mapping(), None)
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingSatelliteData { .. }));
    }
}
