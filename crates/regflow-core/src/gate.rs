//! Human approval gates
//!
//! A gate presents the items a phase produced, some of them AI generated
//! with a confidence score, and records a single approve or reject
//! decision.

use crate::config::GateConfig;
use crate::error::GateError;
use crate::phase::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ulid::Ulid;

/// One item put in front of a reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateItem {
    /// Item id
    pub id: String,
    /// Display label
    pub label: String,
    /// Proposed value
    pub value: String,
    /// Produced by a model rather than a person
    pub is_ai_generated: bool,
    /// Model confidence in `[0, 1]`
    pub confidence_score: Option<f64>,
}

impl GateItem {
    /// Item authored by a person
    pub fn manual(id: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value: value.into(),
            is_ai_generated: false,
            confidence_score: None,
        }
    }

    /// Item proposed by a model
    ///
    /// # Errors
    /// `InvalidConfidence` outside `[0, 1]`.
    pub fn suggested(
        id: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
        confidence: f64,
    ) -> Result<Self, GateError> {
        let item = Self {
            is_ai_generated: true,
            confidence_score: Some(confidence),
            ..Self::manual(id, label, value)
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<(), GateError> {
        match self.confidence_score {
            Some(value) if !(0.0..=1.0).contains(&value) => Err(GateError::InvalidConfidence {
                id: self.id.clone(),
                value,
            }),
            _ => Ok(()),
        }
    }

    /// AI item below the confidence threshold, or with no score at all
    #[must_use]
    pub fn needs_review(&self, min_confidence: f64) -> bool {
        self.is_ai_generated
            && self
                .confidence_score
                .map_or(true, |score| score < min_confidence)
    }
}

/// Outcome recorded on a gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateVerdict {
    /// Phase output accepted
    Approved {
        /// Why
        rationale: String,
        /// Typed signature, if given
        signature: Option<String>,
    },
    /// Phase output sent back
    Rejected {
        /// Why
        reason: String,
    },
}

/// Decision taken on a gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Decision id
    pub id: Ulid,
    /// Phase the gate belongs to
    pub phase: Phase,
    /// Approve or reject
    pub verdict: GateVerdict,
    /// When
    pub decided_at: DateTime<Utc>,
}

impl GateDecision {
    /// Whether the gate was approved
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self.verdict, GateVerdict::Approved { .. })
    }
}

/// Approval gate for one phase
#[derive(Debug, Clone)]
pub struct HumanGate {
    phase: Phase,
    items: Vec<GateItem>,
    config: GateConfig,
    decision: Option<GateDecision>,
}

impl HumanGate {
    /// Open a gate
    ///
    /// # Errors
    /// `InvalidConfidence` or `DuplicateItem` for malformed items.
    pub fn new(phase: Phase, items: Vec<GateItem>, config: GateConfig) -> Result<Self, GateError> {
        let mut seen = HashSet::new();
        for item in &items {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(GateError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self {
            phase,
            items,
            config,
            decision: None,
        })
    }

    /// Phase
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// All items
    #[inline]
    pub fn items(&self) -> &[GateItem] {
        &self.items
    }

    /// AI items under the configured confidence threshold
    pub fn items_needing_review(&self) -> Vec<&GateItem> {
        self.items
            .iter()
            .filter(|item| item.needs_review(self.config.min_confidence))
            .collect()
    }

    /// Decision, once taken
    #[inline]
    pub fn decision(&self) -> Option<&GateDecision> {
        self.decision.as_ref()
    }

    /// Whether a decision was taken
    #[inline]
    pub fn is_decided(&self) -> bool {
        self.decision.is_some()
    }

    /// Approve the phase output
    ///
    /// # Errors
    /// - `AlreadyDecided` on a second decision
    /// - `EmptyRationale` without a rationale
    /// - `SignatureRequired` when configured and none given
    pub fn approve(
        &mut self,
        rationale: &str,
        signature: Option<&str>,
    ) -> Result<&GateDecision, GateError> {
        self.ensure_open()?;
        if rationale.trim().is_empty() {
            return Err(GateError::EmptyRationale);
        }
        let signature = signature.map(str::trim).filter(|s| !s.is_empty());
        if self.config.require_signature && signature.is_none() {
            return Err(GateError::SignatureRequired);
        }
        tracing::info!(
            phase = %self.phase,
            items = self.items.len(),
            flagged = self.items_needing_review().len(),
            "gate approved"
        );
        Ok(self.decide(GateVerdict::Approved {
            rationale: rationale.trim().to_string(),
            signature: signature.map(str::to_string),
        }))
    }

    /// Reject the phase output
    ///
    /// # Errors
    /// `AlreadyDecided` on a second decision, `EmptyReason` without a reason.
    pub fn reject(&mut self, reason: &str) -> Result<&GateDecision, GateError> {
        self.ensure_open()?;
        if reason.trim().is_empty() {
            return Err(GateError::EmptyReason);
        }
        tracing::info!(phase = %self.phase, reason, "gate rejected");
        Ok(self.decide(GateVerdict::Rejected {
            reason: reason.trim().to_string(),
        }))
    }

    fn ensure_open(&self) -> Result<(), GateError> {
        if self.decision.is_some() {
            return Err(GateError::AlreadyDecided);
        }
        Ok(())
    }

    fn decide(&mut self, verdict: GateVerdict) -> &GateDecision {
        self.decision.insert(GateDecision {
            id: Ulid::new(),
            phase: self.phase,
            verdict,
            decided_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn items() -> Vec<GateItem> {
        vec![
            GateItem::manual("a", "Owner", "Finance"),
            GateItem::suggested("b", "Threshold", "99.5", 0.92).unwrap(),
            GateItem::suggested("c", "Logic", "lei IS NOT NULL", 0.41).unwrap(),
        ]
    }

    #[test]
    fn flags_low_confidence_ai_items() {
        let gate = HumanGate::new(Phase::DataQualityRules, items(), GateConfig::default()).unwrap();
        let flagged: Vec<&str> = gate.items_needing_review().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(flagged, vec!["c"]);

        let strict = GateConfig {
            min_confidence: 0.95,
            ..GateConfig::default()
        };
        let gate = HumanGate::new(Phase::DataQualityRules, items(), strict).unwrap();
        assert_eq!(gate.items_needing_review().len(), 2);
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        assert!(matches!(
            GateItem::suggested("x", "l", "v", 1.2),
            Err(GateError::InvalidConfidence { .. })
        ));

        let mut bad = GateItem::manual("x", "l", "v");
        bad.confidence_score = Some(-0.1);
        let err = HumanGate::new(Phase::Documentation, vec![bad], GateConfig::default()).unwrap_err();
        assert!(matches!(err, GateError::InvalidConfidence { .. }));
    }

    #[test]
    fn rejects_duplicate_items() {
        let dup = vec![GateItem::manual("a", "x", "1"), GateItem::manual("a", "y", "2")];
        let err = HumanGate::new(Phase::Documentation, dup, GateConfig::default()).unwrap_err();
        assert_eq!(err, GateError::DuplicateItem("a".to_string()));
    }

    #[test]
    fn approve_records_decision_once() {
        let mut gate = HumanGate::new(Phase::CdeIdentification, items(), GateConfig::default()).unwrap();
        assert_eq!(gate.approve("  ", None).unwrap_err(), GateError::EmptyRationale);
        assert!(!gate.is_decided());

        let decision = gate.approve("reviewed with data owners", None).unwrap();
        assert!(decision.is_approved());
        assert_eq!(decision.phase, Phase::CdeIdentification);

        assert_eq!(gate.approve("again", None).unwrap_err(), GateError::AlreadyDecided);
        assert_eq!(gate.reject("too late").unwrap_err(), GateError::AlreadyDecided);
    }

    #[test]
    fn signature_requirement_is_configurable() {
        let config = GateConfig {
            require_signature: true,
            ..GateConfig::default()
        };
        let mut gate = HumanGate::new(Phase::Attestation, items(), config).unwrap();
        assert_eq!(gate.approve("ok", Some(" ")).unwrap_err(), GateError::SignatureRequired);

        let decision = gate.approve("ok", Some("J. Smith")).unwrap();
        assert_eq!(
            decision.verdict,
            GateVerdict::Approved {
                rationale: "ok".to_string(),
                signature: Some("J. Smith".to_string()),
            }
        );
    }

    #[test]
    fn reject_needs_reason() {
        let mut gate = HumanGate::new(Phase::RequirementsDocument, vec![], GateConfig::default()).unwrap();
        assert_eq!(gate.reject("").unwrap_err(), GateError::EmptyReason);
        let decision = gate.reject("missing lines 4-7").unwrap();
        assert!(!decision.is_approved());
    }
}
