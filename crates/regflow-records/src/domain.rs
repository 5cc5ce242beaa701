//! Domain field types for each workflow collection

use crate::error::RecordError;
use crate::tree::RecordSet;
use regflow_status::{
    AnnotationStatus, ComplianceStatus, DocumentStatus, ElementStatus, RuleReviewStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Data-quality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DqDimension {
    /// Required values present
    Completeness,
    /// Values reflect reality
    Accuracy,
    /// Values conform to format and domain
    Validity,
    /// Values agree across sources
    Consistency,
    /// Values available when needed
    Timeliness,
    /// No unintended duplicates
    Uniqueness,
    /// Relationships hold
    Integrity,
}

impl DqDimension {
    /// All seven dimensions, in display order
    pub const ALL: [DqDimension; 7] = [
        DqDimension::Completeness,
        DqDimension::Accuracy,
        DqDimension::Validity,
        DqDimension::Consistency,
        DqDimension::Timeliness,
        DqDimension::Uniqueness,
        DqDimension::Integrity,
    ];

    /// Stable wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DqDimension::Completeness => "completeness",
            DqDimension::Accuracy => "accuracy",
            DqDimension::Validity => "validity",
            DqDimension::Consistency => "consistency",
            DqDimension::Timeliness => "timeliness",
            DqDimension::Uniqueness => "uniqueness",
            DqDimension::Integrity => "integrity",
        }
    }
}

impl fmt::Display for DqDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DqDimension {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DqDimension::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| RecordError::invalid_field("dimension", format!("unknown dimension {s:?}")))
    }
}

/// Rule extracted from regulatory text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegulatoryRuleFields")]
pub struct RegulatoryRule {
    /// Citation in the source regulation
    pub citation: String,
    /// Rule text
    pub text: String,
    /// Extraction confidence in `[0, 1]`, when machine-extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl RegulatoryRule {
    /// Create rule
    ///
    /// # Errors
    /// Fails when `confidence` lies outside `[0, 1]`.
    pub fn new(
        citation: impl Into<String>,
        text: impl Into<String>,
        confidence: Option<f64>,
    ) -> Result<Self, RecordError> {
        if let Some(c) = confidence {
            check_unit_interval("confidence", c)?;
        }
        Ok(Self {
            citation: citation.into(),
            text: text.into(),
            confidence,
        })
    }
}

#[derive(Deserialize)]
struct RegulatoryRuleFields {
    citation: String,
    text: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl TryFrom<RegulatoryRuleFields> for RegulatoryRule {
    type Error = RecordError;

    fn try_from(value: RegulatoryRuleFields) -> Result<Self, Self::Error> {
        Self::new(value.citation, value.text, value.confidence)
    }
}

/// Line in the requirements document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Short title
    pub title: String,
    /// Full description
    pub description: String,
}

/// Reportable data element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataElement {
    /// Business name
    pub name: String,
    /// Definition
    #[serde(default)]
    pub description: String,
    /// Whether it is a critical data element
    #[serde(default)]
    pub is_cde: bool,
}

/// Data-quality rule bound to a CDE and dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DqRuleFields")]
pub struct DqRule {
    /// CDE the rule checks
    pub cde: String,
    /// Dimension covered
    pub dimension: DqDimension,
    /// Rule logic expression
    pub logic: String,
    /// Pass threshold, percent of rows in `[0, 100]`
    pub threshold: f64,
}

impl DqRule {
    /// Create rule
    ///
    /// # Errors
    /// Fails on an empty logic expression or a threshold outside `[0, 100]`.
    pub fn new(
        cde: impl Into<String>,
        dimension: DqDimension,
        logic: impl Into<String>,
        threshold: f64,
    ) -> Result<Self, RecordError> {
        let logic = logic.into();
        if logic.trim().is_empty() {
            return Err(RecordError::invalid_field("logic", "expression is empty"));
        }
        if !(0.0..=100.0).contains(&threshold) {
            return Err(RecordError::invalid_field(
                "threshold",
                format!("{threshold} is outside [0, 100]"),
            ));
        }
        Ok(Self {
            cde: cde.into(),
            dimension,
            logic,
            threshold,
        })
    }
}

#[derive(Deserialize)]
struct DqRuleFields {
    cde: String,
    dimension: DqDimension,
    logic: String,
    threshold: f64,
}

impl TryFrom<DqRuleFields> for DqRule {
    type Error = RecordError;

    fn try_from(value: DqRuleFields) -> Result<Self, Self::Error> {
        Self::new(value.cde, value.dimension, value.logic, value.threshold)
    }
}

/// Reviewer comment on a workflow artefact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// What the annotation is attached to
    pub target: String,
    /// Author
    pub author: String,
    /// Comment text
    pub text: String,
}

/// Compliance principle, e.g. one of the BCBS 239 principles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    /// Principle number
    pub number: u8,
    /// Short title
    pub title: String,
    /// Grouping, e.g. "Governance and infrastructure"
    pub category: String,
}

/// Generated documentation artefact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Title
    pub title: String,
    /// Document kind, e.g. "data dictionary"
    pub kind: String,
}

/// Regulatory rules under review
pub type RegulatoryRuleSet = RecordSet<RuleReviewStatus, RegulatoryRule>;
/// Requirements document lines
pub type RequirementSet = RecordSet<RuleReviewStatus, Requirement>;
/// Data elements, usually sectioned
pub type ElementSet = RecordSet<ElementStatus, DataElement>;
/// Data-quality rules
pub type DqRuleSet = RecordSet<RuleReviewStatus, DqRule>;
/// Annotations
pub type AnnotationSet = RecordSet<AnnotationStatus, Annotation>;
/// Compliance principles
pub type PrincipleSet = RecordSet<ComplianceStatus, Principle>;
/// Documents
pub type DocumentSet = RecordSet<DocumentStatus, Document>;

fn check_unit_interval(field: &'static str, value: f64) -> Result<(), RecordError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RecordError::invalid_field(
            field,
            format!("{value} is outside [0, 1]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dq_rule_threshold_bounds() {
        assert!(DqRule::new("LEI", DqDimension::Completeness, "lei IS NOT NULL", 99.5).is_ok());
        assert!(DqRule::new("LEI", DqDimension::Completeness, "lei IS NOT NULL", 100.0).is_ok());

        let err = DqRule::new("LEI", DqDimension::Completeness, "lei IS NOT NULL", 101.0)
            .unwrap_err();
        assert!(err.to_string().contains("outside [0, 100]"));

        assert!(DqRule::new("LEI", DqDimension::Accuracy, "x", -1.0).is_err());
        assert!(DqRule::new("LEI", DqDimension::Accuracy, "x", f64::NAN).is_err());
    }

    #[test]
    fn dq_rule_needs_logic() {
        let err = DqRule::new("LEI", DqDimension::Validity, "  ", 95.0).unwrap_err();
        assert_eq!(
            err,
            RecordError::invalid_field("logic", "expression is empty")
        );
    }

    #[test]
    fn negative_confidence_rejected() {
        assert!(RegulatoryRule::new("Art. 4", "report daily", Some(-0.2)).is_err());
        assert!(RegulatoryRule::new("Art. 4", "report daily", Some(0.92)).is_ok());
        assert!(RegulatoryRule::new("Art. 4", "report daily", None).is_ok());
    }

    #[test]
    fn loaded_rules_are_validated() {
        let ok: DqRule = serde_json::from_str(
            r#"{"cde": "lei", "dimension": "validity", "logic": "len(lei) = 20", "threshold": 98.0}"#,
        )
        .unwrap();
        assert_eq!(ok.dimension, DqDimension::Validity);

        let err = serde_json::from_str::<DqRule>(
            r#"{"cde": "lei", "dimension": "validity", "logic": "x", "threshold": 500.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("outside [0, 100]"));
        assert!(serde_json::from_str::<DqRule>(
            r#"{"cde": "lei", "dimension": "validity", "logic": "", "threshold": 50.0}"#,
        )
        .is_err());

        let err = serde_json::from_str::<RegulatoryRule>(
            r#"{"citation": "Art. 4", "text": "report daily", "confidence": -3.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid confidence"));
        let rule: RegulatoryRule =
            serde_json::from_str(r#"{"citation": "Art. 4", "text": "report daily"}"#).unwrap();
        assert_eq!(rule.confidence, None);
    }

    #[test]
    fn loaded_set_rejects_invalid_rule() {
        let input = r#"[{"type": "record", "id": "q1", "status": "pending",
            "fields": {"cde": "lei", "dimension": "accuracy", "logic": "x", "threshold": -1.0}}]"#;
        assert!(serde_json::from_str::<DqRuleSet>(input).is_err());
    }

    #[test]
    fn dimension_parse() {
        assert_eq!(
            "timeliness".parse::<DqDimension>().unwrap(),
            DqDimension::Timeliness
        );
        assert!("freshness".parse::<DqDimension>().is_err());
        assert_eq!(DqDimension::ALL.len(), 7);
    }
}
