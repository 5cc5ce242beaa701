//! Domain status enumerations
//!
//! One enum per workflow domain. Wire names are snake_case and are the only
//! accepted spellings; anything else fails to parse or deserialize.

use crate::error::StatusError;
use crate::lifecycle::{parse_status, Lifecycle, SatelliteKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status of an extracted regulatory or data-quality rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleReviewStatus {
    /// Awaiting review
    Pending,
    /// Accepted as proposed
    Accepted,
    /// Accepted with edits
    Modified,
    /// Rejected by the reviewer
    Rejected,
}

impl Lifecycle for RuleReviewStatus {
    const DOMAIN: &'static str = "rule_review";
    const ALL: &'static [Self] = &[
        RuleReviewStatus::Pending,
        RuleReviewStatus::Accepted,
        RuleReviewStatus::Modified,
        RuleReviewStatus::Rejected,
    ];
    const INITIAL: Self = RuleReviewStatus::Pending;

    fn as_str(self) -> &'static str {
        match self {
            RuleReviewStatus::Pending => "pending",
            RuleReviewStatus::Accepted => "accepted",
            RuleReviewStatus::Modified => "modified",
            RuleReviewStatus::Rejected => "rejected",
        }
    }

    fn successors(self) -> &'static [Self] {
        use RuleReviewStatus::*;
        match self {
            Pending => &[Accepted, Modified, Rejected],
            Accepted | Modified | Rejected => &[],
        }
    }

    fn is_complete(self) -> bool {
        matches!(self, RuleReviewStatus::Accepted | RuleReviewStatus::Modified)
    }
}

/// Mapping status of a data element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementStatus {
    /// Not yet mapped
    Pending,
    /// Mapped to a source field
    Mapped,
    /// No source exists
    Gap,
    /// Mapping confirmed
    Validated,
}

impl Lifecycle for ElementStatus {
    const DOMAIN: &'static str = "data_element";
    const ALL: &'static [Self] = &[
        ElementStatus::Pending,
        ElementStatus::Mapped,
        ElementStatus::Gap,
        ElementStatus::Validated,
    ];
    const INITIAL: Self = ElementStatus::Pending;

    fn as_str(self) -> &'static str {
        match self {
            ElementStatus::Pending => "pending",
            ElementStatus::Mapped => "mapped",
            ElementStatus::Gap => "gap",
            ElementStatus::Validated => "validated",
        }
    }

    fn successors(self) -> &'static [Self] {
        use ElementStatus::*;
        match self {
            Pending => &[Mapped, Gap],
            Mapped => &[Validated, Gap],
            // reset
            Gap => &[Pending],
            // revoke
            Validated => &[Mapped],
        }
    }

    fn is_complete(self) -> bool {
        matches!(self, ElementStatus::Mapped | ElementStatus::Validated)
    }

    fn is_gap(self) -> bool {
        self == ElementStatus::Gap
    }

    fn required_satellite(self) -> Option<SatelliteKind> {
        match self {
            ElementStatus::Mapped | ElementStatus::Validated => Some(SatelliteKind::SourceMapping),
            ElementStatus::Pending | ElementStatus::Gap => None,
        }
    }
}

/// Status of a review annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStatus {
    /// Raised and unanswered
    Open,
    /// Addressed with a resolution
    Resolved,
    /// Closed without action
    Dismissed,
}

impl Lifecycle for AnnotationStatus {
    const DOMAIN: &'static str = "annotation";
    const ALL: &'static [Self] = &[
        AnnotationStatus::Open,
        AnnotationStatus::Resolved,
        AnnotationStatus::Dismissed,
    ];
    const INITIAL: Self = AnnotationStatus::Open;

    fn as_str(self) -> &'static str {
        match self {
            AnnotationStatus::Open => "open",
            AnnotationStatus::Resolved => "resolved",
            AnnotationStatus::Dismissed => "dismissed",
        }
    }

    fn successors(self) -> &'static [Self] {
        match self {
            AnnotationStatus::Open => &[AnnotationStatus::Resolved, AnnotationStatus::Dismissed],
            AnnotationStatus::Resolved | AnnotationStatus::Dismissed => &[],
        }
    }

    fn is_complete(self) -> bool {
        self != AnnotationStatus::Open
    }

    fn is_gap(self) -> bool {
        self == AnnotationStatus::Open
    }

    fn required_satellite(self) -> Option<SatelliteKind> {
        match self {
            AnnotationStatus::Resolved => Some(SatelliteKind::Resolution),
            AnnotationStatus::Open | AnnotationStatus::Dismissed => None,
        }
    }
}

/// Assessment of a compliance principle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Not yet assessed
    NotAssessed,
    /// Fully compliant
    Compliant,
    /// Partially compliant
    Partial,
    /// Not compliant
    NonCompliant,
}

impl Lifecycle for ComplianceStatus {
    const DOMAIN: &'static str = "compliance";
    const ALL: &'static [Self] = &[
        ComplianceStatus::NotAssessed,
        ComplianceStatus::Compliant,
        ComplianceStatus::Partial,
        ComplianceStatus::NonCompliant,
    ];
    const INITIAL: Self = ComplianceStatus::NotAssessed;

    fn as_str(self) -> &'static str {
        match self {
            ComplianceStatus::NotAssessed => "not_assessed",
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Partial => "partial",
            ComplianceStatus::NonCompliant => "non_compliant",
        }
    }

    fn successors(self) -> &'static [Self] {
        use ComplianceStatus::*;
        match self {
            NotAssessed => &[Compliant, Partial, NonCompliant],
            // re-assessment
            Compliant => &[Partial, NonCompliant],
            Partial => &[Compliant, NonCompliant],
            NonCompliant => &[Compliant, Partial],
        }
    }

    fn is_complete(self) -> bool {
        self == ComplianceStatus::Compliant
    }

    fn is_gap(self) -> bool {
        self == ComplianceStatus::NonCompliant
    }

    fn required_satellite(self) -> Option<SatelliteKind> {
        match self {
            ComplianceStatus::Compliant => Some(SatelliteKind::Evidence),
            _ => None,
        }
    }
}

/// Review status of a generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being written
    Draft,
    /// Submitted for review
    InReview,
    /// Signed off
    Approved,
}

impl Lifecycle for DocumentStatus {
    const DOMAIN: &'static str = "document";
    const ALL: &'static [Self] = &[
        DocumentStatus::Draft,
        DocumentStatus::InReview,
        DocumentStatus::Approved,
    ];
    const INITIAL: Self = DocumentStatus::Draft;

    fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::InReview => "in_review",
            DocumentStatus::Approved => "approved",
        }
    }

    fn successors(self) -> &'static [Self] {
        match self {
            DocumentStatus::Draft => &[DocumentStatus::InReview],
            DocumentStatus::InReview => &[DocumentStatus::Approved, DocumentStatus::Draft],
            DocumentStatus::Approved => &[],
        }
    }

    fn is_complete(self) -> bool {
        self == DocumentStatus::Approved
    }

    fn required_satellite(self) -> Option<SatelliteKind> {
        match self {
            DocumentStatus::Approved => Some(SatelliteKind::Attestation),
            DocumentStatus::Draft | DocumentStatus::InReview => None,
        }
    }
}

impl fmt::Display for RuleReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ElementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AnnotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleReviewStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_status(s)
    }
}

impl FromStr for ElementStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_status(s)
    }
}

impl FromStr for AnnotationStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_status(s)
    }
}

impl FromStr for ComplianceStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_status(s)
    }
}

impl FromStr for DocumentStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_status(s)
    }
}
