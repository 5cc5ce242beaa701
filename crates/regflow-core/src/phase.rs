//! Workflow phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// The nine phases of a report workflow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Regulatory rules extracted and reviewed
    RegulatoryIntelligence,
    /// Requirements document agreed
    RequirementsDocument,
    /// Data elements mapped to sources
    DataRequirements,
    /// Critical data elements confirmed
    CdeIdentification,
    /// DQ rules reviewed and activated
    DataQualityRules,
    /// Issues resolved
    IssueManagement,
    /// Controls assessed against principles
    ControlsManagement,
    /// Documents approved
    Documentation,
    /// Final sign-off
    Attestation,
}

impl Phase {
    /// All phases in workflow order
    pub const ALL: [Phase; 9] = [
        Phase::RegulatoryIntelligence,
        Phase::RequirementsDocument,
        Phase::DataRequirements,
        Phase::CdeIdentification,
        Phase::DataQualityRules,
        Phase::IssueManagement,
        Phase::ControlsManagement,
        Phase::Documentation,
        Phase::Attestation,
    ];

    /// Stable name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::RegulatoryIntelligence => "regulatory_intelligence",
            Phase::RequirementsDocument => "requirements_document",
            Phase::DataRequirements => "data_requirements",
            Phase::CdeIdentification => "cde_identification",
            Phase::DataQualityRules => "data_quality_rules",
            Phase::IssueManagement => "issue_management",
            Phase::ControlsManagement => "controls_management",
            Phase::Documentation => "documentation",
            Phase::Attestation => "attestation",
        }
    }

    /// 1-based position
    #[must_use]
    pub fn number(self) -> usize {
        self as usize + 1
    }

    /// Following phase, `None` after attestation
    #[must_use]
    pub fn next(self) -> Option<Phase> {
        Phase::ALL.get(self as usize + 1).copied()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
