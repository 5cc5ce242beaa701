//! Satellite records
//!
//! Satellites capture why or how a record's status changed. They are
//! attached through the transition handler and replaced only through an
//! explicit amendment.

use chrono::{DateTime, SecondsFormat, Utc};
use regflow_status::SatelliteKind;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where a data element is sourced from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapping {
    /// Source system name
    pub system: String,
    /// Table or feed within the system
    pub table: String,
    /// Field within the table
    pub field: String,
    /// Transformation applied on the way in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
}

impl SourceMapping {
    /// Create mapping without a transformation
    pub fn new(
        system: impl Into<String>,
        table: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            table: table.into(),
            field: field.into(),
            transformation: None,
        }
    }

    /// With transformation expression
    #[must_use]
    pub fn with_transformation(mut self, expr: impl Into<String>) -> Self {
        self.transformation = Some(expr.into());
        self
    }
}

/// How an annotation was addressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Resolution text
    pub text: String,
    /// Who resolved it
    pub resolved_by: String,
}

impl Resolution {
    /// Create resolution
    pub fn new(text: impl Into<String>, resolved_by: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            resolved_by: resolved_by.into(),
        }
    }
}

/// Evidence supporting an assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// What the evidence shows
    pub description: String,
    /// Link or document reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Evidence {
    /// Create evidence without a reference
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            reference: None,
        }
    }

    /// With document reference
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Signed confirmation binding a person to a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Attested statement
    pub statement: String,
    /// Signer identity
    pub signer: String,
    /// Signing time
    pub signed_at: DateTime<Utc>,
    /// Hex SHA-256 over signer, statement and time
    pub digest: String,
}

impl Attestation {
    /// Sign `statement` as `signer` now
    pub fn sign(statement: impl Into<String>, signer: impl Into<String>) -> Self {
        Self::sign_at(statement, signer, Utc::now())
    }

    /// Sign at a fixed time
    pub fn sign_at(
        statement: impl Into<String>,
        signer: impl Into<String>,
        signed_at: DateTime<Utc>,
    ) -> Self {
        let statement = statement.into();
        let signer = signer.into();
        let digest = compute_digest(&signer, &statement, signed_at);
        Self {
            statement,
            signer,
            signed_at,
            digest,
        }
    }

    /// Check the digest still matches the content
    #[must_use]
    pub fn verify(&self) -> bool {
        self.digest == compute_digest(&self.signer, &self.statement, self.signed_at)
    }
}

fn compute_digest(signer: &str, statement: &str, signed_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signer.as_bytes());
    hasher.update([0]);
    hasher.update(statement.as_bytes());
    hasher.update([0]);
    hasher.update(
        signed_at
            .to_rfc3339_opts(SecondsFormat::Micros, true)
            .as_bytes(),
    );
    hex::encode(hasher.finalize())
}

/// A satellite attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Satellite {
    /// Source mapping
    SourceMapping(SourceMapping),
    /// Annotation resolution
    Resolution(Resolution),
    /// Assessment evidence
    Evidence(Evidence),
    /// Signed attestation
    Attestation(Attestation),
}

impl Satellite {
    /// Kind of this satellite
    #[inline]
    #[must_use]
    pub fn kind(&self) -> SatelliteKind {
        match self {
            Satellite::SourceMapping(_) => SatelliteKind::SourceMapping,
            Satellite::Resolution(_) => SatelliteKind::Resolution,
            Satellite::Evidence(_) => SatelliteKind::Evidence,
            Satellite::Attestation(_) => SatelliteKind::Attestation,
        }
    }

    /// Check content is usable; returns the reason when it is not
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Satellite::SourceMapping(m) => {
                if m.system.trim().is_empty() {
                    return Err("source system is empty".to_string());
                }
                if m.field.trim().is_empty() {
                    return Err("source field is empty".to_string());
                }
                Ok(())
            }
            Satellite::Resolution(r) => {
                if r.text.trim().is_empty() {
                    Err("resolution text is empty".to_string())
                } else {
                    Ok(())
                }
            }
            Satellite::Evidence(e) => {
                if e.description.trim().is_empty() {
                    Err("evidence description is empty".to_string())
                } else {
                    Ok(())
                }
            }
            Satellite::Attestation(a) => {
                if a.statement.trim().is_empty() {
                    Err("attestation statement is empty".to_string())
                } else if a.signer.trim().is_empty() {
                    Err("attestation signer is empty".to_string())
                } else if !a.verify() {
                    Err("attestation digest does not match".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl From<SourceMapping> for Satellite {
    fn from(value: SourceMapping) -> Self {
        Satellite::SourceMapping(value)
    }
}

impl From<Resolution> for Satellite {
    fn from(value: Resolution) -> Self {
        Satellite::Resolution(value)
    }
}

impl From<Evidence> for Satellite {
    fn from(value: Evidence) -> Self {
        Satellite::Evidence(value)
    }
}

impl From<Attestation> for Satellite {
    fn from(value: Attestation) -> Self {
        Satellite::Attestation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn attestation_digest_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let a = Attestation::sign_at("figures are complete", "cfo", at);
        let b = Attestation::sign_at("figures are complete", "cfo", at);
        assert_eq!(a.digest, b.digest);
        assert_eq!(a.digest.len(), 64);
        assert!(a.verify());
    }

    #[test]
    fn tampered_attestation_fails_verification() {
        let mut a = Attestation::sign("figures are complete", "cfo");
        a.statement = "figures are approximately complete".to_string();
        assert!(!a.verify());
        assert!(Satellite::from(a).validate().is_err());
    }

    #[test]
    fn empty_resolution_is_invalid() {
        let s = Satellite::from(Resolution::new("   ", "analyst"));
        assert_eq!(s.kind(), SatelliteKind::Resolution);
        assert_eq!(s.validate().unwrap_err(), "resolution text is empty");
    }

    #[test]
    fn mapping_needs_system_and_field() {
        let ok = Satellite::from(SourceMapping::new("GL", "ledger", "balance"));
        assert!(ok.validate().is_ok());

        let no_field = Satellite::from(SourceMapping::new("GL", "ledger", ""));
        assert!(no_field.validate().is_err());
    }

    #[test]
    fn satellite_serde_is_tagged() {
        let s = Satellite::from(Evidence::new("policy v3").with_reference("DOC-12"));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["kind"], "evidence");
        assert_eq!(json["reference"], "DOC-12");

        let back: Satellite = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }
}
