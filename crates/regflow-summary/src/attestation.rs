//! Attestation checklist
//!
//! A submission can only be attested once every required item has been
//! acknowledged.

use crate::error::SummaryError;
use crate::summary::percentage;
use regflow_records::Attestation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One line of the attestation checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item id
    pub id: String,
    /// What the attester confirms
    pub label: String,
    /// Whether attestation is blocked until acknowledged
    pub required: bool,
    /// Acknowledged by the attester
    #[serde(default)]
    pub acknowledged: bool,
}

impl ChecklistItem {
    /// Required, unacknowledged item
    pub fn required(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required: true,
            acknowledged: false,
        }
    }

    /// Optional, unacknowledged item
    pub fn optional(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(id, label)
        }
    }
}

/// Ordered checklist; updates return a new checklist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChecklistItem>", into = "Vec<ChecklistItem>")]
pub struct AttestationChecklist {
    items: Vec<ChecklistItem>,
}

impl AttestationChecklist {
    /// Checklist from items
    ///
    /// # Errors
    /// `DuplicateChecklistItem` when two items share an id.
    pub fn new(items: Vec<ChecklistItem>) -> Result<Self, SummaryError> {
        let mut seen = HashSet::new();
        if let Some(dup) = items.iter().find(|i| !seen.insert(i.id.as_str())) {
            return Err(SummaryError::DuplicateChecklistItem(dup.id.clone()));
        }
        Ok(Self { items })
    }

    /// The checklist used for a regulatory submission
    #[must_use]
    pub fn standard() -> Self {
        Self {
            items: vec![
                ChecklistItem::required("lineage", "Data lineage reviewed for all CDEs"),
                ChecklistItem::required("dq_rules", "Data-quality rules approved and active"),
                ChecklistItem::required("issues", "Open issues resolved or risk-accepted"),
                ChecklistItem::required("controls", "Control evidence attached"),
                ChecklistItem::required("documentation", "Documentation approved"),
                ChecklistItem::required("reconciliation", "Submission figures reconciled to ledger"),
                ChecklistItem::optional("commentary", "Management commentary attached"),
            ],
        }
    }

    /// Items in order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Checklist with `id` acknowledged
    ///
    /// # Errors
    /// `UnknownChecklistItem` when no item has that id.
    pub fn acknowledge(&self, id: &str) -> Result<Self, SummaryError> {
        self.set(id, true)
    }

    /// Checklist with `id` no longer acknowledged
    ///
    /// # Errors
    /// `UnknownChecklistItem` when no item has that id.
    pub fn withdraw(&self, id: &str) -> Result<Self, SummaryError> {
        self.set(id, false)
    }

    fn set(&self, id: &str, acknowledged: bool) -> Result<Self, SummaryError> {
        if !self.items.iter().any(|i| i.id == id) {
            return Err(SummaryError::UnknownChecklistItem(id.to_string()));
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    ChecklistItem {
                        acknowledged,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Ok(Self { items })
    }

    /// Ids of required items not yet acknowledged
    #[must_use]
    pub fn missing_required(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.required && !i.acknowledged)
            .map(|i| i.id.clone())
            .collect()
    }

    /// Derived summary
    #[must_use]
    pub fn summary(&self) -> AttestationSummary {
        let total_items = self.items.len();
        let required_items = self.items.iter().filter(|i| i.required).count();
        let acknowledged_required = self
            .items
            .iter()
            .filter(|i| i.required && i.acknowledged)
            .count();
        let acknowledged_total = self.items.iter().filter(|i| i.acknowledged).count();

        AttestationSummary {
            total_items,
            required_items,
            acknowledged_required,
            acknowledged_total,
            completion_percentage: percentage(acknowledged_total, total_items),
            can_attest: total_items > 0 && acknowledged_required == required_items,
        }
    }

    /// Sign the attestation statement
    ///
    /// # Errors
    /// - `IncompleteChecklist` while required items are unacknowledged
    /// - `InvalidAttestation` on an empty checklist, statement or signer
    pub fn sign(&self, statement: &str, signer: &str) -> Result<Attestation, SummaryError> {
        if self.items.is_empty() {
            return Err(SummaryError::InvalidAttestation(
                "checklist is empty".to_string(),
            ));
        }
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(SummaryError::IncompleteChecklist { missing });
        }
        if statement.trim().is_empty() {
            return Err(SummaryError::InvalidAttestation(
                "statement is empty".to_string(),
            ));
        }
        if signer.trim().is_empty() {
            return Err(SummaryError::InvalidAttestation(
                "signer is empty".to_string(),
            ));
        }
        Ok(Attestation::sign(statement, signer))
    }
}

impl TryFrom<Vec<ChecklistItem>> for AttestationChecklist {
    type Error = SummaryError;

    fn try_from(value: Vec<ChecklistItem>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AttestationChecklist> for Vec<ChecklistItem> {
    fn from(value: AttestationChecklist) -> Self {
        value.items
    }
}

/// Derived view of an [`AttestationChecklist`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationSummary {
    /// All items
    pub total_items: usize,
    /// Required items
    pub required_items: usize,
    /// Required items acknowledged
    pub acknowledged_required: usize,
    /// All items acknowledged
    pub acknowledged_total: usize,
    /// Share of acknowledged items
    pub completion_percentage: u8,
    /// Every required item acknowledged
    pub can_attest: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn small() -> AttestationChecklist {
        AttestationChecklist::new(vec![
            ChecklistItem::required("a", "A"),
            ChecklistItem::required("b", "B"),
            ChecklistItem::optional("c", "C"),
        ])
        .unwrap()
    }

    #[test]
    fn cannot_attest_until_required_acknowledged() {
        let list = small().acknowledge("a").unwrap().acknowledge("c").unwrap();
        let summary = list.summary();
        assert_eq!(summary.acknowledged_required, 1);
        assert_eq!(summary.acknowledged_total, 2);
        assert_eq!(summary.completion_percentage, 67);
        assert!(!summary.can_attest);

        let err = list.sign("numbers are right", "cfo").unwrap_err();
        assert_eq!(
            err,
            SummaryError::IncompleteChecklist {
                missing: vec!["b".to_string()]
            }
        );
    }

    #[test]
    fn optional_items_do_not_block() {
        let list = small().acknowledge("a").unwrap().acknowledge("b").unwrap();
        assert!(list.summary().can_attest);

        let attestation = list.sign("numbers are right", "cfo").unwrap();
        assert_eq!(attestation.signer, "cfo");
        assert!(attestation.verify());
    }

    #[test]
    fn acknowledge_is_immutable_update() {
        let list = small();
        let next = list.acknowledge("a").unwrap();
        assert!(!list.items()[0].acknowledged);
        assert!(next.items()[0].acknowledged);
        assert!(!next.withdraw("a").unwrap().items()[0].acknowledged);
    }

    #[test]
    fn unknown_item() {
        assert_eq!(
            small().acknowledge("zz").unwrap_err(),
            SummaryError::UnknownChecklistItem("zz".to_string())
        );
    }

    #[test]
    fn empty_checklist_cannot_attest() {
        let list = AttestationChecklist::default();
        assert!(!list.summary().can_attest);
        assert!(matches!(
            list.sign("x", "y"),
            Err(SummaryError::InvalidAttestation(_))
        ));
    }

    #[test]
    fn blank_signer_rejected() {
        let list = small().acknowledge("a").unwrap().acknowledge("b").unwrap();
        assert!(matches!(
            list.sign("numbers are right", " "),
            Err(SummaryError::InvalidAttestation(_))
        ));
    }

    #[test]
    fn duplicate_items_rejected() {
        let err = AttestationChecklist::new(vec![
            ChecklistItem::required("a", "A"),
            ChecklistItem::optional("a", "A again"),
        ])
        .unwrap_err();
        assert_eq!(err, SummaryError::DuplicateChecklistItem("a".to_string()));

        let loaded = serde_json::from_str::<AttestationChecklist>(
            r#"[{"id": "a", "label": "A", "required": true},
                {"id": "a", "label": "B", "required": false}]"#,
        );
        assert!(loaded.is_err());
    }

    #[test]
    fn standard_checklist_shape() {
        let summary = AttestationChecklist::standard().summary();
        assert_eq!(summary.total_items, 7);
        assert_eq!(summary.required_items, 6);
    }
}
