//! BCBS 239 principle catalogue

use regflow_records::{Principle, PrincipleSet, Record, RecordSet};

/// Principles 1-11: number, title, category.
pub const BCBS239_PRINCIPLES: [(u8, &str, &str); 11] = [
    (1, "Governance", GOVERNANCE),
    (2, "Data architecture and IT infrastructure", GOVERNANCE),
    (3, "Accuracy and integrity", AGGREGATION),
    (4, "Completeness", AGGREGATION),
    (5, "Timeliness", AGGREGATION),
    (6, "Adaptability", AGGREGATION),
    (7, "Accuracy", REPORTING),
    (8, "Comprehensiveness", REPORTING),
    (9, "Clarity and usefulness", REPORTING),
    (10, "Frequency", REPORTING),
    (11, "Distribution", REPORTING),
];

const GOVERNANCE: &str = "Overarching governance and infrastructure";
const AGGREGATION: &str = "Risk data aggregation capabilities";
const REPORTING: &str = "Risk reporting practices";

/// Compliance matrix with every principle `not_assessed`
///
/// Record ids are `bcbs239-p<number>`.
#[must_use]
pub fn bcbs239_matrix() -> PrincipleSet {
    let records = BCBS239_PRINCIPLES
        .iter()
        .map(|(number, title, category)| {
            Record::new(
                format!("bcbs239-p{number}"),
                Principle {
                    number: *number,
                    title: (*title).to_string(),
                    category: (*category).to_string(),
                },
            )
        })
        .collect();
    // ids are unique and nothing starts past the initial status
    RecordSet::from_records(records).unwrap_or_default()
}
