//! Status summaries
//!
//! [`summarize`] flattens a collection to its leaves and counts them per
//! status. Nothing here is cached: call it after every change.

use indexmap::IndexMap;
use regflow_records::{Record, RecordId, RecordSet};
use regflow_status::Lifecycle;
use serde::{Deserialize, Serialize};

/// Which statuses count as complete and which as gaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCriteria<S> {
    complete: Vec<S>,
    gap: Vec<S>,
}

impl<S: Lifecycle> SummaryCriteria<S> {
    /// Criteria from the domain's own `is_complete` / `is_gap`
    #[must_use]
    pub fn domain_default() -> Self {
        Self {
            complete: S::ALL.iter().copied().filter(|s| s.is_complete()).collect(),
            gap: S::ALL.iter().copied().filter(|s| s.is_gap()).collect(),
        }
    }

    /// Explicit criteria
    pub fn new(complete: impl IntoIterator<Item = S>, gap: impl IntoIterator<Item = S>) -> Self {
        Self {
            complete: complete.into_iter().collect(),
            gap: gap.into_iter().collect(),
        }
    }

    /// Whether `status` counts towards completion
    #[inline]
    #[must_use]
    pub fn is_complete(&self, status: S) -> bool {
        self.complete.contains(&status)
    }

    /// Whether `status` is a gap
    #[inline]
    #[must_use]
    pub fn is_gap(&self, status: S) -> bool {
        self.gap.contains(&status)
    }
}

impl<S: Lifecycle> Default for SummaryCriteria<S> {
    fn default() -> Self {
        Self::domain_default()
    }
}

/// Derived view of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Summary<S: Lifecycle> {
    /// Number of leaf records
    pub total_count: usize,
    /// Count per status; every status is present, in declaration order
    pub counts_by_status: IndexMap<S, usize>,
    /// `round(100 * complete / total)`, 0 when empty
    pub completion_percentage: u8,
    /// Leaf ids in a gap status, in collection order
    pub gap_list: Vec<RecordId>,
}

impl<S: Lifecycle> Summary<S> {
    /// Count for one status
    #[must_use]
    pub fn count(&self, status: S) -> usize {
        self.counts_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Whether every leaf is complete (false when empty)
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.completion_percentage == 100
    }

    /// Whether there are gaps
    #[must_use]
    pub fn has_gaps(&self) -> bool {
        !self.gap_list.is_empty()
    }
}

/// Summary of one top-level section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SectionSummary<S: Lifecycle> {
    /// Section id
    pub id: RecordId,
    /// Section title
    pub title: String,
    /// Summary over the section's leaves
    pub summary: Summary<S>,
}

/// Summarize with the domain's default criteria.
#[must_use]
pub fn summarize<S: Lifecycle, T>(records: &RecordSet<S, T>) -> Summary<S> {
    summarize_with(records, &SummaryCriteria::domain_default())
}

/// Summarize with explicit criteria.
#[must_use]
pub fn summarize_with<S: Lifecycle, T>(
    records: &RecordSet<S, T>,
    criteria: &SummaryCriteria<S>,
) -> Summary<S> {
    summarize_leaves(records.leaves(), criteria)
}

/// Summarize any sequence of leaf records.
pub fn summarize_leaves<'a, S, T, I>(leaves: I, criteria: &SummaryCriteria<S>) -> Summary<S>
where
    S: Lifecycle,
    T: 'a,
    I: IntoIterator<Item = &'a Record<S, T>>,
{
    let mut counts_by_status: IndexMap<S, usize> = S::ALL.iter().map(|s| (*s, 0)).collect();
    let mut gap_list = Vec::new();
    let mut total_count = 0;
    let mut complete = 0;

    for record in leaves {
        let status = record.status();
        total_count += 1;
        *counts_by_status.entry(status).or_insert(0) += 1;
        if criteria.is_complete(status) {
            complete += 1;
        }
        if criteria.is_gap(status) {
            gap_list.push(record.id().clone());
        }
    }

    Summary {
        total_count,
        counts_by_status,
        completion_percentage: percentage(complete, total_count),
        gap_list,
    }
}

/// One summary per top-level section, in collection order.
#[must_use]
pub fn summarize_sections<S: Lifecycle, T>(
    records: &RecordSet<S, T>,
    criteria: &SummaryCriteria<S>,
) -> Vec<SectionSummary<S>> {
    records
        .sections()
        .map(|section| SectionSummary {
            id: section.id.clone(),
            title: section.title.clone(),
            summary: summarize_leaves(section.leaves(), criteria),
        })
        .collect()
}

/// `round(100 * part / total)` with halves rounded up; 0 when `total` is 0.
#[must_use]
pub fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total);
    let pct = (100 * part + total / 2) / total;
    // part <= total keeps pct within 0..=100
    u8::try_from(pct).unwrap_or(100)
}
