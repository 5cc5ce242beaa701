//! Record board
//!
//! Holds the current immutable [`RecordSet`] for one domain together with
//! its transition handler and summary. Every successful mutation swaps in
//! the new set and recomputes the summary, so readers never see a summary
//! for a set other than the current one.

use regflow_records::{
    Entry, RecordError, RecordId, RecordSet, Satellite, TransitionHandler, TransitionMeta,
    TransitionPolicy, TransitionRequest,
};
use regflow_status::Lifecycle;
use regflow_summary::{summarize_sections, summarize_with, SectionSummary, Summary, SummaryCriteria};

/// Current records and derived summary for one domain
#[derive(Debug, Clone)]
pub struct Board<S: Lifecycle, T> {
    records: RecordSet<S, T>,
    handler: TransitionHandler,
    criteria: SummaryCriteria<S>,
    summary: Summary<S>,
}

impl<S: Lifecycle, T: Clone> Board<S, T> {
    /// Board over `records` with the domain's default summary criteria
    #[must_use]
    pub fn new(records: RecordSet<S, T>, policy: TransitionPolicy) -> Self {
        Self::with_criteria(records, policy, SummaryCriteria::domain_default())
    }

    /// Board with explicit summary criteria
    #[must_use]
    pub fn with_criteria(
        records: RecordSet<S, T>,
        policy: TransitionPolicy,
        criteria: SummaryCriteria<S>,
    ) -> Self {
        let summary = summarize_with(&records, &criteria);
        Self {
            records,
            handler: TransitionHandler::new(policy),
            criteria,
            summary,
        }
    }

    /// Current records
    #[inline]
    pub fn records(&self) -> &RecordSet<S, T> {
        &self.records
    }

    /// Summary of the current records
    #[inline]
    pub fn summary(&self) -> &Summary<S> {
        &self.summary
    }

    /// Criteria the summary is computed with
    #[inline]
    pub fn criteria(&self) -> &SummaryCriteria<S> {
        &self.criteria
    }

    /// Transition policy in force
    #[inline]
    pub fn policy(&self) -> TransitionPolicy {
        self.handler.policy()
    }

    /// Per-section summaries
    #[must_use]
    pub fn section_summaries(&self) -> Vec<SectionSummary<S>> {
        summarize_sections(&self.records, &self.criteria)
    }

    /// Apply a transition request
    ///
    /// # Errors
    /// As [`TransitionHandler::apply`]; the board is unchanged on error.
    pub fn apply(&mut self, request: TransitionRequest<S>) -> Result<&Summary<S>, RecordError> {
        let next = self.handler.apply(&self.records, request)?;
        Ok(self.commit(next))
    }

    /// Bare status change
    ///
    /// # Errors
    /// As [`Board::apply`].
    pub fn transition(
        &mut self,
        id: impl Into<RecordId>,
        to: S,
        meta: Option<TransitionMeta>,
    ) -> Result<&Summary<S>, RecordError> {
        let mut request = TransitionRequest::new(id, to);
        if let Some(meta) = meta {
            request = request.with_meta(meta);
        }
        self.apply(request)
    }

    /// Reset one record to the initial status
    ///
    /// # Errors
    /// As [`TransitionHandler::reset`].
    pub fn reset(
        &mut self,
        id: &RecordId,
        meta: Option<TransitionMeta>,
    ) -> Result<&Summary<S>, RecordError> {
        let next = self.handler.reset(&self.records, id, meta)?;
        Ok(self.commit(next))
    }

    /// Replace a satellite without changing status
    ///
    /// # Errors
    /// As [`TransitionHandler::amend`].
    pub fn amend(
        &mut self,
        id: &RecordId,
        satellite: impl Into<Satellite>,
        meta: Option<TransitionMeta>,
    ) -> Result<&Summary<S>, RecordError> {
        let next = self.handler.amend(&self.records, id, satellite, meta)?;
        Ok(self.commit(next))
    }

    /// Append a record or section
    ///
    /// # Errors
    /// `DuplicateId` or `MissingSatelliteData` from the new set's checks.
    pub fn insert(&mut self, entry: impl Into<Entry<S, T>>) -> Result<&Summary<S>, RecordError> {
        let next = self.records.with_entry(entry)?;
        Ok(self.commit(next))
    }

    fn commit(&mut self, records: RecordSet<S, T>) -> &Summary<S> {
        self.summary = summarize_with(&records, &self.criteria);
        self.records = records;
        &self.summary
    }
}

impl<S: Lifecycle, T: Clone> Default for Board<S, T> {
    fn default() -> Self {
        Self::new(RecordSet::new(), TransitionPolicy::default())
    }
}
