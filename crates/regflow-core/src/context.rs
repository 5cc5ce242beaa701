//! Per-workflow context
//!
//! One [`WorkflowContext`] exists per report workflow instance. It owns a
//! [`Board`] for every phase collection, the attestation checklist and the
//! gate decisions taken so far, and is consumed by
//! [`WorkflowContext::complete`].

use crate::board::Board;
use crate::config::WorkflowConfig;
use crate::directory::Directory;
use crate::error::WorkflowError;
use crate::gate::{GateDecision, GateItem, HumanGate};
use crate::phase::Phase;
use crate::suggestion::{RuleSuggestion, SuggestionProvider, SuggestionRequest, SuggestionTask};
use chrono::{DateTime, Utc};
use regflow_records::{
    Annotation, AnnotationSet, Attestation, DataElement, Document, DocumentSet, DqRule, DqRuleSet,
    ElementSet, Principle, PrincipleSet, Record, RecordId, RegulatoryRule, RegulatoryRuleSet,
    Requirement, RequirementSet, TransitionPolicy,
};
use regflow_status::{
    AnnotationStatus, ComplianceStatus, DocumentStatus, ElementStatus, RuleReviewStatus,
};
use regflow_summary::{
    bcbs239_matrix, summarize_documentation, AttestationChecklist, AttestationSummary,
    CoverageMatrix, CoverageSummary, DocumentationSummary, SummaryCriteria, SummaryError, Summary,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use ulid::Ulid;

/// Unique workflow identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub Ulid);

impl WorkflowId {
    /// Generate new workflow ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of one report workflow
#[derive(Debug)]
pub struct WorkflowContext {
    id: WorkflowId,
    report: String,
    config: WorkflowConfig,
    started_at: DateTime<Utc>,
    regulatory_rules: Board<RuleReviewStatus, RegulatoryRule>,
    requirements: Board<RuleReviewStatus, Requirement>,
    elements: Board<ElementStatus, DataElement>,
    dq_rules: Board<RuleReviewStatus, DqRule>,
    issues: Board<AnnotationStatus, Annotation>,
    controls: Board<ComplianceStatus, Principle>,
    documents: Board<DocumentStatus, Document>,
    annotations: Board<AnnotationStatus, Annotation>,
    active_rules: Vec<RecordId>,
    checklist: AttestationChecklist,
    attestation: Option<Attestation>,
    decisions: BTreeMap<Phase, GateDecision>,
    directory: Directory,
}

impl WorkflowContext {
    /// Empty workflow for `report`
    ///
    /// Controls start from the BCBS 239 principle matrix and the checklist
    /// from [`AttestationChecklist::standard`].
    pub fn new(report: impl Into<String>, config: WorkflowConfig) -> Self {
        let policy = config.transition_policy();
        let context = Self {
            id: WorkflowId::new(),
            report: report.into(),
            started_at: Utc::now(),
            regulatory_rules: Board::new(RegulatoryRuleSet::new(), policy),
            requirements: Board::new(RequirementSet::new(), config.requirement_policy()),
            elements: Board::new(ElementSet::new(), policy),
            dq_rules: Board::new(DqRuleSet::new(), policy),
            issues: Board::new(AnnotationSet::new(), policy),
            controls: Board::new(bcbs239_matrix(), policy),
            documents: Board::new(DocumentSet::new(), policy),
            annotations: Board::new(AnnotationSet::new(), policy),
            active_rules: Vec::new(),
            checklist: AttestationChecklist::standard(),
            attestation: None,
            decisions: BTreeMap::new(),
            directory: Directory::default(),
            config,
        };
        tracing::info!(workflow = %context.id, report = %context.report, "workflow started");
        context
    }

    fn policy(&self) -> TransitionPolicy {
        self.config.transition_policy()
    }

    /// Builder: load regulatory rules
    #[must_use]
    pub fn with_regulatory_rules(mut self, rules: RegulatoryRuleSet) -> Self {
        self.regulatory_rules = Board::new(rules, self.policy());
        self
    }

    /// Builder: load requirement lines
    #[must_use]
    pub fn with_requirements(mut self, requirements: RequirementSet) -> Self {
        self.requirements = Board::new(requirements, self.config.requirement_policy());
        self
    }

    /// Builder: load data elements
    #[must_use]
    pub fn with_elements(mut self, elements: ElementSet) -> Self {
        self.elements = Board::new(elements, self.policy());
        self
    }

    /// Builder: load DQ rules
    #[must_use]
    pub fn with_dq_rules(mut self, rules: DqRuleSet) -> Self {
        self.dq_rules = Board::new(rules, self.policy());
        self
    }

    /// Builder: load issues
    #[must_use]
    pub fn with_issues(mut self, issues: AnnotationSet) -> Self {
        self.issues = Board::new(issues, self.policy());
        self
    }

    /// Builder: replace the control assessment matrix
    #[must_use]
    pub fn with_controls(mut self, controls: PrincipleSet) -> Self {
        self.controls = Board::new(controls, self.policy());
        self
    }

    /// Builder: load documents
    #[must_use]
    pub fn with_documents(mut self, documents: DocumentSet) -> Self {
        self.documents = Board::new(documents, self.policy());
        self
    }

    /// Builder: load document annotations
    #[must_use]
    pub fn with_annotations(mut self, annotations: AnnotationSet) -> Self {
        self.annotations = Board::new(annotations, self.policy());
        self
    }

    /// Builder: replace the attestation checklist
    #[must_use]
    pub fn with_checklist(mut self, checklist: AttestationChecklist) -> Self {
        self.checklist = checklist;
        self
    }

    /// Builder: set the recipient directory
    #[must_use]
    pub fn with_directory(mut self, directory: Directory) -> Self {
        self.directory = directory;
        self
    }

    /// Workflow id
    #[inline]
    pub fn id(&self) -> WorkflowId {
        self.id
    }

    /// Report name
    #[inline]
    pub fn report(&self) -> &str {
        &self.report
    }

    /// Configuration
    #[inline]
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Start time
    #[inline]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Recipient directory
    #[inline]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Regulatory rules board
    #[inline]
    pub fn regulatory_rules(&self) -> &Board<RuleReviewStatus, RegulatoryRule> {
        &self.regulatory_rules
    }

    /// Regulatory rules board, mutable
    #[inline]
    pub fn regulatory_rules_mut(&mut self) -> &mut Board<RuleReviewStatus, RegulatoryRule> {
        &mut self.regulatory_rules
    }

    /// Requirements board
    #[inline]
    pub fn requirements(&self) -> &Board<RuleReviewStatus, Requirement> {
        &self.requirements
    }

    /// Requirements board, mutable
    #[inline]
    pub fn requirements_mut(&mut self) -> &mut Board<RuleReviewStatus, Requirement> {
        &mut self.requirements
    }

    /// Data elements board
    #[inline]
    pub fn elements(&self) -> &Board<ElementStatus, DataElement> {
        &self.elements
    }

    /// Data elements board, mutable
    #[inline]
    pub fn elements_mut(&mut self) -> &mut Board<ElementStatus, DataElement> {
        &mut self.elements
    }

    /// DQ rules board
    #[inline]
    pub fn dq_rules(&self) -> &Board<RuleReviewStatus, DqRule> {
        &self.dq_rules
    }

    /// DQ rules board, mutable
    #[inline]
    pub fn dq_rules_mut(&mut self) -> &mut Board<RuleReviewStatus, DqRule> {
        &mut self.dq_rules
    }

    /// Issues board
    #[inline]
    pub fn issues(&self) -> &Board<AnnotationStatus, Annotation> {
        &self.issues
    }

    /// Issues board, mutable
    #[inline]
    pub fn issues_mut(&mut self) -> &mut Board<AnnotationStatus, Annotation> {
        &mut self.issues
    }

    /// Control assessment board
    #[inline]
    pub fn controls(&self) -> &Board<ComplianceStatus, Principle> {
        &self.controls
    }

    /// Control assessment board, mutable
    #[inline]
    pub fn controls_mut(&mut self) -> &mut Board<ComplianceStatus, Principle> {
        &mut self.controls
    }

    /// Documents board
    #[inline]
    pub fn documents(&self) -> &Board<DocumentStatus, Document> {
        &self.documents
    }

    /// Documents board, mutable
    #[inline]
    pub fn documents_mut(&mut self) -> &mut Board<DocumentStatus, Document> {
        &mut self.documents
    }

    /// Document annotations board
    #[inline]
    pub fn annotations(&self) -> &Board<AnnotationStatus, Annotation> {
        &self.annotations
    }

    /// Document annotations board, mutable
    #[inline]
    pub fn annotations_mut(&mut self) -> &mut Board<AnnotationStatus, Annotation> {
        &mut self.annotations
    }

    /// Names of elements flagged as CDEs, in collection order
    pub fn cde_names(&self) -> Vec<String> {
        self.elements
            .records()
            .leaves()
            .filter(|r| r.fields().is_cde)
            .map(|r| r.fields().name.clone())
            .collect()
    }

    /// Coverage of CDEs by reviewed DQ rules
    ///
    /// # Errors
    /// `UnknownCde` when a reviewed rule targets an element that is not a CDE.
    pub fn coverage_matrix(&self) -> Result<CoverageMatrix, WorkflowError> {
        Ok(CoverageMatrix::from_rules(
            self.cde_names(),
            self.dq_rules.records(),
        )?)
    }

    /// Coverage summary
    ///
    /// # Errors
    /// As [`WorkflowContext::coverage_matrix`].
    pub fn coverage(&self) -> Result<CoverageSummary, WorkflowError> {
        Ok(self.coverage_matrix()?.summary())
    }

    /// Activate every accepted or modified DQ rule
    ///
    /// Returns how many rules are active afterwards.
    ///
    /// # Errors
    /// `NothingToActivate` when no rule is accepted or modified.
    pub fn activate_rules(&mut self) -> Result<usize, WorkflowError> {
        let criteria = SummaryCriteria::<RuleReviewStatus>::domain_default();
        let accepted: Vec<RecordId> = self
            .dq_rules
            .records()
            .leaves()
            .filter(|r| criteria.is_complete(r.status()))
            .map(|r| r.id().clone())
            .collect();
        if accepted.is_empty() {
            return Err(WorkflowError::NothingToActivate);
        }
        tracing::info!(workflow = %self.id, count = accepted.len(), "activated DQ rules");
        self.active_rules = accepted;
        Ok(self.active_rules.len())
    }

    /// Rules activated by the last [`WorkflowContext::activate_rules`]
    #[inline]
    pub fn active_rules(&self) -> &[RecordId] {
        &self.active_rules
    }

    /// Start a suggestion task for the uncovered dimensions of `cde`
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// `UnknownCde` when `cde` is not a CDE, plus the coverage errors.
    pub fn suggest_rules<P: SuggestionProvider>(
        &self,
        provider: Arc<P>,
        cde: &str,
    ) -> Result<SuggestionTask, WorkflowError> {
        let matrix = self.coverage_matrix()?;
        if !matrix.cdes().any(|c| c == cde) {
            return Err(SummaryError::UnknownCde(cde.to_string()).into());
        }
        let dimensions = regflow_records::DqDimension::ALL
            .into_iter()
            .filter(|d| !matrix.is_covered(cde, *d))
            .collect();
        let request = SuggestionRequest {
            cde: cde.to_string(),
            dimensions,
        };
        tracing::debug!(workflow = %self.id, cde, "requesting rule suggestions");
        Ok(SuggestionTask::spawn(
            provider,
            request,
            self.config.suggestion.timeout(),
        ))
    }

    /// Add a suggested rule to the DQ rules board, pending review
    ///
    /// The record id is `dq-<cde>-<dimension>`.
    ///
    /// # Errors
    /// `InvalidField` for an invalid proposal, `DuplicateId` when a rule
    /// with that id exists.
    pub fn accept_suggestion(&mut self, suggestion: &RuleSuggestion) -> Result<RecordId, WorkflowError> {
        let rule = suggestion.to_rule()?;
        let id = RecordId::new(format!("dq-{}-{}", rule.cde, rule.dimension));
        self.dq_rules.insert(Record::new(id.clone(), rule))?;
        Ok(id)
    }

    /// Documents and annotations summarized together
    #[must_use]
    pub fn documentation_summary(&self) -> DocumentationSummary {
        summarize_documentation(self.documents.records(), self.annotations.records())
    }

    /// Open an approval gate with the configured gate settings
    ///
    /// # Errors
    /// `Gate` for malformed items.
    pub fn open_gate(&self, phase: Phase, items: Vec<GateItem>) -> Result<HumanGate, WorkflowError> {
        Ok(HumanGate::new(phase, items, self.config.gate)?)
    }

    /// Record the decision of a decided gate
    ///
    /// A later decision for the same phase replaces the earlier one.
    ///
    /// # Errors
    /// `GateUndecided` when the gate has no decision yet.
    pub fn record_gate(&mut self, gate: &HumanGate) -> Result<&GateDecision, WorkflowError> {
        let decision = gate
            .decision()
            .ok_or(WorkflowError::GateUndecided(gate.phase()))?
            .clone();
        tracing::info!(
            workflow = %self.id,
            phase = %decision.phase,
            approved = decision.is_approved(),
            "recorded gate decision"
        );
        let phase = decision.phase;
        self.decisions.insert(phase, decision);
        Ok(&self.decisions[&phase])
    }

    /// Decision recorded for `phase`
    pub fn gate_decision(&self, phase: Phase) -> Option<&GateDecision> {
        self.decisions.get(&phase)
    }

    /// First phase without an approved gate
    pub fn current_phase(&self) -> Option<Phase> {
        Phase::ALL
            .into_iter()
            .find(|p| !self.decisions.get(p).is_some_and(GateDecision::is_approved))
    }

    /// Attestation checklist
    #[inline]
    pub fn checklist(&self) -> &AttestationChecklist {
        &self.checklist
    }

    /// Acknowledge a checklist item
    ///
    /// # Errors
    /// `UnknownChecklistItem` for an id not on the checklist.
    pub fn acknowledge(&mut self, item: &str) -> Result<AttestationSummary, WorkflowError> {
        self.checklist = self.checklist.acknowledge(item)?;
        Ok(self.checklist.summary())
    }

    /// Withdraw a checklist acknowledgement
    ///
    /// A signed attestation no longer backed by a complete checklist is
    /// discarded and has to be signed again.
    ///
    /// # Errors
    /// `UnknownChecklistItem` for an id not on the checklist.
    pub fn withdraw(&mut self, item: &str) -> Result<AttestationSummary, WorkflowError> {
        self.checklist = self.checklist.withdraw(item)?;
        let summary = self.checklist.summary();
        if !summary.can_attest {
            if let Some(revoked) = self.attestation.take() {
                tracing::warn!(
                    workflow = %self.id,
                    item,
                    digest = %revoked.digest,
                    "attestation revoked by withdrawn acknowledgement"
                );
            }
        }
        Ok(summary)
    }

    /// Sign the attestation
    ///
    /// # Errors
    /// `IncompleteChecklist` while required items are unacknowledged,
    /// `InvalidAttestation` for an empty statement or signer.
    pub fn attest(&mut self, statement: &str, signer: &str) -> Result<&Attestation, WorkflowError> {
        let attestation = self.checklist.sign(statement, signer)?;
        tracing::info!(
            workflow = %self.id,
            signer = %attestation.signer,
            digest = %attestation.digest,
            "workflow attested"
        );
        Ok(self.attestation.insert(attestation))
    }

    /// Signed attestation, if any
    #[inline]
    pub fn attestation(&self) -> Option<&Attestation> {
        self.attestation.as_ref()
    }

    /// Every summary at this point in time
    ///
    /// # Errors
    /// As [`WorkflowContext::coverage`].
    pub fn snapshot(&self) -> Result<WorkflowSnapshot, WorkflowError> {
        Ok(WorkflowSnapshot {
            regulatory_rules: self.regulatory_rules.summary().clone(),
            requirements: self.requirements.summary().clone(),
            elements: self.elements.summary().clone(),
            dq_rules: self.dq_rules.summary().clone(),
            active_rules: self.active_rules.len(),
            coverage: self.coverage()?,
            issues: self.issues.summary().clone(),
            controls: self.controls.summary().clone(),
            documentation: self.documentation_summary(),
            attestation: self.checklist.summary(),
            decisions: self.decisions.values().cloned().collect(),
        })
    }

    /// Tear the workflow down into its outcome
    ///
    /// # Errors
    /// `NotAttested` before [`WorkflowContext::attest`], `IncompleteChecklist`
    /// while required items are unacknowledged; the context is handed back
    /// inside the error.
    pub fn complete(mut self) -> Result<WorkflowOutcome, IncompleteWorkflow> {
        let snapshot = match self.snapshot() {
            Ok(snapshot) => snapshot,
            Err(error) => return Err(IncompleteWorkflow::new(error, self)),
        };
        if self.attestation.is_none() {
            return Err(IncompleteWorkflow::new(WorkflowError::NotAttested, self));
        }
        let missing = self.checklist.missing_required();
        if !missing.is_empty() {
            let error = SummaryError::IncompleteChecklist { missing };
            return Err(IncompleteWorkflow::new(error.into(), self));
        }
        let Some(attestation) = self.attestation.take() else {
            return Err(IncompleteWorkflow::new(WorkflowError::NotAttested, self));
        };
        let outcome = WorkflowOutcome {
            id: self.id,
            report: self.report,
            started_at: self.started_at,
            completed_at: Utc::now(),
            attestation,
            snapshot,
        };
        tracing::info!(workflow = %outcome.id, report = %outcome.report, "workflow completed");
        Ok(outcome)
    }
}

/// All summaries of a workflow at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    /// Regulatory rule review
    pub regulatory_rules: Summary<RuleReviewStatus>,
    /// Requirements document lines
    pub requirements: Summary<RuleReviewStatus>,
    /// Data elements
    pub elements: Summary<ElementStatus>,
    /// DQ rule review
    pub dq_rules: Summary<RuleReviewStatus>,
    /// Active DQ rules
    pub active_rules: usize,
    /// CDE coverage
    pub coverage: CoverageSummary,
    /// Issues
    pub issues: Summary<AnnotationStatus>,
    /// Control assessments
    pub controls: Summary<ComplianceStatus>,
    /// Documentation
    pub documentation: DocumentationSummary,
    /// Checklist progress
    pub attestation: AttestationSummary,
    /// Gate decisions in phase order
    pub decisions: Vec<GateDecision>,
}

/// Result of a completed workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    /// Workflow id
    pub id: WorkflowId,
    /// Report name
    pub report: String,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Completion time
    pub completed_at: DateTime<Utc>,
    /// Signed attestation
    pub attestation: Attestation,
    /// Final summaries
    pub snapshot: WorkflowSnapshot,
}

/// Completion refused; the context is returned unchanged
#[derive(Debug, thiserror::Error)]
#[error("workflow cannot complete: {error}")]
pub struct IncompleteWorkflow {
    /// Why
    #[source]
    pub error: WorkflowError,
    /// The workflow, still usable
    pub context: Box<WorkflowContext>,
}

impl IncompleteWorkflow {
    fn new(error: WorkflowError, context: WorkflowContext) -> Self {
        Self {
            error,
            context: Box::new(context),
        }
    }

    /// Recover the context
    #[must_use]
    pub fn into_context(self) -> WorkflowContext {
        *self.context
    }
}
