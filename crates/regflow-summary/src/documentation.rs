//! Documentation phase summary

use crate::summary::{summarize, Summary};
use indexmap::IndexMap;
use regflow_records::RecordSet;
use regflow_status::{AnnotationStatus, DocumentStatus};
use serde::{Deserialize, Serialize};

/// Documents and their review annotations, summarized together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationSummary {
    /// Number of documents
    pub total_documents: usize,
    /// Documents per status
    pub counts_by_status: IndexMap<DocumentStatus, usize>,
    /// Share of approved documents
    pub completion_percentage: u8,
    /// Annotations still open
    pub open_annotations: usize,
    /// Annotations resolved or dismissed
    pub closed_annotations: usize,
    /// Every document approved and nothing open
    pub ready_for_attestation: bool,
}

/// Summarize documents together with their annotations.
#[must_use]
pub fn summarize_documentation<D, A>(
    documents: &RecordSet<DocumentStatus, D>,
    annotations: &RecordSet<AnnotationStatus, A>,
) -> DocumentationSummary {
    let docs: Summary<DocumentStatus> = summarize(documents);
    let notes: Summary<AnnotationStatus> = summarize(annotations);

    let open_annotations = notes.count(AnnotationStatus::Open);
    let ready_for_attestation = docs.is_complete() && open_annotations == 0;

    DocumentationSummary {
        total_documents: docs.total_count,
        counts_by_status: docs.counts_by_status,
        completion_percentage: docs.completion_percentage,
        open_annotations,
        closed_annotations: notes.total_count - open_annotations,
        ready_for_attestation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regflow_records::{Attestation, Record, RecordId, Resolution, TransitionHandler, TransitionRequest};

    fn approved_docs() -> RecordSet<DocumentStatus, ()> {
        let handler = TransitionHandler::default();
        let set = RecordSet::from_records(vec![Record::new("d1", ())]).unwrap();
        let set = handler
            .apply(&set, TransitionRequest::new("d1", DocumentStatus::InReview))
            .unwrap();
        handler
            .apply(
                &set,
                TransitionRequest::new("d1", DocumentStatus::Approved)
                    .with_satellite(Attestation::sign("dictionary reviewed", "owner")),
            )
            .unwrap()
    }

    #[test]
    fn open_annotation_blocks_readiness() {
        let notes: RecordSet<AnnotationStatus, ()> =
            RecordSet::from_records(vec![Record::new("n1", ()), Record::new("n2", ())]).unwrap();
        let notes = TransitionHandler::default()
            .apply(
                &notes,
                TransitionRequest::new("n1", AnnotationStatus::Resolved)
                    .with_satellite(Resolution::new("definition fixed", "owner")),
            )
            .unwrap();

        let summary = summarize_documentation(&approved_docs(), &notes);
        assert_eq!(summary.total_documents, 1);
        assert_eq!(summary.completion_percentage, 100);
        assert_eq!(summary.open_annotations, 1);
        assert_eq!(summary.closed_annotations, 1);
        assert!(!summary.ready_for_attestation);

        let notes = TransitionHandler::default()
            .apply(&notes, TransitionRequest::new("n2", AnnotationStatus::Dismissed))
            .unwrap();
        assert!(summarize_documentation(&approved_docs(), &notes).ready_for_attestation);
        assert!(notes.contains(&RecordId::from("n2")));
    }

    #[test]
    fn no_documents_is_not_ready() {
        let docs: RecordSet<DocumentStatus, ()> = RecordSet::new();
        let notes: RecordSet<AnnotationStatus, ()> = RecordSet::new();
        let summary = summarize_documentation(&docs, &notes);
        assert!(!summary.ready_for_attestation);
        assert_eq!(summary.completion_percentage, 0);
    }
}
