//! regflow Core
//!
//! Per-workflow state for a regulatory-reporting workflow.
//!
//! # Architecture
//!
//! ```text
//! WorkflowContext
//!     ├── Board<RuleReviewStatus, RegulatoryRule>   regulatory intelligence
//!     ├── Board<RuleReviewStatus, Requirement>      requirements document
//!     ├── Board<ElementStatus, DataElement>         data requirements, CDEs
//!     ├── Board<RuleReviewStatus, DqRule>           DQ rules + coverage
//!     ├── Board<AnnotationStatus, Annotation>       issues
//!     ├── Board<ComplianceStatus, Principle>        controls (BCBS 239)
//!     ├── Board<DocumentStatus, Document>           documentation
//!     └── AttestationChecklist + gate decisions     attestation
//! ```
//!
//! Each [`Board`] holds an immutable record set and swaps in a new one on
//! every successful transition, recomputing its summary.
//!
//! # Example
//!
//! ```rust
//! use regflow_core::{WorkflowConfig, WorkflowContext};
//! use regflow_status::ComplianceStatus;
//!
//! let mut ctx = WorkflowContext::new("COREP", WorkflowConfig::default());
//! ctx.controls_mut()
//!     .transition("bcbs239-p4", ComplianceStatus::Partial, None)
//!     .unwrap();
//! assert_eq!(ctx.controls().summary().count(ComplianceStatus::Partial), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod board;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod gate;
pub mod logging;
pub mod phase;
pub mod suggestion;

// Re-exports
pub use board::Board;
pub use config::{GateConfig, LoggingConfig, SuggestionConfig, TransitionConfig, WorkflowConfig};
pub use context::{IncompleteWorkflow, WorkflowContext, WorkflowId, WorkflowOutcome, WorkflowSnapshot};
pub use directory::{Directory, Recipient};
pub use error::{ConfigError, GateError, SuggestionError, WorkflowError};
pub use gate::{GateDecision, GateItem, GateVerdict, HumanGate};
pub use logging::init_tracing;
pub use phase::Phase;
pub use suggestion::{
    CancellationToken, RuleSuggestion, SuggestionOutcome, SuggestionProvider, SuggestionRequest,
    SuggestionTask, TemplateProvider,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a workflow
    pub use crate::{
        Board, GateItem, HumanGate, Phase, WorkflowConfig, WorkflowContext, WorkflowError,
    };
    pub use regflow_records::prelude::*;
    pub use regflow_status::{
        AnnotationStatus, ComplianceStatus, DocumentStatus, ElementStatus, RuleReviewStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
