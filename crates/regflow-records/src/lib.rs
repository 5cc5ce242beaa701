//! regflow Records
//!
//! Immutable record collections and the transition handler.
//!
//! # Overview
//!
//! - **Record**: one domain entity with a lifecycle status and satellites
//! - **RecordSet**: ordered, optionally sectioned collection of records
//! - **TransitionHandler**: validated, non-mutating status changes
//!
//! # Example
//!
//! ```rust
//! use regflow_records::{
//!     Record, RecordId, RecordSet, SourceMapping, TransitionHandler, TransitionRequest,
//! };
//! use regflow_status::ElementStatus;
//!
//! let set: RecordSet<ElementStatus, &str> =
//!     RecordSet::from_records(vec![Record::new("lei", "Legal entity identifier")]).unwrap();
//!
//! let handler = TransitionHandler::default();
//! let next = handler
//!     .apply(
//!         &set,
//!         TransitionRequest::new("lei", ElementStatus::Mapped)
//!             .with_satellite(SourceMapping::new("CRM", "counterparty", "lei_code")),
//!     )
//!     .unwrap();
//!
//! assert_eq!(next.find(&RecordId::from("lei")).unwrap().status(), ElementStatus::Mapped);
//! assert_eq!(set.find(&RecordId::from("lei")).unwrap().status(), ElementStatus::Pending);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod domain;
pub mod error;
pub mod record;
pub mod satellite;
pub mod transition;
pub mod tree;

// Re-exports
pub use domain::{
    Annotation, AnnotationSet, DataElement, Document, DocumentSet, DqDimension, DqRule,
    DqRuleSet, ElementSet, PrincipleSet, Principle, RegulatoryRule, RegulatoryRuleSet,
    Requirement, RequirementSet,
};
pub use error::RecordError;
pub use record::{Record, RecordId, StatusChange, TransitionMeta};
pub use satellite::{Attestation, Evidence, Resolution, Satellite, SourceMapping};
pub use transition::{
    apply_transition, TransitionHandler, TransitionPolicy, TransitionRequest, UnknownIdPolicy,
};
pub use tree::{Entry, Leaves, RecordSet, Section};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for record handling
    pub use crate::{
        apply_transition, Entry, Record, RecordError, RecordId, RecordSet, Satellite, Section,
        TransitionHandler, TransitionMeta, TransitionPolicy, TransitionRequest,
    };
    pub use regflow_status::Lifecycle;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
