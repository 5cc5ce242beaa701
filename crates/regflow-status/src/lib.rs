//! regflow Status System
//!
//! Closed status enumerations and their transition graphs.
//!
//! # Core Concepts
//!
//! - [`Lifecycle`]: trait implemented by every domain status enum
//! - [`validate_transition`]: checks a single edge against the domain graph
//! - [`SatelliteKind`]: the satellite record a status requires, if any
//!
//! # Domains
//!
//! | Enum | Initial | Complete | Gap |
//! |------|---------|----------|-----|
//! | [`RuleReviewStatus`] | `pending` | `accepted`, `modified` | none |
//! | [`ElementStatus`] | `pending` | `mapped`, `validated` | `gap` |
//! | [`AnnotationStatus`] | `open` | `resolved`, `dismissed` | `open` |
//! | [`ComplianceStatus`] | `not_assessed` | `compliant` | `non_compliant` |
//! | [`DocumentStatus`] | `draft` | `approved` | none |
//!
//! # Example
//!
//! ```rust
//! use regflow_status::{validate_transition, ElementStatus};
//!
//! assert!(validate_transition(ElementStatus::Pending, ElementStatus::Mapped).is_ok());
//! assert!(validate_transition(ElementStatus::Pending, ElementStatus::Validated).is_err());
//!
//! let parsed: ElementStatus = "gap".parse().unwrap();
//! assert_eq!(parsed, ElementStatus::Gap);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod domains;
pub mod error;
pub mod lifecycle;

// Re-exports
pub use domains::{
    AnnotationStatus, ComplianceStatus, DocumentStatus, ElementStatus, RuleReviewStatus,
};
pub use error::StatusError;
pub use lifecycle::{
    allowed_transitions, is_terminal, parse_status, validate_transition, Lifecycle, SatelliteKind,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for status handling
    pub use crate::{
        AnnotationStatus, ComplianceStatus, DocumentStatus, ElementStatus, Lifecycle,
        RuleReviewStatus, SatelliteKind, StatusError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
