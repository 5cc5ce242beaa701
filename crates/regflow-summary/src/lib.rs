//! regflow Summaries
//!
//! Pure aggregation over record collections.
//!
//! # Core Concepts
//!
//! - [`summarize`]: counts per status, completion percentage and gap list
//! - [`CoverageMatrix`]: CDE × data-quality dimension coverage
//! - [`summarize_documentation`]: documents plus their annotations
//! - [`AttestationChecklist`]: acknowledgement gate in front of signing
//! - [`bcbs239_matrix`]: the eleven BCBS 239 principles as compliance records
//!
//! # Example
//!
//! ```rust
//! use regflow_summary::prelude::*;
//!
//! let summary = summarize(&bcbs239_matrix());
//! assert_eq!(summary.total_count, 11);
//! assert_eq!(summary.completion_percentage, 0);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod attestation;
mod bcbs;
mod coverage;
mod documentation;
mod error;
mod summary;

// Re-exports
pub use attestation::{AttestationChecklist, AttestationSummary, ChecklistItem};
pub use bcbs::{bcbs239_matrix, BCBS239_PRINCIPLES};
pub use coverage::{CoverageGap, CoverageMatrix, CoverageSummary};
pub use documentation::{summarize_documentation, DocumentationSummary};
pub use error::SummaryError;
pub use summary::{
    percentage, summarize, summarize_leaves, summarize_sections, summarize_with,
    SectionSummary, Summary, SummaryCriteria,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building summaries
    pub use crate::{
        bcbs239_matrix, summarize, summarize_sections, summarize_with, AttestationChecklist,
        CoverageMatrix, Summary, SummaryCriteria, SummaryError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
