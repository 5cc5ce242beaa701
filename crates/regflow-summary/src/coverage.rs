//! CDE × dimension coverage matrix
//!
//! A cell is covered once at least one complete DQ rule exists for that CDE
//! and dimension.

use crate::error::SummaryError;
use crate::summary::{percentage, SummaryCriteria};
use indexmap::IndexMap;
use regflow_records::{DqDimension, DqRule, RecordSet};
use regflow_status::RuleReviewStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Coverage of every CDE across the seven DQ dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageMatrix {
    cells: IndexMap<String, BTreeSet<DqDimension>>,
}

impl CoverageMatrix {
    /// Matrix with no coverage for the given CDEs
    pub fn new<I, C>(cdes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            cells: cdes
                .into_iter()
                .map(|c| (c.into(), BTreeSet::new()))
                .collect(),
        }
    }

    /// Derive coverage from reviewed DQ rules
    ///
    /// Rules count when their status is complete under the rule review
    /// domain's default criteria (accepted or modified).
    ///
    /// # Errors
    /// `UnknownCde` when a counted rule names a CDE outside `cdes`.
    pub fn from_rules<I, C>(
        cdes: I,
        rules: &RecordSet<RuleReviewStatus, DqRule>,
    ) -> Result<Self, SummaryError>
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let criteria = SummaryCriteria::<RuleReviewStatus>::domain_default();
        let mut matrix = Self::new(cdes);
        for rule in rules.leaves().filter(|r| criteria.is_complete(r.status())) {
            let fields = rule.fields();
            matrix.mark_covered(&fields.cde, fields.dimension)?;
        }
        Ok(matrix)
    }

    /// CDEs in insertion order
    pub fn cdes(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Mark a cell covered
    ///
    /// # Errors
    /// `UnknownCde` when the CDE is not part of the matrix.
    pub fn mark_covered(&mut self, cde: &str, dimension: DqDimension) -> Result<(), SummaryError> {
        self.cells
            .get_mut(cde)
            .ok_or_else(|| SummaryError::UnknownCde(cde.to_string()))?
            .insert(dimension);
        Ok(())
    }

    /// Whether a cell is covered; unknown CDEs are never covered
    #[must_use]
    pub fn is_covered(&self, cde: &str, dimension: DqDimension) -> bool {
        self.cells
            .get(cde)
            .is_some_and(|dims| dims.contains(&dimension))
    }

    /// Derived coverage summary
    #[must_use]
    pub fn summary(&self) -> CoverageSummary {
        let total_cells = self.cells.len() * DqDimension::ALL.len();
        let mut per_dimension: IndexMap<DqDimension, usize> =
            DqDimension::ALL.iter().map(|d| (*d, 0)).collect();
        let mut gaps = Vec::new();
        let mut covered_cells = 0;

        for (cde, dims) in &self.cells {
            for dimension in DqDimension::ALL {
                if dims.contains(&dimension) {
                    covered_cells += 1;
                    *per_dimension.entry(dimension).or_insert(0) += 1;
                } else {
                    gaps.push(CoverageGap {
                        cde: cde.clone(),
                        dimension,
                    });
                }
            }
        }

        CoverageSummary {
            total_cells,
            covered_cells,
            coverage_percentage: percentage(covered_cells, total_cells),
            gaps,
            per_dimension,
        }
    }
}

/// Uncovered cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageGap {
    /// CDE name
    pub cde: String,
    /// Uncovered dimension
    pub dimension: DqDimension,
}

/// Derived view of a [`CoverageMatrix`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// CDEs × dimensions
    pub total_cells: usize,
    /// Covered cells
    pub covered_cells: usize,
    /// `round(100 * covered / total)`, 0 when empty
    pub coverage_percentage: u8,
    /// Uncovered cells, CDE-major order
    pub gaps: Vec<CoverageGap>,
    /// Covered CDE count per dimension
    pub per_dimension: IndexMap<DqDimension, usize>,
}
