use pretty_assertions::assert_eq;
use proptest::prelude::*;
use regflow_records::RecordId;
use regflow_status::{ElementStatus, Lifecycle, RuleReviewStatus};
use regflow_summary::{
    summarize, summarize_sections, summarize_with, SummaryCriteria,
};
use regflow_test_utils::{element_layout, rule_set, rule_status, sectioned_elements};

proptest! {
    #[test]
    fn prop_total_equals_leaf_count(layout in element_layout()) {
        let set = sectioned_elements(&layout);
        let summary = summarize(&set);
        prop_assert_eq!(summary.total_count, set.leaf_count());
        prop_assert_eq!(summary.total_count, layout.iter().map(Vec::len).sum::<usize>());
    }

    #[test]
    fn prop_counts_sum_to_total(layout in element_layout()) {
        let summary = summarize(&sectioned_elements(&layout));
        prop_assert_eq!(summary.counts_by_status.values().sum::<usize>(), summary.total_count);
        prop_assert_eq!(summary.counts_by_status.len(), ElementStatus::ALL.len());
    }

    #[test]
    fn prop_percentage_in_range(statuses in prop::collection::vec(rule_status(), 0..30)) {
        let summary = summarize(&rule_set(&statuses));
        prop_assert!(summary.completion_percentage <= 100);
        if statuses.is_empty() {
            prop_assert_eq!(summary.completion_percentage, 0);
        }
    }

    #[test]
    fn prop_section_counts_add_up(layout in element_layout()) {
        let set = sectioned_elements(&layout);
        let whole = summarize(&set);
        let parts = summarize_sections(&set, &SummaryCriteria::default());

        for status in ElementStatus::ALL {
            let sum: usize = parts.iter().map(|p| p.summary.count(*status)).sum();
            prop_assert_eq!(sum, whole.count(*status));
        }
        let gaps: Vec<RecordId> = parts.iter().flat_map(|p| p.summary.gap_list.clone()).collect();
        prop_assert_eq!(gaps, whole.gap_list);
    }

    #[test]
    fn prop_gap_list_matches_gap_count(layout in element_layout()) {
        let summary = summarize(&sectioned_elements(&layout));
        prop_assert_eq!(summary.gap_list.len(), summary.count(ElementStatus::Gap));
    }
}

#[test]
fn rules_example_scenario() {
    use RuleReviewStatus::*;
    let set = rule_set(&[Pending, Accepted, Accepted, Rejected]);
    let summary = summarize_with(&set, &SummaryCriteria::new([Accepted], []));

    assert_eq!(summary.total_count, 4);
    assert_eq!(summary.count(Pending), 1);
    assert_eq!(summary.count(Accepted), 2);
    assert_eq!(summary.count(Rejected), 1);
    assert_eq!(summary.count(Modified), 0);
    assert_eq!(summary.completion_percentage, 50);
    assert!(summary.gap_list.is_empty());
}

#[test]
fn element_completion_counts_mapped_and_validated() {
    use ElementStatus::*;
    let set = sectioned_elements(&[vec![Mapped, Validated], vec![Gap, Pending]]);
    let summary = summarize(&set);
    assert_eq!(summary.completion_percentage, 50);
    assert_eq!(summary.gap_list, vec![RecordId::from("el-1-0")]);
}
