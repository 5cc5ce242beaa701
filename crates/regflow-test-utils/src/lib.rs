//! Testing utilities for regflow workspace
//!
//! Shared fixtures, builders and proptest strategies.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use proptest::sample::select;
use regflow_records::{
    DataElement, DqDimension, DqRule, Entry, Record, RecordId, RecordSet, Section,
    SourceMapping, TransitionHandler, TransitionMeta, TransitionRequest,
};
use regflow_status::{ElementStatus, Lifecycle, RuleReviewStatus};

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 31, 17, 0, 0).unwrap()
}

pub fn meta(actor: &str) -> TransitionMeta {
    TransitionMeta::new(actor).at(fixed_time())
}

pub fn mapping() -> SourceMapping {
    SourceMapping::new("GL", "ledger", "balance")
}

pub fn element(name: &str) -> DataElement {
    DataElement {
        name: name.to_string(),
        description: String::new(),
        is_cde: false,
    }
}

pub fn cde(name: &str) -> DataElement {
    DataElement {
        is_cde: true,
        ..element(name)
    }
}

pub fn dq_rule(cde: &str, dimension: DqDimension) -> DqRule {
    DqRule::new(cde, dimension, format!("{cde} check"), 99.0).unwrap()
}

/// Flat rule set with the given statuses, ids `r0..rN`
pub fn rule_set(statuses: &[RuleReviewStatus]) -> RecordSet<RuleReviewStatus, ()> {
    let mut set = RecordSet::from_records(
        (0..statuses.len())
            .map(|i| Record::new(format!("r{i}"), ()))
            .collect(),
    )
    .unwrap();
    let handler = TransitionHandler::default();
    for (i, status) in statuses.iter().enumerate() {
        if *status != RuleReviewStatus::INITIAL {
            set = handler
                .apply(&set, TransitionRequest::new(format!("r{i}"), *status))
                .unwrap();
        }
    }
    set
}

/// Path from `pending` to `target` through the element graph
pub fn element_path(target: ElementStatus) -> &'static [ElementStatus] {
    match target {
        ElementStatus::Pending => &[],
        ElementStatus::Mapped => &[ElementStatus::Mapped],
        ElementStatus::Gap => &[ElementStatus::Gap],
        ElementStatus::Validated => &[ElementStatus::Mapped, ElementStatus::Validated],
    }
}

/// Walk one element to `target`, attaching a mapping where needed
pub fn drive_element<T: Clone>(
    set: &RecordSet<ElementStatus, T>,
    id: &RecordId,
    target: ElementStatus,
) -> RecordSet<ElementStatus, T> {
    let handler = TransitionHandler::default();
    element_path(target).iter().fold(set.clone(), |acc, to| {
        let request = TransitionRequest::new(id.clone(), *to).with_satellite(mapping());
        handler.apply(&acc, request).unwrap()
    })
}

/// Sectioned element set: each inner vec becomes one section
pub fn sectioned_elements(layout: &[Vec<ElementStatus>]) -> RecordSet<ElementStatus, DataElement> {
    let mut entries: Vec<Entry<ElementStatus, DataElement>> = Vec::new();
    for (s, statuses) in layout.iter().enumerate() {
        let mut section = Section::new(format!("sec-{s}"), format!("Section {s}"));
        for i in 0..statuses.len() {
            section = section.with_child(Record::new(format!("el-{s}-{i}"), element("x")));
        }
        entries.push(section.into());
    }
    let mut set = RecordSet::from_entries(entries).unwrap();
    for (s, statuses) in layout.iter().enumerate() {
        for (i, status) in statuses.iter().enumerate() {
            set = drive_element(&set, &RecordId::new(format!("el-{s}-{i}")), *status);
        }
    }
    set
}

pub fn element_status() -> impl Strategy<Value = ElementStatus> {
    select(ElementStatus::ALL.to_vec())
}

pub fn rule_status() -> impl Strategy<Value = RuleReviewStatus> {
    select(RuleReviewStatus::ALL.to_vec())
}

/// Up to 5 sections of up to 8 elements each
pub fn element_layout() -> impl Strategy<Value = Vec<Vec<ElementStatus>>> {
    prop::collection::vec(prop::collection::vec(element_status(), 0..8), 0..5)
}
