use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::sample::select;
use regflow_records::{
    apply_transition, Entry, Record, RecordError, RecordId, RecordSet, Section, SourceMapping,
    TransitionHandler, TransitionPolicy, TransitionRequest, UnknownIdPolicy,
};
use regflow_status::{ElementStatus, Lifecycle};

type Elements = RecordSet<ElementStatus, u32>;

fn build(count: usize, section_size: usize, steps: &[(usize, ElementStatus)]) -> Elements {
    let mut entries: Vec<Entry<ElementStatus, u32>> = Vec::new();
    let mut section = Section::new("sec-0", "Section 0");
    for i in 0..count {
        let record = Record::new(format!("el-{i}"), i as u32);
        if section_size > 0 && i % (section_size + 1) != 0 {
            section = section.with_child(record);
        } else {
            entries.push(record.into());
        }
    }
    entries.push(section.into());
    let mut set = RecordSet::from_entries(entries).unwrap();

    let handler = TransitionHandler::default();
    for (idx, to) in steps {
        let request = TransitionRequest::new(format!("el-{}", idx % count.max(1)), *to)
            .with_satellite(SourceMapping::new("GL", "ledger", "balance"));
        if let Ok(next) = handler.apply(&set, request) {
            set = next;
        }
    }
    set
}

fn status_strategy() -> impl Strategy<Value = ElementStatus> {
    select(ElementStatus::ALL.to_vec())
}

fn set_strategy() -> impl Strategy<Value = Elements> {
    (
        1usize..20,
        0usize..4,
        prop::collection::vec((0usize..20, status_strategy()), 0..40),
    )
        .prop_map(|(count, section_size, steps)| build(count, section_size, &steps))
}

proptest! {
    #[test]
    fn prop_reapplying_same_status_is_idempotent(
        set in set_strategy(),
        idx in 0usize..20,
        to in status_strategy(),
    ) {
        let id = RecordId::new(format!("el-{}", idx % set.leaf_count()));
        let handler = TransitionHandler::default();
        let request = || {
            TransitionRequest::new(id.clone(), to)
                .with_satellite(SourceMapping::new("GL", "ledger", "balance"))
        };
        if let Ok(once) = handler.apply(&set, request()) {
            let twice = handler.apply(&once, request()).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    #[test]
    fn prop_input_is_never_mutated(
        set in set_strategy(),
        idx in 0usize..20,
        to in status_strategy(),
    ) {
        let before = set.clone();
        let id = RecordId::new(format!("el-{}", idx % set.leaf_count()));
        let _ = apply_transition(&set, &id, to, None);
        prop_assert_eq!(&set, &before);
    }

    #[test]
    fn prop_shape_is_preserved(
        set in set_strategy(),
        idx in 0usize..20,
        to in status_strategy(),
    ) {
        let id = RecordId::new(format!("el-{}", idx % set.leaf_count()));
        let request = TransitionRequest::new(id, to)
            .with_satellite(SourceMapping::new("GL", "ledger", "balance"));
        if let Ok(out) = TransitionHandler::default().apply(&set, request) {
            let ids_before: Vec<_> = set.leaves().map(|r| r.id().clone()).collect();
            let ids_after: Vec<_> = out.leaves().map(|r| r.id().clone()).collect();
            prop_assert_eq!(ids_before, ids_after);
            prop_assert_eq!(set.entries().len(), out.entries().len());
            prop_assert!(out.validate_invariants().is_ok());
        }
    }

    #[test]
    fn prop_apply_keeps_attached_satellites(
        set in set_strategy(),
        idx in 0usize..20,
        to in status_strategy(),
    ) {
        let id = RecordId::new(format!("el-{}", idx % set.leaf_count()));
        let before = set.find(&id).unwrap().satellites().to_vec();
        let request = TransitionRequest::new(id.clone(), to)
            .with_satellite(SourceMapping::new("Risk", "exposures", "ead"));
        if let Ok(out) = TransitionHandler::default().apply(&set, request) {
            let after = out.find(&id).unwrap().satellites();
            if !before.is_empty() {
                prop_assert_eq!(after, before.as_slice());
            }
        }
    }

    #[test]
    fn prop_unknown_id_ignored_returns_equal_set(set in set_strategy(), to in status_strategy()) {
        let handler = TransitionHandler::new(
            TransitionPolicy::new().with_unknown_id(UnknownIdPolicy::Ignore),
        );
        let out = handler
            .apply(&set, TransitionRequest::new("missing", to))
            .unwrap();
        prop_assert_eq!(out, set);
    }
}

#[test]
fn mapped_validated_mapped_round_trip() {
    let set = build(3, 0, &[]);
    let id = RecordId::from("el-1");
    let handler = TransitionHandler::default();

    let mapped = handler
        .apply(
            &set,
            TransitionRequest::new(id.clone(), ElementStatus::Mapped)
                .with_satellite(SourceMapping::new("GL", "ledger", "balance")),
        )
        .unwrap();
    let validated = apply_transition(&mapped, &id, ElementStatus::Validated, None).unwrap();
    let revoked = apply_transition(&validated, &id, ElementStatus::Mapped, None).unwrap();

    let original = mapped.find(&id).unwrap();
    let restored = revoked.find(&id).unwrap();
    assert_eq!(restored.status(), original.status());
    assert_eq!(restored.satellites(), original.satellites());
    assert_eq!(restored.history().len(), 3);
}

#[test]
fn gap_reset_then_remap() {
    let set = build(1, 0, &[]);
    let id = RecordId::from("el-0");
    let handler = TransitionHandler::default();

    let gap = apply_transition(&set, &id, ElementStatus::Gap, None).unwrap();
    let pending = apply_transition(&gap, &id, ElementStatus::Pending, None).unwrap();
    let mapped = handler
        .apply(
            &pending,
            TransitionRequest::new(id.clone(), ElementStatus::Mapped)
                .with_satellite(SourceMapping::new("Risk", "exposures", "ead")),
        )
        .unwrap();
    assert_eq!(mapped.find(&id).unwrap().status(), ElementStatus::Mapped);
}

#[test]
fn remapping_requires_amend() {
    let handler = TransitionHandler::default();
    let id = RecordId::from("el-0");
    let mapped = handler
        .apply(
            &build(1, 0, &[]),
            TransitionRequest::new(id.clone(), ElementStatus::Mapped)
                .with_satellite(SourceMapping::new("GL", "ledger", "orig")),
        )
        .unwrap();

    let err = handler
        .apply(
            &mapped,
            TransitionRequest::new(id.clone(), ElementStatus::Gap)
                .with_satellite(SourceMapping::new("GL", "ledger", "new")),
        )
        .unwrap_err();
    assert!(matches!(err, RecordError::SatelliteAttached { .. }));

    let amended = handler
        .amend(&mapped, &id, SourceMapping::new("GL", "ledger", "new"), None)
        .unwrap();
    assert_ne!(amended.find(&id).unwrap().satellites(), mapped.find(&id).unwrap().satellites());
}
