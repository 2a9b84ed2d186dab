//! Node provenance tracker tests.

mod common;

use std::sync::Arc;

use depmat_core::{NodeId, PhaseKindInterner};
use depmat_engine::{NodeProvenanceTracker, PhaseId, ProvenanceStore, SideTable};
use proptest::prelude::*;

use common::FaultyStore;

proptest! {
    #[test]
    fn never_stamped_nodes_read_no_phase(ids in proptest::collection::vec(any::<u64>(), 0..64)) {
        let tracker = NodeProvenanceTracker::with_side_table(16);
        for id in ids {
            prop_assert_eq!(tracker.get_creation_phase(NodeId(id)).unwrap(), PhaseId::NO_PHASE);
        }
    }

    #[test]
    fn stamping_never_overwrites(
        ids in proptest::collection::hash_set(any::<u64>(), 1..64),
        first in 0u32..8,
        second in 0u32..8,
    ) {
        let kinds = PhaseKindInterner::new();
        let p = PhaseId::new(kinds.intern("P"), first);
        let q = PhaseId::new(kinds.intern("Q"), second);
        let tracker = NodeProvenanceTracker::with_side_table(16);
        let nodes: Vec<NodeId> = ids.into_iter().map(NodeId).collect();

        let outcome = tracker.stamp_unmarked(nodes.iter().copied(), p);
        prop_assert_eq!(outcome.stamped as usize, nodes.len());

        let again = tracker.stamp_unmarked(nodes.iter().copied(), q);
        prop_assert_eq!(again.stamped, 0);
        prop_assert_eq!(again.already_marked as usize, nodes.len());
        for node in nodes {
            prop_assert_eq!(tracker.get_creation_phase(node).unwrap(), p);
        }
    }
}

#[test]
fn deleted_nodes_read_deleted_phase() {
    let tracker = NodeProvenanceTracker::with_side_table(4);
    tracker.mark_deleted(NodeId(9)).unwrap();
    assert_eq!(
        tracker.get_creation_phase(NodeId(9)).unwrap(),
        PhaseId::DELETED_PHASE
    );
}

#[test]
fn store_faults_are_values_and_read_as_no_phase() {
    let tracker = NodeProvenanceTracker::new(Arc::new(FaultyStore::new(vec![NodeId(2)])));

    assert!(tracker.get_creation_phase(NodeId(2)).is_err());
    assert_eq!(tracker.creation_phase_or_unknown(NodeId(2)), PhaseId::NO_PHASE);
    assert_eq!(tracker.faults(), 1);

    // Writing goes through the default load-then-store path, which fails too.
    let kinds = PhaseKindInterner::new();
    let outcome = tracker.stamp_unmarked(
        [NodeId(1), NodeId(2)],
        PhaseId::new(kinds.intern("A"), 0),
    );
    assert_eq!(outcome.stamped, 1);
    assert_eq!(outcome.faults, 1);
    assert_eq!(tracker.faults(), 2);
}

#[test]
fn concurrent_stamping_keeps_one_winner() {
    let kinds = PhaseKindInterner::new();
    let table = Arc::new(SideTable::new());
    let phases: Vec<PhaseId> = (0..8).map(|i| PhaseId::new(kinds.intern("P"), i)).collect();

    std::thread::scope(|s| {
        for &phase in &phases {
            let table = Arc::clone(&table);
            s.spawn(move || {
                let tracker = NodeProvenanceTracker::new(table);
                tracker.stamp_unmarked((0..1000).map(NodeId), phase);
            });
        }
    });

    assert_eq!(table.len(), Some(1000));
    for id in 0..1000 {
        let stamp = table.load(NodeId(id)).unwrap().unwrap();
        assert!(phases.contains(&stamp));
    }
}
