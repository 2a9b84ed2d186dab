//! Engine and background sink wired together.

use std::sync::Arc;

use depmat_core::config::{SinkConfig, SinkKind};
use depmat_core::{DepmatConfig, NodeId};
use depmat_engine::{ParsedSnapshot, ProvenanceEngine, ScopeOwner};
use depmat_storage::connection::open_reader;
use depmat_storage::queries::snapshots;
use depmat_storage::{AsyncSnapshotSink, MemoryWriter};
use tempfile::TempDir;

fn config() -> DepmatConfig {
    DepmatConfig::from_toml("[scope]\nbackground_sweep = false\n").unwrap()
}

fn nodes(ids: std::ops::Range<u64>) -> Vec<NodeId> {
    ids.map(NodeId).collect()
}

fn run_two_phases(engine: &ProvenanceEngine, owner: &ScopeOwner, label: &str) {
    engine.on_unit_start(owner, label);
    engine.on_phase_enter(owner, "A", nodes(0..3));
    engine.on_phase_exit(owner, "A", nodes(0..3)).unwrap();
    engine.on_phase_enter(owner, "B", nodes(0..4));
    engine.on_phase_exit(owner, "B", nodes(0..4)).unwrap();
    engine.on_unit_end(owner).unwrap();
}

#[test]
fn finalized_units_reach_the_backend() {
    let writer = MemoryWriter::new();
    let store = writer.store();
    let sink = Arc::new(AsyncSnapshotSink::new(Box::new(writer), None).unwrap());
    let engine = ProvenanceEngine::new(config(), sink.clone());
    let owner = ScopeOwner::new();

    run_two_phases(&engine, &owner, "req-1");
    run_two_phases(&engine, &owner, "req-2");
    sink.flush().unwrap();

    let persisted = store.snapshots();
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted[0].unit_label, "req-1");
    let parsed = ParsedSnapshot::parse(&persisted[1].text).unwrap();
    assert_eq!(parsed.cell("B#0", "A#0").unwrap().to_string(), "3:4:1");
    assert_eq!(parsed.cell("B#0", "NoPhase#0").unwrap().to_string(), "1:4:1");
}

#[test]
fn sqlite_sink_from_config() {
    let tmp = TempDir::new().unwrap();
    let sink_config = SinkConfig {
        kind: Some(SinkKind::Sqlite),
        output_dir: Some(tmp.path().to_path_buf()),
        ..SinkConfig::default()
    };
    let sink = Arc::new(AsyncSnapshotSink::from_config(&sink_config).unwrap());
    {
        let engine = ProvenanceEngine::new(config(), sink.clone());
        let owner = ScopeOwner::new();
        run_two_phases(&engine, &owner, "compile-42");
        // Left open; finalized on shutdown.
        engine.on_unit_start(&owner, "compile-43");
        engine.on_phase_enter(&owner, "A", nodes(0..1));
        engine.shutdown();
    }
    sink.flush().unwrap();

    let conn = open_reader(&tmp.path().join("depmat.db")).unwrap();
    let rows = snapshots::list(&conn).unwrap();
    assert_eq!(rows.len(), 2);
    let open_one = snapshots::latest_by_label(&conn, "compile-43").unwrap().unwrap();
    assert!(open_one.snapshot.text.contains("A#0\n\n"));
    drop(conn);

    let stats = sink.close().unwrap();
    assert_eq!(stats.persisted, 2);
}
