//! AsyncSnapshotSink hand-off, back-pressure and shutdown.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{snapshot, BrokenWriter, GateWriter, PanickingWriter};
use crossbeam_channel::{bounded, unbounded};
use depmat_core::errors::SinkError;
use depmat_core::SnapshotSink;
use depmat_storage::{AsyncSnapshotSink, MemoryWriter};

#[test]
fn persists_in_hand_off_order() {
    let writer = MemoryWriter::new();
    let store = writer.store();
    let sink = AsyncSnapshotSink::new(Box::new(writer), None).unwrap();

    for unit in 1..=20 {
        sink.persist(snapshot(unit, "req")).unwrap();
    }
    sink.flush().unwrap();

    let ids: Vec<u64> = store.snapshots().iter().map(|s| s.unit_id.get()).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    let stats = sink.stats();
    assert_eq!(stats.persisted, 20);
    assert_eq!(stats.flushes, 1);
    assert!(stats.bytes > 0);
}

#[test]
fn close_drains_the_queue() {
    let writer = MemoryWriter::new();
    let store = writer.store();
    let sink = AsyncSnapshotSink::new(Box::new(writer), None).unwrap();
    for unit in 1..=5 {
        sink.persist(snapshot(unit, "req")).unwrap();
    }

    let stats = sink.shutdown().unwrap();
    assert_eq!(stats.persisted, 5);
    assert_eq!(store.len(), 5);
}

#[test]
fn closed_sink_refuses_snapshots() {
    let sink = AsyncSnapshotSink::new(Box::new(MemoryWriter::new()), None).unwrap();
    sink.close().unwrap();

    assert!(matches!(sink.persist(snapshot(1, "late")), Err(SinkError::Closed)));
    assert!(matches!(sink.flush(), Err(SinkError::Closed)));
    assert!(matches!(sink.close(), Err(SinkError::Closed)));
}

#[test]
fn full_bounded_queue_rejects_without_blocking() {
    let (started_tx, started_rx) = unbounded();
    let (gate_tx, gate_rx) = unbounded();
    let writer = GateWriter {
        started: started_tx,
        gate: gate_rx,
    };
    let sink = AsyncSnapshotSink::new(Box::new(writer), Some(1)).unwrap();

    sink.persist(snapshot(1, "a")).unwrap();
    // Unit 1 is now held by the writer, so the queue is empty again.
    assert_eq!(started_rx.recv().unwrap(), 1);
    sink.persist(snapshot(2, "b")).unwrap();

    let err = sink.persist(snapshot(3, "c")).unwrap_err();
    assert!(matches!(err, SinkError::QueueFull { capacity: 1 }));
    assert_eq!(sink.stats().rejected, 1);

    gate_tx.send(()).unwrap();
    gate_tx.send(()).unwrap();
    let stats = sink.close().unwrap();
    assert_eq!(stats.persisted, 2);
    assert_eq!(stats.rejected, 1);
}

#[test]
fn backend_failures_are_counted_not_returned() {
    let sink = AsyncSnapshotSink::new(Box::new(BrokenWriter), None).unwrap();
    sink.persist(snapshot(1, "a")).unwrap();
    sink.persist(snapshot(2, "b")).unwrap();

    let stats = sink.close().unwrap();
    assert_eq!(stats.persisted, 0);
    assert_eq!(stats.failed, 2);
}

#[test]
fn writer_panic_surfaces_on_close() {
    let sink = AsyncSnapshotSink::new(Box::new(PanickingWriter), None).unwrap();
    sink.persist(snapshot(1, "a")).unwrap();

    assert!(matches!(sink.close(), Err(SinkError::WriterPanicked)));
}

#[test]
fn concurrent_producers_lose_nothing() {
    let writer = MemoryWriter::new();
    let store = writer.store();
    let sink = Arc::new(AsyncSnapshotSink::new(Box::new(writer), None).unwrap());

    let handles: Vec<_> = (0..8u64)
        .map(|t| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                for i in 0..50 {
                    sink.persist(snapshot(t * 1_000 + i, "worker")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    sink.flush().unwrap();

    assert_eq!(store.len(), 400);
    assert_eq!(sink.stats().persisted, 400);
}

#[test]
fn flush_waits_for_blocked_writer() {
    let (started_tx, started_rx) = unbounded();
    let (gate_tx, gate_rx) = unbounded();
    let sink = Arc::new(
        AsyncSnapshotSink::new(
            Box::new(GateWriter {
                started: started_tx,
                gate: gate_rx,
            }),
            None,
        )
        .unwrap(),
    );
    sink.persist(snapshot(1, "a")).unwrap();
    started_rx.recv().unwrap();

    let (done_tx, done_rx) = bounded(1);
    let flusher = {
        let sink = Arc::clone(&sink);
        thread::spawn(move || {
            sink.flush().unwrap();
            done_tx.send(()).unwrap();
        })
    };
    assert!(done_rx.try_recv().is_err());

    gate_tx.send(()).unwrap();
    flusher.join().unwrap();
    assert!(done_rx.try_recv().is_ok());
    assert_eq!(sink.stats().persisted, 1);
}

#[test]
fn close_is_not_held_up_by_a_flush_waiting_on_a_full_queue() {
    let (started_tx, started_rx) = unbounded();
    let (gate_tx, gate_rx) = unbounded();
    let sink = AsyncSnapshotSink::new(
        Box::new(GateWriter {
            started: started_tx,
            gate: gate_rx,
        }),
        Some(1),
    )
    .unwrap();

    sink.persist(snapshot(1, "a")).unwrap();
    started_rx.recv().unwrap();
    sink.persist(snapshot(2, "b")).unwrap();

    thread::scope(|s| {
        let flusher = s.spawn(|| sink.flush());
        thread::sleep(Duration::from_millis(20));
        let closer = s.spawn(|| sink.close());

        // Once close has taken the sender, new snapshots are refused
        // as closed, while the writer is still stuck.
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match sink.persist(snapshot(9, "late")) {
                Err(SinkError::Closed) => break,
                Err(SinkError::QueueFull { .. }) => {
                    assert!(Instant::now() < deadline, "close never took the sender");
                    thread::sleep(Duration::from_millis(1));
                }
                other => panic!("unexpected persist result: {other:?}"),
            }
        }

        for _ in 0..2 {
            gate_tx.send(()).unwrap();
        }
        flusher.join().unwrap().unwrap();
        let stats = closer.join().unwrap().unwrap();
        assert_eq!(stats.persisted, 2);
        assert_eq!(stats.flushes, 1);
    });
}
