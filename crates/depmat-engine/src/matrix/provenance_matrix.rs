//! ProvenanceMatrix: concurrent consumer × producer counts for one unit.
//!
//! Writers take the freeze lock shared and never wait for it: if a snapshot
//! holds it exclusively, the update is skipped and counted. Rendering takes
//! it exclusively, so a snapshot never observes a half-applied update.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};
use std::time::Instant;

use dashmap::DashMap;
use depmat_core::config::MatrixConfig;
use depmat_core::PhaseKindInterner;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use super::cell::{Cell, CellValue};
use super::key_order::KeyOrder;
use super::row::Row;
use crate::phase::PhaseId;

pub struct ProvenanceMatrix {
    kinds: Arc<PhaseKindInterner>,
    rows: DashMap<PhaseId, Arc<Row>, FxBuildHasher>,
    order: KeyOrder,
    freeze: RwLock<()>,
    sealed: AtomicBool,
    skipped_writes: AtomicU64,
    row_capacity: usize,
}

impl ProvenanceMatrix {
    pub fn new(kinds: Arc<PhaseKindInterner>, config: &MatrixConfig) -> Self {
        let capacity = config.effective_initial_capacity();
        let order = KeyOrder::with_capacity(capacity);
        if config.effective_seed_sentinels() {
            order.insert(PhaseId::NO_PHASE);
            order.insert(PhaseId::DELETED_PHASE);
        }
        Self {
            kinds,
            rows: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            order,
            freeze: RwLock::new(()),
            sealed: AtomicBool::new(false),
            skipped_writes: AtomicU64::new(0),
            row_capacity: capacity,
        }
    }

    /// Shared write access, or `None` while a snapshot is rendering or after
    /// the matrix was sealed. A `None` is counted as a skipped write.
    pub fn try_write(&self) -> Option<MatrixWriter<'_>> {
        let guard = match self.freeze.try_read() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                self.skipped_writes.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };
        if self.sealed.load(Ordering::Acquire) {
            self.skipped_writes.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(MatrixWriter {
            matrix: self,
            _guard: guard,
        })
    }

    /// Record one invocation of `consumer` over a graph whose nodes have the
    /// given creation phases.
    ///
    /// Returns the graph size, or `None` if the update was skipped.
    pub fn observe<I>(&self, consumer: PhaseId, producers: I) -> Option<u64>
    where
        I: IntoIterator<Item = PhaseId>,
    {
        let writer = self.try_write()?;
        let row = writer.row(consumer);
        let mut graph_size = 0u64;
        for producer in producers {
            graph_size += 1;
            writer.record(&row, producer);
        }
        writer.close_invocation(&row, graph_size);
        Some(graph_size)
    }

    pub fn row(&self, key: &PhaseId) -> Option<Arc<Row>> {
        self.rows.get(key).map(|r| Arc::clone(&r))
    }

    /// Value at (`row`, `col`), zero if never touched.
    pub fn cell_value(&self, row: &PhaseId, col: &PhaseId) -> CellValue {
        self.row(row)
            .map(|r| r.value(col))
            .unwrap_or(CellValue::ZERO)
    }

    /// Keys in first-seen order.
    pub fn key_order(&self) -> Vec<PhaseId> {
        self.order.snapshot()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn skipped_writes(&self) -> u64 {
        self.skipped_writes.load(Ordering::Relaxed)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn kinds(&self) -> &PhaseKindInterner {
        &self.kinds
    }

    /// Exclusive access for rendering. Writers skip while it is held.
    pub fn freeze(&self) -> FrozenMatrix<'_> {
        FrozenMatrix {
            matrix: self,
            _guard: self.freeze.write().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Render with rows and columns both in first-seen key order.
    pub fn render(&self) -> String {
        self.freeze().render()
    }

    /// Render with explicit orders. See [`FrozenMatrix::render_with`].
    pub fn render_with(&self, row_order: &[PhaseId], col_order: &[PhaseId]) -> String {
        self.freeze().render_with(row_order, col_order)
    }

    /// Seal the matrix and render it. Later writes are skipped. Returns
    /// `None` if the matrix was already sealed.
    pub fn seal_and_render(&self) -> Option<String> {
        let frozen = self.freeze();
        frozen.seal().then(|| frozen.render())
    }

    /// Seal without rendering. Returns false if already sealed.
    pub fn seal(&self) -> bool {
        self.freeze().seal()
    }

    fn render_frozen(&self, row_order: &[PhaseId], col_order: &[PhaseId]) -> String {
        let start = Instant::now();
        let mut out = String::with_capacity(16 * (col_order.len() + 1) * (row_order.len() + 1));
        // Writing into a String cannot fail.
        let _ = self.write_grid(&mut out, row_order, col_order);
        debug!(
            render_time_ms = start.elapsed().as_millis() as u64,
            keys = col_order.len(),
            "rendered provenance matrix"
        );
        out
    }

    fn write_grid(
        &self,
        out: &mut impl fmt::Write,
        row_order: &[PhaseId],
        col_order: &[PhaseId],
    ) -> fmt::Result {
        for key in col_order {
            writeln!(out, "{}", key.label(&self.kinds))?;
        }
        out.write_char('\n')?;
        for row_key in row_order {
            let row = self.row(row_key);
            for (i, col_key) in col_order.iter().enumerate() {
                if i > 0 {
                    out.write_char(' ')?;
                }
                let value = row
                    .as_ref()
                    .map(|r| r.value(col_key))
                    .unwrap_or(CellValue::ZERO);
                write!(out, "{value}")?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProvenanceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvenanceMatrix")
            .field("rows", &self.rows.len())
            .field("keys", &self.order.len())
            .field("sealed", &self.is_sealed())
            .field("skipped_writes", &self.skipped_writes())
            .finish()
    }
}

/// Exclusive hold on a matrix; no write is in flight while it lives.
pub struct FrozenMatrix<'a> {
    matrix: &'a ProvenanceMatrix,
    _guard: RwLockWriteGuard<'a, ()>,
}

impl FrozenMatrix<'_> {
    pub fn render(&self) -> String {
        let keys = self.matrix.order.snapshot();
        self.matrix.render_frozen(&keys, &keys)
    }

    /// The header lists `col_order`; one grid line follows per entry of
    /// `row_order`. Missing rows or cells render as `0:0:0`.
    pub fn render_with(&self, row_order: &[PhaseId], col_order: &[PhaseId]) -> String {
        self.matrix.render_frozen(row_order, col_order)
    }

    /// Mark the matrix sealed. Returns false if it already was.
    pub fn seal(&self) -> bool {
        !self.matrix.sealed.swap(true, Ordering::AcqRel)
    }
}

/// Shared write access to a matrix. Holding one blocks snapshots.
pub struct MatrixWriter<'a> {
    matrix: &'a ProvenanceMatrix,
    _guard: RwLockReadGuard<'a, ()>,
}

impl MatrixWriter<'_> {
    /// Row for `key`, created if absent.
    ///
    /// `key` is in the key order when this returns, even if another thread
    /// created the row and has not registered it yet.
    pub fn row(&self, key: PhaseId) -> Arc<Row> {
        let row = match self.matrix.rows.get(&key) {
            Some(row) => Arc::clone(&row),
            None => Arc::clone(
                self.matrix
                    .rows
                    .entry(key)
                    .or_insert_with(|| Arc::new(Row::with_capacity(self.matrix.row_capacity)))
                    .value(),
            ),
        };
        self.matrix.order.insert(key);
        row
    }

    /// Cell for `col` in `row`; `col` is in the key order when this returns.
    pub fn cell(&self, row: &Row, col: PhaseId) -> Arc<Cell> {
        let (cell, _) = row.get_or_create(col);
        self.matrix.order.insert(col);
        cell
    }

    /// Count one node of `row`'s graph as produced by `producer`.
    pub fn record(&self, row: &Row, producer: PhaseId) {
        self.cell(row, producer).add_matched(1);
    }

    /// Close one invocation of `row`: every cell present in the row gains
    /// `graph_size` observed nodes and one invocation.
    pub fn close_invocation(&self, row: &Row, graph_size: u64) {
        row.for_each_value(|_, cell| cell.close_invocation(graph_size));
    }
}
