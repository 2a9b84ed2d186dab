//! One consumer row of the matrix, keyed by producer phase.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use super::cell::{Cell, CellValue};
use crate::phase::PhaseId;

#[derive(Debug)]
pub struct Row {
    cells: DashMap<PhaseId, Arc<Cell>, FxBuildHasher>,
}

impl Row {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Cell for producer `col`, and whether this call created it.
    /// Concurrent callers for the same column get the same cell.
    pub fn get_or_create(&self, col: PhaseId) -> (Arc<Cell>, bool) {
        if let Some(cell) = self.cells.get(&col) {
            return (Arc::clone(&cell), false);
        }
        let mut created = false;
        let entry = self.cells.entry(col).or_insert_with(|| {
            created = true;
            Arc::new(Cell::new())
        });
        (Arc::clone(entry.value()), created)
    }

    /// Value of the cell for `col`, zero if it was never touched.
    pub fn value(&self, col: &PhaseId) -> CellValue {
        self.cells
            .get(col)
            .map(|c| c.value().value())
            .unwrap_or(CellValue::ZERO)
    }

    /// Visit every cell present in the row.
    pub fn for_each_value(&self, mut f: impl FnMut(&PhaseId, &Cell)) {
        for entry in self.cells.iter() {
            f(entry.key(), entry.value());
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depmat_core::PhaseKindInterner;

    #[test]
    fn value_reads_cell_counters_or_zero() {
        let kinds = PhaseKindInterner::new();
        let a0 = PhaseId::new(kinds.intern("A"), 0);
        let row = Row::with_capacity(4);

        let (cell, created) = row.get_or_create(a0);
        assert!(created);
        cell.add_matched(2);
        cell.close_invocation(5);

        assert_eq!(row.value(&a0), CellValue::new(2, 5, 1));
        assert_eq!(row.value(&PhaseId::NO_PHASE), CellValue::ZERO);
        assert!(!row.get_or_create(a0).1);
    }
}
