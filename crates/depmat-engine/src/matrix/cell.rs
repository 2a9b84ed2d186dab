//! One (consumer, producer) cell with three atomic counters.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use depmat_core::constants::CELL_SEPARATOR;
use serde::{Deserialize, Serialize};

/// Live cell. Counters only grow.
#[derive(Debug, Default)]
pub struct Cell {
    matched_nodes: AtomicU64,
    total_nodes_in_phase: AtomicU64,
    invocation_count: AtomicU64,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_matched(&self, n: u64) {
        self.matched_nodes.fetch_add(n, Ordering::Relaxed);
    }

    /// Close one invocation of the consumer phase over a graph of
    /// `graph_size` nodes.
    pub fn close_invocation(&self, graph_size: u64) {
        self.total_nodes_in_phase
            .fetch_add(graph_size, Ordering::Relaxed);
        self.invocation_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn value(&self) -> CellValue {
        CellValue {
            matched_nodes: self.matched_nodes.load(Ordering::Relaxed),
            total_nodes_in_phase: self.total_nodes_in_phase.load(Ordering::Relaxed),
            invocation_count: self.invocation_count.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of a cell, rendered as `matched:total:invocations`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellValue {
    pub matched_nodes: u64,
    pub total_nodes_in_phase: u64,
    pub invocation_count: u64,
}

impl CellValue {
    pub const ZERO: CellValue = CellValue {
        matched_nodes: 0,
        total_nodes_in_phase: 0,
        invocation_count: 0,
    };

    pub fn new(matched_nodes: u64, total_nodes_in_phase: u64, invocation_count: u64) -> Self {
        Self {
            matched_nodes,
            total_nodes_in_phase,
            invocation_count,
        }
    }

    /// Fraction of the consumer's observed nodes produced by this producer.
    /// Zero when the consumer never saw a node.
    pub fn ratio(&self) -> f64 {
        if self.total_nodes_in_phase == 0 {
            0.0
        } else {
            self.matched_nodes as f64 / self.total_nodes_in_phase as f64
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Component-wise sum, used when aggregating snapshots.
    pub fn saturating_add(self, other: CellValue) -> CellValue {
        CellValue {
            matched_nodes: self.matched_nodes.saturating_add(other.matched_nodes),
            total_nodes_in_phase: self
                .total_nodes_in_phase
                .saturating_add(other.total_nodes_in_phase),
            invocation_count: self.invocation_count.saturating_add(other.invocation_count),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.matched_nodes,
            self.total_nodes_in_phase,
            self.invocation_count,
            sep = CELL_SEPARATOR
        )
    }
}

/// Error parsing a `matched:total:invocations` triple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected three ':'-separated counters")]
pub struct ParseCellError;

impl FromStr for CellValue {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(CELL_SEPARATOR);
        let mut next = || -> Result<u64, ParseCellError> {
            parts
                .next()
                .ok_or(ParseCellError)?
                .parse()
                .map_err(|_| ParseCellError)
        };
        let value = CellValue::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(ParseCellError);
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_as_colon_triple() {
        let cell = Cell::new();
        cell.add_matched(3);
        cell.close_invocation(4);
        assert_eq!(cell.value().to_string(), "3:4:1");
        assert_eq!(CellValue::ZERO.to_string(), "0:0:0");
    }

    #[test]
    fn parses_triples_strictly() {
        assert_eq!("1:4:1".parse::<CellValue>(), Ok(CellValue::new(1, 4, 1)));
        assert!("1:4".parse::<CellValue>().is_err());
        assert!("1:4:1:0".parse::<CellValue>().is_err());
        assert!("a:4:1".parse::<CellValue>().is_err());
    }

    #[test]
    fn ratio_handles_empty_consumer() {
        assert_eq!(CellValue::ZERO.ratio(), 0.0);
        assert!((CellValue::new(3, 4, 1).ratio() - 0.75).abs() < f64::EPSILON);
    }
}
