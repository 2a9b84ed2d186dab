//! Which phases produced the nodes a phase consumes.

use depmat_core::errors::ReportError;
use serde::{Deserialize, Serialize};

use super::parse::ParsedSnapshot;
use crate::matrix::CellValue;

/// One producer of a consumer's nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub phase: String,
    pub value: CellValue,
    /// Share of the consumer's observed nodes, in `[0, 1]`.
    pub ratio: f64,
}

impl ParsedSnapshot {
    /// The `n` producers that created most of the nodes `consumer` saw,
    /// most first. Producers with no matched node are left out; ties keep
    /// key order.
    pub fn top_producers(&self, consumer: &str, n: usize) -> Result<Vec<Producer>, ReportError> {
        let mut producers: Vec<Producer> = self
            .row(consumer)?
            .into_iter()
            .filter(|(_, value)| value.matched_nodes > 0)
            .map(|(phase, value)| Producer {
                phase: phase.to_string(),
                value,
                ratio: value.ratio(),
            })
            .collect();
        producers.sort_by(|a, b| b.value.matched_nodes.cmp(&a.value.matched_nodes));
        producers.truncate(n);
        Ok(producers)
    }

    /// Consumers that saw at least one node produced by `producer`, with
    /// the counts, in key order.
    pub fn consumers_of(&self, producer: &str) -> Result<Vec<(&str, CellValue)>, ReportError> {
        let col = self.index_of(producer)?;
        Ok(self
            .keys()
            .iter()
            .enumerate()
            .map(|(row, key)| (key.as_str(), self.cell_at(row, col)))
            .filter(|(_, value)| value.matched_nodes > 0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producers_are_ranked_by_matched_nodes() {
        let snapshot = ParsedSnapshot::parse(
            "NoPhase#0\nA#0\nB#0\nC#0\n\n\
             0:0:0 0:0:0 0:0:0 0:0:0\n\
             0:0:0 0:0:0 0:0:0 0:0:0\n\
             0:0:0 0:0:0 0:0:0 0:0:0\n\
             1:9:1 5:9:1 3:9:1 0:9:1\n",
        )
        .unwrap();

        let top = snapshot.top_producers("C#0", 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].phase, "A#0");
        assert_eq!(top[1].phase, "B#0");
        assert!((top[0].ratio - 5.0 / 9.0).abs() < 1e-9);

        let all = snapshot.top_producers("C#0", 10).unwrap();
        assert_eq!(all.len(), 3);

        assert_eq!(snapshot.consumers_of("A#0").unwrap().len(), 1);
        assert!(snapshot.top_producers("Z#0", 1).is_err());
    }
}
