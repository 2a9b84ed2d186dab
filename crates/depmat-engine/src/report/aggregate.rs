//! Cell-wise sums of several snapshots.

use std::collections::HashMap;

use super::parse::ParsedSnapshot;
use crate::matrix::CellValue;

/// Sum `snapshots` cell-wise by key label. The result's keys are the union
/// of all keys in first-seen order.
pub fn aggregate<'a, I>(snapshots: I) -> ParsedSnapshot
where
    I: IntoIterator<Item = &'a ParsedSnapshot>,
{
    aggregate_mapped(snapshots, |key| key.to_string())
}

/// Like [`aggregate`], but keys are first passed through `map`. Keys that
/// map to the same label are merged.
pub fn aggregate_mapped<'a, I, F>(snapshots: I, map: F) -> ParsedSnapshot
where
    I: IntoIterator<Item = &'a ParsedSnapshot>,
    F: Fn(&str) -> String,
{
    let snapshots: Vec<&ParsedSnapshot> = snapshots.into_iter().collect();

    let mut keys: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut mappings: Vec<Vec<usize>> = Vec::with_capacity(snapshots.len());
    for snapshot in &snapshots {
        let mapping = snapshot
            .keys()
            .iter()
            .map(|key| {
                let label = map(key);
                *index.entry(label.clone()).or_insert_with(|| {
                    keys.push(label);
                    keys.len() - 1
                })
            })
            .collect();
        mappings.push(mapping);
    }

    let size = keys.len();
    let mut cells = vec![CellValue::ZERO; size * size];
    for (snapshot, mapping) in snapshots.iter().zip(&mappings) {
        let n = snapshot.len();
        for (i, value) in snapshot.cells().iter().enumerate() {
            let (row, col) = (mapping[i / n], mapping[i % n]);
            let slot = &mut cells[row * size + col];
            *slot = slot.saturating_add(*value);
        }
    }

    ParsedSnapshot::from_square(keys, cells)
}

/// Collapse every occurrence of a kind onto `<kind>#0`.
pub fn by_kind(key: &str) -> String {
    match key.rsplit_once(depmat_core::constants::OCCURRENCE_SEPARATOR) {
        Some((kind, _)) => format!("{kind}{}0", depmat_core::constants::OCCURRENCE_SEPARATOR),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_by_label_over_key_union() {
        let first = ParsedSnapshot::parse("A#0\nB#0\n\n1:1:1 0:0:0\n2:3:1 1:3:1\n").unwrap();
        let second = ParsedSnapshot::parse("B#0\nC#0\n\n4:4:1 0:0:0\n1:5:1 4:5:1\n").unwrap();

        let total = aggregate([&first, &second]);
        assert_eq!(total.keys(), ["A#0", "B#0", "C#0"]);
        assert_eq!(total.cell("B#0", "B#0").unwrap(), CellValue::new(5, 7, 2));
        assert_eq!(total.cell("B#0", "A#0").unwrap(), CellValue::new(2, 3, 1));
        assert_eq!(total.cell("C#0", "B#0").unwrap(), CellValue::new(1, 5, 1));
        assert_eq!(total.cell("A#0", "C#0").unwrap(), CellValue::ZERO);
    }

    #[test]
    fn occurrences_collapse_by_kind() {
        let snapshot =
            ParsedSnapshot::parse("A#0\nA#1\n\n0:0:0 0:0:0\n2:2:1 0:0:0\n").unwrap();
        let collapsed = aggregate_mapped([&snapshot], by_kind);
        assert_eq!(collapsed.keys(), ["A#0"]);
        assert_eq!(collapsed.cell("A#0", "A#0").unwrap(), CellValue::new(2, 2, 1));
    }

    #[test]
    fn empty_input_gives_empty_matrix() {
        let none: [&ParsedSnapshot; 0] = [];
        assert!(aggregate(none).is_empty());
    }
}
