//! Parser for the rendered matrix text.
//!
//! Format: one `<kind>#<occurrence>` key per line, a blank line, then one
//! grid line per key with space-separated `matched:total:invocations`
//! cells in key order.

use std::fmt::{self, Write as _};

use depmat_core::constants::OCCURRENCE_SEPARATOR;
use depmat_core::errors::ReportError;
use serde::{Deserialize, Serialize};

use crate::matrix::CellValue;

/// A square matrix read back from text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSnapshot {
    keys: Vec<String>,
    /// Row-major, `keys.len()` × `keys.len()`.
    cells: Vec<CellValue>,
}

impl ParsedSnapshot {
    pub fn parse(text: &str) -> Result<Self, ReportError> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

        let mut keys = Vec::new();
        let mut separated = false;
        for (line, raw) in lines.by_ref() {
            let key = raw.trim();
            if key.is_empty() {
                separated = true;
                break;
            }
            if !is_valid_key(key) {
                return Err(ReportError::MalformedKey {
                    line,
                    text: raw.to_string(),
                });
            }
            keys.push(key.to_string());
        }
        if !separated {
            return Err(ReportError::MissingSeparator);
        }

        let size = keys.len();
        let mut cells = Vec::with_capacity(size * size);
        let mut rows = 0;
        for (line, raw) in lines {
            if raw.trim().is_empty() {
                continue;
            }
            let before = cells.len();
            for token in raw.split_whitespace() {
                let cell = token.parse::<CellValue>().map_err(|_| ReportError::MalformedCell {
                    line,
                    text: token.to_string(),
                })?;
                cells.push(cell);
            }
            let found = cells.len() - before;
            if found != size {
                return Err(ReportError::DimensionMismatch {
                    expected: size,
                    found,
                });
            }
            rows += 1;
        }
        if rows != size {
            return Err(ReportError::DimensionMismatch {
                expected: size,
                found: rows,
            });
        }
        Ok(Self { keys, cells })
    }

    /// Build from keys and a row-major grid.
    pub fn from_parts(keys: Vec<String>, cells: Vec<CellValue>) -> Result<Self, ReportError> {
        let size = keys.len();
        if cells.len() != size * size {
            return Err(ReportError::DimensionMismatch {
                expected: size * size,
                found: cells.len(),
            });
        }
        Ok(Self { keys, cells })
    }

    pub(crate) fn from_square(keys: Vec<String>, cells: Vec<CellValue>) -> Self {
        debug_assert_eq!(cells.len(), keys.len() * keys.len());
        Self { keys, cells }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index_of(&self, key: &str) -> Result<usize, ReportError> {
        self.keys
            .iter()
            .position(|k| k == key)
            .ok_or_else(|| ReportError::UnknownKey {
                key: key.to_string(),
            })
    }

    /// Cell by position. Panics if either index is out of range.
    pub fn cell_at(&self, row: usize, col: usize) -> CellValue {
        self.cells[row * self.keys.len() + col]
    }

    /// Cell at (consumer, producer) by key label.
    pub fn cell(&self, consumer: &str, producer: &str) -> Result<CellValue, ReportError> {
        Ok(self.cell_at(self.index_of(consumer)?, self.index_of(producer)?))
    }

    /// Producer keys and cells of one consumer row, in key order.
    pub fn row(&self, consumer: &str) -> Result<Vec<(&str, CellValue)>, ReportError> {
        let row = self.index_of(consumer)?;
        Ok(self
            .keys
            .iter()
            .enumerate()
            .map(|(col, key)| (key.as_str(), self.cell_at(row, col)))
            .collect())
    }

    /// Render back into the text format.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// JSON with the key list and every non-zero cell.
    pub fn to_json(&self) -> serde_json::Value {
        let mut cells = Vec::new();
        for (row, consumer) in self.keys.iter().enumerate() {
            for (col, producer) in self.keys.iter().enumerate() {
                let value = self.cell_at(row, col);
                if value.is_zero() {
                    continue;
                }
                cells.push(serde_json::json!({
                    "consumer": consumer,
                    "producer": producer,
                    "matched_nodes": value.matched_nodes,
                    "total_nodes_in_phase": value.total_nodes_in_phase,
                    "invocation_count": value.invocation_count,
                    "ratio": value.ratio(),
                }));
            }
        }
        serde_json::json!({ "keys": self.keys, "cells": cells })
    }

    pub(crate) fn cells(&self) -> &[CellValue] {
        &self.cells
    }
}

impl fmt::Display for ParsedSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            writeln!(f, "{key}")?;
        }
        f.write_char('\n')?;
        let size = self.keys.len();
        for row in 0..size {
            for col in 0..size {
                if col > 0 {
                    f.write_char(' ')?;
                }
                write!(f, "{}", self.cell_at(row, col))?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

fn is_valid_key(key: &str) -> bool {
    match key.rsplit_once(OCCURRENCE_SEPARATOR) {
        Some((kind, occurrence)) => {
            !kind.is_empty()
                && !key.contains(char::is_whitespace)
                && occurrence.parse::<u32>().is_ok()
        }
        None => false,
    }
}
