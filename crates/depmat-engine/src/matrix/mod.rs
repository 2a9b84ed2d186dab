//! The provenance matrix: producer/consumer phase counts for one unit.

pub mod cell;
pub mod key_order;
pub mod provenance_matrix;
pub mod row;

pub use cell::{Cell, CellValue};
pub use key_order::KeyOrder;
pub use provenance_matrix::{FrozenMatrix, MatrixWriter, ProvenanceMatrix};
pub use row::Row;
