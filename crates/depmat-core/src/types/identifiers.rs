//! Identifier newtypes.
//!
//! `NodeId` and `UnitId` wrap plain integers handed out by the host or the
//! engine; `KindId` wraps a `lasso::Spur` produced by the phase-kind
//! interner. Keeping them distinct prevents passing a node where a unit is
//! expected.

use std::fmt;

use lasso::Spur;
use serde::{Deserialize, Serialize};

macro_rules! define_numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_numeric_id!(
    /// Stable identity of a host node (pointer or handle).
    NodeId
);

define_numeric_id!(
    /// Identity of one unit of work, assigned by the engine.
    UnitId
);

/// Interned phase-kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(pub Spur);

impl KindId {
    pub fn new(spur: Spur) -> Self {
        Self(spur)
    }

    pub fn inner(self) -> Spur {
        self.0
    }
}

impl From<Spur> for KindId {
    fn from(spur: Spur) -> Self {
        Self(spur)
    }
}
