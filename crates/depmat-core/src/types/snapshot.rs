//! A finished, rendered unit-of-work snapshot on its way to a sink.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::identifiers::UnitId;

/// Rendered matrix text plus the unit metadata a sink needs for naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Engine-assigned unit identifier.
    pub unit_id: UnitId,
    /// Host-supplied label (e.g. a compilation request id).
    pub unit_label: String,
    /// Name the snapshot is persisted under (e.g. `depmat`).
    pub name: String,
    /// Rendered matrix text.
    pub text: String,
    /// Unit start, Unix milliseconds.
    pub started_at_ms: u64,
    /// Wall time between unit start and finalization.
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl Snapshot {
    /// Size of the rendered text in bytes.
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
