//! v001: the snapshots table.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    unit_id INTEGER NOT NULL,
    unit_label TEXT NOT NULL,
    name TEXT NOT NULL,
    started_at_ms INTEGER NOT NULL,
    duration_ms INTEGER NOT NULL,
    text TEXT NOT NULL,
    written_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
);

CREATE INDEX IF NOT EXISTS idx_snapshots_label ON snapshots(unit_label);
CREATE INDEX IF NOT EXISTS idx_snapshots_name ON snapshots(name, started_at_ms);
";
