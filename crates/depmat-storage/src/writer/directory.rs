//! One file per snapshot under an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use depmat_core::errors::SinkError;
use depmat_core::Snapshot;

use super::SnapshotWriter;

/// Writes `<seq>-<label>.<name>` files. The sequence number continues
/// after the highest one already present, so snapshots with the same label
/// never overwrite each other.
#[derive(Debug)]
pub struct DirectoryWriter {
    dir: PathBuf,
    next_seq: u64,
}

impl DirectoryWriter {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        let next_seq = highest_seq(&dir)? + 1;
        Ok(Self { dir, next_seq })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name the next snapshot would get.
    pub fn file_name(seq: u64, snapshot: &Snapshot) -> String {
        format!(
            "{seq:06}-{}.{}",
            sanitize(&snapshot.unit_label),
            snapshot.name
        )
    }
}

impl SnapshotWriter for DirectoryWriter {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        let name = Self::file_name(self.next_seq, snapshot);
        let path = self.dir.join(&name);
        let tmp = self.dir.join(format!(".{name}.tmp"));
        fs::write(&tmp, snapshot.text.as_bytes()).map_err(|source| io_err(&tmp, source))?;
        fs::rename(&tmp, &path).map_err(|source| io_err(&path, source))?;
        self.next_seq += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

fn io_err(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Labels come from the host; keep them to one safe path component.
fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "unit".to_string()
    } else {
        cleaned.to_string()
    }
}

fn highest_seq(dir: &Path) -> Result<u64, SinkError> {
    let entries = fs::read_dir(dir).map_err(|source| io_err(dir, source))?;
    Ok(entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            name.split_once('-')?.0.parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_become_single_path_components() {
        assert_eq!(sanitize("job 7/../etc"), "job_7_.._etc");
        assert_eq!(sanitize("..."), "unit");
        assert_eq!(sanitize("req-12_a.b"), "req-12_a.b");
    }
}
