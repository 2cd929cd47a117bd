use crate::{IndexerError, Result};
use pervasive_protocol::{MonthKey, Record};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Supplier of one month's candidate-eligible crawl records.
///
/// A month with no data returns an empty list rather than an error.
pub trait MonthSource {
    fn load_month(&self, month: &MonthKey) -> Result<Vec<Record>>;
}

impl MonthSource for BTreeMap<MonthKey, Vec<Record>> {
    fn load_month(&self, month: &MonthKey) -> Result<Vec<Record>> {
        Ok(self.get(month).cloned().unwrap_or_default())
    }
}

/// Directory of `YYYY-MM.json` snapshots, each a JSON array of records.
#[derive(Debug, Clone)]
pub struct JsonSnapshotDir {
    root: PathBuf,
}

impl JsonSnapshotDir {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, month: &MonthKey) -> PathBuf {
        self.root.join(month.snapshot_file_name())
    }

    /// Newest month with a snapshot file in the directory.
    pub fn latest_month(&self) -> Result<Option<MonthKey>> {
        let mut latest: Option<MonthKey> = None;
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if !is_json || !path.is_file() {
                continue;
            }
            let Some(month) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<MonthKey>().ok())
            else {
                continue;
            };
            latest = Some(latest.map_or(month, |current| current.max(month)));
        }
        Ok(latest)
    }

    /// Write `records` as the snapshot for `month`.
    pub fn write_month(&self, month: &MonthKey, records: &[Record]) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.snapshot_path(month);
        let bytes = serde_json::to_vec(records)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl MonthSource for JsonSnapshotDir {
    fn load_month(&self, month: &MonthKey) -> Result<Vec<Record>> {
        let path = self.snapshot_path(month);
        if !path.exists() {
            log::warn!("Snapshot {} not found", path.display());
            return Ok(Vec::new());
        }

        let bytes = std::fs::read(&path)?;
        let entries: Vec<serde_json::Value> =
            serde_json::from_slice(&bytes).map_err(|err| IndexerError::InvalidSnapshot {
                path: path.clone(),
                reason: err.to_string(),
            })?;

        let total = entries.len();
        let records: Vec<Record> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Record>(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    log::debug!("Skipping undecodable entry in {}: {err}", path.display());
                    None
                }
            })
            .collect();

        if records.len() < total {
            log::warn!(
                "Skipped {} undecodable entries in {}",
                total - records.len(),
                path.display()
            );
        }
        Ok(records)
    }
}
