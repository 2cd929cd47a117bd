use crate::snapshot::MonthSource;
use crate::stats::IngestStats;
use crate::{IndexerError, Result};
use pervasive_protocol::{split_url, MonthKey, Record};
use std::collections::{BTreeMap, BTreeSet};

/// Occurrences of one content hash within one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HashStat {
    pub occurrence_count: u64,
    pub size: u64,
}

/// Per-path history: month -> content hash -> stat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathHistory {
    months: BTreeMap<MonthKey, BTreeMap<String, HashStat>>,
}

impl PathHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `hash` in `month`. The first size seen for
    /// a hash is kept.
    pub fn record(&mut self, month: MonthKey, hash: &str, size: u64, count: u64) {
        let stat = self
            .months
            .entry(month)
            .or_default()
            .entry(hash.to_string())
            .or_insert(HashStat {
                occurrence_count: 0,
                size,
            });
        stat.occurrence_count = stat.occurrence_count.saturating_add(count);
    }

    /// Number of months with at least one hash.
    pub fn month_count(&self) -> usize {
        self.months.len()
    }

    pub fn has_month(&self, month: &MonthKey) -> bool {
        self.months.contains_key(month)
    }

    /// Occurrences in `month`, summed over every hash.
    pub fn count_in(&self, month: &MonthKey) -> u64 {
        self.months
            .get(month)
            .map(|hashes| hashes.values().map(|stat| stat.occurrence_count).sum())
            .unwrap_or(0)
    }

    pub fn monthly_counts(&self, months: &[MonthKey]) -> Vec<u64> {
        months.iter().map(|month| self.count_in(month)).collect()
    }

    pub fn distinct_hashes(&self) -> BTreeSet<&str> {
        self.months
            .values()
            .flat_map(|hashes| hashes.keys().map(String::as_str))
            .collect()
    }

    /// Size of the first hash recorded in `month`.
    pub fn size_in(&self, month: &MonthKey) -> Option<u64> {
        self.months
            .get(month)
            .and_then(|hashes| hashes.values().next())
            .map(|stat| stat.size)
    }

    /// Size from the most recent month that has data.
    pub fn latest_size(&self) -> Option<u64> {
        self.months
            .values()
            .next_back()
            .and_then(|hashes| hashes.values().next())
            .map(|stat| stat.size)
    }
}

/// First-seen fetch destination per URL.
#[derive(Debug, Clone, Default)]
pub(crate) struct DestinationIndex {
    by_url: BTreeMap<String, String>,
}

impl DestinationIndex {
    pub fn get(&self, url: &str) -> Option<&str> {
        self.by_url.get(url).map(String::as_str)
    }

    /// Keep the first destination reported for `url`.
    pub fn record_first(&mut self, url: String, destination: &str) {
        self.by_url
            .entry(url)
            .or_insert_with(|| destination.to_string());
    }
}

/// origin -> path -> [`PathHistory`] over a fixed window of tracked months.
///
/// Only the current (newest) month may introduce an origin; older months
/// add history to origins that are already known. [`OriginIndex::build`]
/// therefore ingests newest first.
#[derive(Debug, Clone)]
pub struct OriginIndex {
    /// Tracked months, newest first
    months: Vec<MonthKey>,
    origins: BTreeMap<String, BTreeMap<String, PathHistory>>,
    destinations: DestinationIndex,
    stats: IngestStats,
}

impl OriginIndex {
    pub fn new(months: impl IntoIterator<Item = MonthKey>) -> Result<Self> {
        let mut months: Vec<MonthKey> = months.into_iter().collect();
        months.sort_unstable_by(|a, b| b.cmp(a));
        months.dedup();
        if months.is_empty() {
            return Err(IndexerError::NoMonths);
        }
        Ok(Self {
            months,
            origins: BTreeMap::new(),
            destinations: DestinationIndex::default(),
            stats: IngestStats::new(),
        })
    }

    /// Load every tracked month from `source` and ingest it, newest first.
    pub fn build<S>(source: &S, months: impl IntoIterator<Item = MonthKey>) -> Result<Self>
    where
        S: MonthSource + ?Sized,
    {
        let mut index = Self::new(months)?;
        for month in index.months.clone() {
            let records = source.load_month(&month)?;
            if records.is_empty() {
                log::warn!("No records for {month}; it counts as zero occurrences everywhere");
                index.stats.add_empty_month(month.to_string());
                continue;
            }
            log::info!("Ingesting {} records for {month}", records.len());
            index.ingest(&records, month);
        }
        log::info!(
            "Indexed {} origins, {} paths ({} malformed records, {} from untracked origins)",
            index.origins.len(),
            index.path_count(),
            index.stats.malformed,
            index.stats.unknown_origin
        );
        Ok(index)
    }

    pub fn ingest(&mut self, records: &[Record], month: MonthKey) {
        if !self.months.contains(&month) {
            log::warn!("Ignoring {} records for untracked month {month}", records.len());
            return;
        }
        let is_current = month == self.current_month();
        let month_label = month.to_string();

        for record in records {
            let Some(hash) = record.content_hash.as_deref().filter(|h| !h.is_empty()) else {
                log::debug!("Skipping record without content hash: {}", record.url);
                self.stats.add_malformed();
                continue;
            };
            if record.occurrence_count == 0 {
                log::debug!("Skipping record with zero occurrences: {}", record.url);
                self.stats.add_malformed();
                continue;
            }
            let Some(parts) = split_url(&record.url) else {
                log::debug!("Skipping unusable url: {:?}", record.url);
                self.stats.add_malformed();
                continue;
            };

            if !self.origins.contains_key(&parts.origin) {
                if !is_current {
                    self.stats.add_unknown_origin();
                    continue;
                }
                self.origins.insert(parts.origin.clone(), BTreeMap::new());
            }
            let Some(paths) = self.origins.get_mut(&parts.origin) else {
                continue;
            };

            let history = paths.entry(parts.path.clone()).or_default();
            if let Some(destination) = record.destination_type.as_deref() {
                self.destinations
                    .record_first(format!("{}{}", parts.origin, parts.path), destination);
            }
            history.record(month, hash, record.size, record.occurrence_count);
            self.stats.add_record(&month_label);
        }
    }

    /// Tracked months, newest first.
    pub fn months(&self) -> &[MonthKey] {
        &self.months
    }

    pub fn current_month(&self) -> MonthKey {
        self.months[0]
    }

    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.origins.keys().map(String::as_str)
    }

    /// Snapshot of the origin keys, safe to hold across removals.
    pub fn origin_keys(&self) -> Vec<String> {
        self.origins.keys().cloned().collect()
    }

    pub fn paths(&self, origin: &str) -> Option<&BTreeMap<String, PathHistory>> {
        self.origins.get(origin)
    }

    /// Snapshot of an origin's path keys in lexicographic order.
    pub fn path_keys(&self, origin: &str) -> Vec<String> {
        self.origins
            .get(origin)
            .map(|paths| paths.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn history(&self, origin: &str, path: &str) -> Option<&PathHistory> {
        self.origins.get(origin)?.get(path)
    }

    pub fn contains(&self, origin: &str, path: &str) -> bool {
        self.history(origin, path).is_some()
    }

    pub fn remove_path(&mut self, origin: &str, path: &str) -> Option<PathHistory> {
        self.origins.get_mut(origin)?.remove(path)
    }

    pub fn destination(&self, origin: &str, path: &str) -> Option<&str> {
        self.destinations.get(&format!("{origin}{path}"))
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn path_count(&self) -> usize {
        self.origins.values().map(BTreeMap::len).sum()
    }
}
