use crate::Result;
use pervasive_indexer::{IngestStats, OriginIndex};
use pervasive_protocol::MonthKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Why a path was dropped without becoming a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    TooLong,
    StaticNonPervasive,
    Unversioned,
    Blocked,
}

/// Diagnostic record of one classification decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationEvent {
    PervasiveFixed {
        url: String,
        monthly_counts: Vec<u64>,
    },
    Excluded {
        url: String,
        reason: ExclusionReason,
    },
    PatternAccepted(PatternOutcome),
    PatternRejected(PatternOutcome),
    DuplicatePattern {
        pattern: String,
        covered_by: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOutcome {
    pub pattern: String,
    pub seed: String,
    pub candidates: Vec<String>,
    pub matched: Vec<String>,
    pub monthly_counts: Vec<u64>,
}

/// Counters for a single engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub pervasive_fixed: usize,
    pub too_long: usize,
    pub static_non_pervasive: usize,
    pub unversioned: usize,
    pub blocked: usize,
    pub patterns_accepted: usize,
    pub patterns_rejected: usize,
    /// Paths consumed by accepted or rejected patterns
    pub paths_clustered: usize,
    pub duplicates_removed: usize,
    pub passes: usize,
}

/// Collects classification events, logging each as it arrives.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<ClassificationEvent>,
    stats: RunStats,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: ClassificationEvent) {
        match &event {
            ClassificationEvent::PervasiveFixed {
                url,
                monthly_counts,
            } => {
                log::info!("Pervasive static URL {monthly_counts:?}: {url}");
                self.stats.pervasive_fixed += 1;
            }
            ClassificationEvent::Excluded { url, reason } => {
                log::debug!("Removed {reason:?} URL: {url}");
                match reason {
                    ExclusionReason::TooLong => self.stats.too_long += 1,
                    ExclusionReason::StaticNonPervasive => self.stats.static_non_pervasive += 1,
                    ExclusionReason::Unversioned => self.stats.unversioned += 1,
                    ExclusionReason::Blocked => self.stats.blocked += 1,
                }
            }
            ClassificationEvent::PatternAccepted(outcome) => {
                log::info!("Pattern {:?}: {}", outcome.monthly_counts, outcome.pattern);
                log::info!("             URL: {}", outcome.seed);
                for candidate in &outcome.candidates {
                    log::info!("       Candidate: {candidate}");
                }
                for matched in &outcome.matched {
                    log::info!("         Matched: {matched}");
                }
                self.stats.patterns_accepted += 1;
                self.stats.paths_clustered += outcome.matched.len();
            }
            ClassificationEvent::PatternRejected(outcome) => {
                log::debug!(
                    "Rejected pattern {:?}: {} ({} paths consumed)",
                    outcome.monthly_counts,
                    outcome.pattern,
                    outcome.matched.len()
                );
                self.stats.patterns_rejected += 1;
                self.stats.paths_clustered += outcome.matched.len();
            }
            ClassificationEvent::DuplicatePattern {
                pattern,
                covered_by,
            } => {
                log::info!("Removed pattern {pattern} as duplicate of {covered_by}");
                self.stats.duplicates_removed += 1;
            }
        }
        self.events.push(event);
    }

    pub fn finish_pass(&mut self) {
        self.stats.passes += 1;
    }

    pub fn events(&self) -> &[ClassificationEvent] {
        &self.events
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn into_parts(self) -> (Vec<ClassificationEvent>, RunStats) {
        (self.events, self.stats)
    }
}

/// A path that still had current-month data when the run finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedUrl {
    pub url: String,
    pub monthly_counts: Vec<u64>,
}

/// Result of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    /// Tracked months, newest first
    pub months: Vec<MonthKey>,
    /// Accepted patterns, sorted and unique
    pub patterns: Vec<String>,
    pub unmatched: Vec<UnmatchedUrl>,
    pub events: Vec<ClassificationEvent>,
    pub stats: RunStats,
    pub ingest: IngestStats,
}

impl PatternReport {
    /// Newline-terminated pattern list.
    pub fn patterns_text(&self) -> String {
        let mut out = String::new();
        for pattern in &self.patterns {
            out.push_str(pattern);
            out.push('\n');
        }
        out
    }

    pub fn write_patterns(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.patterns_text())?;
        Ok(())
    }
}

/// Every remaining path with data in the current month, by origin then path.
pub fn collect_unmatched(index: &OriginIndex) -> Vec<UnmatchedUrl> {
    let current = index.current_month();
    let mut unmatched = Vec::new();
    for origin in index.origins() {
        let Some(paths) = index.paths(origin) else {
            continue;
        };
        for (path, history) in paths {
            if !history.has_month(&current) {
                continue;
            }
            let entry = UnmatchedUrl {
                url: format!("{origin}{path}"),
                monthly_counts: history.monthly_counts(index.months()),
            };
            log::info!("Unmatched URL {:?}: {}", entry.monthly_counts, entry.url);
            unmatched.push(entry);
        }
    }
    unmatched
}
