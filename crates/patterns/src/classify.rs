use crate::config::PatternConfig;
use crate::report::{ClassificationEvent, EventLog, ExclusionReason};
use pervasive_indexer::{OriginIndex, PathHistory};
use pervasive_protocol::filename;

/// Strips pervasive-fixed and excluded paths from the working index before
/// clustering.
///
/// Stages run in a fixed order and each one removes what it classifies:
/// pervasive-fixed, too long, static but not pervasive, unversioned,
/// blocked.
pub struct StableSetClassifier<'a> {
    config: &'a PatternConfig,
}

impl<'a> StableSetClassifier<'a> {
    pub fn new(config: &'a PatternConfig) -> Self {
        Self { config }
    }

    /// Run every stage. Returns the exact URLs accepted as pervasive-fixed.
    pub fn run(&self, index: &mut OriginIndex, events: &mut EventLog) -> Vec<String> {
        let fixed = self.extract_pervasive_fixed(index, events);
        self.remove_long(index, events);
        self.remove_static(index, events);
        self.remove_unversioned(index, events);
        self.remove_blocked(index, events);
        log::info!(
            "{} pervasive static URLs, {} paths left for clustering",
            fixed.len(),
            index.path_count()
        );
        fixed
    }

    /// Paths present in every tracked month at or above the threshold.
    pub fn extract_pervasive_fixed(
        &self,
        index: &mut OriginIndex,
        events: &mut EventLog,
    ) -> Vec<String> {
        let months = index.months().to_vec();
        let threshold = self.config.pervasive_threshold;
        let mut fixed = Vec::new();

        for origin in index.origin_keys() {
            for path in index.path_keys(&origin) {
                let Some(history) = index.history(&origin, &path) else {
                    continue;
                };
                if history.month_count() != months.len() {
                    continue;
                }
                let mut counts = Vec::with_capacity(months.len());
                let mut pervasive = true;
                for month in &months {
                    let count = history.count_in(month);
                    counts.push(count);
                    if count < threshold {
                        pervasive = false;
                        break;
                    }
                }
                if !pervasive {
                    continue;
                }

                let url = format!("{origin}{path}");
                events.record(ClassificationEvent::PervasiveFixed {
                    url: url.clone(),
                    monthly_counts: counts,
                });
                index.remove_path(&origin, &path);
                if !fixed.contains(&url) {
                    fixed.push(url);
                }
            }
        }
        fixed
    }

    pub fn remove_long(&self, index: &mut OriginIndex, events: &mut EventLog) {
        let max_len = self.config.max_url_length;
        remove_where(index, events, ExclusionReason::TooLong, |origin, path, _| {
            origin.chars().count() + path.chars().count() > max_len
        });
    }

    /// Unchanged across every tracked month, yet below the threshold.
    pub fn remove_static(&self, index: &mut OriginIndex, events: &mut EventLog) {
        let tracked = index.months().len();
        remove_where(
            index,
            events,
            ExclusionReason::StaticNonPervasive,
            |_, _, history| history.month_count() == tracked && history.distinct_hashes().len() == 1,
        );
    }

    /// Content changed in place under the same URL.
    pub fn remove_unversioned(&self, index: &mut OriginIndex, events: &mut EventLog) {
        remove_where(index, events, ExclusionReason::Unversioned, |_, _, history| {
            history.distinct_hashes().len() > 1
        });
    }

    pub fn remove_blocked(&self, index: &mut OriginIndex, events: &mut EventLog) {
        let blocklist = &self.config.blocklist;
        remove_where(index, events, ExclusionReason::Blocked, |_, path, _| {
            let name = filename(path);
            blocklist
                .iter()
                .any(|token| !token.is_empty() && name.contains(token.as_str()))
        });
    }
}

fn remove_where(
    index: &mut OriginIndex,
    events: &mut EventLog,
    reason: ExclusionReason,
    predicate: impl Fn(&str, &str, &PathHistory) -> bool,
) {
    let mut doomed = Vec::new();
    for origin in index.origins() {
        let Some(paths) = index.paths(origin) else {
            continue;
        };
        for (path, history) in paths {
            if predicate(origin, path, history) {
                doomed.push((origin.to_string(), path.clone()));
            }
        }
    }

    for (origin, path) in doomed {
        index.remove_path(&origin, &path);
        events.record(ClassificationEvent::Excluded {
            url: format!("{origin}{path}"),
            reason,
        });
    }
}
