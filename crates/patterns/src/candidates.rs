use crate::config::PatternConfig;
use crate::sequence::SequenceMatcher;
use pervasive_indexer::OriginIndex;
use pervasive_protocol::{filename, segment_count};

/// The path a cluster is built around.
#[derive(Debug, Clone, Copy)]
pub struct Seed<'a> {
    pub origin: &'a str,
    pub path: &'a str,
    pub destination: Option<&'a str>,
    /// Size in the current month
    pub size: u64,
}

/// Finds sibling paths that look like other versions of a seed path.
pub struct CandidateMatcher<'a> {
    config: &'a PatternConfig,
}

impl<'a> CandidateMatcher<'a> {
    pub fn new(config: &'a PatternConfig) -> Self {
        Self { config }
    }

    /// Candidates for `seed`, in lexicographic path order.
    ///
    /// Acceptance widens a size window around the seed size, so later
    /// candidates are judged against every size accepted before them.
    pub fn find(&self, index: &OriginIndex, seed: &Seed<'_>) -> Vec<String> {
        let Some(paths) = index.paths(seed.origin) else {
            return Vec::new();
        };

        let seed_key = self.filename_key(filename(seed.path));
        let seed_segments = segment_count(seed.path);
        let mut window = SizeWindow::new(seed.size);
        let mut candidates: Vec<String> = Vec::new();

        for (path, history) in paths {
            if path == seed.path || candidates.iter().any(|chosen| chosen == path) {
                continue;
            }
            if index.destination(seed.origin, path) != seed.destination {
                continue;
            }
            if segment_count(path) != seed_segments {
                continue;
            }
            let key = self.filename_key(filename(path));
            if !self.filenames_similar(&seed_key, &key) {
                continue;
            }
            let Some(size) = history.latest_size() else {
                continue;
            };
            if window.try_extend(size, self.config.size_match_percent) {
                candidates.push(path.clone());
            }
        }

        if !candidates.is_empty() {
            log::debug!(
                "{} candidates for {}{}",
                candidates.len(),
                seed.origin,
                seed.path
            );
        }
        candidates
    }

    /// Filename with every ignorable token removed, in configured order.
    pub fn filename_key(&self, name: &str) -> String {
        self.config
            .filename_ignore
            .iter()
            .filter(|token| !token.is_empty())
            .fold(name.to_string(), |acc, token| acc.replace(token.as_str(), ""))
    }

    pub fn filenames_similar(&self, seed_key: &str, key: &str) -> bool {
        let length_gap = seed_key.chars().count().abs_diff(key.chars().count());
        if length_gap > self.config.max_filename_length_difference {
            return false;
        }
        let matcher = SequenceMatcher::new(seed_key, key);
        matcher.ratio() >= self.config.min_filename_ratio
            && matcher.matching_blocks().len() <= self.config.max_filename_matching_blocks
    }
}

/// Running `[min, max]` of accepted sizes, anchored on the seed size.
#[derive(Debug, Clone, Copy)]
struct SizeWindow {
    target: u64,
    min: u64,
    max: u64,
}

impl SizeWindow {
    fn new(target: u64) -> Self {
        Self {
            target,
            min: target,
            max: target,
        }
    }

    /// Accept `size` if stretching the window to it grows it by at most
    /// `percent` of the target size.
    fn try_extend(&mut self, size: u64, percent: u64) -> bool {
        let stretch = if size < self.min {
            self.min - size
        } else if size > self.max {
            size - self.max
        } else {
            0
        };
        let allowed = u128::from(percent) * u128::from(self.target);
        if u128::from(stretch) * 100 > allowed {
            return false;
        }
        self.min = self.min.min(size);
        self.max = self.max.max(size);
        true
    }
}
