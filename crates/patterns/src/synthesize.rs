use crate::config::PatternConfig;
use crate::sequence::SequenceMatcher;
use pervasive_protocol::filename;

/// Derives the most specific wildcard path that covers a seed path and its
/// candidates.
pub struct PatternSynthesizer<'a> {
    config: &'a PatternConfig,
}

impl<'a> PatternSynthesizer<'a> {
    pub fn new(config: &'a PatternConfig) -> Self {
        Self { config }
    }

    /// Pattern for `seed` and `candidates`, post-processed, or `None` when
    /// the differences are too irregular to generalize.
    pub fn synthesize(&self, seed: &str, candidates: &[String]) -> Option<String> {
        let raw = self.path_pattern(seed, candidates)?;
        Some(self.finalize(raw))
    }

    fn path_pattern(&self, seed: &str, candidates: &[String]) -> Option<String> {
        let segments: Vec<&str> = seed.split('/').collect();
        let last = segments.len() - 1;

        let mut differs = vec![false; segments.len()];
        for candidate in candidates {
            let other: Vec<&str> = candidate.split('/').collect();
            if other.len() != segments.len() {
                return None;
            }
            for (idx, (ours, theirs)) in segments.iter().zip(&other).enumerate() {
                if ours != theirs {
                    differs[idx] = true;
                }
            }
        }
        let differences: Vec<usize> = (0..segments.len()).filter(|&idx| differs[idx]).collect();
        let &last_difference = differences.last()?;

        let stable = segments.len() - differences.len();
        let filename_differs = last_difference == last;

        if !filename_differs && (stable > self.config.min_stable_path || differences.len() == 1) {
            return Some(replace_segments(&segments, &differences, None));
        }

        if filename_differs
            && (differences.len() <= 2 || stable > self.config.min_stable_path)
        {
            let others: Vec<&str> = candidates.iter().map(|c| filename(c)).collect();
            let name_pattern = filename_pattern(segments[last], &others)?;
            return Some(replace_segments(&segments, &differences, Some(name_pattern)));
        }

        None
    }

    /// Apply configured literal replacements and collapse `/*/*/` runs.
    pub fn finalize(&self, mut pattern: String) -> String {
        for literal in &self.config.wildcard_replace {
            if !literal.is_empty() {
                pattern = pattern.replace(literal.as_str(), "*");
            }
        }
        while pattern.contains("/*/*/") {
            pattern = pattern.replace("/*/*/", "/*/");
        }
        pattern
    }
}

fn replace_segments(segments: &[&str], differences: &[usize], filename: Option<String>) -> String {
    let last = segments.len() - 1;
    let mut out: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
    for &idx in differences {
        if idx == last {
            if let Some(name) = &filename {
                out[idx] = name.clone();
                continue;
            }
        }
        out[idx] = "*".to_string();
    }
    out.join("/")
}

/// Wildcard filename keeping the literal runs `file` shares with every
/// differing candidate.
///
/// Returns `None` when no candidate differs from `file`, and `*` when the
/// shared runs intersect to nothing. Single-character runs are dropped.
pub fn filename_pattern(file: &str, candidates: &[&str]) -> Option<String> {
    let chars: Vec<char> = file.chars().collect();
    let mut common: Option<Vec<(usize, usize)>> = None;

    for candidate in candidates.iter().filter(|c| **c != file) {
        let matcher = SequenceMatcher::new(file, candidate);
        let spans: Vec<(usize, usize)> = matcher
            .runs()
            .map(|block| (block.a_start, block.a_end()))
            .collect();
        common = Some(match common {
            None => spans,
            Some(previous) => intersect(&spans, &previous),
        });
    }

    let common = common?;
    let (Some(&(first, _)), Some(&(_, last))) = (common.first(), common.last()) else {
        return Some("*".to_string());
    };

    let mut pattern = String::new();
    if first != 0 {
        pattern.push('*');
    }
    for (idx, &(start, end)) in common.iter().enumerate() {
        if idx > 0 && !pattern.ends_with('*') {
            pattern.push('*');
        }
        if end - start > 1 {
            pattern.extend(&chars[start..end]);
        }
    }
    if last != chars.len() && !pattern.ends_with('*') {
        pattern.push('*');
    }
    if pattern.is_empty() {
        pattern.push('*');
    }
    Some(pattern)
}

fn intersect(spans: &[(usize, usize)], previous: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for &(start, end) in spans {
        for &(p_start, p_end) in previous {
            let s = start.max(p_start);
            let e = end.min(p_end);
            if s < e {
                out.push((s, e));
            }
        }
    }
    out
}
