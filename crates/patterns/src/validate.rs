use crate::pattern::UrlPattern;
use pervasive_indexer::OriginIndex;

/// Aggregate traffic of every working-set path a pattern matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Summed occurrences per tracked month, newest first
    pub monthly_counts: Vec<u64>,
    /// Matched paths in lexicographic order
    pub matched: Vec<String>,
    pub accepted: bool,
}

/// Match `pattern` against the paths still tracked under `origin`.
///
/// The pattern is accepted only when the combined count reaches
/// `threshold` in every tracked month.
pub fn validate(
    index: &OriginIndex,
    origin: &str,
    pattern: &UrlPattern,
    threshold: u64,
) -> Validation {
    let months = index.months();
    let mut monthly_counts = vec![0u64; months.len()];
    let mut matched = Vec::new();

    if let Some(paths) = index.paths(origin) {
        for (path, history) in paths {
            if !pattern.matches(path) {
                continue;
            }
            for (total, month) in monthly_counts.iter_mut().zip(months) {
                *total = total.saturating_add(history.count_in(month));
            }
            matched.push(path.clone());
        }
    }

    let accepted = !matched.is_empty() && monthly_counts.iter().all(|&count| count >= threshold);
    Validation {
        monthly_counts,
        matched,
        accepted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pervasive_protocol::{MonthKey, Record};
    use pretty_assertions::assert_eq;

    fn month(raw: &str) -> MonthKey {
        raw.parse().expect("month")
    }

    fn index() -> OriginIndex {
        let mut index = OriginIndex::new([month("2025-06"), month("2025-05")]).expect("index");
        index.ingest(
            &[
                Record::new("https://cdn.example/v/2/app.js", "script", 1, "b", 70),
                Record::new("https://cdn.example/v/2/app.css", "style", 1, "c", 500),
            ],
            month("2025-06"),
        );
        index.ingest(
            &[
                Record::new("https://cdn.example/v/1/app.js", "script", 1, "a", 60),
                Record::new("https://cdn.example/v/2/app.js", "script", 1, "b", 40),
            ],
            month("2025-05"),
        );
        index
    }

    #[test]
    fn sums_every_matching_path_per_month() {
        let index = index();
        let pattern = UrlPattern::new("/v/*/app.js").expect("pattern");
        let result = validate(&index, "https://cdn.example", &pattern, 100);
        assert_eq!(result.monthly_counts, vec![70, 100]);
        assert_eq!(
            result.matched,
            vec!["/v/1/app.js".to_string(), "/v/2/app.js".to_string()]
        );
        assert!(!result.accepted);

        let result = validate(&index, "https://cdn.example", &pattern, 70);
        assert!(result.accepted);
    }

    #[test]
    fn unknown_origin_matches_nothing() {
        let index = index();
        let pattern = UrlPattern::new("*").expect("pattern");
        let result = validate(&index, "https://other.example", &pattern, 0);
        assert!(result.matched.is_empty());
        assert!(!result.accepted);
    }
}
