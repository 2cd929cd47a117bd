use pervasive_indexer::OriginIndex;
use pervasive_patterns::{ClassificationEvent, PatternConfig, PatternEngine, PatternReport, UrlPattern};
use pervasive_protocol::{MonthKey, Record};
use proptest::prelude::*;
use std::collections::BTreeSet;

const THRESHOLD: u64 = 1_000;
const ORIGINS: [&str; 2] = ["https://a.example", "https://b.example"];

fn months() -> Vec<MonthKey> {
    "2025-06".parse::<MonthKey>().expect("month").trailing(3)
}

fn path_for(template: usize, variant: u8) -> String {
    match template {
        0 => format!("/v/1.{variant}/app.js"),
        1 => format!("/img/logo-{variant}a{variant}.png"),
        _ => format!("/lib/{variant}/x/y/core.js"),
    }
}

#[derive(Debug, Clone)]
struct Visit {
    origin: usize,
    template: usize,
    variant: u8,
    month: usize,
    count: u64,
    size: u64,
}

fn visit() -> impl Strategy<Value = Visit> {
    (
        0usize..ORIGINS.len(),
        0usize..3,
        0u8..5,
        0usize..3,
        1u64..1_500,
        prop::sample::select(vec![1_000u64, 1_020, 4_000]),
    )
        .prop_map(|(origin, template, variant, month, count, size)| Visit {
            origin,
            template,
            variant,
            month,
            count,
            size,
        })
}

fn build(visits: &[Visit]) -> OriginIndex {
    let months = months();
    let mut index = OriginIndex::new(months.clone()).expect("index");
    for (idx, month) in months.iter().enumerate() {
        let records: Vec<Record> = visits
            .iter()
            .filter(|v| v.month == idx)
            .map(|v| {
                let url = format!("{}{}", ORIGINS[v.origin], path_for(v.template, v.variant));
                Record::new(url, "script", v.size, format!("h{}", v.variant), v.count)
            })
            .collect();
        index.ingest(&records, *month);
    }
    index
}

fn run(index: OriginIndex) -> PatternReport {
    let config = PatternConfig {
        pervasive_threshold: THRESHOLD,
        ..PatternConfig::default()
    };
    PatternEngine::new(config)
        .expect("engine")
        .run(index)
        .expect("run")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_accepted_patterns_meet_threshold_and_match_their_members(
        visits in prop::collection::vec(visit(), 1..40)
    ) {
        let report = run(build(&visits));
        let mut consumed = BTreeSet::new();

        for event in &report.events {
            match event {
                ClassificationEvent::PervasiveFixed { monthly_counts, .. } => {
                    prop_assert!(monthly_counts.iter().all(|&c| c >= THRESHOLD));
                }
                ClassificationEvent::PatternAccepted(outcome) => {
                    prop_assert!(outcome.monthly_counts.iter().all(|&c| c >= THRESHOLD));
                    let pattern = UrlPattern::new(outcome.pattern.as_str()).expect("pattern");
                    prop_assert!(pattern.matches(&outcome.seed));
                    for url in &outcome.matched {
                        prop_assert!(pattern.matches(url));
                        prop_assert!(consumed.insert(url.clone()), "{} consumed twice", url);
                    }
                }
                ClassificationEvent::PatternRejected(outcome) => {
                    for url in &outcome.matched {
                        prop_assert!(consumed.insert(url.clone()), "{} consumed twice", url);
                    }
                }
                _ => {}
            }
        }
    }

    #[test]
    fn proptest_no_pattern_is_covered_by_a_shorter_one(
        visits in prop::collection::vec(visit(), 1..40)
    ) {
        let report = run(build(&visits));
        let compiled: Vec<UrlPattern> = report
            .patterns
            .iter()
            .map(|p| UrlPattern::new(p.as_str()).expect("pattern"))
            .collect();
        for text in &report.patterns {
            for other in &compiled {
                if other.as_str().chars().count() < text.chars().count() {
                    prop_assert!(!other.matches(text), "{} covers {}", other, text);
                }
            }
        }
        let mut sorted = report.patterns.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted, report.patterns);
    }

    #[test]
    fn proptest_runs_are_deterministic(visits in prop::collection::vec(visit(), 1..40)) {
        let index = build(&visits);
        let first = run(index.clone());
        let second = run(index);
        prop_assert_eq!(first.patterns, second.patterns);
        prop_assert_eq!(first.stats, second.stats);
    }
}
