use crate::candidates::{CandidateMatcher, Seed};
use crate::classify::StableSetClassifier;
use crate::config::PatternConfig;
use crate::dedup::remove_duplicates;
use crate::pattern::UrlPattern;
use crate::report::{
    collect_unmatched, ClassificationEvent, EventLog, PatternOutcome, PatternReport,
};
use crate::synthesize::PatternSynthesizer;
use crate::validate::validate;
use crate::Result;
use pervasive_indexer::OriginIndex;

/// Runs classification, clustering and deduplication over one index.
pub struct PatternEngine {
    config: PatternConfig,
}

impl PatternEngine {
    pub fn new(config: PatternConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Consume `index` as the working set and produce the final report.
    pub fn run(&self, mut index: OriginIndex) -> Result<PatternReport> {
        let mut events = EventLog::new();

        let fixed = StableSetClassifier::new(&self.config).run(&mut index, &mut events);
        let mut accepted = Vec::with_capacity(fixed.len());
        for url in fixed {
            accepted.push(UrlPattern::new(url)?);
        }

        loop {
            let before = accepted.len();
            self.cluster_pass(&mut index, &mut accepted, &mut events)?;
            events.finish_pass();
            let added = accepted.len() - before;
            log::debug!("Clustering pass {} accepted {added} patterns", events.stats().passes);
            if added == 0 {
                break;
            }
        }

        let accepted: Vec<String> = accepted.into_iter().map(UrlPattern::into_string).collect();
        let mut patterns = remove_duplicates(accepted, &mut events)?;
        patterns.sort();
        patterns.dedup();

        let unmatched = collect_unmatched(&index);
        let (events, stats) = events.into_parts();
        log::info!(
            "{} patterns, {} unmatched URLs after {} passes",
            patterns.len(),
            unmatched.len(),
            stats.passes
        );

        Ok(PatternReport {
            months: index.months().to_vec(),
            patterns,
            unmatched,
            events,
            stats,
            ingest: index.stats().clone(),
        })
    }

    fn cluster_pass(
        &self,
        index: &mut OriginIndex,
        accepted: &mut Vec<UrlPattern>,
        events: &mut EventLog,
    ) -> Result<()> {
        let current = index.current_month();
        let threshold = self.config.pervasive_threshold;
        let matcher = CandidateMatcher::new(&self.config);
        let synthesizer = PatternSynthesizer::new(&self.config);

        for origin in index.origin_keys() {
            for path in index.path_keys(&origin) {
                let Some(size) = index.history(&origin, &path).and_then(|h| h.size_in(&current))
                else {
                    continue;
                };
                let url = format!("{origin}{path}");
                if accepted.iter().any(|pattern| pattern.matches(&url)) {
                    continue;
                }

                let seed = Seed {
                    origin: &origin,
                    path: &path,
                    destination: index.destination(&origin, &path),
                    size,
                };
                let candidates = matcher.find(index, &seed);
                if candidates.is_empty() {
                    continue;
                }
                let Some(path_pattern) = synthesizer.synthesize(&path, &candidates) else {
                    log::debug!("No pattern for {url} and {} candidates", candidates.len());
                    continue;
                };

                let compiled = UrlPattern::new(path_pattern.as_str())?;
                let validation = validate(index, &origin, &compiled, threshold);
                for matched in &validation.matched {
                    index.remove_path(&origin, matched);
                }

                let qualify = |paths: &[String]| -> Vec<String> {
                    paths.iter().map(|p| format!("{origin}{p}")).collect()
                };
                let outcome = PatternOutcome {
                    pattern: format!("{origin}{path_pattern}"),
                    seed: url,
                    candidates: qualify(&candidates),
                    matched: qualify(&validation.matched),
                    monthly_counts: validation.monthly_counts,
                };

                if validation.accepted {
                    accepted.push(UrlPattern::new(outcome.pattern.as_str())?);
                    events.record(ClassificationEvent::PatternAccepted(outcome));
                } else {
                    events.record(ClassificationEvent::PatternRejected(outcome));
                }
            }
        }
        Ok(())
    }
}
