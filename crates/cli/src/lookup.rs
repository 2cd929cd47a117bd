use crate::{print_stdout, MatchArgs};
use anyhow::{Context as AnyhowContext, Result};
use pervasive_patterns::PatternSet;
use pervasive_protocol::serialize_json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct MatchOutput<'a> {
    url: &'a str,
    pattern: Option<&'a str>,
}

pub(crate) fn run(args: MatchArgs) -> Result<()> {
    let set = PatternSet::load(&args.patterns)
        .with_context(|| format!("Failed to load patterns {}", args.patterns.display()))?;
    log::debug!("Loaded {} patterns", set.len());

    let results: Vec<MatchOutput<'_>> = args
        .urls
        .iter()
        .map(|url| MatchOutput {
            url,
            pattern: set.first_match(url).map(|p| p.as_str()),
        })
        .collect();

    if args.json {
        return print_stdout(&serialize_json(&results)?);
    }

    let lines: Vec<String> = results
        .iter()
        .map(|r| format!("{}\t{}", r.url, r.pattern.unwrap_or("-")))
        .collect();
    print_stdout(&lines.join("\n"))
}
