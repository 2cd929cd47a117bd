use crate::report::render_summary;
use crate::{print_stdout, AnalyzeArgs};
use anyhow::{anyhow, Context as AnyhowContext, Result};
use pervasive_indexer::{JsonSnapshotDir, OriginIndex};
use pervasive_patterns::{PatternConfig, PatternEngine};
use pervasive_protocol::{serialize_json, MonthKey};
use std::env;
use std::path::PathBuf;

pub(crate) const CONFIG_ENV: &str = "PERVASIVE_CONFIG";

pub(crate) fn run(args: AnalyzeArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let source = JsonSnapshotDir::new(&args.data_dir);

    let current = match &args.current {
        Some(raw) => raw
            .parse::<MonthKey>()
            .with_context(|| format!("Invalid --current month {raw:?}"))?,
        None => source
            .latest_month()
            .with_context(|| format!("Failed to scan {}", args.data_dir.display()))?
            .ok_or_else(|| {
                anyhow!(
                    "No YYYY-MM.json snapshots found in {}",
                    args.data_dir.display()
                )
            })?,
    };
    let months = current.trailing(config.months_tracked);
    log::info!(
        "Analyzing {} months ending at {current} from {}",
        months.len(),
        args.data_dir.display()
    );

    let index = OriginIndex::build(&source, months).context("Failed to build origin index")?;
    let engine = PatternEngine::new(config)?;
    let report = engine.run(index).context("Pattern discovery failed")?;

    report
        .write_patterns(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!(
        "Wrote {} patterns to {}",
        report.patterns.len(),
        args.output.display()
    );

    if args.json {
        print_stdout(&serialize_json(&report)?)
    } else {
        print_stdout(&render_summary(&report, &args.output))
    }
}

/// Defaults, then the config file, then command-line overrides.
fn resolve_config(args: &AnalyzeArgs) -> Result<PatternConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            PatternConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => PatternConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.pervasive_threshold = threshold;
    }
    if let Some(months) = args.months {
        config.months_tracked = months;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(config: Option<PathBuf>) -> AnalyzeArgs {
        AnalyzeArgs {
            data_dir: PathBuf::from("data"),
            current: None,
            months: None,
            config,
            output: PathBuf::from("patterns.txt"),
            threshold: None,
            json: false,
        }
    }

    #[test]
    fn flags_override_config_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pervasive.toml");
        fs::write(&path, "pervasive_threshold = 500\nmonths_tracked = 4\n").unwrap();

        let mut args = args(Some(path));
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.pervasive_threshold, 500);
        assert_eq!(config.months_tracked, 4);

        args.threshold = Some(42);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.pervasive_threshold, 42);
        assert_eq!(config.months_tracked, 4);
    }

    #[test]
    fn zero_months_flag_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("empty.toml");
        fs::write(&path, "").unwrap();
        let mut args = args(Some(path));
        args.months = Some(0);
        assert!(resolve_config(&args).is_err());
    }
}
