use pervasive_patterns::PatternReport;
use std::path::Path;

pub fn render_summary(report: &PatternReport, output: &Path) -> String {
    let months: Vec<String> = report.months.iter().map(|m| m.to_string()).collect();
    let stats = &report.stats;

    let mut md = String::new();
    md.push_str("# Pervasive pattern report\n\n");
    md.push_str(&format!("- Months: `{}`\n", months.join(", ")));
    md.push_str(&format!(
        "- Records ingested: `{}` (malformed `{}`, untracked origins `{}`)\n",
        report.ingest.total_records(),
        report.ingest.malformed,
        report.ingest.unknown_origin
    ));
    if !report.ingest.empty_months.is_empty() {
        md.push_str(&format!(
            "- Empty months: `{}`\n",
            report.ingest.empty_months.join(", ")
        ));
    }
    md.push_str(&format!(
        "- Patterns: `{}` written to `{}`\n\n",
        report.patterns.len(),
        output.display()
    ));

    md.push_str("| stage | count |\n");
    md.push_str("|---|---:|\n");
    for (stage, count) in [
        ("pervasive_fixed", stats.pervasive_fixed),
        ("too_long", stats.too_long),
        ("static_non_pervasive", stats.static_non_pervasive),
        ("unversioned", stats.unversioned),
        ("blocked", stats.blocked),
        ("patterns_accepted", stats.patterns_accepted),
        ("patterns_rejected", stats.patterns_rejected),
        ("duplicates_removed", stats.duplicates_removed),
        ("unmatched", report.unmatched.len()),
    ] {
        md.push_str(&format!("| `{stage}` | `{count}` |\n"));
    }

    if !report.patterns.is_empty() {
        md.push_str("\n## Patterns\n\n");
        for pattern in &report.patterns {
            md.push_str(&format!("- `{pattern}`\n"));
        }
    }
    md
}
