use crate::pattern::UrlPattern;
use crate::report::{ClassificationEvent, EventLog};
use crate::Result;

/// Drop every pattern that a strictly shorter accepted pattern already
/// matches. Order of the survivors is preserved.
pub fn remove_duplicates(patterns: Vec<String>, events: &mut EventLog) -> Result<Vec<String>> {
    let compiled = patterns
        .iter()
        .map(|text| UrlPattern::new(text.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let mut kept = Vec::with_capacity(patterns.len());
    for (idx, text) in patterns.iter().enumerate() {
        let len = text.chars().count();
        let covered_by = compiled.iter().enumerate().find(|(other_idx, other)| {
            *other_idx != idx && other.as_str().chars().count() < len && other.matches(text)
        });
        match covered_by {
            Some((_, other)) => events.record(ClassificationEvent::DuplicatePattern {
                pattern: text.clone(),
                covered_by: other.as_str().to_string(),
            }),
            None => kept.push(text.clone()),
        }
    }
    Ok(kept)
}
