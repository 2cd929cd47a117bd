use crate::{PatternError, Result};
use regex::Regex;
use std::fmt;
use std::path::Path;

/// A glob-style URL pattern: `*` matches any run of characters (including
/// `/`), every other character is literal and case-sensitive.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    text: String,
    matcher: Option<Regex>,
}

impl UrlPattern {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let matcher = if text.contains('*') {
            let source = glob_to_regex(&text);
            let regex = Regex::new(&source).map_err(|source| PatternError::InvalidPattern {
                pattern: text.clone(),
                source,
            })?;
            Some(regex)
        } else {
            None
        };
        Ok(Self { text, matcher })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when the pattern has no wildcard and only matches itself.
    pub fn is_exact(&self) -> bool {
        self.matcher.is_none()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.matcher {
            Some(regex) => regex.is_match(candidate),
            None => self.text == candidate,
        }
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for UrlPattern {}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut source = String::with_capacity(pattern.len() + 16);
    source.push_str("(?s)^");
    let mut previous_was_star = false;
    for (idx, literal) in pattern.split('*').enumerate() {
        if idx > 0 && !previous_was_star {
            source.push_str(".*");
        }
        previous_was_star = literal.is_empty() && idx > 0;
        source.push_str(&regex::escape(literal));
    }
    source.push('$');
    source
}

/// A list of patterns loaded from a patterns file.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<UrlPattern>,
}

impl PatternSet {
    /// Parse one pattern per line; blank lines and `#` comments are skipped.
    pub fn parse(raw: &str) -> Result<Self> {
        let patterns = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(UrlPattern::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&raw)
    }

    pub fn first_match(&self, url: &str) -> Option<&UrlPattern> {
        self.patterns.iter().find(|pattern| pattern.matches(url))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
