use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A crawl month, displayed as `YYYY-MM`.
///
/// Ordering is chronological, so the newest month is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: u16,
    month: u8,
}

impl MonthKey {
    pub fn new(year: u16, month: u8) -> Result<Self> {
        if !(1..=9999).contains(&year) {
            bail!("year {year} out of range");
        }
        if !(1..=12).contains(&month) {
            bail!("month {month} out of range");
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// The month before this one. Saturates at 0001-01.
    #[must_use]
    pub fn previous(&self) -> Self {
        match (self.year, self.month) {
            (1, 1) => *self,
            (year, 1) => Self {
                year: year - 1,
                month: 12,
            },
            (year, month) => Self {
                year,
                month: month - 1,
            },
        }
    }

    /// `count` months ending at `self`, newest first.
    pub fn trailing(&self, count: usize) -> Vec<Self> {
        let mut months = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            months.push(current);
            let previous = current.previous();
            if previous == current {
                break;
            }
            current = previous;
        }
        months
    }

    /// File name of this month's snapshot inside a data directory.
    pub fn snapshot_file_name(&self) -> String {
        format!("{self}.json")
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (year, month) = raw
            .split_once('-')
            .ok_or_else(|| anyhow!("expected YYYY-MM, got {raw:?}"))?;
        let year = year
            .parse::<u16>()
            .map_err(|_| anyhow!("invalid year in {raw:?}"))?;
        let month = month
            .parse::<u8>()
            .map_err(|_| anyhow!("invalid month in {raw:?}"))?;
        Self::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn month(raw: &str) -> MonthKey {
        raw.parse().expect("month")
    }

    #[test]
    fn parses_padded_and_unpadded_months() {
        assert_eq!(month("2025-03"), month("2025-3"));
        assert_eq!(month(" 2025-11 ").to_string(), "2025-11");
        assert!("2025".parse::<MonthKey>().is_err());
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("2025-00".parse::<MonthKey>().is_err());
        assert!("abcd-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn previous_wraps_year_boundary() {
        assert_eq!(month("2025-01").previous(), month("2024-12"));
        assert_eq!(month("2025-07").previous(), month("2025-06"));
    }

    #[test]
    fn trailing_is_newest_first() {
        let months: Vec<String> = month("2025-02")
            .trailing(4)
            .into_iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(months, vec!["2025-02", "2025-01", "2024-12", "2024-11"]);
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(month("2024-12") < month("2025-01"));
        assert!(month("2025-10") > month("2025-09"));
    }

    #[test]
    fn serde_uses_display_form() {
        let json = serde_json::to_string(&month("2025-4")).expect("json");
        assert_eq!(json, "\"2025-04\"");
        let back: MonthKey = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, month("2025-04"));
    }
}
