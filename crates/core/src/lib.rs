use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
pub use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOCUMENT_PATTERN: &str = "*.tex";

/// Read-only access token for the hosting platform. Never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for empty or whitespace-only tokens.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub default_branch: Option<String>,
    #[serde(default)]
    pub fork: bool,
}

impl RepoRef {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A file inside a repository. `handle` is whatever the source needs to
/// fetch the content again (blob sha, absolute path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    pub path: String,
    pub handle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub repository: String,
    pub files: usize,
    pub words: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub words: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Delta {
    pub date: NaiveDate,
    pub change: i64,
    pub total: u64,
}

/// Result of writing a day into the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced { previous: u64 },
}

/// Daily word totals, sorted by date with at most one entry per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    daily_counts: Vec<DailyCount>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from arbitrary entries. Sorts by date; when a date
    /// repeats, the later entry wins.
    pub fn from_counts(counts: impl IntoIterator<Item = DailyCount>) -> Self {
        let mut series = Self::new();
        for count in counts {
            series.upsert(count.date, count.words);
        }
        series
    }

    pub fn upsert(&mut self, date: NaiveDate, words: u64) -> Upsert {
        match self
            .daily_counts
            .binary_search_by(|entry| entry.date.cmp(&date))
        {
            Ok(index) => {
                let previous = self.daily_counts[index].words;
                self.daily_counts[index].words = words;
                Upsert::Replaced { previous }
            }
            Err(index) => {
                self.daily_counts.insert(index, DailyCount { date, words });
                Upsert::Inserted
            }
        }
    }

    /// Drops all but the newest `days` entries. Returns how many were removed.
    pub fn retain_latest(&mut self, days: usize) -> usize {
        let excess = self.daily_counts.len().saturating_sub(days);
        self.daily_counts.drain(..excess);
        excess
    }

    pub fn entries(&self) -> &[DailyCount] {
        &self.daily_counts
    }

    pub fn latest(&self) -> Option<&DailyCount> {
        self.daily_counts.last()
    }

    pub fn get(&self, date: NaiveDate) -> Option<u64> {
        self.daily_counts
            .binary_search_by(|entry| entry.date.cmp(&date))
            .ok()
            .map(|index| self.daily_counts[index].words)
    }

    pub fn len(&self) -> usize {
        self.daily_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daily_counts.is_empty()
    }

    /// Day-over-day change. The first entry has no predecessor and reports 0.
    pub fn deltas(&self) -> Vec<Delta> {
        let mut prev: Option<u64> = None;
        self.daily_counts
            .iter()
            .map(|entry| {
                let change = prev
                    .map(|prev| entry.words as i64 - prev as i64)
                    .unwrap_or(0);
                prev = Some(entry.words);
                Delta {
                    date: entry.date,
                    change,
                    total: entry.words,
                }
            })
            .collect()
    }

    /// True when dates are strictly increasing.
    pub fn is_normalized(&self) -> bool {
        self.daily_counts
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date)
    }
}

/// Glob over file names. Only `*` is special. A pattern containing `/` is
/// matched against the whole repository path, otherwise against the last
/// path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPattern(String);

impl DocumentPattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, PatternError> {
        let pattern = pattern.into();
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if pattern.trim_matches('*').is_empty() {
            return Err(PatternError::Degenerate(pattern.to_string()));
        }
        Ok(Self(pattern.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, path: &str) -> bool {
        let candidate = if self.0.contains('/') {
            path.trim_start_matches('/')
        } else {
            path.rsplit('/').next().unwrap_or(path)
        };
        glob_matches(candidate, &self.0)
    }
}

impl Default for DocumentPattern {
    fn default() -> Self {
        Self(DEFAULT_DOCUMENT_PATTERN.to_string())
    }
}

impl fmt::Display for DocumentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentPattern {
    type Err = PatternError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for DocumentPattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentPattern> for String {
    fn from(value: DocumentPattern) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("document pattern is empty")]
    Empty,
    #[error("document pattern {0:?} matches every file")]
    Degenerate(String),
}

pub fn glob_matches(value: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return value == pattern;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let last = parts.len() - 1;
    let mut remainder = value;
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if index == 0 {
            match remainder.strip_prefix(part) {
                Some(rest) => remainder = rest,
                None => return false,
            }
        } else if index == last {
            return remainder.ends_with(part);
        } else if let Some(found) = remainder.find(part) {
            remainder = &remainder[found + part.len()..];
        } else {
            return false;
        }
    }
    true
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Missing, invalid or insufficiently scoped credential.
    #[error("authorization error: {0}")]
    Authorization(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

/// Where repositories and their document files come from.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Every repository the account owns, across all pages.
    async fn list_repositories(&self) -> Result<Vec<RepoRef>, SourceError>;

    /// Every file in the repository, recursively.
    async fn list_files(&self, repo: &RepoRef) -> Result<Vec<RepoFile>, SourceError>;

    async fn fetch_file(&self, repo: &RepoRef, file: &RepoFile) -> Result<Vec<u8>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn upsert_replaces_same_day_entry() {
        let mut series = TimeSeries::new();
        assert_eq!(series.upsert(date("2024-01-01"), 500), Upsert::Inserted);
        assert_eq!(
            series.upsert(date("2024-01-01"), 520),
            Upsert::Replaced { previous: 500 }
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(date("2024-01-01")), Some(520));
    }

    #[test]
    fn upsert_keeps_dates_sorted() {
        let mut series = TimeSeries::new();
        series.upsert(date("2024-01-03"), 700);
        series.upsert(date("2024-01-01"), 500);
        series.upsert(date("2024-01-02"), 650);
        let dates: Vec<_> = series.entries().iter().map(|entry| entry.date).collect();
        assert_eq!(
            dates,
            vec![date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]
        );
        assert!(series.is_normalized());
    }

    #[test]
    fn from_counts_dedupes_with_last_write_winning() {
        let series = TimeSeries::from_counts([
            DailyCount {
                date: date("2024-01-02"),
                words: 10,
            },
            DailyCount {
                date: date("2024-01-01"),
                words: 5,
            },
            DailyCount {
                date: date("2024-01-02"),
                words: 12,
            },
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().map(|entry| entry.words), Some(12));
    }

    #[test]
    fn deltas_start_at_zero() {
        let series = TimeSeries::from_counts([
            DailyCount {
                date: date("2024-01-01"),
                words: 500,
            },
            DailyCount {
                date: date("2024-01-02"),
                words: 650,
            },
            DailyCount {
                date: date("2024-01-03"),
                words: 600,
            },
        ]);
        let changes: Vec<_> = series.deltas().iter().map(|delta| delta.change).collect();
        assert_eq!(changes, vec![0, 150, -50]);
    }

    #[test]
    fn retain_latest_drops_oldest() {
        let mut series = TimeSeries::new();
        for day in 1..=5 {
            series.upsert(date(&format!("2024-01-0{day}")), day * 100);
        }
        assert_eq!(series.retain_latest(3), 2);
        assert_eq!(series.entries()[0].date, date("2024-01-03"));
        assert_eq!(series.retain_latest(10), 0);
    }

    #[test]
    fn series_json_shape() {
        let mut series = TimeSeries::new();
        series.upsert(date("2024-01-01"), 500);
        let json = serde_json::to_string(&series).expect("json");
        assert_eq!(json, r#"{"daily_counts":[{"date":"2024-01-01","words":500}]}"#);
        let empty: TimeSeries = serde_json::from_str("{}").expect("empty");
        assert!(empty.is_empty());
    }

    #[test]
    fn pattern_matches_file_name() {
        let pattern = DocumentPattern::default();
        assert!(pattern.matches("thesis/chapters/intro.tex"));
        assert!(pattern.matches("main.tex"));
        assert!(pattern.matches("a.tex.tex"));
        assert!(!pattern.matches("main.tex.bak"));
        assert!(!pattern.matches("notes.md"));
        assert!(!pattern.matches("tex/readme"));
    }

    #[test]
    fn pattern_with_slash_matches_full_path() {
        let pattern = DocumentPattern::new("paper/*.tex").expect("pattern");
        assert!(pattern.matches("paper/main.tex"));
        assert!(!pattern.matches("draft/main.tex"));
    }

    #[test]
    fn pattern_rejects_empty_and_degenerate() {
        assert_eq!(DocumentPattern::new("  "), Err(PatternError::Empty));
        assert!(matches!(
            DocumentPattern::new("**"),
            Err(PatternError::Degenerate(_))
        ));
        assert!(matches!(
            DocumentPattern::new("*"),
            Err(PatternError::Degenerate(_))
        ));
    }

    #[test]
    fn glob_handles_inner_wildcards() {
        assert!(glob_matches("chapter-01.tex", "chapter-*.tex"));
        assert!(glob_matches("abc", "a*c"));
        assert!(!glob_matches("abd", "a*c"));
        assert!(glob_matches("anything", "*"));
    }

    #[test]
    fn credential_is_redacted_and_trimmed() {
        assert!(Credential::new("   ").is_none());
        let credential = Credential::new(" ghp_secret \n").expect("credential");
        assert_eq!(credential.expose(), "ghp_secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }
}
