use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CATEGORY: &str = "Unknown";
pub const DEFAULT_AI_SUMMARY: &str = "AI summary pending";

/// Urgency bucket assigned upstream to every feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub const fn ordered() -> [PriorityLevel; 4] {
        [Self::Critical, Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriorityLevel(pub String);

impl fmt::Display for UnknownPriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown priority level '{}' (expected CRITICAL, HIGH, MEDIUM or LOW)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPriorityLevel {}

impl FromStr for PriorityLevel {
    type Err = UnknownPriorityLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownPriorityLevel(value.trim().to_string()))
    }
}

/// One pre-scored feedback row. Only ever shared by reference once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub feedback_id: String,
    pub original_text: String,
    pub category: String,
    pub priority_level: PriorityLevel,
    pub priority_score: Option<f64>,
    pub sentiment: Option<String>,
    pub urgency: Option<String>,
    pub ai_summary: String,
}

/// The set of priority levels a caller wants to look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrioritySelection(BTreeSet<PriorityLevel>);

impl PrioritySelection {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn all() -> Self {
        Self(PriorityLevel::ordered().into_iter().collect())
    }

    pub fn contains(&self, level: PriorityLevel) -> bool {
        self.0.contains(&level)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn levels(&self) -> impl Iterator<Item = PriorityLevel> + '_ {
        self.0.iter().copied()
    }

    /// Parses a comma or whitespace separated list such as `critical,high`.
    pub fn parse_list(raw: &str) -> Result<Self, UnknownPriorityLevel> {
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl Default for PrioritySelection {
    fn default() -> Self {
        [
            PriorityLevel::Critical,
            PriorityLevel::High,
            PriorityLevel::Medium,
        ]
        .into_iter()
        .collect()
    }
}

impl FromIterator<PriorityLevel> for PrioritySelection {
    fn from_iter<T: IntoIterator<Item = PriorityLevel>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for PrioritySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(none)");
        }
        let labels: Vec<&str> = self.0.iter().map(|level| level.label()).collect();
        f.write_str(&labels.join(", "))
    }
}

/// Headline counts over the whole dataset, independent of any selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
}

/// Immutable snapshot of every record loaded for one rendering cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackDataset {
    records: Vec<FeedbackRecord>,
}

impl FeedbackDataset {
    pub fn new(records: Vec<FeedbackRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn overview(&self) -> DatasetOverview {
        let count = |level: PriorityLevel| {
            self.records
                .iter()
                .filter(|record| record.priority_level == level)
                .count()
        };

        DatasetOverview {
            total: self.records.len(),
            critical: count(PriorityLevel::Critical),
            high: count(PriorityLevel::High),
        }
    }

    /// A copy ordered by `priority_score` descending. Rows without a score sink to the
    /// bottom; equal scores keep their load order.
    pub fn ranked_by_score(&self) -> Self {
        let mut records = self.records.clone();
        records.sort_by(|a, b| match (a.priority_score, b.priority_score) {
            (Some(left), Some(right)) => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Self { records }
    }
}

#[cfg(test)]
pub(crate) fn record_for_tests(id: &str, level: PriorityLevel, category: &str) -> FeedbackRecord {
    FeedbackRecord {
        feedback_id: id.to_string(),
        original_text: format!("feedback text for {id}"),
        category: category.to_string(),
        priority_level: level,
        priority_score: None,
        sentiment: None,
        urgency: None,
        ai_summary: DEFAULT_AI_SUMMARY.to_string(),
    }
}
