use super::domain::{
    FeedbackDataset, FeedbackRecord, PriorityLevel, DEFAULT_AI_SUMMARY, DEFAULT_CATEGORY,
};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read feedback dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid feedback CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads prioritized feedback exports into an immutable [`FeedbackDataset`].
pub struct FeedbackLoader;

impl FeedbackLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<FeedbackDataset, DatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        debug!(path = %path.display(), records = dataset.len(), "feedback dataset loaded");
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<FeedbackDataset, DatasetError> {
        // short rows fall back to the field defaults below
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut records = Vec::new();

        for row in csv_reader.deserialize::<FeedbackRow>() {
            records.push(row?.normalize());
        }

        Ok(FeedbackDataset::new(records))
    }
}

#[derive(Debug, Deserialize)]
struct FeedbackRow {
    feedback_id: String,
    #[serde(default)]
    original_text: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority_level: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority_score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sentiment: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    urgency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ai_summary: Option<String>,
}

impl FeedbackRow {
    fn normalize(self) -> FeedbackRecord {
        let priority_level = match self.priority_level.as_deref() {
            None => PriorityLevel::Low,
            Some(raw) => PriorityLevel::parse(raw).unwrap_or_else(|| {
                warn!(
                    feedback_id = %self.feedback_id,
                    value = raw,
                    "unrecognized priority level, treating as LOW"
                );
                PriorityLevel::Low
            }),
        };

        let priority_score = self.priority_score.as_deref().and_then(|raw| {
            let parsed = raw.parse::<f64>().ok().filter(|score| score.is_finite());
            if parsed.is_none() {
                warn!(feedback_id = %self.feedback_id, value = raw, "ignoring non-numeric priority score");
            }
            parsed
        });

        FeedbackRecord {
            feedback_id: self.feedback_id,
            original_text: self.original_text,
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            priority_level,
            priority_score,
            sentiment: self.sentiment,
            urgency: self.urgency,
            ai_summary: self
                .ai_summary
                .unwrap_or_else(|| DEFAULT_AI_SUMMARY.to_string()),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
