//! Natural-language summaries of the filtered feedback from an external language model.

mod chat;

pub use chat::{ChatCompletionSummarizer, DEFAULT_SUMMARIZER_ENDPOINT, DEFAULT_SUMMARIZER_MODEL};

use crate::workflows::feedback::FilteredFeedback;
use serde::Serialize;
use std::fmt::Debug;
use tracing::warn;

pub const SUMMARY_SAMPLE_SIZE: usize = 10;
const SUMMARY_INSTRUCTION: &str = "Summarize insights from this feedback:";

#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("summarizer is not configured")]
    NotConfigured,
    #[error("summarizer request failed: {0}")]
    Transport(String),
    #[error("summarizer rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("summarizer returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Opaque text-in/text-out summarization service.
pub trait Summarizer: Debug + Send + Sync {
    fn summarize(&self, prompt: &str) -> Result<String, SummarizerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SummaryStatus {
    NoData,
    Available { summary: String },
    Unavailable { reason: String },
}

/// Instruction followed by the text of the first [`SUMMARY_SAMPLE_SIZE`] filtered records.
pub fn build_summary_prompt(filtered: &FilteredFeedback<'_>) -> String {
    let sample: Vec<&str> = filtered
        .records()
        .iter()
        .take(SUMMARY_SAMPLE_SIZE)
        .map(|record| record.original_text.as_str())
        .collect();
    format!("{SUMMARY_INSTRUCTION}\n{}", sample.join("\n"))
}

/// Asks the summarizer about the filtered collection. Failures become
/// [`SummaryStatus::Unavailable`] and never abort the caller.
pub fn summarize_feedback(
    summarizer: Option<&dyn Summarizer>,
    filtered: &FilteredFeedback<'_>,
) -> SummaryStatus {
    if filtered.is_empty() {
        return SummaryStatus::NoData;
    }

    let result = match summarizer {
        Some(summarizer) => summarizer.summarize(&build_summary_prompt(filtered)),
        None => Err(SummarizerError::NotConfigured),
    };

    match result {
        Ok(summary) => SummaryStatus::Available { summary },
        Err(err) => {
            warn!(error = %err, "AI summary not available");
            SummaryStatus::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::feedback::domain::record_for_tests;
    use crate::workflows::feedback::{FeedbackDataset, PriorityLevel, PrioritySelection};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingSummarizer {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Summarizer for RecordingSummarizer {
        fn summarize(&self, prompt: &str) -> Result<String, SummarizerError> {
            self.prompts
                .lock()
                .expect("prompt mutex")
                .push(prompt.to_string());
            if self.fail {
                Err(SummarizerError::Rejected {
                    status: 401,
                    body: "invalid api key".to_string(),
                })
            } else {
                Ok("Customers are frustrated with billing.".to_string())
            }
        }
    }

    fn dataset(size: usize) -> FeedbackDataset {
        FeedbackDataset::new(
            (0..size)
                .map(|index| record_for_tests(&index.to_string(), PriorityLevel::High, "Billing"))
                .collect(),
        )
    }

    #[test]
    fn prompt_uses_first_ten_filtered_records() {
        let dataset = dataset(12);
        let filtered = dataset.filter(&PrioritySelection::default());
        let prompt = build_summary_prompt(&filtered);

        let mut lines = prompt.lines();
        assert_eq!(lines.next(), Some("Summarize insights from this feedback:"));
        let texts: Vec<&str> = lines.collect();
        assert_eq!(texts.len(), SUMMARY_SAMPLE_SIZE);
        assert_eq!(texts[0], "feedback text for 0");
        assert_eq!(texts[9], "feedback text for 9");
    }

    #[test]
    fn summary_is_available_when_service_answers() {
        let dataset = dataset(2);
        let filtered = dataset.filter(&PrioritySelection::default());
        let summarizer = RecordingSummarizer::default();

        let status = summarize_feedback(Some(&summarizer as &dyn Summarizer), &filtered);
        assert_eq!(
            status,
            SummaryStatus::Available {
                summary: "Customers are frustrated with billing.".to_string()
            }
        );
        assert_eq!(summarizer.prompts.lock().expect("prompt mutex").len(), 1);
    }

    #[test]
    fn failures_and_missing_configuration_are_non_fatal() {
        let dataset = dataset(2);
        let filtered = dataset.filter(&PrioritySelection::default());
        let failing = RecordingSummarizer {
            fail: true,
            ..RecordingSummarizer::default()
        };

        match summarize_feedback(Some(&failing as &dyn Summarizer), &filtered) {
            SummaryStatus::Unavailable { reason } => assert!(reason.contains("401")),
            other => panic!("expected unavailable, got {other:?}"),
        }
        assert!(matches!(
            summarize_feedback(None, &filtered),
            SummaryStatus::Unavailable { .. }
        ));
    }

    #[test]
    fn empty_selection_skips_the_service() {
        let dataset = dataset(2);
        let filtered = dataset.filter(&PrioritySelection::empty());
        let summarizer = RecordingSummarizer::default();

        assert_eq!(
            summarize_feedback(Some(&summarizer as &dyn Summarizer), &filtered),
            SummaryStatus::NoData
        );
        assert!(summarizer.prompts.lock().expect("prompt mutex").is_empty());
    }
}
