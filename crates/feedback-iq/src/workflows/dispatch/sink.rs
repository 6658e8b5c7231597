use crate::workflows::feedback::FeedbackRecord;
use serde::Serialize;
use std::fmt::Debug;

/// Fixed-shape body posted to the automation webhook for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPayload {
    pub feedback_id: String,
    pub text: String,
    pub category: String,
    pub priority: String,
    pub score: Option<f64>,
}

impl From<&FeedbackRecord> for DispatchPayload {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            feedback_id: record.feedback_id.clone(),
            text: record.original_text.clone(),
            category: record.category.clone(),
            priority: record.priority_level.label().to_string(),
            score: record.priority_score,
        }
    }
}

/// Failures that happen before the sink produced any response.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Destination for dispatched feedback. Implementations return the HTTP status the sink
/// answered with and leave success classification to the dispatcher.
pub trait FeedbackSink: Debug + Send + Sync {
    fn post(&self, payload: &DispatchPayload) -> Result<u16, SinkError>;
}

impl<S: FeedbackSink + ?Sized> FeedbackSink for Box<S> {
    fn post(&self, payload: &DispatchPayload) -> Result<u16, SinkError> {
        (**self).post(payload)
    }
}

impl<S: FeedbackSink + ?Sized> FeedbackSink for std::sync::Arc<S> {
    fn post(&self, payload: &DispatchPayload) -> Result<u16, SinkError> {
        (**self).post(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::feedback::domain::record_for_tests;
    use crate::workflows::feedback::PriorityLevel;
    use serde_json::json;

    #[test]
    fn payload_serializes_to_webhook_shape() {
        let mut record = record_for_tests("FB-7", PriorityLevel::High, "Billing");
        record.priority_score = Some(7.5);
        let payload = DispatchPayload::from(&record);

        assert_eq!(
            serde_json::to_value(&payload).expect("serializes"),
            json!({
                "feedback_id": "FB-7",
                "text": "feedback text for FB-7",
                "category": "Billing",
                "priority": "HIGH",
                "score": 7.5,
            })
        );
    }

    #[test]
    fn missing_score_serializes_as_null() {
        let record = record_for_tests("FB-8", PriorityLevel::Low, "UX");
        let value = serde_json::to_value(DispatchPayload::from(&record)).expect("serializes");
        assert!(value["score"].is_null());
    }
}
