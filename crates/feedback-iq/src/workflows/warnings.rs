use super::dispatch::{DeliveryOutcome, DispatchEvent};
use super::feedback::FilteredFeedback;
use super::summarizer::SummaryStatus;
use serde::Serialize;
use std::fmt;

/// User-visible, non-fatal problems surfaced next to otherwise working output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardWarning {
    SinkRejected { feedback_id: String, status: u16 },
    SinkUnreachable { feedback_id: String, reason: String },
    SummarizerUnavailable { reason: String },
    EmptySelection,
}

impl DashboardWarning {
    pub fn from_outcome(feedback_id: &str, outcome: &DeliveryOutcome) -> Option<Self> {
        match outcome {
            DeliveryOutcome::Delivered => None,
            DeliveryOutcome::Rejected { status } => Some(Self::SinkRejected {
                feedback_id: feedback_id.to_string(),
                status: *status,
            }),
            DeliveryOutcome::TransportFailed { reason } => Some(Self::SinkUnreachable {
                feedback_id: feedback_id.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn from_event(event: &DispatchEvent) -> Option<Self> {
        Self::from_outcome(&event.feedback_id, &event.outcome)
    }

    pub fn from_summary(status: &SummaryStatus) -> Option<Self> {
        match status {
            SummaryStatus::Unavailable { reason } => Some(Self::SummarizerUnavailable {
                reason: reason.clone(),
            }),
            SummaryStatus::NoData | SummaryStatus::Available { .. } => None,
        }
    }

    pub fn from_selection(filtered: &FilteredFeedback<'_>) -> Option<Self> {
        filtered.is_empty().then_some(Self::EmptySelection)
    }
}

impl fmt::Display for DashboardWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardWarning::SinkRejected {
                feedback_id,
                status,
            } => write!(f, "failed to send feedback {feedback_id} - status {status}"),
            DashboardWarning::SinkUnreachable {
                feedback_id,
                reason,
            } => write!(f, "error sending feedback {feedback_id}: {reason}"),
            DashboardWarning::SummarizerUnavailable { reason } => {
                write!(f, "AI summary not available ({reason})")
            }
            DashboardWarning::EmptySelection => {
                write!(f, "no feedback matches the selected priorities")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_map_to_sink_warnings() {
        assert!(DashboardWarning::from_outcome("FB-1", &DeliveryOutcome::Delivered).is_none());

        let rejected =
            DashboardWarning::from_outcome("FB-1", &DeliveryOutcome::Rejected { status: 404 })
                .expect("warning");
        assert_eq!(rejected.to_string(), "failed to send feedback FB-1 - status 404");

        let unreachable = DashboardWarning::from_outcome(
            "FB-2",
            &DeliveryOutcome::TransportFailed {
                reason: "timed out".to_string(),
            },
        )
        .expect("warning");
        assert!(matches!(
            unreachable,
            DashboardWarning::SinkUnreachable { .. }
        ));
    }

    #[test]
    fn only_unavailable_summaries_warn() {
        assert!(DashboardWarning::from_summary(&SummaryStatus::NoData).is_none());
        assert_eq!(
            DashboardWarning::from_summary(&SummaryStatus::Unavailable {
                reason: "quota".to_string()
            }),
            Some(DashboardWarning::SummarizerUnavailable {
                reason: "quota".to_string()
            })
        );
    }
}
