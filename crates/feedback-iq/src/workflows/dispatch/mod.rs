//! Relays feedback records to an external sink, one at a time, with per-item outcomes.

mod sink;
mod webhook;

pub use sink::{DispatchPayload, FeedbackSink, SinkError};
pub use webhook::{WebhookSink, DEFAULT_SINK_TIMEOUT};

use crate::workflows::feedback::FeedbackRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_DISPATCH_PAUSE: Duration = Duration::from_millis(300);
const SUCCESS_STATUS: u16 = 200;

/// Result of one delivery attempt. Always a value, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Rejected { status: u16 },
    TransportFailed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::Rejected { .. } => "Rejected",
            Self::TransportFailed { .. } => "Transport failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchEvent {
    /// Zero-based position in the bulk input.
    pub position: usize,
    pub feedback_id: String,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchTally {
    pub delivered: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl DispatchTally {
    pub fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Rejected { .. } => self.rejected += 1,
            DeliveryOutcome::TransportFailed { .. } => self.failed += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.delivered + self.rejected + self.failed
    }
}

/// Cooperative stop signal for a bulk dispatch, checked between items.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Payloads a bulk dispatch over `records` would send. Never contacts a sink.
pub fn preview<'r, I>(records: I) -> Vec<DispatchPayload>
where
    I: IntoIterator<Item = &'r FeedbackRecord>,
{
    records.into_iter().map(DispatchPayload::from).collect()
}

#[derive(Debug)]
pub struct Dispatcher<S> {
    sink: S,
    pause: Duration,
}

impl<S: FeedbackSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pause: DEFAULT_DISPATCH_PAUSE,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Sends one record. Sending the same record twice delivers it twice.
    pub fn dispatch(&self, record: &FeedbackRecord) -> DeliveryOutcome {
        let payload = DispatchPayload::from(record);
        let outcome = match self.sink.post(&payload) {
            Ok(SUCCESS_STATUS) => DeliveryOutcome::Delivered,
            Ok(status) => DeliveryOutcome::Rejected { status },
            Err(err) => DeliveryOutcome::TransportFailed {
                reason: err.to_string(),
            },
        };

        match &outcome {
            DeliveryOutcome::Delivered => {
                info!(feedback_id = %record.feedback_id, "feedback delivered to sink")
            }
            DeliveryOutcome::Rejected { status } => {
                warn!(feedback_id = %record.feedback_id, status, "sink rejected feedback")
            }
            DeliveryOutcome::TransportFailed { reason } => {
                warn!(feedback_id = %record.feedback_id, %reason, "sink unreachable")
            }
        }

        outcome
    }

    /// Lazily sends every record in order, pausing between consecutive sends.
    pub fn dispatch_all<'d, 'r, I>(&'d self, records: I) -> DispatchRun<'d, S, I::IntoIter>
    where
        I: IntoIterator<Item = &'r FeedbackRecord>,
    {
        DispatchRun {
            dispatcher: self,
            records: records.into_iter(),
            position: 0,
            tally: DispatchTally::default(),
            cancel: None,
        }
    }
}

/// Iterator of [`DispatchEvent`]s produced by [`Dispatcher::dispatch_all`].
///
/// Each call to `next` performs at most one sink request. Dropping the run, or cancelling
/// its token, stops further sends; there is no resume.
#[derive(Debug)]
pub struct DispatchRun<'d, S, I> {
    dispatcher: &'d Dispatcher<S>,
    records: I,
    position: usize,
    tally: DispatchTally,
    cancel: Option<CancellationToken>,
}

impl<'d, S, I> DispatchRun<'d, S, I> {
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn tally(&self) -> DispatchTally {
        self.tally
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(CancellationToken::is_cancelled)
            .unwrap_or(false)
    }
}

impl<'d, 'r, S, I> Iterator for DispatchRun<'d, S, I>
where
    S: FeedbackSink,
    I: Iterator<Item = &'r FeedbackRecord>,
{
    type Item = DispatchEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancelled() {
            return None;
        }
        let record = self.records.next()?;

        if self.position > 0 && !self.dispatcher.pause.is_zero() {
            std::thread::sleep(self.dispatcher.pause);
            if self.cancelled() {
                info!(
                    sent = self.position,
                    "bulk dispatch cancelled before completion"
                );
                return None;
            }
        }

        let attempted_at = Utc::now();
        let outcome = self.dispatcher.dispatch(record);
        self.tally.record(&outcome);

        let event = DispatchEvent {
            position: self.position,
            feedback_id: record.feedback_id.clone(),
            outcome,
            attempted_at,
        };
        self.position += 1;
        Some(event)
    }
}
