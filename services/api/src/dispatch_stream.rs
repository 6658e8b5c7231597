use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use feedback_iq::workflows::dispatch::{CancellationToken, DispatchTally, Dispatcher, FeedbackSink};
use feedback_iq::workflows::feedback::FeedbackRecord;
use feedback_iq::workflows::DashboardWarning;
use serde::Serialize;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

const STREAM_BUFFER: usize = 16;

/// Last NDJSON line of a streamed dispatch.
#[derive(Debug, Serialize)]
pub(crate) struct DispatchSummary {
    pub(crate) tally: DispatchTally,
    pub(crate) cancelled: bool,
    pub(crate) warnings: Vec<DashboardWarning>,
}

/// Cancels the dispatch once the response body is dropped, e.g. when the client disconnects.
struct CancelOnDrop<S> {
    inner: S,
    token: CancellationToken,
}

impl<S: Stream + Unpin> Stream for CancelOnDrop<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl<S> Drop for CancelOnDrop<S> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Sends `records` on a blocking thread and streams one `DispatchEvent` per line as each
/// send completes, followed by a [`DispatchSummary`] line.
pub(crate) fn stream_dispatch<S>(
    dispatcher: Dispatcher<S>,
    records: Vec<FeedbackRecord>,
    mut warnings: Vec<DashboardWarning>,
) -> Response
where
    S: FeedbackSink + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(STREAM_BUFFER);
    let token = CancellationToken::new();
    let run_token = token.clone();

    tokio::task::spawn_blocking(move || {
        let mut run = dispatcher
            .dispatch_all(&records)
            .with_cancellation(run_token.clone());

        for event in run.by_ref() {
            warnings.extend(DashboardWarning::from_event(&event));
            if tx.blocking_send(ndjson_line(&event)).is_err() {
                run_token.cancel();
                break;
            }
        }

        let tally = run.tally();
        let cancelled = run_token.is_cancelled() && tally.attempted() < records.len();
        if cancelled {
            warn!(
                sent = tally.attempted(),
                total = records.len(),
                "dispatch stream closed by client"
            );
        } else {
            info!(
                delivered = tally.delivered,
                rejected = tally.rejected,
                failed = tally.failed,
                "dispatch stream finished"
            );
        }

        let summary = DispatchSummary {
            tally,
            cancelled,
            warnings,
        };
        let _ = tx.blocking_send(ndjson_line(&summary));
    });

    let body = CancelOnDrop {
        inner: ReceiverStream::new(rx),
        token,
    }
    .map(Ok::<String, Infallible>);

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(body),
    )
        .into_response()
}

fn ndjson_line<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(mut line) => {
            line.push('\n');
            line
        }
        Err(err) => format!("{}\n", serde_json::json!({ "error": err.to_string() })),
    }
}
