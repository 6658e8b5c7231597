use feedback_iq::config::{DispatchConfig, SummarizerConfig};
use feedback_iq::error::AppError;
use feedback_iq::workflows::dispatch::{Dispatcher, WebhookSink};
use feedback_iq::workflows::feedback::{FeedbackDataset, FeedbackLoader, PrioritySelection};
use feedback_iq::workflows::summarizer::ChatCompletionSummarizer;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Dataset and outbound integrations shared by the feedback routes.
#[derive(Debug, Clone)]
pub(crate) struct FeedbackState {
    pub(crate) dataset: Arc<FeedbackDataset>,
    pub(crate) dispatch: DispatchConfig,
    pub(crate) summarizer: SummarizerConfig,
}

pub(crate) fn load_dataset(path: &Path) -> Result<FeedbackDataset, AppError> {
    let dataset = FeedbackLoader::from_path(path)?;
    let overview = dataset.overview();
    info!(
        path = %path.display(),
        total = overview.total,
        critical = overview.critical,
        high = overview.high,
        "feedback dataset loaded"
    );
    Ok(dataset)
}

/// Builds the HTTP sink. Must not run on an async worker thread.
pub(crate) fn build_dispatcher(config: &DispatchConfig) -> Result<Dispatcher<WebhookSink>, AppError> {
    let url = config.sink_url.as_deref().ok_or(AppError::SinkNotConfigured)?;
    let sink = WebhookSink::new(url, config.timeout)?;
    Ok(Dispatcher::new(sink).with_pause(config.pause))
}

/// Builds the chat client when a key is configured. Must not run on an async worker thread.
pub(crate) fn build_summarizer(config: &SummarizerConfig) -> Option<ChatCompletionSummarizer> {
    let api_key = config.api_key.as_deref()?;
    match ChatCompletionSummarizer::new(&config.endpoint, &config.model, api_key, config.timeout) {
        Ok(summarizer) => Some(summarizer),
        Err(err) => {
            warn!(error = %err, "summarizer client could not be built");
            None
        }
    }
}

/// Runs sync work that may block (reqwest blocking clients, file IO) off the async workers.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AppError::Background(err.to_string()))?
}

pub(crate) fn parse_selection(raw: &str) -> Result<PrioritySelection, String> {
    PrioritySelection::parse_list(raw).map_err(|err| err.to_string())
}

pub(crate) fn deserialize_optional_selection<'de, D>(
    deserializer: D,
) -> Result<Option<PrioritySelection>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<Vec<String>>::deserialize(deserializer)?;
    opt.map(|levels| {
        levels
            .iter()
            .map(|level| level.parse())
            .collect::<Result<PrioritySelection, _>>()
            .map_err(serde::de::Error::custom)
    })
    .transpose()
}
