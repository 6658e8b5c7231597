use crate::cli::ServeArgs;
use crate::infra::{load_dataset, run_blocking, AppState, FeedbackState};
use crate::routes::feedback_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use feedback_iq::config::AppConfig;
use feedback_iq::error::AppError;
use feedback_iq::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(dataset) = args.dataset.take() {
        config.dataset.path = dataset;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let dataset_path = config.dataset.path.clone();
    let dataset = run_blocking(move || load_dataset(&dataset_path)).await?;
    let feedback_state = FeedbackState {
        dataset: Arc::new(dataset),
        dispatch: config.dispatch.clone(),
        summarizer: config.summarizer.clone(),
    };

    let app = feedback_routes()
        .layer(Extension(feedback_state))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        sink_configured = config.dispatch.sink_url.is_some(),
        summarizer_configured = config.summarizer.api_key.is_some(),
        "feedback intelligence service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
