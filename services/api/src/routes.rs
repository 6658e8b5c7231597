use crate::dispatch_stream::stream_dispatch;
use crate::infra::{
    build_dispatcher, build_summarizer, deserialize_optional_selection, run_blocking, AppState,
    FeedbackState,
};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use feedback_iq::error::AppError;
use feedback_iq::workflows::dispatch::{self, DispatchPayload, Dispatcher, WebhookSink};
use feedback_iq::workflows::feedback::{
    AnalyticsView, DatasetOverview, FeedbackDataset, FeedbackLoader, FeedbackRecord,
    InsightsView, PriorityListEntry, PrioritySelection, EXPORT_FILE_NAME,
};
use feedback_iq::workflows::summarizer::{summarize_feedback, Summarizer, SummaryStatus};
use feedback_iq::workflows::DashboardWarning;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(default, deserialize_with = "deserialize_optional_selection")]
    pub(crate) priorities: Option<PrioritySelection>,
    /// Inline CSV replacing the configured dataset for this request.
    #[serde(default)]
    pub(crate) csv: Option<String>,
    #[serde(default)]
    pub(crate) rank_by_score: bool,
    #[serde(default)]
    pub(crate) include_details: bool,
    #[serde(default)]
    pub(crate) summarize: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) overview: DatasetOverview,
    pub(crate) selection: PrioritySelection,
    pub(crate) matched: usize,
    pub(crate) priority_list: Vec<PriorityListEntry>,
    pub(crate) analytics: AnalyticsView,
    pub(crate) insights: InsightsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) summary: Option<SummaryStatus>,
    pub(crate) warnings: Vec<DashboardWarning>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportRequest {
    #[serde(default, deserialize_with = "deserialize_optional_selection")]
    pub(crate) priorities: Option<PrioritySelection>,
    #[serde(default)]
    pub(crate) csv: Option<String>,
    #[serde(default)]
    pub(crate) rank_by_score: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DispatchRequest {
    #[serde(default, deserialize_with = "deserialize_optional_selection")]
    pub(crate) priorities: Option<PrioritySelection>,
    /// Send only this record; it must be part of the filtered selection.
    #[serde(default)]
    pub(crate) feedback_id: Option<String>,
    #[serde(default)]
    pub(crate) dry_run: bool,
}

/// Body of a dry run. Real sends stream NDJSON instead, see [`stream_dispatch`].
#[derive(Debug, Serialize)]
pub(crate) struct DispatchPreview {
    pub(crate) dry_run: bool,
    pub(crate) preview: Vec<DispatchPayload>,
    pub(crate) warnings: Vec<DashboardWarning>,
}

enum DispatchPlan {
    Preview(DispatchPreview),
    Send {
        dispatcher: Dispatcher<WebhookSink>,
        records: Vec<FeedbackRecord>,
        warnings: Vec<DashboardWarning>,
    },
}

pub(crate) fn feedback_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/feedback/report",
            axum::routing::post(feedback_report_endpoint),
        )
        .route(
            "/api/v1/feedback/export",
            axum::routing::post(feedback_export_endpoint),
        )
        .route(
            "/api/v1/feedback/dispatch",
            axum::routing::post(feedback_dispatch_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn feedback_report_endpoint(
    Extension(state): Extension<FeedbackState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    let response = run_blocking(move || build_report(&state, payload)).await?;
    Ok(Json(response))
}

pub(crate) async fn feedback_export_endpoint(
    Extension(state): Extension<FeedbackState>,
    Json(payload): Json<ExportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ExportRequest {
        priorities,
        csv,
        rank_by_score,
    } = payload;

    let dataset = resolve_dataset(&state, csv, rank_by_score)?;
    let selection = priorities.unwrap_or_default();
    let body = dataset.filter(&selection).to_csv_bytes()?;
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub(crate) async fn feedback_dispatch_endpoint(
    Extension(state): Extension<FeedbackState>,
    Json(payload): Json<DispatchRequest>,
) -> Result<Response, AppError> {
    match run_blocking(move || plan_dispatch(&state, payload)).await? {
        DispatchPlan::Preview(preview) => Ok(Json(preview).into_response()),
        DispatchPlan::Send {
            dispatcher,
            records,
            warnings,
        } => Ok(stream_dispatch(dispatcher, records, warnings)),
    }
}

fn resolve_dataset(
    state: &FeedbackState,
    csv: Option<String>,
    rank_by_score: bool,
) -> Result<Arc<FeedbackDataset>, AppError> {
    let dataset = match csv {
        Some(csv) => Arc::new(FeedbackLoader::from_reader(Cursor::new(csv.into_bytes()))?),
        None => state.dataset.clone(),
    };

    if rank_by_score {
        Ok(Arc::new(dataset.ranked_by_score()))
    } else {
        Ok(dataset)
    }
}

fn build_report(state: &FeedbackState, payload: ReportRequest) -> Result<ReportResponse, AppError> {
    let ReportRequest {
        priorities,
        csv,
        rank_by_score,
        include_details,
        summarize,
    } = payload;

    let dataset = resolve_dataset(state, csv, rank_by_score)?;
    let selection = priorities.unwrap_or_default();
    let filtered = dataset.filter(&selection);

    let mut warnings: Vec<DashboardWarning> =
        DashboardWarning::from_selection(&filtered).into_iter().collect();

    let summary = if summarize {
        let summarizer = build_summarizer(&state.summarizer);
        let status = summarize_feedback(
            summarizer.as_ref().map(|client| client as &dyn Summarizer),
            &filtered,
        );
        warnings.extend(DashboardWarning::from_summary(&status));
        Some(status)
    } else {
        None
    };

    Ok(ReportResponse {
        overview: dataset.overview(),
        matched: filtered.len(),
        priority_list: filtered.priority_list(include_details),
        analytics: filtered.analytics(),
        insights: filtered.insights(),
        selection,
        summary,
        warnings,
    })
}

/// Resolves targets and builds the sink up front so lookup and configuration errors
/// still map to status codes before any streaming starts.
fn plan_dispatch(state: &FeedbackState, payload: DispatchRequest) -> Result<DispatchPlan, AppError> {
    let DispatchRequest {
        priorities,
        feedback_id,
        dry_run,
    } = payload;

    let selection = priorities.unwrap_or_default();
    let filtered = state.dataset.filter(&selection);
    let targets: Vec<&FeedbackRecord> = match feedback_id {
        Some(id) => vec![filtered
            .find(&id)
            .ok_or(AppError::UnknownFeedback(id))?],
        None => filtered.records().to_vec(),
    };
    let warnings: Vec<DashboardWarning> =
        DashboardWarning::from_selection(&filtered).into_iter().collect();

    if dry_run {
        return Ok(DispatchPlan::Preview(DispatchPreview {
            dry_run,
            preview: dispatch::preview(targets.iter().copied()),
            warnings,
        }));
    }

    Ok(DispatchPlan::Send {
        dispatcher: build_dispatcher(&state.dispatch)?,
        records: targets.into_iter().cloned().collect(),
        warnings,
    })
}
