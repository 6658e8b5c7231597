use crate::infra::{build_dispatcher, build_summarizer, load_dataset, parse_selection, run_blocking};
use clap::Args;
use feedback_iq::config::AppConfig;
use feedback_iq::error::AppError;
use feedback_iq::telemetry;
use feedback_iq::workflows::dispatch::{self, CancellationToken, DeliveryOutcome};
use feedback_iq::workflows::feedback::{
    AnalyticsView, DatasetOverview, FeedbackDataset, FeedbackRecord, FilteredFeedback,
    InsightsView, PriorityListEntry, PrioritySelection,
};
use feedback_iq::workflows::summarizer::{summarize_feedback, Summarizer, SummaryStatus};
use feedback_iq::workflows::DashboardWarning;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug, Default)]
pub(crate) struct SelectionArgs {
    /// Feedback CSV to read. Defaults to FEEDBACK_DATASET.
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
    /// Comma separated priority levels. Defaults to CRITICAL,HIGH,MEDIUM.
    #[arg(long, value_parser = parse_selection)]
    pub(crate) priority: Option<PrioritySelection>,
    /// Order records by priority score, highest first.
    #[arg(long)]
    pub(crate) rank: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    pub(crate) selection: SelectionArgs,
    /// Include sentiment, urgency and AI summary for each record.
    #[arg(long)]
    pub(crate) details: bool,
    /// Ask the configured chat completion API for a summary.
    #[arg(long)]
    pub(crate) summarize: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) selection: SelectionArgs,
    /// Destination file. Writes to stdout when omitted.
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DispatchArgs {
    #[command(flatten)]
    pub(crate) selection: SelectionArgs,
    /// Send a single record from the selection.
    #[arg(long)]
    pub(crate) id: Option<String>,
    /// List the payloads without contacting the sink.
    #[arg(long)]
    pub(crate) dry_run: bool,
}

struct Session {
    config: AppConfig,
    dataset: FeedbackDataset,
    selection: PrioritySelection,
}

fn prepare(args: SelectionArgs) -> Result<Session, AppError> {
    let SelectionArgs {
        dataset,
        priority,
        rank,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(path) = dataset {
        config.dataset.path = path;
    }
    telemetry::init(&config.telemetry)?;

    let mut dataset = load_dataset(&config.dataset.path)?;
    if rank {
        dataset = dataset.ranked_by_score();
    }

    Ok(Session {
        config,
        dataset,
        selection: priority.unwrap_or_default(),
    })
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    run_blocking(move || report(args)).await
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    run_blocking(move || export(args)).await
}

pub(crate) async fn run_dispatch(args: DispatchArgs) -> Result<(), AppError> {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current record");
            signal_token.cancel();
        }
    });

    run_blocking(move || dispatch(args, token)).await
}

fn report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        selection,
        details,
        summarize,
    } = args;
    let session = prepare(selection)?;
    let filtered = session.dataset.filter(&session.selection);

    render_header(
        &session.config.dataset.path,
        &session.dataset.overview(),
        &filtered,
    );
    render_priority_list(&filtered.priority_list(details));
    render_analytics(&filtered.analytics());
    render_insights(&filtered.insights());

    let mut warnings: Vec<DashboardWarning> =
        DashboardWarning::from_selection(&filtered).into_iter().collect();
    if summarize {
        let summarizer = build_summarizer(&session.config.summarizer);
        let status = summarize_feedback(
            summarizer.as_ref().map(|client| client as &dyn Summarizer),
            &filtered,
        );
        render_summary(&status);
        warnings.extend(DashboardWarning::from_summary(&status));
    }
    render_warnings(&warnings);

    Ok(())
}

fn export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs { selection, output } = args;
    let session = prepare(selection)?;
    let filtered = session.dataset.filter(&session.selection);

    match output {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            filtered.write_csv(file)?;
            info!(path = %path.display(), records = filtered.len(), "feedback exported");
            println!(
                "Exported {} feedback records ({}) to {}",
                filtered.len(),
                filtered.selection(),
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            filtered.write_csv(stdout.lock())?;
        }
    }

    Ok(())
}

fn dispatch(args: DispatchArgs, token: CancellationToken) -> Result<(), AppError> {
    let DispatchArgs {
        selection,
        id,
        dry_run,
    } = args;
    let session = prepare(selection)?;
    let filtered = session.dataset.filter(&session.selection);

    let targets: Vec<&FeedbackRecord> = match id {
        Some(id) => vec![filtered
            .find(&id)
            .ok_or(AppError::UnknownFeedback(id))?],
        None => filtered.records().to_vec(),
    };

    if dry_run {
        println!(
            "Dry run: {} feedback records would be sent ({})",
            targets.len(),
            filtered.selection()
        );
        for payload in dispatch::preview(targets.iter().copied()) {
            println!(
                "- {} | {} | {} | {} | {}",
                payload.feedback_id,
                payload.priority,
                format_score(payload.score),
                payload.category,
                payload.text
            );
        }
        return Ok(());
    }

    let dispatcher = build_dispatcher(&session.config.dispatch)?;
    let total = targets.len();
    println!(
        "Dispatching {} feedback records to {}",
        total,
        dispatcher.sink().url()
    );

    let mut run = dispatcher
        .dispatch_all(targets.iter().copied())
        .with_cancellation(token.clone());
    let mut warnings: Vec<DashboardWarning> =
        DashboardWarning::from_selection(&filtered).into_iter().collect();
    for event in run.by_ref() {
        println!(
            "[{}/{}] {} -> {}",
            event.position + 1,
            total,
            event.feedback_id,
            describe_outcome(&event.outcome)
        );
        std::io::stdout().flush()?;
        warnings.extend(DashboardWarning::from_event(&event));
    }

    let tally = run.tally();
    if token.is_cancelled() && tally.attempted() < total {
        println!(
            "Dispatch cancelled after {} of {} records",
            tally.attempted(),
            total
        );
    }
    println!(
        "Delivered {} | rejected {} | failed {}",
        tally.delivered, tally.rejected, tally.failed
    );
    render_warnings(&warnings);

    Ok(())
}

fn render_header(path: &Path, overview: &DatasetOverview, filtered: &FilteredFeedback<'_>) {
    println!("FeedbackIQ feedback intelligence report");
    println!(
        "Dataset: {} ({} records | {} critical | {} high priority)",
        path.display(),
        overview.total,
        overview.critical,
        overview.high
    );
    println!(
        "Selection: {} -> {} matching records",
        filtered.selection(),
        filtered.len()
    );
}

fn render_priority_list(entries: &[PriorityListEntry]) {
    println!("\nPriority list");
    if entries.is_empty() {
        println!("- No feedback matches the selected priority levels");
        return;
    }
    for entry in entries {
        println!(
            "- {} | {} | {} | {} | {}",
            entry.feedback_id,
            entry.priority_level,
            format_score(entry.priority_score),
            entry.category,
            entry.original_text
        );
        if let Some(detail) = &entry.detail {
            println!(
                "    sentiment {} | urgency {} | summary: {}",
                detail.sentiment.as_deref().unwrap_or("n/a"),
                detail.urgency.as_deref().unwrap_or("n/a"),
                detail.ai_summary
            );
        }
    }
}

fn render_analytics(analytics: &AnalyticsView) {
    for line in analytics_lines(analytics) {
        println!("{line}");
    }
}

fn analytics_lines(analytics: &AnalyticsView) -> Vec<String> {
    if analytics.is_empty() {
        return vec!["\nAnalytics: no data for the selected priorities".to_string()];
    }
    let mut lines = vec!["\nPriority distribution".to_string()];
    for entry in &analytics.priority_distribution {
        lines.push(format!("- {}: {}", entry.level, entry.count));
    }
    lines.push("Category breakdown".to_string());
    for share in &analytics.category_distribution {
        lines.push(format!(
            "- {}: {} ({:.2}%)",
            share.category, share.count, share.percentage
        ));
    }
    lines
}

fn render_insights(insights: &InsightsView) {
    for line in insights_lines(insights) {
        println!("{line}");
    }
}

fn insights_lines(insights: &InsightsView) -> Vec<String> {
    let Some(insights) = insights.ready() else {
        return vec!["\nKey insights: no data for the selected priorities".to_string()];
    };
    let mut lines = vec![
        "\nKey insights".to_string(),
        format!("- Total feedback analyzed: {}", insights.total),
        format!("- Critical issues: {}", insights.critical_count),
        format!("- Most common category: {}", insights.most_common_category),
        format!("Top {} priorities:", insights.top_priorities.len()),
    ];
    for top in &insights.top_priorities {
        lines.push(format!("  {}. {} - {}", top.rank, top.feedback_id, top.excerpt));
    }
    lines
}

fn render_summary(status: &SummaryStatus) {
    match status {
        SummaryStatus::NoData => {}
        SummaryStatus::Available { summary } => {
            println!("\nAI insights");
            println!("{summary}");
        }
        SummaryStatus::Unavailable { .. } => {
            println!("\nAI insights");
            println!("AI summary not available");
        }
    }
}

fn render_warnings(warnings: &[DashboardWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

fn describe_outcome(outcome: &DeliveryOutcome) -> String {
    match outcome {
        DeliveryOutcome::Delivered => outcome.label().to_string(),
        DeliveryOutcome::Rejected { status } => format!("{} (status {status})", outcome.label()),
        DeliveryOutcome::TransportFailed { reason } => format!("{} ({reason})", outcome.label()),
    }
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|score| format!("{score:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedback_iq::workflows::feedback::FeedbackLoader;

    #[test]
    fn outcomes_describe_their_cause() {
        assert_eq!(describe_outcome(&DeliveryOutcome::Delivered), "Delivered");
        assert_eq!(
            describe_outcome(&DeliveryOutcome::Rejected { status: 502 }),
            "Rejected (status 502)"
        );
        assert_eq!(
            describe_outcome(&DeliveryOutcome::TransportFailed {
                reason: "timed out".to_string()
            }),
            "Transport failed (timed out)"
        );
    }

    #[test]
    fn empty_views_render_a_no_data_state() {
        let insights = insights_lines(&InsightsView::NoData);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].contains("Key insights: no data"));

        let analytics = analytics_lines(&AnalyticsView::default());
        assert_eq!(analytics.len(), 1);
        assert!(analytics[0].contains("no data"));
    }

    #[test]
    fn ready_insights_list_top_priorities() {
        let dataset = FeedbackLoader::from_reader(
            "feedback_id,original_text,category,priority_level\nFB-1,Checkout broken,Billing,CRITICAL\n"
                .as_bytes(),
        )
        .expect("dataset loads");
        let filtered = dataset.filter(&PrioritySelection::default());

        let lines = insights_lines(&filtered.insights());
        assert!(lines.iter().any(|line| line == "- Most common category: Billing"));
        assert!(lines.iter().any(|line| line == "  1. FB-1 - Checkout broken"));
        assert_eq!(analytics_lines(&filtered.analytics())[1], "- CRITICAL: 1");
    }

    #[test]
    fn missing_scores_render_as_not_available() {
        assert_eq!(format_score(Some(9.456)), "9.46");
        assert_eq!(format_score(None), "n/a");
    }
}
