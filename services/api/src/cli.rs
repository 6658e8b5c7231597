use crate::commands::{run_dispatch, run_export, run_report, DispatchArgs, ExportArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use feedback_iq::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "FeedbackIQ",
    about = "Serve, report on, export and dispatch prioritized customer feedback",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the priority list, analytics and insights for a selection
    Report(ReportArgs),
    /// Write the filtered records as CSV
    Export(ExportArgs),
    /// Send filtered records to the configured webhook sink
    Dispatch(DispatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured feedback CSV path
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Export(args) => run_export(args).await,
        Command::Dispatch(args) => run_dispatch(args).await,
    }
}
