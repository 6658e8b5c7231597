mod cli;
mod commands;
mod dispatch_stream;
mod infra;
mod routes;
mod server;

use feedback_iq::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
