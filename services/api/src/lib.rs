mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use hotel_onboard::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
