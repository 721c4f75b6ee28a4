//! One-shot pipeline binary.
//!
//! Reads configuration from the environment (a `.env` file is honored when
//! present), runs the pipeline once, and exits zero on completion -
//! including the "nothing to do" paths - or non-zero on any error.

use pdfwatch::WatchConfig;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match WatchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, category = %e.category(), "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    match pdfwatch::run(&config).await {
        Ok(summary) => {
            info!(
                messages = summary.messages,
                documents = summary.documents,
                matches = summary.matches,
                notified = summary.notified,
                "Pipeline run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.operation() {
                Some(operation) => {
                    error!(error = %e, category = %e.category(), operation, "Pipeline run failed");
                }
                None => {
                    error!(error = %e, category = %e.category(), "Pipeline run failed");
                }
            }
            ExitCode::FAILURE
        }
    }
}
