//! redline - interactive terminal SQL client for MySQL and PostgreSQL
//!
//! Parses arguments, connects, and hands the terminal to the session loop.
//! The actual logic is in the library modules for better testability.

use anyhow::Result;
use clap::Parser;
use redline::app::App;
use redline::cli::Cli;
use redline::config::{Settings, load_settings};
use redline::db::DbClient;
use redline::history::QueryHistory;
use redline::logging;

/// Exit status for unusable arguments
const USAGE_EXIT: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings().unwrap_or_else(|e| {
        eprintln!("Ignoring settings: {}", e);
        Settings::default()
    });
    logging::init(&settings);

    let options = match cli.connection_options() {
        Ok(options) => options,
        Err(e) => usage_exit(&e),
    };
    if let Err(e) = options.validate() {
        usage_exit(&e);
    }

    tracing::info!(target = %options.display_name(), "connecting");
    let client = match DbClient::connect(options).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "connection failed");
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let history = QueryHistory::load(settings.history_size.max(1), settings.save_history);
    let mut app = App::new(client, history);
    let outcome = app.run().await;
    app.shutdown().await;
    outcome?;

    Ok(())
}

fn usage_exit(err: &dyn std::error::Error) -> ! {
    eprintln!(
        "Unable to proceed with specified arguments: \n{}\n\n{}",
        err,
        Cli::usage()
    );
    std::process::exit(USAGE_EXIT);
}
