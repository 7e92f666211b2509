mod cli;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookmate::{AppState, config};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookmate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let args = cli::Cli::parse();

    // --profile wins over PROFILE from the environment
    let profile = args.profile.clone();
    let config = config::Config::from_lookup(|key| match key {
        "PROFILE" if profile.is_some() => profile.clone(),
        _ => std::env::var(key).ok(),
    });
    tracing::debug!(
        "Profile '{}', storage at {:?}",
        config.profile,
        config.storage_dir
    );

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli::run(args.command, &state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            cli::output::report(&failure);
            ExitCode::FAILURE
        }
    }
}
