//! cinesea binary entrypoint kept minimal. The runtime lives in `app`.

use std::sync::OnceLock;

use clap::Parser;

use cinesea::{app, config};

/// Movie discovery client: incremental search, filters, and an offline
/// favorites ledger.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// TMDB API key (overrides CINESEA_API_KEY and settings.toml).
    #[arg(long)]
    api_key: Option<String>,

    /// Skip the catalog entirely; favorites, recent searches, and settings
    /// remain available from local state.
    #[arg(long)]
    offline: bool,
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

fn init_logging() {
    let mut log_path = config::logs_dir();
    log_path.push("cinesea.log");
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            // Fallback: stderr logger so startup never blocks on the log file.
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = Args::parse();
    tracing::info!("cinesea starting");
    if let Err(err) = app::run(args.api_key, args.offline).await {
        tracing::error!(error = %err, "application error");
        eprintln!("cinesea hit a problem it could not recover from: {err}");
        eprintln!("your favorites and settings are safe; restart to try again");
        std::process::exit(1);
    }
    tracing::info!("cinesea exited");
}
