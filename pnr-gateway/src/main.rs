mod config;
mod logging;
mod statsd;

use clap::{Args, Parser};
use config::{Config, ConfigError};
use pnr_status::PnrQuery;
use pnr_status::pnr::ValidationError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pnr-gateway", about = "HTTP gateway for railway PNR status checks")]
enum CliCommand {
    /// Serve POST /check-pnr
    Run(RunArgs),
    /// Print the partner API ciphertext for a PNR
    Encrypt { pnr: String },
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, short, default_value = "pnr-gateway.yaml")]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    #[error(transparent)]
    Metrics(#[from] statsd::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Gateway(#[from] pnr_status::RunError),
    #[error(transparent)]
    InvalidPnr(#[from] ValidationError),
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    let result = match cli {
        CliCommand::Run(args) => run(args),
        CliCommand::Encrypt { pnr } => encrypt(&pnr),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pnr-gateway exited with an error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let mut config = Config::from_file(&args.config)?;
    config.finalize(std::env::var("PORT").ok().as_deref())?;

    // Held until the server stops so pending events are flushed.
    let _sentry = logging::init(&config.common.logging)?;

    if let Some(metrics_config) = &config.common.metrics {
        statsd::init(metrics_config)?;
    }

    tracing::info!(config = %args.config.display(), "Starting pnr-gateway");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(pnr_status::run(config.gateway, shutdown_signal()))?;

    Ok(())
}

fn encrypt(raw: &str) -> Result<(), CliError> {
    let pnr = PnrQuery::parse(raw)?;
    println!("{}", pnr_status::crypto::encrypt(pnr.as_str()));
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
