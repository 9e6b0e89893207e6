mod session;
mod sweep;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use varredor_core::AccessGate;

#[derive(Debug, Parser)]
#[command(name = "varredor-cli")]
#[command(about = "Sweep a location for restaurants and rank them by weighted rating")]
struct Cli {
    /// Shared access passkey. Prompted for on stdin when absent.
    #[arg(long, global = true, env = "VARREDOR_PASSKEY", hide_env_values = true)]
    passkey: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every grid cell of a location and rank what was found
    Sweep(SweepArgs),
}

#[derive(Debug, Args)]
struct SweepArgs {
    /// City or address to sweep, e.g. "Lisboa, Portugal"
    location: String,

    /// Grid spacing in kilometres (default from VARREDOR_GRID_STEP_KM)
    #[arg(long)]
    step_km: Option<f64>,

    /// Search radius per cell in metres (default from VARREDOR_SEARCH_RADIUS_METERS)
    #[arg(long)]
    radius: Option<u32>,

    /// Search text (default from VARREDOR_SEARCH_QUERY)
    #[arg(long)]
    query: Option<String>,

    /// Write restaurants_<slug>.csv
    #[arg(long)]
    csv: bool,

    /// Write restaurants_<slug>.xlsx
    #[arg(long)]
    xlsx: bool,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Append the results to the configured spreadsheet document
    #[arg(long)]
    upload: bool,

    /// How many places to print in the summary
    #[arg(long, default_value_t = 10)]
    top: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = varredor_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let gate = AccessGate::new(config.access_passkey.clone());
    let passkey = match cli.passkey {
        Some(passkey) => passkey,
        None => prompt_passkey()?,
    };
    if !gate.verify(&passkey) {
        anyhow::bail!("access denied: passkey does not match");
    }

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    match cli.command {
        Commands::Sweep(args) => sweep::run_sweep(&config, &args, &cancel).await,
    }
}

fn prompt_passkey() -> anyhow::Result<String> {
    eprint!("passkey: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Cancels `token` on Ctrl-C or, on Unix, SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::warn!("interrupt received; cancelling sweep");
    token.cancel();
}
