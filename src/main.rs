//! LabBooker server.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌────────────────────────────────────────────────┐
//!                  │                   LABBOOKER                    │
//!   HTTP request   │  ┌────────┐   ┌──────────┐   ┌─────────────┐  │
//!  ────────────────┼─▶│  http  │──▶│ handlers │──▶│  bookings   │  │
//!                  │  │ server │   │          │   │  service    │  │
//!                  │  └────────┘   └────┬─────┘   └──────┬──────┘  │
//!                  │                    │                │         │
//!                  │                    ▼                ▼         │
//!                  │              ┌──────────┐    ┌────────────┐   │
//!                  │              │  issues  │    │   rules    │   │
//!                  │              │  store   │    │ evaluator  │   │
//!                  │              └──────────┘    └─────┬──────┘   │
//!                  │                                    ▼          │
//!                  │                             ┌────────────┐    │
//!                  │                             │   policy   │    │
//!                  │                             │   store    │    │
//!                  │                             └────────────┘    │
//!                  │  config · observability · lifecycle            │
//!                  └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use labbooker::config::{load_or_default, LoadedConfig};
use labbooker::lifecycle::startup;
use labbooker::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "labbooker")]
#[command(about = "Lab and study room booking server", long_about = None)]
struct Args {
    /// Path to the TOML server configuration.
    #[arg(short, long, env = "LABBOOKER_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let LoadedConfig { config, missing_path } = load_or_default(args.config.as_deref())?;

    init_logging(&config.observability);
    tracing::info!("labbooker v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = missing_path {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
    }

    startup::start(config).await?;
    Ok(())
}
