//! tinylink server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API (default)
//! tinylink
//! tinylink serve
//!
//! # Delete expired links once and exit, e.g. from cron
//! tinylink sweep
//! ```
//!
//! Configuration comes from the environment (and `.env`); see [`tinylink::config`].

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tinylink::config::{self, Config};
use tinylink::server;

/// URL shortener with cache-backed redirects.
#[derive(Parser)]
#[command(name = "tinylink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Delete expired links once and exit
    Sweep,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            config.print_summary();
            server::run(config).await
        }
        Commands::Sweep => {
            let removed = server::sweep_once(config).await?;
            tracing::info!(removed, "Expired links swept");
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.log_format == "json" {
        builder.json().with_current_span(true).init();
    } else {
        builder.init();
    }
}
