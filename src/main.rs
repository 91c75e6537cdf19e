//! Itch-Gleaner main entry point
//!
//! Thin command dispatch over the library: each subcommand maps to one
//! crawl-and-claim pass.

use clap::{Parser, Subcommand};
use itch_gleaner::claim::{run_claim_url, run_free_pass};
use itch_gleaner::config::load_config;
use itch_gleaner::crawler::{run_reward_pass, run_sale_pass};
use itch_gleaner::report::run_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Itch-Gleaner: automated claiming of free itch.io promotions
#[derive(Parser, Debug)]
#[command(name = "itch-gleaner")]
#[command(version)]
#[command(about = "Claims free community copies and 100%-off sales", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the next segment of the sale-id space and claim members
    Sales,

    /// Crawl creator profiles and collections for community copies
    Rewards,

    /// Claim everything on the remote free-games feed
    ClaimFree,

    /// Claim a single game by URL
    ClaimUrl {
        /// Store page URL of the game
        url: String,
    },

    /// Rebuild the sale-grouped reports from segment logs
    Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Sales => run_sale_pass(&config).await?,
        Command::Rewards => run_reward_pass(&config).await?,
        Command::ClaimFree => run_free_pass(&config).await?,
        Command::ClaimUrl { url } => run_claim_url(&config, &url).await?,
        Command::Report => run_report(&config).await?,
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("itch_gleaner=info,warn"),
            1 => EnvFilter::new("itch_gleaner=debug,info"),
            2 => EnvFilter::new("itch_gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
