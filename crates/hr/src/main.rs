//! hr CLI - hot reload agent.
//!
//! Provides commands for:
//! - `watch`: Follow a development server's reload endpoint and reload on
//!   build changes

mod commands;
mod error;
mod output;
mod reload;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::WatchArgs;
use output::Output;

/// hr - hot reload agent.
#[derive(Parser)]
#[command(name = "hr", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a development server and reload when its build changes.
    Watch(WatchArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Watch(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Watch(args) => {
            // The agent is single-threaded; one event loop is enough.
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
