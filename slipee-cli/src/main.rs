//! Slipee CLI - static map server and one-shot renderer
//!
//! ```text
//! slipee serve                       # HTTP server + background worker
//! slipee render --lat 59.91 --long 10.75 --zoom 12
//! slipee fingerprint --lat 59.91 --long 10.75
//! ```

mod commands;
mod error;
mod query;
mod server;

use clap::{Parser, Subcommand};

use commands::{fingerprint, render, serve};

#[derive(Parser)]
#[command(name = "slipee")]
#[command(version = slipee::VERSION)]
#[command(about = "Static map images stitched from slippy map tiles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server and the background generation worker
    Serve(serve::ServeArgs),
    /// Generate one map now and print its cache path
    Render(render::RenderArgs),
    /// Print a map's fingerprint and cache path without fetching anything
    Fingerprint(fingerprint::FingerprintArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Render(args) => render::run(args).await,
        Commands::Fingerprint(args) => fingerprint::run(args).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
