//! bbhtml CLI - BBCode to sanitized HTML.
//!
//! Provides commands for:
//! - `render`: Render BBCode to sanitized HTML
//! - `tree`: Dump the parse tree
//! - `sanitize`: Run the configured sanitizer over HTML

mod commands;
mod engine;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, SanitizeArgs, TreeArgs};
use output::Output;

/// bbhtml - BBCode to sanitized HTML.
#[derive(Parser)]
#[command(name = "bbhtml", version, about)]
struct Cli {
    /// Enable verbose output (debug logs for tag and template resolution).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render BBCode to sanitized HTML.
    Render(RenderArgs),
    /// Print the parse tree of a BBCode document.
    Tree(TreeArgs),
    /// Sanitize HTML with the configured policy.
    Sanitize(SanitizeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Tree(args) => args.execute(),
        Commands::Sanitize(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
