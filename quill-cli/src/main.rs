//! quill CLI: project scaffolding.
//!
//! Install with `cargo install quill-cli`, then run:
//!
//! ```bash
//! quill new my-app
//! ```
//!
//! See `quill --help` for all available commands and options.

mod commands;
mod templates;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quill", about = "quill project scaffolding tool", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new quill application
    New {
        /// Project name (used as directory name and Cargo package name)
        name: String,

        /// Skip the views/ directory; the root route renders JSON instead
        #[arg(long)]
        no_views: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::New { name, no_views } => commands::new::run(&name, &PathBuf::from("."), no_views),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
