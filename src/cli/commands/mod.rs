//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "fieldscan")]
#[command(about = "Extract contact fields from images via OCR")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the extraction web server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default from config, else 127.0.0.1:3030)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run OCR and field extraction on a local image and print the result as JSON
    Extract {
        /// JPEG or PNG image file
        image: PathBuf,
        /// The file contains base64 text rather than raw image bytes
        #[arg(long)]
        base64: bool,
    },

    /// Check that the OCR engine is installed and show which executable is used
    Check,
}

/// Parse arguments, load settings and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (settings, _config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Extract { image, base64 } => {
            extract::cmd_extract(&settings, &image, base64).await
        }
        Commands::Check => check::cmd_check(&settings),
    }
}
