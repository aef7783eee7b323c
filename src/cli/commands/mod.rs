//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "groundqa")]
#[command(about = "Extract citation-grounded Q&A pairs from PDF manuals")]
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
    /// Extract Q&A pairs from a PDF file or a directory of PDFs
    Extract {
        /// PDF file or directory containing PDFs
        input: PathBuf,
        /// Output JSONL file (appended to)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the browser upload interface
    Serve {
        /// Address to bind: port, host, or host:port
        #[arg(short, long, env = "GROUNDQA_BIND")]
        bind: Option<String>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let (mut settings, _config) = match load_settings_with_options(options) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Extract { input, output } => {
            if let Some(output) = output {
                settings.output = output;
            }
            extract::cmd_extract(&settings, &input).await
        }
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            serve::cmd_serve(&settings).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from(["groundqa", "-v", "extract", "manuals", "-o", "out.jsonl"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Extract { input, output } => {
                assert_eq!(input, PathBuf::from("manuals"));
                assert_eq!(output, Some(PathBuf::from("out.jsonl")));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_extract_requires_input() {
        assert!(Cli::try_parse_from(["groundqa", "extract"]).is_err());
    }

    #[test]
    fn test_parse_serve_with_config() {
        let cli = Cli::try_parse_from(["groundqa", "serve", "--bind", "9000", "-c", "alt.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.as_deref(), Some("9000")),
            _ => panic!("expected serve"),
        }
    }
}
