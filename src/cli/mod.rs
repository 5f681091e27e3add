//! CLI module for Adalat
//!
//! Command-line parsing for the `adalat-server` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod check;
pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Adalat - Bangladesh Legal Assistant
///
/// Retrieval-augmented question answering over the Bangladesh legal corpus.
#[derive(Parser, Debug)]
#[command(
    name = "adalat-server",
    version,
    about = "Adalat - Bangladesh Legal Assistant",
    long_about = "Retrieval-augmented question answering over the Bangladesh legal corpus.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a working directory.",
    after_help = "EXAMPLES:\n    \
                  adalat-server init                          # Scaffold adalat.toml and data/\n    \
                  adalat-server build-index                   # Chunk the corpus and build the index\n    \
                  adalat-server                               # Start the server\n    \
                  adalat-server ask \"What is the punishment for theft?\" --mode lawyer"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "adalat.toml", env = "ADALAT_CONFIG", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server and web UI
    Serve {
        /// Do not build the index at startup when none is saved
        #[arg(long)]
        no_build: bool,
    },

    /// Scaffold adalat.toml, .env.example and the data directories
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8501")]
        port: u16,
    },

    /// Load and chunk the corpus CSV, writing the processed chunks as JSON
    Ingest {
        /// Corpus CSV (defaults to data.csv_path or the first CSV in data.data_dir)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output file (defaults to data.processed_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Process the corpus and (re)build the vector store
    BuildIndex,

    /// Answer one question from the command line
    Ask {
        /// The question
        question: String,

        /// Answer mode: general, lawyer, argument, research or simple
        #[arg(short, long, default_value = "general")]
        mode: String,

        /// Number of documents to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Search strategy: semantic, bm25 or hybrid
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Print corpus statistics
    Stats,

    /// Verify configuration, API key, corpus and vector store
    Check,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["adalat-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("adalat.toml"));
    }

    #[test]
    fn test_ask_arguments() {
        let cli = Cli::try_parse_from([
            "adalat-server",
            "ask",
            "What is bail?",
            "--mode",
            "lawyer",
            "-k",
            "3",
            "--config",
            "other.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        match cli.command {
            Some(Commands::Ask {
                question,
                mode,
                top_k,
                strategy,
            }) => {
                assert_eq!(question, "What is bail?");
                assert_eq!(mode, "lawyer");
                assert_eq!(top_k, Some(3));
                assert!(strategy.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
