//! CLI definitions for starsearch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// starsearch CLI.
#[derive(Parser)]
#[command(name = "starsearch")]
#[command(about = "Hybrid semantic and keyword search over your starred repositories")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.starsearch/config.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Search starred repositories
    Search {
        /// Query text
        query: String,

        /// Maximum number of results (capped at search.max_limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Search mode: vector, lexical or fused
        #[arg(short, long)]
        mode: Option<String>,

        /// Share of the fused score given to vector results (0.0 - 1.0)
        #[arg(short, long)]
        weight: Option<f32>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search and open the top result in the browser
    Open {
        /// Query text
        query: String,

        /// Search mode: vector, lexical or fused
        #[arg(short, long)]
        mode: Option<String>,

        /// Share of the fused score given to vector results (0.0 - 1.0)
        #[arg(short, long)]
        weight: Option<f32>,

        /// Print the URL instead of launching a browser
        #[arg(long)]
        print: bool,
    },

    /// Import a JSON array of repositories and rebuild the index
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Show index status
    Status {
        /// Print status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON search API
    Serve {
        /// Server host (default: server.host)
        #[arg(long)]
        host: Option<String>,

        /// Server port (default: server.port)
        #[arg(long)]
        port: Option<u16>,
    },
}
