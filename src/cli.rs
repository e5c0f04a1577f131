//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// linktracker - tracked short links with click analytics
#[derive(Parser)]
#[command(name = "linktracker")]
#[command(version)]
#[command(about = "Tracked short links with click analytics", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Create a tracked link
    CreateLink {
        /// Link title
        title: String,

        /// Destination URL (http or https)
        destination_url: String,

        /// Campaign name
        #[arg(long)]
        campaign: Option<String>,
    },

    /// List tracked links with their counters
    ListLinks,

    /// Delete a tracked link (its clicks are kept)
    DeleteLink {
        /// Link id
        id: i64,
    },

    /// Wipe all clicks and generate sample click data
    ResetData {
        /// First day of the sample window (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day of the sample window (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Print dashboard statistics
    Stats {
        /// Relative range in days (e.g. 7, 30, 90)
        #[arg(long)]
        range: Option<String>,

        /// Custom range start (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Custom range end (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Show statistics for a single link instead
        #[arg(long)]
        link: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show raw click table diagnostics
    DataCount {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate example configuration file
    GenerateConfig {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
