//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for pastelinker using clap's derive macros.

use clap::{Parser, Subcommand};

/// Pastelinker - content-addressed text links
#[derive(Parser, Debug)]
#[command(name = "pastelinker")]
#[command(version)]
#[command(about = "Store text once, share it by short code", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Owner id used for create and all mutating commands
    #[arg(long, global = true, default_value = "local")]
    pub owner: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store content and create a link to it
    Create {
        /// Text content
        content: String,

        /// Create the link hidden
        #[arg(long)]
        private: bool,

        /// Expiration time (RFC3339 or relative like "1d", "2h")
        #[arg(long)]
        expires: Option<String>,
    },

    /// Read content by short code
    Get {
        short_code: String,
    },

    /// Read content by link id
    Show {
        id: String,
    },

    /// Update an owned link
    Update {
        id: String,

        /// New content (stored as a new blob)
        #[arg(long)]
        content: Option<String>,

        /// New visibility
        #[arg(long)]
        visible: Option<bool>,

        /// New expiration time
        #[arg(long)]
        expires: Option<String>,
    },

    /// Hide an owned link
    Hide {
        id: String,
    },

    /// Make an owned link visible again
    Publish {
        id: String,
    },

    /// Set the expiration time of an owned link ("now" expires it immediately)
    Expire {
        id: String,
        when: String,
    },

    /// Delete an owned link (the stored content is kept)
    Delete {
        id: String,
    },

    /// List links
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,

        #[arg(long, default_value_t = 10)]
        page_size: u64,

        /// Sort field: created_at, updated_at, expires_at, short_code
        #[arg(long, default_value = "created_at")]
        sort: String,

        /// Ascending order (default descending)
        #[arg(long)]
        asc: bool,

        /// List links of every owner
        #[arg(long)]
        all: bool,
    },

    /// Print a sample configuration file
    Config,
}
