//! Command-line surface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orunmila")]
#[command(version)]
#[command(about = "Tagged word-list manager backed by a single SQLite file")]
#[command(long_about = r#"
Orunmila stores words and the tags attached to them.

Example usage:
  orunmila add --tags noun,animal cat dog
  orunmila import --tags english words.txt
  orunmila search --tags animal --show-tags
  orunmila describe My English word list
"#)]
pub struct Cli {
    /// Path to the database file (default: <cwd>/orunmila.db)
    #[arg(long = "db", global = true, value_name = "DB_PATH")]
    pub database: Option<PathBuf>,

    /// Path to a TOML config file (default: ./orunmila.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Hide status lines, keep data output (also ORUNMILA_QUIET=1)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add words to the database from the command line with optional tags
    Add {
        /// A comma separated list of the tags to use
        #[arg(short, long, default_value = "")]
        tags: String,

        /// Space separated words to add
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Import word files (one word per line) with optional tags
    Import {
        /// A comma separated list of the tags to use
        #[arg(short, long, default_value = "")]
        tags: String,

        /// Lines read between two commits
        #[arg(long)]
        batch_size: Option<usize>,

        /// The file(s) to read the words from
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Display words matching an optional list of tags
    Search(SearchArgs),

    /// Set the database description
    Describe {
        /// Description text
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Display database system configuration information
    Info,

    /// Rebuild the database file, repacking it into a minimal amount of disk space
    Vacuum,

    /// Show row counts of every table
    Stats,
}

/// Arguments of the `search` subcommand
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "search")]
pub struct SearchArgs {
    /// A comma separated list of the tags to use
    #[arg(short, long, default_value = "")]
    pub tags: String,

    /// Show the tags of each word
    #[arg(short = 's', long = "show-tags", visible_alias = "st")]
    pub show_tags: bool,

    /// Print one JSON object per word
    #[arg(long)]
    pub json: bool,
}
