//! # Orunmila - tagged word-list manager
//!
//! Orunmila keeps word lists in a single SQLite file:
//! - words and tags linked through a many-to-many `word_tags` relation
//! - idempotent insert-or-ignore upserts for words, tags and links
//! - bulk imports of newline-delimited word files with periodic commits
//! - tag-filtered search, optionally annotated with each word's tags
//! - a small key/value `sysconfig` table (version, description, ...)

pub mod storage;
pub mod tags;
pub mod import;
pub mod search;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use storage::WordStore;
pub use tags::{TagSet, TagState};
pub use import::{ImportStats, FileOutcome};
pub use search::SearchHit;

/// Result type alias for Orunmila operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Orunmila operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    Argument(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}
