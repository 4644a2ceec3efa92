//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with tables:
//! - words(id, name)
//! - tags(id, name)
//! - word_tags(word_id, tag_id)
//! - sysconfig(name, val)

pub mod schema;
pub mod sqlite;

pub use sqlite::{
    DbStats, WordStore, ensure_schema, find_tag_id, find_word_id, link_word_tag, upsert_tag,
    upsert_word,
};
