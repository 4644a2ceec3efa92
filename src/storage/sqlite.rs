//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::debug;
use crate::{Result, Error};
use crate::tags::{self, TagSet};
use super::schema;

/// Create the database file (and its parent directory) if needed and make
/// sure every table exists.
///
/// Safe to run against a file that already holds data: all statements are
/// `IF NOT EXISTS` / `INSERT OR IGNORE`.
pub fn ensure_schema(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    initialize_schema(&conn)
}

fn initialize_schema(conn: &Connection) -> Result<()> {
    for stmt in schema::all_schema_statements() {
        conn.execute(stmt, [])?;
    }
    conn.execute(schema::SEED_SYSCONFIG, [schema::SCHEMA_VERSION])?;
    Ok(())
}

/// SQLite-backed storage for words, tags and their links
///
/// The store owns its connection; dropping it closes the file.
pub struct WordStore {
    conn: Connection,
}

impl WordStore {
    /// Open a database file for writing (creates it and the schema if needed)
    pub fn open(path: &Path) -> Result<Self> {
        ensure_schema(path)?;
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    /// Open an existing database file read-only
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    // ========== Tag Operations ==========

    /// Resolve every tag of the set, inserting missing ones, in one transaction
    pub fn resolve_tags(&mut self, tags: TagSet) -> Result<TagSet> {
        let tx = self.conn.transaction()?;
        let resolved = tags::resolve(&tx, tags)?;
        tx.commit()?;
        Ok(resolved)
    }

    /// Look tags up without inserting anything; unknown names are dropped
    pub fn lookup_tags(&self, tags: TagSet) -> Result<TagSet> {
        tags::lookup(&self.conn, tags)
    }

    // ========== System Config Operations ==========

    /// Get a sysconfig value by name
    pub fn get_config(&self, name: &str) -> Result<Option<String>> {
        let val: Option<Option<String>> = self
            .conn
            .query_row("SELECT val FROM sysconfig WHERE name = ?1", [name], |row| row.get(0))
            .optional()?;
        Ok(val.flatten())
    }

    /// Insert or replace a sysconfig value
    pub fn set_config(&self, name: &str, val: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sysconfig (name, val) VALUES (?1, ?2)",
            params![name, val],
        )?;
        Ok(())
    }

    /// All sysconfig rows in insertion order
    pub fn config_entries(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare("SELECT name, val FROM sysconfig ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                let name: String = row.get(0)?;
                let val: Option<String> = row.get(1)?;
                Ok((name, val.unwrap_or_default()))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Store the database description, joined from free-text parts
    pub fn describe<S: AsRef<str>>(&mut self, parts: &[S]) -> Result<String> {
        let joined = parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
        let desc = joined.trim();
        if desc.is_empty() {
            return Err(Error::Argument("please provide a description".to_string()));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO sysconfig (name, val) VALUES ('description', ?1)",
            [desc],
        )?;
        tx.commit()?;
        Ok(desc.to_string())
    }

    // ========== Maintenance ==========

    /// Rebuild the database file into a minimal amount of disk space
    pub fn vacuum(&self) -> Result<()> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    /// Count all words
    pub fn count_words(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM words")
    }

    /// Count all tags
    pub fn count_tags(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM tags")
    }

    /// Count all word/tag links
    pub fn count_links(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM word_tags")
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            words: self.count_words()?,
            tags: self.count_tags()?,
            links: self.count_links()?,
        })
    }
}

// ========== Row Primitives ==========
//
// Free functions over `&Connection` so they run unchanged inside a
// `rusqlite::Transaction`.

#[derive(Debug, Clone, Copy)]
enum NameTable {
    Words,
    Tags,
}

impl NameTable {
    fn select_sql(self) -> &'static str {
        match self {
            NameTable::Words => "SELECT id FROM words WHERE name = ?1",
            NameTable::Tags => "SELECT id FROM tags WHERE name = ?1",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            NameTable::Words => "INSERT OR IGNORE INTO words (name) VALUES (?1)",
            NameTable::Tags => "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
        }
    }
}

fn find_id(conn: &Connection, table: NameTable, name: &str) -> Result<Option<i64>> {
    conn.prepare_cached(table.select_sql())?
        .query_row([name], |row| row.get(0))
        .optional()
        .map_err(Into::into)
}

fn upsert_id(conn: &Connection, table: NameTable, name: &str) -> Result<Option<i64>> {
    if let Some(id) = find_id(conn, table, name)? {
        return Ok(Some(id));
    }
    let inserted = conn.prepare_cached(table.insert_sql())?.execute([name])?;
    if inserted > 0 {
        return Ok(Some(conn.last_insert_rowid()));
    }
    debug!("{:?} entry {:?} already exists, fetching", table, name);
    find_id(conn, table, name)
}

/// Get the id of a word
pub fn find_word_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    find_id(conn, NameTable::Words, name)
}

/// Get the id of a word, inserting it when absent
pub fn upsert_word(conn: &Connection, name: &str) -> Result<Option<i64>> {
    upsert_id(conn, NameTable::Words, name)
}

/// Get the id of a tag
pub fn find_tag_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    find_id(conn, NameTable::Tags, name)
}

/// Get the id of a tag, inserting it when absent
pub fn upsert_tag(conn: &Connection, name: &str) -> Result<Option<i64>> {
    upsert_id(conn, NameTable::Tags, name)
}

/// Link a word to a tag; returns false when the link already existed
pub fn link_word_tag(conn: &Connection, word_id: i64, tag_id: i64) -> Result<bool> {
    let inserted = conn
        .prepare_cached("INSERT OR IGNORE INTO word_tags (word_id, tag_id) VALUES (?1, ?2)")?
        .execute([word_id, tag_id])?;
    Ok(inserted > 0)
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub words: usize,
    pub tags: usize,
    pub links: usize,
}
