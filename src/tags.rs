//! Tag resolution
//!
//! A [`TagSet`] maps tag names to their state in the store. Sets start out
//! [`TagState::Unresolved`] when parsed from user input and become
//! [`TagState::Resolved`] once the store has confirmed an id. The set is a
//! plain value: resolvers take it by value and hand back the resolved copy.

use std::collections::BTreeMap;
use rusqlite::Connection;
use tracing::{debug, warn};
use crate::Result;
use crate::storage;

/// Resolution state of a single tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagState {
    Unresolved,
    Resolved(i64),
}

impl TagState {
    pub fn id(self) -> Option<i64> {
        match self {
            TagState::Resolved(id) => Some(id),
            TagState::Unresolved => None,
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, TagState::Resolved(_))
    }
}

/// Distinct, trimmed tag names with their resolution state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    entries: BTreeMap<String, TagState>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list of tags.
    ///
    /// Names are trimmed, empty names are skipped and duplicates collapse,
    /// so `""` and `" , "` both give an empty set.
    pub fn parse(raw: &str) -> Self {
        Self::from_names(raw.split(','))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    /// Add a tag as unresolved unless it is already present
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), TagState::Unresolved);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<TagState> {
        self.entries.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TagState)> {
        self.entries.iter().map(|(name, state)| (name.as_str(), *state))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Ids of every resolved tag, in name order
    pub fn resolved_ids(&self) -> Vec<i64> {
        self.entries.values().filter_map(|state| state.id()).collect()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.entries.values().all(|state| state.is_resolved())
    }

    /// Remove every unresolved entry, returning the dropped names
    pub fn drop_unresolved(&mut self) -> Vec<String> {
        let dropped: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, state)| !state.is_resolved())
            .map(|(name, _)| name.clone())
            .collect();
        for name in &dropped {
            self.entries.remove(name);
        }
        dropped
    }

    fn set_state(&mut self, name: &str, state: TagState) {
        if let Some(slot) = self.entries.get_mut(name) {
            *slot = state;
        }
    }

    fn unresolved_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, state)| !state.is_resolved())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Resolve every tag, inserting the ones the store does not know yet.
///
/// Runs on whatever connection it is given; callers wrap it in a
/// transaction so the inserted tags land atomically. Tags that still have
/// no id afterwards are dropped with a warning.
pub fn resolve(conn: &Connection, mut tags: TagSet) -> Result<TagSet> {
    for name in tags.unresolved_names() {
        if let Some(id) = storage::find_tag_id(conn, &name)? {
            tags.set_state(&name, TagState::Resolved(id));
        }
    }

    for name in tags.unresolved_names() {
        if let Some(id) = storage::upsert_tag(conn, &name)? {
            debug!("inserted tag {:?} => {}", name, id);
            tags.set_state(&name, TagState::Resolved(id));
        }
    }

    for name in tags.drop_unresolved() {
        warn!("tag {:?} could not be resolved, skipping it", name);
    }
    Ok(tags)
}

/// Resolve tags without writing; unknown tags are dropped with a warning.
pub fn lookup(conn: &Connection, mut tags: TagSet) -> Result<TagSet> {
    for name in tags.unresolved_names() {
        if let Some(id) = storage::find_tag_id(conn, &name)? {
            tags.set_state(&name, TagState::Resolved(id));
        }
    }

    for name in tags.drop_unresolved() {
        warn!("tag {:?} not found in the db", name);
    }
    Ok(tags)
}
