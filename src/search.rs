//! Tag-filtered word search

use rusqlite::{Connection, params_from_iter};
use tracing::info;
use crate::Result;
use crate::tags::{self, TagSet};

/// Comma-joined names of every tag carried by `w`
const TAGS_COLUMN: &str = "(SELECT group_concat(name, ',') FROM tags \
     WHERE id IN (SELECT tag_id FROM word_tags WHERE word_id = w.id))";

/// One word returned by a search
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SearchHit {
    pub name: String,
    /// The word's tags sorted by name, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn split_tags(raw: Option<String>) -> Vec<String> {
    let mut tags: Vec<String> = raw
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tags.sort();
    tags
}

fn build_query(filter_ids: usize, show_tags: bool) -> String {
    let tags_column = if show_tags { TAGS_COLUMN } else { "NULL" };
    if filter_ids == 0 {
        format!("SELECT w.name, {} FROM words AS w ORDER BY w.id", tags_column)
    } else {
        let placeholders = vec!["?"; filter_ids].join(",");
        format!(
            "SELECT w.name, {} FROM words AS w \
             JOIN word_tags AS f ON f.word_id = w.id \
             WHERE f.tag_id IN ({}) \
             GROUP BY w.id ORDER BY w.id",
            tags_column, placeholders
        )
    }
}

/// Stream matching words to `visit`, returning how many were visited.
///
/// Filter tags are looked up, never inserted. Unknown ones are dropped with
/// a warning; when none of them resolves every word matches.
pub fn search_each<F>(conn: &Connection, filter: TagSet, show_tags: bool, mut visit: F) -> Result<usize>
where
    F: FnMut(SearchHit) -> Result<()>,
{
    let filter = if filter.is_empty() {
        info!("No tags were given");
        filter
    } else {
        info!("Using tags: {:?}", filter.names().collect::<Vec<_>>());
        tags::lookup(conn, filter)?
    };

    let ids = filter.resolved_ids();
    let sql = build_query(ids.len(), show_tags);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(ids.iter()))?;

    let mut count = 0;
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let tags = if show_tags {
            Some(split_tags(row.get(1)?))
        } else {
            None
        };
        visit(SearchHit { name, tags })?;
        count += 1;
    }
    Ok(count)
}

/// Collect every matching word
pub fn search(conn: &Connection, filter: TagSet, show_tags: bool) -> Result<Vec<SearchHit>> {
    let mut hits = Vec::new();
    search_each(conn, filter, show_tags, |hit| {
        hits.push(hit);
        Ok(())
    })?;
    Ok(hits)
}
