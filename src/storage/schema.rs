//! Database schema definitions

/// SQL to create the words table
pub const CREATE_WORDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS words (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the tags table
pub const CREATE_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the word/tag association table
pub const CREATE_WORD_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS word_tags (
    word_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    FOREIGN KEY(word_id) REFERENCES words(id),
    FOREIGN KEY(tag_id) REFERENCES tags(id),
    PRIMARY KEY(word_id, tag_id)
)
"#;

/// SQL to create the key/value system configuration table
pub const CREATE_SYSCONFIG_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sysconfig (
    name TEXT NOT NULL PRIMARY KEY,
    val TEXT
)
"#;

/// SQL to create indexes
///
/// The primary key already covers lookups by `word_id`; tag-filtered
/// search walks the relation the other way.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_word_tags_tag ON word_tags(tag_id)",
];

/// Schema version written on first creation
pub const SCHEMA_VERSION: &str = "0.0.0";

/// Default sysconfig rows, only inserted when absent; `?1` is [`SCHEMA_VERSION`]
pub const SEED_SYSCONFIG: &str = r#"
INSERT OR IGNORE INTO sysconfig (name, val) VALUES ('version', ?1), ('dbname', 'default')
"#;

/// All schema creation statements; the seed runs separately since it binds a value
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_WORDS_TABLE,
        CREATE_TAGS_TABLE,
        CREATE_WORD_TAGS_TABLE,
        CREATE_SYSCONFIG_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
