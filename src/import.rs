//! Word import
//!
//! Words arrive either from the command line (`add`, one unit of work) or
//! from newline-delimited files (`import`, committed every `batch_size`
//! lines so large lists never sit in a single transaction).

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use rusqlite::Connection;
use tracing::{debug, info, warn};
use crate::{Result, Error};
use crate::storage;
use crate::tags::{self, TagSet};

/// Lines read between two commits when nothing else is configured
pub const DEFAULT_BATCH_SIZE: usize = 4000;

/// Counters collected while importing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportStats {
    /// Lines read, blank ones included
    pub lines: usize,
    /// Non-empty words processed
    pub words: usize,
    /// Word/tag links newly created
    pub links: usize,
    /// Transactions committed
    pub batches: usize,
    /// Import files that did not exist
    pub skipped_files: usize,
}

impl ImportStats {
    pub fn merge(&mut self, other: ImportStats) {
        self.lines += other.lines;
        self.words += other.words;
        self.links += other.links;
        self.batches += other.batches;
        self.skipped_files += other.skipped_files;
    }
}

/// What happened to one import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Imported(ImportStats),
    Missing,
}

/// Insert a word if needed and link it to every resolved tag.
fn import_word(conn: &Connection, tags: &TagSet, word: &str, stats: &mut ImportStats) -> Result<()> {
    let Some(word_id) = storage::upsert_word(conn, word)? else {
        warn!("word {:?} could not be stored, skipping it", word);
        return Ok(());
    };
    debug!("word: {} => id: {}", word, word_id);

    for (tag, state) in tags.iter() {
        if let Some(tag_id) = state.id() {
            debug!("adding word_tags({}, {}) // {} {}", word_id, tag_id, word, tag);
            if storage::link_word_tag(conn, word_id, tag_id)? {
                stats.links += 1;
            }
        }
    }
    stats.words += 1;
    Ok(())
}

/// Add command-line words under the given tags.
///
/// Tag resolution and every insert share one transaction.
pub fn add_words<S: AsRef<str>>(
    conn: &mut Connection,
    tags: TagSet,
    words: &[S],
) -> Result<(TagSet, ImportStats)> {
    let mut stats = ImportStats::default();
    let tx = conn.transaction()?;
    let tags = tags::resolve(&tx, tags)?;

    for raw in words {
        stats.lines += 1;
        let word = raw.as_ref().trim();
        if word.is_empty() {
            continue;
        }
        debug!("adding word: {}", word);
        import_word(&tx, &tags, word, &mut stats)?;
    }

    tx.commit()?;
    stats.batches += 1;
    Ok((tags, stats))
}

/// Read up to `batch_size` lines into the current transaction.
fn import_batch<I>(
    conn: &Connection,
    tags: &TagSet,
    lines: &mut I,
    batch_size: usize,
    stats: &mut ImportStats,
) -> Result<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    for line in lines.take(batch_size) {
        let line = line?;
        stats.lines += 1;

        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        import_word(conn, tags, word, stats)?;
    }
    Ok(())
}

/// Import newline-delimited words, committing every `batch_size` lines.
///
/// The first transaction also resolves the tags; later transactions are
/// only opened while lines remain. A failure rolls back the batch in
/// flight; batches committed before it stay in the store.
pub fn import_lines<I>(
    conn: &mut Connection,
    tags: TagSet,
    lines: I,
    batch_size: usize,
) -> Result<(TagSet, ImportStats)>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    if batch_size == 0 {
        return Err(Error::Argument("batch size must be greater than zero".to_string()));
    }

    let mut lines = lines.into_iter().peekable();
    let mut stats = ImportStats::default();

    let tx = conn.transaction()?;
    let tags = tags::resolve(&tx, tags)?;
    import_batch(&tx, &tags, &mut lines, batch_size, &mut stats)?;
    tx.commit()?;
    stats.batches += 1;

    while lines.peek().is_some() {
        info!("Lines: {}", stats.lines);
        let tx = conn.transaction()?;
        import_batch(&tx, &tags, &mut lines, batch_size, &mut stats)?;
        tx.commit()?;
        stats.batches += 1;
    }

    Ok((tags, stats))
}

/// Newline-delimited lines of a reader, decoded lossily.
///
/// Word lists are often Latin-1; invalid UTF-8 bytes become U+FFFD instead
/// of ending the import.
pub struct WordLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> WordLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }
}

impl<R: BufRead> Iterator for WordLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.buf);
                if line.contains(char::REPLACEMENT_CHARACTER) {
                    debug!("line {:?} is not valid UTF-8, decoded lossily", line);
                }
                Some(Ok(line.into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Import one word file.
///
/// A missing file is reported and skipped; anything that exists but is not
/// a regular file is refused.
pub fn import_file(
    conn: &mut Connection,
    tags: TagSet,
    path: &Path,
    batch_size: usize,
) -> Result<(TagSet, FileOutcome)> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("{} does not exist, skipped", path.display());
            return Ok((tags, FileOutcome::Missing));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(Error::Argument(format!("{:?} is not a regular file", path)));
    }

    info!("importing file: {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    let (tags, stats) = import_lines(conn, tags, WordLines::new(reader), batch_size)?;
    Ok((tags, FileOutcome::Imported(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::WordStore;
    use std::io::Write;

    fn lines(words: &[&str]) -> Vec<io::Result<String>> {
        words.iter().map(|w| Ok(w.to_string())).collect()
    }

    #[test]
    fn test_add_words_cross_product() {
        let mut store = WordStore::open_in_memory().unwrap();
        let (tags, stats) =
            add_words(store.conn_mut(), TagSet::parse("a,b,c"), &["word1", "word2"]).unwrap();

        assert!(tags.is_fully_resolved());
        assert_eq!(stats.words, 2);
        assert_eq!(stats.links, 6);
        assert_eq!(store.count_tags().unwrap(), 3);
        assert_eq!(store.count_words().unwrap(), 2);
        assert_eq!(store.count_links().unwrap(), 6);
    }

    #[test]
    fn test_add_words_trims_and_skips_empty() {
        let mut store = WordStore::open_in_memory().unwrap();
        let (_, stats) = add_words(
            store.conn_mut(),
            TagSet::parse("x"),
            &[" word1 ", "", "word1", "   ", "word2"],
        )
        .unwrap();

        assert_eq!(stats.lines, 5);
        assert_eq!(stats.words, 3);
        assert_eq!(store.count_words().unwrap(), 2);
        assert_eq!(store.count_links().unwrap(), 2);
    }

    #[test]
    fn test_add_without_tags() {
        let mut store = WordStore::open_in_memory().unwrap();
        let (tags, _) = add_words(store.conn_mut(), TagSet::parse(""), &["lonely"]).unwrap();
        assert!(tags.is_empty());
        assert_eq!(store.count_words().unwrap(), 1);
        assert_eq!(store.count_tags().unwrap(), 0);
        assert_eq!(store.count_links().unwrap(), 0);
    }

    #[test]
    fn test_readding_under_new_tag_links_existing_word() {
        let mut store = WordStore::open_in_memory().unwrap();
        add_words(store.conn_mut(), TagSet::parse("a"), &["word"]).unwrap();
        add_words(store.conn_mut(), TagSet::parse("a,b"), &["word"]).unwrap();

        assert_eq!(store.count_words().unwrap(), 1);
        assert_eq!(store.count_tags().unwrap(), 2);
        assert_eq!(store.count_links().unwrap(), 2);
    }

    #[test]
    fn test_import_lines_batches() {
        let mut store = WordStore::open_in_memory().unwrap();
        let input = lines(&["one", "two", "", "three", "four", "two", "five"]);
        let (_, stats) = import_lines(store.conn_mut(), TagSet::parse("n"), input, 3).unwrap();

        assert_eq!(stats.lines, 7);
        assert_eq!(stats.words, 6);
        // 3 + 3 + 1 lines, each batch committed
        assert_eq!(stats.batches, 3);
        assert_eq!(store.count_words().unwrap(), 5);
        assert_eq!(store.count_links().unwrap(), 5);
    }

    #[test]
    fn test_import_lines_empty_source() {
        let mut store = WordStore::open_in_memory().unwrap();
        let (tags, stats) =
            import_lines(store.conn_mut(), TagSet::parse("t"), Vec::new(), DEFAULT_BATCH_SIZE)
                .unwrap();

        assert_eq!(stats, ImportStats { batches: 1, ..Default::default() });
        // tags are still resolved and persisted by the first unit
        assert!(tags.is_fully_resolved());
        assert_eq!(store.count_tags().unwrap(), 1);
    }

    #[test]
    fn test_import_lines_rejects_zero_batch() {
        let mut store = WordStore::open_in_memory().unwrap();
        let result = import_lines(store.conn_mut(), TagSet::new(), lines(&["a"]), 0);
        assert!(matches!(result, Err(Error::Argument(_))));
    }

    #[test]
    fn test_read_error_keeps_committed_batches() {
        let mut store = WordStore::open_in_memory().unwrap();
        let input = vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad utf-8")),
        ];
        let result = import_lines(store.conn_mut(), TagSet::new(), input, 2);

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(store.count_words().unwrap(), 2);
    }

    #[test]
    fn test_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "apple\n  banana  \n\ncherry").unwrap();

        let mut store = WordStore::open_in_memory().unwrap();
        let (_, outcome) =
            import_file(store.conn_mut(), TagSet::parse("fruit"), &path, DEFAULT_BATCH_SIZE)
                .unwrap();

        match outcome {
            FileOutcome::Imported(stats) => assert_eq!(stats.words, 3),
            FileOutcome::Missing => panic!("file should have been imported"),
        }
        assert_eq!(store.count_words().unwrap(), 3);
        assert_eq!(store.count_links().unwrap(), 3);
    }

    #[test]
    fn test_import_lines_exact_multiple_of_batch() {
        let mut store = WordStore::open_in_memory().unwrap();
        let input = lines(&["a", "b", "c", "d", "e", "f"]);
        let (_, stats) = import_lines(store.conn_mut(), TagSet::new(), input, 3).unwrap();

        // no trailing empty transaction once the input is used up
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.lines, 6);
        assert_eq!(store.count_words().unwrap(), 6);
    }

    #[test]
    fn test_import_file_with_latin1_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        let mut bytes = Vec::new();
        for i in 0..5 {
            bytes.extend_from_slice(format!("w{}\n", i).as_bytes());
        }
        bytes.extend_from_slice(b"caf\xe9\n");
        for i in 5..10 {
            bytes.extend_from_slice(format!("w{}\n", i).as_bytes());
        }
        std::fs::write(&path, bytes).unwrap();

        let mut store = WordStore::open_in_memory().unwrap();
        let (_, outcome) = import_file(store.conn_mut(), TagSet::parse("t"), &path, 3).unwrap();

        match outcome {
            FileOutcome::Imported(stats) => assert_eq!(stats.words, 11),
            FileOutcome::Missing => panic!("file should have been imported"),
        }
        assert_eq!(store.count_words().unwrap(), 11);
        for i in 0..10 {
            let word = format!("w{}", i);
            assert!(storage::find_word_id(store.conn(), &word).unwrap().is_some(), "{} missing", word);
        }
        assert!(storage::find_word_id(store.conn(), "caf\u{FFFD}").unwrap().is_some());
    }

    #[test]
    fn test_word_lines_handles_crlf_and_missing_final_newline() {
        let got: Vec<String> = WordLines::new(&b"one\r\ntwo\nthree"[..])
            .map(|l| l.unwrap().trim().to_string())
            .collect();
        assert_eq!(got, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_import_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WordStore::open_in_memory().unwrap();
        let (tags, outcome) = import_file(
            store.conn_mut(),
            TagSet::parse("t"),
            &dir.path().join("nonexistent.txt"),
            DEFAULT_BATCH_SIZE,
        )
        .unwrap();

        assert_eq!(outcome, FileOutcome::Missing);
        assert_eq!(tags, TagSet::parse("t"));
        assert_eq!(store.count_tags().unwrap(), 0);
    }

    #[test]
    fn test_import_directory_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WordStore::open_in_memory().unwrap();
        let result = import_file(store.conn_mut(), TagSet::new(), dir.path(), DEFAULT_BATCH_SIZE);
        assert!(matches!(result, Err(Error::Argument(_))));
    }
}
