//! One entry point per subcommand.
//!
//! Every command opens its own [`WordStore`] and drops it on return, so the
//! connection is released on success and on error alike. Data goes to the
//! caller's writer; decoration goes through [`crate::ui`].

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::info;
use crate::cli::SearchArgs;
use crate::config::Settings;
use crate::import::{self, FileOutcome, ImportStats};
use crate::search::{self, SearchHit};
use crate::storage::{self, DbStats, WordStore};
use crate::tags::TagSet;
use crate::ui::{self, Icons, Spinner};
use crate::{Error, Result};

pub fn run_add<S: AsRef<str>>(settings: &Settings, tags: &str, words: &[S]) -> Result<ImportStats> {
    if words.is_empty() {
        return Err(Error::Argument("you need to provide words to be added".to_string()));
    }
    info!(
        "Adding the given words: {:?}",
        words.iter().map(AsRef::as_ref).collect::<Vec<_>>()
    );

    let mut store = WordStore::open(&settings.database)?;
    let (tags, stats) = import::add_words(store.conn_mut(), TagSet::parse(tags), words)?;

    ui::success(&format!("Added {} word(s)", stats.words));
    if !tags.is_empty() {
        ui::summary_row("tags:", &tags.names().collect::<Vec<_>>().join(","));
    }
    Ok(stats)
}

pub fn run_import(settings: &Settings, tags: &str, files: &[PathBuf]) -> Result<ImportStats> {
    if files.is_empty() {
        return Err(Error::Argument("you need to provide at least a filename".to_string()));
    }
    info!("performing an import on the given files: {:?}", files);

    let mut store = WordStore::open(&settings.database)?;
    let mut tags = TagSet::parse(tags);
    let mut total = ImportStats::default();

    for path in files {
        let spinner = Spinner::new(&format!("Importing {}", path.display()));
        let (resolved, outcome) =
            import::import_file(store.conn_mut(), tags, path, settings.batch_size)?;
        tags = resolved;
        let elapsed = spinner.finish();

        match outcome {
            FileOutcome::Imported(stats) => {
                ui::summary_row(
                    &format!("{} {}", Icons::FILE, path.display()),
                    &format!("{} word(s) in {}", stats.words, elapsed),
                );
                total.merge(stats);
            }
            // already reported by the importer
            FileOutcome::Missing => total.skipped_files += 1,
        }
    }

    ui::success(&format!("Imported {} word(s)", total.words));
    if total.skipped_files > 0 {
        ui::summary_row("skipped files:", &total.skipped_files.to_string());
    }
    Ok(total)
}

fn write_hit<W: Write>(out: &mut W, hit: &SearchHit, json: bool) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, hit).map_err(io::Error::from)?;
        return writeln!(out);
    }
    match &hit.tags {
        Some(tags) => writeln!(out, "{} {}", hit.name, tags.join(",")),
        None => writeln!(out, "{}", hit.name),
    }
}

pub fn run_search<W: Write>(database: &Path, args: &SearchArgs, out: &mut W) -> Result<usize> {
    info!("performing a search");
    storage::ensure_schema(database)?;
    let store = WordStore::open_read_only(database)?;

    search::search_each(store.conn(), TagSet::parse(&args.tags), args.show_tags, |hit| {
        write_hit(&mut *out, &hit, args.json)?;
        Ok(())
    })
}

/// Parse the arguments that follow `search` and run it.
///
/// Unlike the top-level parser this never exits the process: unknown flags
/// and `--help` come back as [`Error::Argument`].
pub fn search_from_args<I, T, W>(database: &Path, args: I, out: &mut W) -> Result<usize>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    W: Write,
{
    let argv = std::iter::once(OsString::from("search")).chain(args.into_iter().map(Into::into));
    let args = SearchArgs::try_parse_from(argv).map_err(|e| Error::Argument(e.to_string()))?;
    run_search(database, &args, out)
}

pub fn run_describe<S: AsRef<str>>(database: &Path, text: &[S]) -> Result<String> {
    let mut store = WordStore::open(database)?;
    let desc = store.describe(text)?;
    ui::success(&format!("Description set to {:?}", desc));
    Ok(desc)
}

pub fn run_info<W: Write>(database: &Path, out: &mut W) -> Result<()> {
    let store = WordStore::open(database)?;
    for (name, val) in store.config_entries()? {
        writeln!(out, "[{}]: {}", name, val)?;
    }
    Ok(())
}

pub fn run_vacuum(database: &Path) -> Result<()> {
    let store = WordStore::open(database)?;
    let spinner = Spinner::new("Rebuilding database");
    store.vacuum()?;
    let elapsed = spinner.finish();
    ui::success(&format!("database rebuilt successfully in {}", elapsed));
    Ok(())
}

pub fn run_stats(database: &Path) -> Result<DbStats> {
    let store = WordStore::open(database)?;
    let stats = store.stats()?;
    ui::header(
        Icons::STATS,
        &format!("Orunmila Statistics ({})", database.display().bold()),
    );
    if !crate::output::is_quiet() {
        println!("{}", ui::stats_table(&stats));
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::DEFAULT_BATCH_SIZE;
    use tempfile::TempDir;

    fn settings() -> (TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            database: dir.path().join("orunmila.db"),
            batch_size: DEFAULT_BATCH_SIZE,
        };
        (dir, settings)
    }

    fn search_output(database: &Path, args: &[&str]) -> String {
        let mut out: Vec<u8> = Vec::new();
        search_from_args(database, args.iter().copied(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_search_unknown_flag_is_an_argument_error() {
        let (_dir, settings) = settings();
        let mut out: Vec<u8> = Vec::new();
        let err = search_from_args(&settings.database, ["--undefined"], &mut out).unwrap_err();
        match err {
            Error::Argument(msg) => assert!(msg.contains("--undefined")),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!settings.database.exists());
    }

    #[test]
    fn test_search_help_is_returned_not_printed() {
        let (_dir, settings) = settings();
        let mut out: Vec<u8> = Vec::new();
        let err = search_from_args(&settings.database, ["--help"], &mut out).unwrap_err();
        match err {
            Error::Argument(msg) => assert!(msg.contains("Usage")),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_search_on_fresh_database() {
        let (_dir, settings) = settings();
        assert_eq!(search_output(&settings.database, &["--tags", "a,b,c"]), "");
        assert_eq!(search_output(&settings.database, &["--tags", ""]), "");
        assert!(settings.database.exists());
    }

    #[test]
    fn test_add_then_search_existing_tags() {
        let (_dir, settings) = settings();
        run_add(&settings, "a,b,c", &["word1", "word2"]).unwrap();

        assert_eq!(search_output(&settings.database, &["--tags", "a,b,c"]), "word1\nword2\n");

        let stats = WordStore::open_read_only(&settings.database).unwrap().stats().unwrap();
        assert_eq!(stats, DbStats { words: 2, tags: 3, links: 2 * 3 });
    }

    #[test]
    fn test_search_show_tags_and_json() {
        let (_dir, settings) = settings();
        run_add(&settings, "b,a", &["word1"]).unwrap();
        run_add(&settings, "", &["word2"]).unwrap();

        assert_eq!(search_output(&settings.database, &["-s"]), "word1 a,b\nword2 \n");
        assert_eq!(
            search_output(&settings.database, &["--tags", "a", "--json"]),
            "{\"name\":\"word1\"}\n"
        );
        assert_eq!(
            search_output(&settings.database, &["--tags", "a", "--json", "--st"]),
            "{\"name\":\"word1\",\"tags\":[\"a\",\"b\"]}\n"
        );
    }

    #[test]
    fn test_search_does_not_create_tags() {
        let (_dir, settings) = settings();
        run_add(&settings, "", &["word1"]).unwrap();
        assert_eq!(search_output(&settings.database, &["--tags", "ghost"]), "word1\n");
        assert_eq!(run_stats(&settings.database).unwrap().tags, 0);
    }

    #[test]
    fn test_add_without_words() {
        let (_dir, settings) = settings();
        let empty: [&str; 0] = [];
        assert!(matches!(run_add(&settings, "a", &empty), Err(Error::Argument(_))));
    }

    #[test]
    fn test_import_skips_missing_files() {
        let (dir, settings) = settings();
        let words = dir.path().join("words.txt");
        std::fs::write(&words, "one\ntwo\n\nthree\n").unwrap();
        let missing = dir.path().join("nonexistent.txt");

        let stats = run_import(&settings, "num", &[missing, words.clone(), words]).unwrap();
        assert_eq!(stats.words, 6);
        assert_eq!(stats.skipped_files, 1);

        let db = run_stats(&settings.database).unwrap();
        assert_eq!(db, DbStats { words: 3, tags: 1, links: 3 });
    }

    #[test]
    fn test_import_requires_files() {
        let (_dir, settings) = settings();
        assert!(matches!(run_import(&settings, "", &[]), Err(Error::Argument(_))));
    }

    #[test]
    fn test_describe_then_info() {
        let (_dir, settings) = settings();
        run_describe(&settings.database, &["My", "Desc"]).unwrap();

        let mut out: Vec<u8> = Vec::new();
        run_info(&settings.database, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().any(|l| l == "[description]: My Desc"));
        assert!(text.starts_with("[version]: 0.0.0\n[dbname]: default\n"));
    }

    #[test]
    fn test_vacuum() {
        let (_dir, settings) = settings();
        run_add(&settings, "t", &["word"]).unwrap();
        run_vacuum(&settings.database).unwrap();
        assert_eq!(run_stats(&settings.database).unwrap().words, 1);
    }
}
