use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

use chronicle::codec::{decode_line, encode_line};
use chronicle::errors::{AppError, AppResult, CorruptionError};
use chronicle::journal_core::{Entry, EntryFilter, EntryRecord, ExportFormat, Limit, Meta};
use chronicle::journal_io::Store;

// Helper function to set up an initialized store in a temporary directory
fn set_up_store() -> AppResult<(Store, tempfile::TempDir)> {
    let temp_dir = tempdir()?;
    let mut store = Store::new(temp_dir.path().join("journal"));
    store.init("UTC")?;
    Ok((store, temp_dir))
}

fn note(message: &str, tags: &[&str]) -> Entry {
    Entry::build(message, "note", tags.iter().copied(), Meta::new()).unwrap()
}

fn record(id: &str, at: &str, message: &str) -> String {
    format!(
        r#"{{"id":"{}","at":"{}","kind":"note","tags":[],"message":"{}","meta":{{}}}}"#,
        id, at, message
    )
}

fn write_partition(store: &Store, stem: &str, lines: &[String]) {
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(store.entries_dir().join(format!("{}.jsonl", stem)), content).unwrap();
}

#[test]
fn test_search_finds_only_matching_entry() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    store.append(&note("Ship it", &["release"]))?;
    store.append(&note("Refactor", &["dev"]))?;

    let hits = store.search("ship", Some(Limit::new(10)?), &EntryFilter::any())?;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].message(), "Ship it");
    Ok(())
}

#[test]
fn test_append_then_list_one_returns_it() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    store.append(&note("older", &[]))?;
    let latest = note("latest", &["x"]);
    store.append(&latest)?;

    let listed = store.list(Some(Limit::new(1)?), &EntryFilter::any())?;
    assert_eq!(listed, vec![latest]);
    Ok(())
}

#[test]
fn test_list_is_reverse_insertion_order() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    let appended: Vec<Entry> = (0..5).map(|i| note(&format!("entry {}", i), &[])).collect();
    for entry in &appended {
        store.append(entry)?;
    }

    let listed = store.list(None, &EntryFilter::any())?;
    let expected: Vec<Entry> = appended.into_iter().rev().collect();
    assert_eq!(listed, expected);
    Ok(())
}

#[test]
fn test_ordering_across_partitions() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    write_partition(
        &store,
        "2023-11",
        &[
            record("a", "2023-11-01T08:00:00Z", "first"),
            record("b", "2023-11-30T08:00:00Z", "second"),
        ],
    );
    write_partition(&store, "2024-02", &[record("d", "2024-02-10T08:00:00Z", "fourth")]);
    write_partition(&store, "2023-12", &[record("c", "2023-12-24T08:00:00Z", "third")]);

    let ids: Vec<String> = store
        .list(None, &EntryFilter::any())?
        .iter()
        .map(|e| e.id().to_string())
        .collect();
    assert_eq!(ids, vec!["d", "c", "b", "a"]);
    Ok(())
}

#[test]
fn test_limit_caps_results_and_rejects_non_positive() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    for i in 0..4 {
        store.append(&note(&format!("match {}", i), &["t"]))?;
    }

    assert_eq!(store.list(Some(Limit::new(3)?), &EntryFilter::any())?.len(), 3);
    assert_eq!(store.search("match", Some(Limit::new(2)?), &EntryFilter::any())?.len(), 2);
    assert_eq!(store.list(None, &EntryFilter::any())?.len(), 4);

    assert!(matches!(Limit::new(0), Err(AppError::Validation(_))));
    assert!(matches!(Limit::new(-1), Err(AppError::Validation(_))));
    Ok(())
}

#[test]
fn test_filters_apply_before_limit() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    store.append(&Entry::build("a", "note", ["x"], Meta::new())?)?;
    store.append(&Entry::build("b", "task", ["y"], Meta::new())?)?;
    store.append(&Entry::build("c", "task", ["x"], Meta::new())?)?;
    store.append(&Entry::build("d", "note", ["y"], Meta::new())?)?;

    let tasks = store.list(Some(Limit::new(10)?), &EntryFilter::any().with_kind("task"))?;
    assert_eq!(messages(&tasks), vec!["c", "b"]);

    let tagged = store.list(Some(Limit::new(10)?), &EntryFilter::any().with_tag("x"))?;
    assert_eq!(messages(&tagged), vec!["c", "a"]);

    let both = EntryFilter::any().with_kind("task").with_tag("x");
    assert_eq!(messages(&store.list(None, &both)?), vec!["c"]);

    // The newest entry is filtered out, so the single slot goes to an older one
    let one_note = store.list(Some(Limit::new(1)?), &EntryFilter::any().with_tag("x"))?;
    assert_eq!(messages(&one_note), vec!["c"]);
    Ok(())
}

fn messages(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(Entry::message).collect()
}

#[test]
fn test_search_covers_tags_and_meta_case_insensitively() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    let mut meta = Meta::new();
    meta.insert("Project".to_string(), "Apollo".to_string());
    store.append(&Entry::build("plain text", "note", ["Urgent"], meta)?)?;
    store.append(&note("unrelated", &[]))?;

    for query in ["urgent", "PROJECT", "apollo", "^apol", "  apollo  "] {
        let hits = store.search(query, None, &EntryFilter::any())?;
        assert_eq!(messages(&hits), vec!["plain text"], "query {:?}", query);
    }

    let literal = store.search("text (", None, &EntryFilter::any())?;
    assert!(literal.is_empty());
    Ok(())
}

#[test]
fn test_search_rejects_blank_query() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    store.append(&note("Ship it", &["release"]))?;

    assert!(matches!(
        store.search("   ", Some(Limit::new(10)?), &EntryFilter::any()),
        Err(AppError::Validation(_))
    ));
    Ok(())
}

#[test]
fn test_export_json_parses_back_in_order() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    let first = note("one", &["a"]);
    let second = note("two", &["b"]);
    store.append(&first)?;
    store.append(&second)?;

    let json = store.export("JSON".parse::<ExportFormat>()?, None)?;
    let records: Vec<EntryRecord> = serde_json::from_str(&json)?;
    assert_eq!(records, vec![second.to_record(), first.to_record()]);

    let jsonl = store.export("jsonl".parse()?, None)?;
    let decoded: Vec<Entry> = jsonl
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(decode_line)
        .collect::<AppResult<_>>()?;
    assert_eq!(decoded, vec![second, first]);
    Ok(())
}

#[test]
fn test_export_rejects_unknown_format() {
    assert!(matches!(
        "yaml".parse::<ExportFormat>(),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_queries_before_init_fail() {
    let temp_dir = tempdir().unwrap();
    let store = Store::new(temp_dir.path());

    assert!(matches!(
        store.list(None, &EntryFilter::any()),
        Err(AppError::NotInitialized { .. })
    ));
    assert!(matches!(
        store.search("x", None, &EntryFilter::any()),
        Err(AppError::NotInitialized { .. })
    ));
    assert!(matches!(
        store.export(ExportFormat::Jsonl, None),
        Err(AppError::NotInitialized { .. })
    ));
    assert!(matches!(store.config(), Err(AppError::NotInitialized { .. })));
}

#[test]
fn test_corrupt_line_aborts_read() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    write_partition(
        &store,
        "2024-01",
        &[
            record("a", "2024-01-01T00:00:00Z", "good"),
            "{\"id\": \"truncated".to_string(),
        ],
    );

    match store.list(None, &EntryFilter::any()) {
        Err(AppError::Corruption(CorruptionError::InvalidJson { line, content, .. })) => {
            assert_eq!(line, Some(2));
            assert!(content.contains("truncated"));
        }
        other => panic!("Expected corruption error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_non_utf8_line_is_corruption() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    let mut content = record("a", "2024-01-01T00:00:00Z", "good").into_bytes();
    content.extend_from_slice(b"\n{\"message\": \"\xff\xfe\"}\n");
    fs::write(store.entries_dir().join("2024-01.jsonl"), content)?;

    match store.list(None, &EntryFilter::any()) {
        Err(AppError::Corruption(CorruptionError::InvalidUtf8 { path, line, .. })) => {
            assert_eq!(line, Some(2));
            assert_eq!(path, Some(store.entries_dir().join("2024-01.jsonl")));
        }
        other => panic!("Expected corruption error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_round_trip_through_codec() -> AppResult<()> {
    let mut meta = Meta::new();
    meta.insert("k".to_string(), "v \"quoted\"".to_string());
    let entry = Entry::build("tab\there", "idea", ["b,a", "a"], meta)?;

    let line = encode_line(&entry)?;
    assert_eq!(decode_line(&line)?, entry);
    assert_eq!(entry.tags(), ["a", "b"]);
    Ok(())
}

#[test]
fn test_reinit_preserves_entries() -> AppResult<()> {
    let (mut store, _temp_dir) = set_up_store()?;
    let entry = note("survives", &[]);
    store.append(&entry)?;

    store.init("Europe/Paris")?;

    let reopened = Store::new(store.root());
    assert_eq!(reopened.config()?.timezone, "Europe/Paris");
    assert_eq!(reopened.list(None, &EntryFilter::any())?, vec![entry]);
    Ok(())
}

fn count_lines(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

#[test]
fn test_concurrent_appends_never_tear_lines() -> AppResult<()> {
    let (store, _temp_dir) = set_up_store()?;
    let root = Arc::new(store.root().to_path_buf());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let root = Arc::clone(&root);
            thread::spawn(move || -> AppResult<()> {
                let store = Store::new(root.as_path());
                for i in 0..25 {
                    let message = format!("worker {} entry {} {}", worker, i, "x".repeat(512));
                    store.append(&Entry::build(&message, "note", ["load"], Meta::new())?)?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("writer thread panicked")?;
    }

    let all = store.list(None, &EntryFilter::any())?;
    assert_eq!(all.len(), 100);

    let partitions: usize = fs::read_dir(store.entries_dir())?
        .map(|e| count_lines(&e.unwrap().path()))
        .sum();
    assert_eq!(partitions, 100);
    Ok(())
}
