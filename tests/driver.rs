//! Driver Integration Tests
//!
//! End-to-end runs over seed lists: verdict collection, report contents,
//! print-only behaviour and throttling.

mod common;

use std::time::{Duration, Instant};

use common::*;
use imgset_inspector::core::{
    load_seeds, write_report, Driver, Mode, Verifier, VerifyOptions,
};
use imgset_inspector::domain::{BrokenReason, Verdict};
use tempfile::TempDir;

fn driver(store: MemoryStore, mode: Mode) -> Driver<MemoryStore> {
    let options = VerifyOptions {
        mode,
        ..Default::default()
    };
    Driver::new(Verifier::new(store, options), Duration::ZERO)
}

fn seeds(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_self_cycle_seed_is_reported() {
    let temp = TempDir::new().unwrap();
    let seed_file = temp.path().join("uuids.json");
    std::fs::write(&seed_file, r#"["A"]"#).unwrap();
    let broken_file = temp.path().join("broken-images");

    let d = driver(MemoryStore::new().with(image_set("A", &["A"])), Mode::Verify);
    let report = d.run(&load_seeds(&seed_file).unwrap()).await;

    assert_eq!(
        report.outcomes[0].verdict,
        Verdict::Broken {
            reason: BrokenReason::Cycle,
            offending_id: "A".to_string(),
        }
    );
    assert_eq!(report.broken, vec!["A"]);

    write_report(&broken_file, &report.broken).unwrap();
    assert_eq!(std::fs::read_to_string(&broken_file).unwrap(), "A");
}

#[tokio::test]
async fn test_article_with_good_image_set_is_safe() {
    let store = MemoryStore::new()
        .with(article("B", &embed("X"), None))
        .with(image("X"));
    let d = driver(store, Mode::Verify);

    let report = d.run(&seeds(&["B"])).await;

    assert_eq!(report.outcomes[0].verdict, Verdict::Safe);
    assert!(report.broken.is_empty());
    assert_eq!(report.safe_count(), 1);
}

#[tokio::test]
async fn test_wrong_provenance_seed_is_reported() {
    let store = MemoryStore::new().with(with_tag(image("C"), "legacy-import"));
    let d = driver(store, Mode::Verify);

    let report = d.run(&seeds(&["C"])).await;

    assert_eq!(
        report.outcomes[0].verdict,
        Verdict::WrongProvenance {
            id: "C".to_string()
        }
    );
    assert_eq!(report.broken, vec!["C"]);
}

#[tokio::test]
async fn test_report_lists_the_broken_image_set_not_the_article() {
    let store = MemoryStore::new()
        .with(article("B", &embed("L"), None))
        .with(article("D", &embed("L"), Some("img")))
        .with(image_set("L", &["L"]))
        .with(image("img"));
    let d = driver(store, Mode::Verify);

    let report = d.run(&seeds(&["B", "D"])).await;

    assert_eq!(report.count("broken"), 2);
    assert_eq!(report.outcomes[0].id, "B");
    assert_eq!(report.broken, vec!["L"]);
}

#[tokio::test]
async fn test_failures_do_not_stop_the_run() {
    let store = MemoryStore::new()
        .with(image_set("loop", &["loop"]))
        .with(image("ok"))
        .with(other("odd", "Video"));
    let d = driver(store, Mode::Verify);

    let report = d
        .run(&seeds(&["missing", "loop", "ok", "odd", "loop"]))
        .await;

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.safe_count(), 1);
    assert_eq!(report.count("broken"), 2);
    assert_eq!(report.count("error"), 1);
    assert_eq!(report.count("unresolved-type"), 1);
    // Deduplicated; compared as a set
    let mut broken = report.broken.clone();
    broken.sort();
    assert_eq!(broken, vec!["loop", "missing", "odd"]);
    assert!(report.summary().starts_with("5 seeds: 1 safe, 2 broken"));
}

#[tokio::test]
async fn test_print_only_records_encountered_ids() {
    let store = MemoryStore::new()
        .with(with_tag(article("art", &embed("loop"), Some("img")), "other"))
        .with(image_set("loop", &["loop"]))
        .with(image("img"));
    let d = driver(store, Mode::PrintOnly);

    let report = d.run(&seeds(&["art", "img"])).await;

    assert_eq!(report.mode, Mode::PrintOnly);
    assert!(report.broken.is_empty());
    assert_eq!(report.encountered, vec!["art", "img", "loop"]);
}

#[tokio::test]
async fn test_delay_between_seeds() {
    let store = MemoryStore::new().with(image("a")).with(image("b")).with(image("c"));
    let d = Driver::new(
        Verifier::new(store, VerifyOptions::default()),
        Duration::from_millis(30),
    );

    let started = Instant::now();
    let report = d.run(&seeds(&["a", "b", "c"])).await;

    // Two pauses for three seeds
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(report.safe_count(), 3);
    assert_eq!(d.verifier().resolver().calls(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_empty_seed_list() {
    let d = driver(MemoryStore::new(), Mode::Verify);
    let report = d.run(&[]).await;

    assert!(report.outcomes.is_empty());
    assert!(report.broken.is_empty());
    assert!(report.finished_at >= report.started_at);
}
