//! End-to-end tests for batch processing over an on-disk work directory.
//!
//! Covers: document discovery, completeness check, per-document failure
//! isolation, resume, sharding and the JSON output shape.

use std::fs;
use std::path::Path;

use amr_chains::batch::{self, BatchReport};
use amr_chains::io::{DocRef, WorkDir};
use amr_chains::PipelineConfig;
use pretty_assertions::assert_eq;

// ============================================================================
// Helper: populate a work directory.
// ============================================================================

fn write(root: &Path, kind: &str, subdir: &str, name: &str, text: &str) {
    let dir = root.join(kind).join(subdir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), text).unwrap();
}

fn write_doc(root: &Path, subdir: &str, name: &str, amr: &str, align: &str, tokens: &str, coref: Option<&str>) {
    write(root, "amr", subdir, name, amr);
    write(root, "align", subdir, name, align);
    write(root, "tokenized", subdir, name, tokens);
    if let Some(coref) = coref {
        write(root, "coref", subdir, name, coref);
    }
}

const DEALER_AMR: &str = "# ::snt the dealer testified\n\
(t / testify-01\n    :ARG0 (d / dealer))\n\
\n\
(b / buy-01\n    :ARG0 (h / he)\n    :ARG1 (k / knife))";

fn populate(root: &Path) {
    // Two sentences, dealer coreferent across them.
    write_doc(
        root,
        "nyt_eng_199407",
        "NYT_ENG_19940701.0001.txt",
        DEALER_AMR,
        "1 d\t2 t\n0 h\t1 b\t3 k",
        "the dealer testified\nhe bought a knife\n",
        Some("0 2\t3 4\n5 7\n"),
    );
    // First sentence malformed: the document is still written.
    write_doc(
        root,
        "nyt_eng_199407",
        "NYT_ENG_19940701.0002.txt",
        "(r / run-02 :ARG0 (b / boy)\n\n(j / jump-03 :ARG0 (g / girl))",
        "1 r\t0 b\n1 j\t0 g",
        "boy ran\ngirl jumped\n",
        Some("2 3\n"),
    );
    // Coreference missing: incomplete.
    write_doc(root, "nyt_eng_199408", "NYT_ENG_19940801.0001.txt", "(g / go-02)", "0 g", "went\n", None);
    // Coreference malformed: the document fails to load.
    write_doc(
        root,
        "nyt_eng_199408",
        "NYT_ENG_19940801.0002.txt",
        "(g / go-02)",
        "0 g",
        "went\n",
        Some("zero one\n"),
    );
}

fn ids(report: &BatchReport) -> (Vec<&str>, Vec<&str>) {
    (
        report.written.iter().map(String::as_str).collect(),
        report.skipped.iter().map(|s| s.unit.as_str()).collect(),
    )
}

// ============================================================================
// 1. Failure isolation
// ============================================================================

#[test]
fn test_batch_isolates_failures() {
    let tmp = tempfile::tempdir().unwrap();
    populate(tmp.path());
    let work = WorkDir::new(tmp.path());

    let report = batch::run_work_dir(&work, &PipelineConfig::default()).unwrap();
    let (written, skipped) = ids(&report);
    assert_eq!(written, vec!["NYT_ENG_19940701.0001", "NYT_ENG_19940701.0002"]);
    assert_eq!(skipped, vec![
        "NYT_ENG_19940701.0002#0",
        "NYT_ENG_19940801.0001",
        "NYT_ENG_19940801.0002",
    ]);
    assert!(report.skipped[1].reason.contains("coref"));

    let failed: Vec<&str> = report.failed_documents().map(|s| s.unit.as_str()).collect();
    assert_eq!(failed, vec!["NYT_ENG_19940801.0001", "NYT_ENG_19940801.0002"]);

    let partial = work.read_document(&DocRef::new("nyt_eng_199407", "NYT_ENG_19940701.0002.txt")).unwrap();
    let predicates: Vec<&str> = partial.events.iter().map(|e| e.predicate.as_str()).collect();
    assert_eq!(predicates, vec!["jump-03"]);
    assert_eq!(partial.events[0].sent_id, 1);
}

// ============================================================================
// 2. Output shape
// ============================================================================

#[test]
fn test_output_json_shape() {
    let tmp = tempfile::tempdir().unwrap();
    populate(tmp.path());
    let work = WorkDir::new(tmp.path());
    batch::run_work_dir(&work, &PipelineConfig::default()).unwrap();

    let path = tmp.path().join("event/nyt_eng_199407/NYT_ENG_19940701.0001.txt");
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(json["doc_id"], "NYT_ENG_19940701.0001");
    let dealer = &json["entities"][0];
    assert_eq!(dealer["head"], "dealer");
    assert_eq!(dealer["concept"], "dealer");
    assert_eq!(dealer["mentions"], serde_json::json!([["the", "dealer"], ["he"]]));

    let events = json["events"].as_array().unwrap();
    let summary: Vec<(&str, u64, u64)> = events
        .iter()
        .map(|e| (e["predicate"].as_str().unwrap(), e["sent_id"].as_u64().unwrap(), e["verb_pos"].as_u64().unwrap()))
        .collect();
    // Sentence-relative; a verb's scope includes its arguments' tokens.
    assert_eq!(summary, vec![("testify-01", 0, 2), ("buy-01", 1, 3)]);

    // "he" (sentence 1, token 0) resolves to the dealer.
    assert_eq!(events[1]["roles"][0], serde_json::json!({
        "role": ":ARG0",
        "value": ["he"],
        "concept": "he",
        "ent_id": 0,
    }));
}

// ============================================================================
// 3. Resume and sharding
// ============================================================================

#[test]
fn test_rerun_skips_finished_documents() {
    let tmp = tempfile::tempdir().unwrap();
    populate(tmp.path());
    let work = WorkDir::new(tmp.path());

    batch::run_work_dir(&work, &PipelineConfig::default()).unwrap();
    let second = batch::run_work_dir(&work, &PipelineConfig::default()).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.already_done, vec!["NYT_ENG_19940701.0001", "NYT_ENG_19940701.0002"]);
    assert_eq!(second.failed_documents().count(), 2);
}

#[test]
fn test_shards_cover_work_dir_once() {
    let tmp = tempfile::tempdir().unwrap();
    populate(tmp.path());
    let work = WorkDir::new(tmp.path());

    let mut seen = Vec::new();
    for worker_id in 0..2 {
        let config = PipelineConfig { workers: 2, worker_id, ..PipelineConfig::default() };
        let report = batch::run_work_dir(&work, &config).unwrap();
        seen.extend(report.written.iter().cloned());
        seen.extend(report.failed_documents().map(|s| s.unit.clone()));
    }
    seen.sort();
    assert_eq!(seen, vec![
        "NYT_ENG_19940701.0001",
        "NYT_ENG_19940701.0002",
        "NYT_ENG_19940801.0001",
        "NYT_ENG_19940801.0002",
    ]);
}

#[test]
fn test_missing_amr_dir_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let work = WorkDir::new(tmp.path());
    assert!(matches!(
        batch::run_work_dir(&work, &PipelineConfig::default()),
        Err(amr_chains::Error::Io(_))
    ));
}
