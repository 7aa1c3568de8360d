use renderbatch::ConversionResult;
use renderbatch::backend::Render;
use renderbatch::backend::session::SessionBackend;
use renderbatch::engine::progress::ProgressTracker;
use renderbatch::engine::{
    Decision, NameResolver, aggregate, failure_preview, glob_match, has_source_extension,
    is_up_to_date, matches_any_pattern, skip_decision,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

// --- glob_match ---

#[test]
fn test_glob_match_literal() {
    assert!(glob_match("report.doc", "report.doc"));
    assert!(!glob_match("report.doc", "report.do"));
}

#[test]
fn test_glob_match_star() {
    assert!(glob_match("Invoice_*", "Invoice_001.doc"));
    assert!(glob_match("*.doc", "x.doc"));
    assert!(glob_match("*.doc", ".doc"));
    assert!(!glob_match("*.doc", "x.doc.bak"));
}

#[test]
fn test_glob_match_question() {
    assert!(glob_match("?.doc", "a.doc"));
    assert!(!glob_match("?.doc", "ab.doc"));
    assert!(!glob_match("?.doc", ".doc"));
}

#[test]
fn test_glob_match_case_insensitive() {
    assert!(glob_match("invoice_*", "INVOICE_001.DOC"));
    assert!(glob_match("*.DOC", "report.doc"));
}

#[test]
fn test_glob_match_anchored_not_substring() {
    assert!(!glob_match("Invoice", "Invoice_001.doc"));
    assert!(!glob_match("001", "Invoice_001.doc"));
}

// --- matches_any_pattern ---

#[test]
fn test_matches_any_empty_set_matches_everything() {
    assert!(matches_any_pattern("anything.doc", &[]));
    assert!(matches_any_pattern("", &[]));
}

#[test]
fn test_matches_any_is_or() {
    let patterns = vec!["Invoice_*".to_string(), "Report_*".to_string()];
    assert!(matches_any_pattern("Invoice_001.doc", &patterns));
    assert!(matches_any_pattern("Report_001.doc", &patterns));
    assert!(!matches_any_pattern("Memo_001.doc", &patterns));
}

#[test]
fn test_matches_any_order_independent() {
    let forward = vec!["Invoice_*".to_string(), "*.docx".to_string()];
    let reversed = vec!["*.docx".to_string(), "Invoice_*".to_string()];
    for name in ["Invoice_001.doc", "letter.docx", "other.txt"] {
        assert_eq!(
            matches_any_pattern(name, &forward),
            matches_any_pattern(name, &reversed)
        );
    }
}

// --- has_source_extension ---

#[test]
fn test_has_source_extension_case_insensitive() {
    let exts = vec!["doc".to_string(), "docx".to_string()];
    assert!(has_source_extension(Path::new("a.doc"), &exts));
    assert!(has_source_extension(Path::new("a.DOC"), &exts));
    assert!(has_source_extension(Path::new("dir/a.DocX"), &exts));
    assert!(!has_source_extension(Path::new("a.txt"), &exts));
    assert!(!has_source_extension(Path::new("doc"), &exts));
}

// --- is_up_to_date / skip_decision ---

fn t(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
fn test_up_to_date_target_newer_or_equal() {
    assert!(is_up_to_date(t(100), t(100), Duration::ZERO));
    assert!(is_up_to_date(t(100), t(101), Duration::ZERO));
}

#[test]
fn test_up_to_date_source_newer() {
    assert!(!is_up_to_date(t(101), t(100), Duration::ZERO));
}

#[test]
fn test_up_to_date_window_absorbs_skew() {
    let window = Duration::from_secs(5);
    assert!(is_up_to_date(t(104), t(100), window));
    assert!(is_up_to_date(t(105), t(100), window));
    assert!(!is_up_to_date(t(106), t(100), window));
}

fn set_mtime(path: &Path, time: SystemTime) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

#[test]
fn test_skip_decision_missing_target() {
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("x.doc");
    std::fs::write(&source, b"src").unwrap();
    let target = dir.path().join("x.pdf");
    assert_eq!(
        skip_decision(&source, &target, Duration::ZERO),
        Decision::Convert
    );
}

#[test]
fn test_skip_decision_target_newer() {
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("x.doc");
    let target = dir.path().join("x.pdf");
    std::fs::write(&source, b"src").unwrap();
    std::fs::write(&target, b"out").unwrap();
    set_mtime(&source, t(1_000_000));
    set_mtime(&target, t(1_000_100));
    assert_eq!(
        skip_decision(&source, &target, Duration::ZERO),
        Decision::Skip
    );
}

#[test]
fn test_skip_decision_source_newer_regenerates() {
    let dir = tempfile::TempDir::new().unwrap();
    let source = dir.path().join("x.doc");
    let target = dir.path().join("x.pdf");
    std::fs::write(&source, b"src").unwrap();
    std::fs::write(&target, b"out").unwrap();
    set_mtime(&source, t(1_000_100));
    set_mtime(&target, t(1_000_000));
    assert_eq!(
        skip_decision(&source, &target, Duration::ZERO),
        Decision::Convert
    );
}

// --- NameResolver ---

#[test]
fn test_resolve_empty_input() {
    let resolver = NameResolver::new("pdf");
    assert_eq!(resolver.resolve(""), "");
}

#[test]
fn test_resolve_unmapped_substitutes_extension() {
    let resolver = NameResolver::new("pdf");
    assert_eq!(resolver.resolve("report.doc"), "report.pdf");
    assert_eq!(resolver.resolve("1045_233_raw.doc"), "1045_233_raw.pdf");
}

#[test]
fn test_resolve_mapped_code_pair() {
    let dir = tempfile::TempDir::new().unwrap();
    let names = dir.path().join("names.toml");
    std::fs::write(
        &names,
        "[names]\n\"1045_233\" = \"Quarterly_Invoice\"\n",
    )
    .unwrap();
    let resolver = NameResolver::from_file(Some(&names), "pdf");
    assert_eq!(
        resolver.resolve("1045_233_raw.doc"),
        "Quarterly_Invoice.pdf"
    );
    // Non-matching code pair still passes through.
    assert_eq!(resolver.resolve("9999_1_raw.doc"), "9999_1_raw.pdf");
    // Non-numeric prefix never hits the map.
    assert_eq!(resolver.resolve("draft_233_raw.doc"), "draft_233_raw.pdf");
}

#[test]
fn test_resolve_missing_names_file_passes_through() {
    let resolver = NameResolver::from_file(Some(Path::new("/nonexistent/names.toml")), "pdf");
    assert_eq!(resolver.resolve("report.doc"), "report.pdf");
}

// --- ConversionResult invariants ---

#[test]
fn test_result_constructors_keep_skip_implies_success() {
    let p = PathBuf::from("a.doc");
    let converted = ConversionResult::converted(&p);
    assert!(converted.success && !converted.skipped && converted.error.is_none());
    let skipped = ConversionResult::skipped(&p);
    assert!(skipped.success && skipped.skipped);
    let failed = ConversionResult::failed(&p, "boom");
    assert!(!failed.success && !failed.skipped);
    assert_eq!(failed.error.as_deref(), Some("boom"));
}

// --- aggregate / failure_preview ---

fn results_fixture() -> Vec<ConversionResult> {
    let p = |s: &str| PathBuf::from(s);
    vec![
        ConversionResult::converted(&p("a.doc")),
        ConversionResult::converted(&p("b.doc")),
        ConversionResult::skipped(&p("c.doc")),
        ConversionResult::failed(&p("d.doc"), "renderer exploded"),
        ConversionResult::failed(&p("e.doc"), "timed out"),
    ]
}

#[test]
fn test_aggregate_counts_sum_to_total() {
    let results = results_fixture();
    let stats = aggregate(&results, Duration::from_secs(10));
    assert_eq!(stats.converted, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.total(), results.len());
}

#[test]
fn test_aggregate_throughput() {
    let results = results_fixture();
    let stats = aggregate(&results, Duration::from_secs(10));
    assert!((stats.throughput - 0.5).abs() < 1e-9);
}

#[test]
fn test_aggregate_zero_elapsed_guard() {
    let stats = aggregate(&results_fixture(), Duration::ZERO);
    assert_eq!(stats.throughput, 0.0);
}

#[test]
fn test_failure_preview_bounded() {
    let p = PathBuf::from("x.doc");
    let results: Vec<ConversionResult> = (0..7)
        .map(|i| ConversionResult::failed(&p, format!("error {i}")))
        .collect();
    let preview = failure_preview(&results, 5);
    assert_eq!(preview.len(), 6);
    assert_eq!(preview[5], "... and 2 more");
}

#[test]
fn test_failure_preview_within_bound_has_no_marker() {
    let preview = failure_preview(&results_fixture(), 10);
    assert_eq!(preview.len(), 2);
    assert!(preview[0].contains("renderer exploded"));
}

// --- ProgressTracker ---

#[test]
fn test_progress_sequential_thresholds() {
    let tracker = ProgressTracker::new(40);
    let mut emitted = Vec::new();
    for _ in 0..40 {
        if let Some((done, percent)) = tracker.record() {
            emitted.push((done, percent));
        }
    }
    // 40 jobs at a 5% step: one emit every 2 jobs, final at 100.
    assert_eq!(tracker.done(), 40);
    assert_eq!(emitted.last(), Some(&(40, 100)));
    let percents: Vec<usize> = emitted.iter().map(|&(_, p)| p).collect();
    assert!(percents.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_progress_final_job_always_reports() {
    let tracker = ProgressTracker::new(3);
    let mut last = None;
    for _ in 0..3 {
        if let Some(e) = tracker.record() {
            last = Some(e);
        }
    }
    assert_eq!(last, Some((3, 100)));
}

#[test]
fn test_progress_concurrent_no_duplicates_monotonic() {
    use std::sync::{Arc, Mutex};
    let tracker = Arc::new(ProgressTracker::new(200));
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let emitted = Arc::clone(&emitted);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    if let Some((_, percent)) = tracker.record() {
                        emitted.lock().unwrap().push(percent);
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let mut percents = emitted.lock().unwrap().clone();
    assert_eq!(tracker.done(), 200);
    assert!(percents.contains(&100));
    // Each threshold is claimed by exactly one worker.
    let unclaimed_len = percents.len();
    percents.sort_unstable();
    percents.dedup();
    assert_eq!(percents.len(), unclaimed_len);
}

// --- session worker ceiling ---

#[test]
fn test_session_ceiling_clamps() {
    let backend = SessionBackend::new(PathBuf::from("/usr/bin/renderer"), 4);
    assert_eq!(backend.worker_ceiling(16), 4);
    assert_eq!(backend.worker_ceiling(4), 4);
    assert_eq!(backend.worker_ceiling(2), 2);
}
