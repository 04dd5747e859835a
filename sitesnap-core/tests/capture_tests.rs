// Tests for run orchestration helpers and reporting

use sitesnap_core::capture::{
    CaptureOptions, CaptureReport, StoreSink, generate_capture_listing, generate_capture_report,
};
use sitesnap_core::data::Database;
use sitesnap_crawler::crawler::CaptureSink;
use tempfile::TempDir;

#[test]
fn test_store_sink_records_with_run_id() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    let run_id = db.create_run("https://example.com/").unwrap();

    let mut sink = StoreSink {
        db,
        run_id: run_id.clone(),
    };
    let id = sink
        .record("https://example.com/index.do", "shots/index.png")
        .unwrap();
    assert!(id > 0);

    let rows = sink.db.list_captures_for_run(&run_id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].url, "https://example.com/index.do");
    assert_eq!(rows[0].image_path, "shots/index.png");
}

#[test]
fn test_capture_options_defaults() {
    let options = CaptureOptions::new("https://example.com/", "db/sitesnap.db", "shots");
    assert_eq!(options.max_pages, sitesnap_crawler::DEFAULT_MAX_PAGES);
    assert_eq!(options.timeout_secs, 30);
    assert!(options.login.is_none());
    assert!(options.exclusion_marker.is_none());
}

#[test]
fn test_capture_report_rendering() {
    let report = CaptureReport {
        run_id: "abc-123".to_string(),
        seed_url: "https://example.com/index.do".to_string(),
        shots_dir: "shots/2026_08_29".to_string(),
        visited: 12,
        captured: 4,
    };

    let text = generate_capture_report(&report);
    assert!(text.contains("https://example.com/index.do"));
    assert!(text.contains("abc-123"));
    assert!(text.contains("12"));
    assert!(text.contains("4"));
    assert!(text.contains("shots/2026_08_29"));
}

#[test]
fn test_capture_listing_rendering() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    let run_id = db.create_run("https://example.com/").unwrap();
    db.insert_capture(Some(&run_id), "https://example.com/a", "shots/a.png")
        .unwrap();
    db.insert_capture(Some(&run_id), "https://example.com/b", "shots/b.png")
        .unwrap();

    let rows = db.list_captures().unwrap();
    let text = generate_capture_listing(&rows);
    assert!(text.contains("2 stored capture(s)"));
    assert!(text.contains("https://example.com/a"));
    assert!(text.contains("shots/b.png"));
}

#[test]
fn test_capture_listing_empty() {
    let text = generate_capture_listing(&[]);
    assert!(text.contains("No captures"));
}
