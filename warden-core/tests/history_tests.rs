// Tests for the scan history store

use chrono::Utc;
use tempfile::TempDir;
use warden_core::history::Database;
use warden_engine::batch::{BatchState, BatchSummary};
use warden_engine::intel::{IntelStatus, IntelligenceResult};
use warden_engine::scan::ScanResult;
use warden_engine::score::RiskScore;
use warden_engine::url_parts::normalize;
use warden_engine::verdict::Verdict;

fn scan_fixture(url: &str, verdict: Verdict, status: IntelStatus, threats: &[&str]) -> ScanResult {
    let components = normalize(url).unwrap();
    ScanResult {
        url: components.raw.clone(),
        components,
        risk: RiskScore {
            raw: 30,
            normalized: 21,
        },
        intelligence: IntelligenceResult {
            status,
            threat_types: threats.iter().map(|t| t.to_string()).collect(),
            checked_at: Utc::now(),
        },
        findings: Vec::new(),
        verdict,
        reasons: vec!["Threat intelligence reports no known threats".to_string()],
        scanned_at: Utc::now(),
    }
}

fn open_db(dir: &TempDir) -> Database {
    Database::new(&dir.path().join("warden.db")).unwrap()
}

#[test]
fn insert_and_read_back_round_trip() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    let result = scan_fixture(
        "https://example.com/",
        Verdict::Dangerous,
        IntelStatus::Dangerous,
        &["MALWARE", "SOCIAL_ENGINEERING"],
    );
    db.insert_scan(&result, None).unwrap();

    let entries = db.recent_scans(10).unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.url, "https://example.com/");
    assert_eq!(entry.verdict, "dangerous");
    assert_eq!(entry.threat_types, vec!["MALWARE", "SOCIAL_ENGINEERING"]);
    assert_eq!(entry.rule_score, 21);
    assert!(entry.api_available);
    assert_eq!(entry.reasons.len(), 1);
    assert!(entry.batch_id.is_none());
}

#[test]
fn recent_scans_returns_newest_first() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    for host in ["one.example.com", "two.example.com", "three.example.com"] {
        let result = scan_fixture(
            &format!("https://{host}/"),
            Verdict::Safe,
            IntelStatus::Safe,
            &[],
        );
        db.insert_scan(&result, None).unwrap();
    }

    let entries = db.recent_scans(2).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].url, "https://three.example.com/");
    assert_eq!(entries[1].url, "https://two.example.com/");
}

#[test]
fn unavailable_intelligence_round_trips_as_unavailable() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    let result = scan_fixture(
        "https://example.com/",
        Verdict::Safe,
        IntelStatus::Unavailable,
        &[],
    );
    db.insert_scan(&result, None).unwrap();

    let entries = db.recent_scans(1).unwrap();
    assert!(!entries[0].api_available);
}

#[test]
fn history_is_pruned_to_capacity() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir).with_max_history(3);

    for idx in 0..10 {
        let result = scan_fixture(
            &format!("https://host{idx}.example.com/"),
            Verdict::Safe,
            IntelStatus::Safe,
            &[],
        );
        db.insert_scan(&result, None).unwrap();
    }

    assert_eq!(db.count_scans().unwrap(), 3);
    let entries = db.recent_scans(10).unwrap();
    assert_eq!(entries[0].url, "https://host9.example.com/");
    assert_eq!(entries[2].url, "https://host7.example.com/");
}

#[test]
fn clear_history_removes_everything() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    let result = scan_fixture("https://example.com/", Verdict::Safe, IntelStatus::Safe, &[]);
    db.insert_scan(&result, None).unwrap();
    assert_eq!(db.count_scans().unwrap(), 1);

    db.clear_history().unwrap();
    assert_eq!(db.count_scans().unwrap(), 0);
    assert!(db.recent_scans(10).unwrap().is_empty());
}

#[test]
fn batch_session_lifecycle() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    let session_id = db.create_batch_session(5).unwrap();
    assert_eq!(db.batch_session_status(&session_id).unwrap(), "running");

    let result = scan_fixture("https://example.com/", Verdict::Safe, IntelStatus::Safe, &[]);
    db.insert_scan(&result, Some(&session_id)).unwrap();

    let entries = db.recent_scans(1).unwrap();
    assert_eq!(entries[0].batch_id.as_deref(), Some(session_id.as_str()));

    let summary = BatchSummary {
        total: 5,
        safe: 4,
        suspicious: 0,
        dangerous: 0,
        errored: 1,
    };
    db.finish_batch_session(&session_id, BatchState::Completed, &summary)
        .unwrap();
    assert_eq!(db.batch_session_status(&session_id).unwrap(), "completed");
}

#[test]
fn cancelled_batch_session_is_recorded_as_cancelled() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);

    let session_id = db.create_batch_session(3).unwrap();
    let summary = BatchSummary {
        total: 3,
        safe: 2,
        ..BatchSummary::default()
    };
    db.finish_batch_session(&session_id, BatchState::Cancelled, &summary)
        .unwrap();
    assert_eq!(db.batch_session_status(&session_id).unwrap(), "cancelled");
}

#[test]
fn database_exists_and_drop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("warden.db");

    assert!(!Database::exists(&path));
    {
        let _db = Database::new(&path).unwrap();
    }
    assert!(Database::exists(&path));
    Database::drop_db(&path).unwrap();
    assert!(!Database::exists(&path));
}
