// Tests for report generation

use chrono::Utc;
use warden_core::export::{
    ReportFormat, generate_batch_report, generate_scan_report, save_report, scan_export_json,
};
use warden_engine::batch::{BatchItem, BatchReport, BatchState, BatchSummary};
use warden_engine::intel::{IntelStatus, IntelligenceResult};
use warden_engine::scan::ScanResult;
use warden_engine::score::RiskScore;
use warden_engine::url_parts::normalize;
use warden_engine::verdict::Verdict;

fn scan_fixture(
    url: &str,
    verdict: Verdict,
    status: IntelStatus,
    threats: &[&str],
    score: u32,
) -> ScanResult {
    let components = normalize(url).unwrap();
    ScanResult {
        url: components.raw.clone(),
        components,
        risk: RiskScore {
            raw: score,
            normalized: score,
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

fn batch_fixture() -> BatchReport {
    let items = vec![
        BatchItem::Scanned(scan_fixture(
            "https://ok.example.com/",
            Verdict::Safe,
            IntelStatus::Safe,
            &[],
            0,
        )),
        BatchItem::Scanned(scan_fixture(
            "https://bad.example.com/",
            Verdict::Dangerous,
            IntelStatus::Dangerous,
            &["MALWARE"],
            0,
        )),
        BatchItem::Failed {
            url: "not a url".to_string(),
            error: "Malformed URL: not a url".to_string(),
        },
    ];
    BatchReport {
        state: BatchState::Completed,
        items,
        summary: BatchSummary {
            total: 3,
            safe: 1,
            suspicious: 0,
            dangerous: 1,
            errored: 1,
        },
    }
}

#[test]
fn report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("TXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("CSV"), Some(ReportFormat::Csv));
    assert_eq!(ReportFormat::from_str("pdf"), None);
}

#[test]
fn export_shape_has_the_canonical_fields() {
    let result = scan_fixture(
        "https://example.com/",
        Verdict::Suspicious,
        IntelStatus::Suspicious,
        &["POTENTIALLY_HARMFUL_APPLICATION"],
        45,
    );
    let value = scan_export_json(&result);

    assert_eq!(value["url"], "https://example.com/");
    assert_eq!(value["verdict"], "suspicious");
    assert_eq!(
        value["threat_types"],
        serde_json::json!(["POTENTIALLY_HARMFUL_APPLICATION"])
    );
    assert_eq!(value["rule_score"], 45);
    assert_eq!(value["api_available"], true);
    assert!(value["reasons"].is_array());
    assert!(value["timestamp"].is_string());
}

#[test]
fn unavailable_intelligence_exports_api_available_false() {
    let result = scan_fixture(
        "https://example.com/",
        Verdict::Safe,
        IntelStatus::Unavailable,
        &[],
        0,
    );
    let value = scan_export_json(&result);
    assert_eq!(value["api_available"], false);
}

#[test]
fn scan_text_report_carries_verdict_and_reasons() {
    let result = scan_fixture(
        "https://example.com/",
        Verdict::Dangerous,
        IntelStatus::Dangerous,
        &["MALWARE"],
        80,
    );
    let report = generate_scan_report(&result, ReportFormat::Text);

    assert!(report.contains("WARDEN URL SCAN REPORT"));
    assert!(report.contains("DANGEROUS"));
    assert!(report.contains("80/100"));
    assert!(report.contains("MALWARE"));
    assert!(report.contains("Threat intelligence reports no known threats"));
}

#[test]
fn scan_json_report_wraps_the_export_shape() {
    let result = scan_fixture(
        "https://example.com/",
        Verdict::Safe,
        IntelStatus::Safe,
        &[],
        0,
    );
    let report = generate_scan_report(&result, ReportFormat::Json);
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();

    assert_eq!(value["report"]["metadata"]["generator"], "warden");
    assert_eq!(value["report"]["result"]["verdict"], "safe");
}

#[test]
fn scan_csv_has_header_and_none_placeholder() {
    let result = scan_fixture(
        "https://example.com/",
        Verdict::Safe,
        IntelStatus::Safe,
        &[],
        0,
    );
    let report = generate_scan_report(&result, ReportFormat::Csv);
    let mut lines = report.lines();

    assert_eq!(
        lines.next(),
        Some("URL,Status,Threat Types,Risk Score,Timestamp")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("https://example.com/,SAFE,None,0,"));
}

#[test]
fn csv_quotes_fields_containing_commas() {
    let result = scan_fixture(
        "https://example.com/",
        Verdict::Dangerous,
        IntelStatus::Dangerous,
        &["MALWARE", "UNWANTED_SOFTWARE"],
        70,
    );
    let report = generate_scan_report(&result, ReportFormat::Csv);
    assert!(report.contains("\"MALWARE, UNWANTED_SOFTWARE\""));
}

#[test]
fn batch_text_report_summarizes_counts_in_order() {
    let report = generate_batch_report(&batch_fixture(), ReportFormat::Text);

    assert!(report.contains("WARDEN BATCH SCAN REPORT"));
    assert!(report.contains("Total URLs:   3"));
    assert!(report.contains("Safe:       1"));
    assert!(report.contains("Dangerous:  1"));
    assert!(report.contains("Errors:     1"));

    // Items keep their input order.
    let ok = report.find("https://ok.example.com/").unwrap();
    let bad = report.find("https://bad.example.com/").unwrap();
    let failed = report.find("not a url").unwrap();
    assert!(ok < bad && bad < failed);
}

#[test]
fn batch_json_report_keeps_error_entries() {
    let report = generate_batch_report(&batch_fixture(), ReportFormat::Json);
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();

    assert_eq!(value["report"]["status"], "completed");
    assert_eq!(value["report"]["summary"]["total"], 3);
    assert_eq!(value["report"]["summary"]["errored"], 1);

    let results = value["report"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["verdict"], "safe");
    assert_eq!(results[2]["url"], "not a url");
    assert!(results[2]["error"].as_str().unwrap().contains("Malformed"));
}

#[test]
fn batch_csv_skips_error_entries() {
    let report = generate_batch_report(&batch_fixture(), ReportFormat::Csv);
    let lines: Vec<&str> = report.lines().collect();

    // Header plus the two scanned rows; the malformed entry has no row.
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("SAFE"));
    assert!(lines[2].contains("DANGEROUS"));
}

#[test]
fn save_report_writes_the_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.txt");
    save_report("hello report", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello report");
}
