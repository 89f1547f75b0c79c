// Report generation for single scans and batch runs.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use warden_engine::batch::{BatchItem, BatchReport};
use warden_engine::scan::ScanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

const DIVIDER: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const RULE: &str =
    "──────────────────────────────────────────────────────────────────────";

const CSV_HEADER: &str = "URL,Status,Threat Types,Risk Score,Timestamp";

/// The canonical export shape consumed by history/export collaborators.
pub fn scan_export_json(result: &ScanResult) -> serde_json::Value {
    serde_json::json!({
        "url": result.url,
        "verdict": result.verdict.as_str(),
        "threat_types": result.intelligence.threat_types,
        "rule_score": result.risk.normalized,
        "api_available": result.api_available(),
        "reasons": result.reasons,
        "timestamp": result.scanned_at.to_rfc3339(),
    })
}

pub fn generate_scan_report(result: &ScanResult, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => generate_scan_text(result),
        ReportFormat::Json => generate_scan_json(result),
        ReportFormat::Csv => format!("{CSV_HEADER}\n{}\n", csv_row(result)),
    }
}

pub fn generate_batch_report(report: &BatchReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => generate_batch_text(report),
        ReportFormat::Json => generate_batch_json(report),
        ReportFormat::Csv => generate_batch_csv(report),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn generate_scan_text(result: &ScanResult) -> String {
    let mut report = String::new();

    report.push_str(DIVIDER);
    report.push_str("\n                    WARDEN URL SCAN REPORT\n");
    report.push_str(DIVIDER);
    report.push_str("\n\n");

    report.push_str(&format!("URL:          {}\n", result.url));
    report.push_str(&format!("Scanned:      {}\n", result.scanned_at.to_rfc3339()));
    report.push_str(&format!(
        "Verdict:      {}\n",
        result.verdict.as_str().to_uppercase()
    ));
    report.push_str(&format!("Risk Score:   {}/100\n", result.risk.normalized));
    report.push_str(&format!(
        "Intelligence: {}\n",
        if result.api_available() {
            "available"
        } else {
            "unavailable"
        }
    ));
    report.push('\n');

    report.push_str("THREAT INFORMATION\n");
    report.push_str(RULE);
    report.push('\n');
    if result.intelligence.threat_types.is_empty() {
        report.push_str("No threats reported\n");
    } else {
        for (idx, threat) in result.intelligence.threat_types.iter().enumerate() {
            report.push_str(&format!("  {}. {}\n", idx + 1, threat));
        }
    }
    report.push('\n');

    report.push_str("ANALYSIS DETAILS\n");
    report.push_str(RULE);
    report.push('\n');
    for reason in &result.reasons {
        report.push_str(&format!("  - {reason}\n"));
    }
    report.push('\n');

    report.push_str(DIVIDER);
    report.push('\n');

    report
}

fn generate_scan_json(result: &ScanResult) -> String {
    let json_report = serde_json::json!({
        "report": {
            "metadata": report_metadata(),
            "result": scan_export_json(result),
        }
    });
    serde_json::to_string_pretty(&json_report).unwrap_or_default()
}

fn generate_batch_text(report: &BatchReport) -> String {
    let mut out = String::new();

    out.push_str(DIVIDER);
    out.push_str("\n                  WARDEN BATCH SCAN REPORT\n");
    out.push_str(DIVIDER);
    out.push_str("\n\n");

    out.push_str("SUMMARY\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Status:       {}\n", report.state.as_str()));
    out.push_str(&format!("Total URLs:   {}\n", report.summary.total));
    out.push_str(&format!("Processed:    {}\n", report.summary.processed()));
    out.push_str(&format!("  Safe:       {}\n", report.summary.safe));
    out.push_str(&format!("  Suspicious: {}\n", report.summary.suspicious));
    out.push_str(&format!("  Dangerous:  {}\n", report.summary.dangerous));
    out.push_str(&format!("  Errors:     {}\n", report.summary.errored));
    out.push('\n');

    out.push_str("DETAILED RESULTS\n");
    out.push_str(RULE);
    out.push('\n');
    for (idx, item) in report.items.iter().enumerate() {
        match item {
            BatchItem::Scanned(result) => {
                out.push_str(&format!(
                    "[{}] {} {}\n",
                    idx + 1,
                    result.verdict.as_str().to_uppercase(),
                    result.url
                ));
                out.push_str(&format!("    Risk Score: {}/100\n", result.risk.normalized));
                if !result.intelligence.threat_types.is_empty() {
                    out.push_str(&format!(
                        "    Threats: {}\n",
                        result.intelligence.threat_types.join(", ")
                    ));
                }
            }
            BatchItem::Failed { url, error } => {
                out.push_str(&format!("[{}] ERROR {url}\n", idx + 1));
                out.push_str(&format!("    {error}\n"));
            }
        }
    }
    out.push('\n');

    out.push_str(DIVIDER);
    out.push('\n');

    out
}

fn generate_batch_json(report: &BatchReport) -> String {
    let results: Vec<serde_json::Value> = report
        .items
        .iter()
        .map(|item| match item {
            BatchItem::Scanned(result) => scan_export_json(result),
            BatchItem::Failed { url, error } => serde_json::json!({
                "url": url,
                "error": error,
            }),
        })
        .collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": report_metadata(),
            "status": report.state.as_str(),
            "summary": {
                "total": report.summary.total,
                "processed": report.summary.processed(),
                "safe": report.summary.safe,
                "suspicious": report.summary.suspicious,
                "dangerous": report.summary.dangerous,
                "errored": report.summary.errored,
            },
            "results": results,
        }
    });
    serde_json::to_string_pretty(&json_report).unwrap_or_default()
}

fn generate_batch_csv(report: &BatchReport) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for item in &report.items {
        if let BatchItem::Scanned(result) = item {
            out.push_str(&csv_row(result));
            out.push('\n');
        }
    }
    out
}

fn report_metadata() -> serde_json::Value {
    serde_json::json!({
        "generator": "warden",
        "version": env!("CARGO_PKG_VERSION"),
        "generated_at": chrono::Utc::now().to_rfc3339(),
    })
}

fn csv_row(result: &ScanResult) -> String {
    let threat_types = if result.intelligence.threat_types.is_empty() {
        "None".to_string()
    } else {
        result.intelligence.threat_types.join(", ")
    };

    [
        csv_escape(&result.url),
        csv_escape(&result.verdict.as_str().to_uppercase()),
        csv_escape(&threat_types),
        result.risk.normalized.to_string(),
        csv_escape(&result.scanned_at.to_rfc3339()),
    ]
    .join(",")
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
