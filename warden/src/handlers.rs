use anyhow::{Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use warden_core::export::{self, ReportFormat};
use warden_core::history::Database;
use warden_engine::batch::{BatchMessage, BatchRunner, BatchState};
use warden_engine::intel::{SafeBrowsingClient, SafeBrowsingConfig};
use warden_engine::scan::{Analyzer, ScanResult};
use warden_engine::verdict::Verdict;

/// Load URLs from either a hosts file or the repeated --url arguments.
///
/// No validation happens here: malformed entries are the batch engine's
/// business, and it records them as per-item errors instead of dropping them.
pub fn load_urls_from_source(
    urls: Vec<String>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if !urls.is_empty() {
        Ok(urls)
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load URLs from a newline-delimited file, skipping blanks and # comments.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        return Err(format!("No URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// History database location; WARDEN_DB overrides the default.
pub fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("WARDEN_DB") {
        return PathBuf::from(path);
    }
    let expanded = shellexpand::tilde("~/.config/warden/warden.db");
    PathBuf::from(expanded.as_ref())
}

fn resolve_api_key(matches: &ArgMatches) -> Option<String> {
    matches
        .get_one::<String>("api-key")
        .cloned()
        .or_else(|| std::env::var("WARDEN_API_KEY").ok())
}

fn build_analyzer(matches: &ArgMatches) -> Analyzer<SafeBrowsingClient> {
    let timeout_secs = *matches.get_one::<u64>("timeout").unwrap_or(&10);
    let api_key = resolve_api_key(matches);
    if api_key.is_none() {
        eprintln!(
            "{}",
            "[!] No intelligence API key configured; falling back to rule-based analysis only"
                .yellow()
        );
    }

    let client = SafeBrowsingClient::new(SafeBrowsingConfig {
        api_key,
        timeout_secs,
        ..SafeBrowsingConfig::default()
    });
    Analyzer::new(client)
}

fn report_format(matches: &ArgMatches) -> ReportFormat {
    matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

fn verdict_tag(verdict: Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::Safe => "SAFE".green().bold(),
        Verdict::Suspicious => "SUSPICIOUS".yellow().bold(),
        Verdict::Dangerous => "DANGEROUS".red().bold(),
    }
}

fn print_scan_result(result: &ScanResult) {
    println!("\n{} {}", verdict_tag(result.verdict), result.url);
    println!("  Risk score: {}/100", result.risk.normalized);
    println!(
        "  Intelligence: {}",
        if result.api_available() {
            "available"
        } else {
            "unavailable"
        }
    );
    if !result.intelligence.threat_types.is_empty() {
        println!(
            "  Threats: {}",
            result.intelligence.threat_types.join(", ").red()
        );
    }
    println!("  Reasons:");
    for reason in &result.reasons {
        println!("    - {reason}");
    }
}

/// Open the history database if it has been initialized; scanning still
/// works without one, it just isn't recorded.
fn open_history() -> Option<Database> {
    let path = default_db_path();
    if !Database::exists(&path) {
        eprintln!(
            "{}",
            format!(
                "[!] No history database at {}; run `warden init` to record scans",
                path.display()
            )
            .dimmed()
        );
        return None;
    }
    match Database::new(&path) {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("[!] Could not open history database: {e}");
            None
        }
    }
}

pub async fn handle_check(matches: &ArgMatches) -> Result<()> {
    tracing_subscriber::fmt::init();

    let url = matches.get_one::<String>("url").expect("url is required");
    let analyzer = build_analyzer(matches);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {url}..."));

    let result = analyzer.scan(url).await;
    spinner.finish_and_clear();
    let result = result?;

    print_scan_result(&result);

    if !matches.get_flag("no-history")
        && let Some(db) = open_history()
        && let Err(e) = db.insert_scan(&result, None)
    {
        eprintln!("[!] Failed to record scan in history: {e}");
    }

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        let report = export::generate_scan_report(&result, report_format(matches));
        export::save_report(&report, output)?;
        println!("\nReport saved to {}", output.display());
    }

    Ok(())
}

pub async fn handle_batch(matches: &ArgMatches) -> Result<()> {
    tracing_subscriber::fmt::init();

    let url_args: Vec<String> = matches
        .get_many::<String>("url")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let hosts_file = matches.get_one::<PathBuf>("hosts-file");
    let urls = load_urls_from_source(url_args, hosts_file).map_err(|e| anyhow!(e))?;

    let analyzer = build_analyzer(matches);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = BatchRunner::new(analyzer).with_progress(tx);
    let cancel = runner.cancel_flag();

    println!(
        "\nScanning {} URLs sequentially ({} to cancel after the current URL)\n",
        urls.len(),
        "Ctrl-C".bold()
    );

    let progress = ProgressBar::new(urls.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Ctrl-C requests cooperative cancellation; it never interrupts the
    // lookup already in flight.
    let cancel_clone = cancel.clone();
    let progress_clone = progress.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
            progress_clone.set_message("cancelling after current URL...");
        }
    });

    let worker_urls = urls.clone();
    let worker = tokio::spawn(async move { runner.run(&worker_urls).await });

    while let Some(message) = rx.recv().await {
        match message {
            BatchMessage::Started { .. } => {}
            BatchMessage::Scanned { result } => {
                progress.println(format!(
                    "{} {} ({}/100)",
                    verdict_tag(result.verdict),
                    result.url,
                    result.risk.normalized
                ));
            }
            BatchMessage::Failed { url, error } => {
                progress.println(format!("{} {url}: {error}", "SKIPPED".dimmed()));
            }
            BatchMessage::Progress { processed, .. } => {
                progress.set_position(processed as u64);
            }
            BatchMessage::Done { .. } => {}
        }
    }

    let report = worker
        .await
        .map_err(|e| anyhow!("batch worker failed: {e}"))?;
    progress.finish_and_clear();

    match report.state {
        BatchState::Cancelled => println!(
            "\n{} after {} of {} URLs",
            "Batch cancelled".yellow().bold(),
            report.summary.processed(),
            report.summary.total
        ),
        _ => println!("\n{}", "Batch complete".green().bold()),
    }
    println!(
        "  {} safe, {} suspicious, {} dangerous, {} errors\n",
        report.summary.safe,
        report.summary.suspicious,
        report.summary.dangerous,
        report.summary.errored
    );

    if !matches.get_flag("no-history")
        && let Some(db) = open_history()
    {
        match db.create_batch_session(report.summary.total) {
            Ok(session_id) => {
                for item in &report.items {
                    if let warden_engine::batch::BatchItem::Scanned(result) = item
                        && let Err(e) = db.insert_scan(result, Some(&session_id))
                    {
                        eprintln!("[!] Failed to record {} in history: {e}", result.url);
                    }
                }
                if let Err(e) = db.finish_batch_session(&session_id, report.state, &report.summary)
                {
                    eprintln!("[!] Failed to close batch session: {e}");
                }
            }
            Err(e) => eprintln!("[!] Failed to record batch session: {e}"),
        }
    }

    let format = report_format(matches);
    let rendered = export::generate_batch_report(&report, format);
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        export::save_report(&rendered, output)?;
        println!("Report saved to {}", output.display());
    } else if format != ReportFormat::Text {
        // Structured formats go to stdout verbatim so they can be piped.
        print!("{rendered}");
    }

    Ok(())
}

pub fn handle_history(matches: &ArgMatches) -> Result<()> {
    let path = default_db_path();
    if !Database::exists(&path) {
        return Err(anyhow!(
            "No history database at {}; run `warden init` first",
            path.display()
        ));
    }
    let db = Database::new(&path)?;

    if matches.get_flag("clear") {
        db.clear_history()?;
        println!("History cleared.");
        return Ok(());
    }

    let count = *matches.get_one::<usize>("count").unwrap_or(&20);
    let entries = db.recent_scans(count)?;
    if entries.is_empty() {
        println!("No scans recorded yet.");
        return Ok(());
    }

    println!();
    for entry in entries {
        let verdict = match entry.verdict.as_str() {
            "safe" => entry.verdict.to_uppercase().green(),
            "suspicious" => entry.verdict.to_uppercase().yellow(),
            _ => entry.verdict.to_uppercase().red(),
        };
        let threats = if entry.threat_types.is_empty() {
            String::new()
        } else {
            format!("  [{}]", entry.threat_types.join(", "))
        };
        println!(
            "{:<12} {:>3}/100  {}  {}{}",
            verdict,
            entry.rule_score,
            entry.timestamp,
            entry.url,
            threats
        );
    }
    println!();

    Ok(())
}

pub fn handle_init(matches: &ArgMatches) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let dir_arg = matches.get_one::<String>("PATH").expect("PATH has a default");
    let force = matches.get_flag("force");
    let expanded_config_dir = shellexpand::tilde(dir_arg);
    let config_dir = Path::new(expanded_config_dir.as_ref());
    let db_path = config_dir.join("warden.db");

    if Database::exists(&db_path) && !force {
        spinner.println(format!(
            "[WARNING] A history database already exists at {}",
            db_path.display()
        ));
        spinner.println("This operation will overwrite it.");
        spinner.suspend(|| -> Result<bool> {
            print!("Do you want to continue? [y/N]: ");
            io::stdout().flush()?;
            let mut response = String::new();
            io::stdin().read_line(&mut response)?;
            let response = response.trim().to_lowercase();
            Ok(response == "y" || response == "yes")
        })?
        .then_some(())
        .ok_or_else(|| anyhow!("Initialization cancelled"))?;
    }

    spinner.set_message("Creating configuration directory...");
    fs::create_dir_all(config_dir)?;

    if Database::exists(&db_path) {
        spinner.set_message("Removing existing database...");
        Database::drop_db(&db_path)?;
    }

    spinner.set_message(format!("Initializing database at {}", db_path.display()));
    Database::new(&db_path)?;

    spinner.finish_with_message(format!(
        r#"
    Warden initialization complete!
    Config directory: {}
    Database: {}
    "#,
        config_dir.display(),
        db_path.display()
    ));

    Ok(())
}
