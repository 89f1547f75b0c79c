pub mod export;
pub mod history;

pub use export::{ReportFormat, generate_batch_report, generate_scan_report, save_report};
pub use history::{Database, HistoryEntry};

use colored::Colorize;

const BANNER: &str = r#"
                         _
 __      ____ _ _ __ ___| | ___ _ __
 \ \ /\ / / _` | '__/ _` |/ _ \ '_ \
  \ V  V / (_| | | | (_| |  __/ | | |
   \_/\_/ \__,_|_|  \__,_|\___|_| |_|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan());
    println!(
        "{}",
        format!(
            "  warden v{} - hybrid URL risk analysis",
            env!("CARGO_PKG_VERSION")
        )
        .bright_blue()
    );
    println!("{}", "  verdicts you can argue with\n".dimmed());
}
