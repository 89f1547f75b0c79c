use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("warden")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("warden")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the warden history database on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location to store the warden database")
                        .default_value("~/.config/warden/"),
                )
                .arg(
                    arg!(-f --"force")
                        .help(
                            "Forces the overwriting of any existing database at the specified \
                        location.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("check")
                .about(
                    "Scan a single URL: offline heuristics plus a threat intelligence lookup, \
                combined into one verdict.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The URL to scan (scheme optional, https assumed)"),
                )
                .arg(
                    arg!(-k --"api-key" <KEY>)
                        .required(false)
                        .help("Threat intelligence API key (default: WARDEN_API_KEY env var)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Intelligence lookup timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv")
                        .value_parser(["text", "json", "csv"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"no-history")
                        .required(false)
                        .help("Do not record this scan in the history database")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("batch")
                .about(
                    "Scan a collection of URLs sequentially, one intelligence lookup at a \
                time. Ctrl-C cancels after the current URL.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A URL to scan; may be given multiple times")
                        .action(clap::ArgAction::Append)
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to scan")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-k --"api-key" <KEY>)
                        .required(false)
                        .help("Threat intelligence API key (default: WARDEN_API_KEY env var)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Intelligence lookup timeout in seconds, per URL")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, csv")
                        .value_parser(["text", "json", "csv"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"no-history")
                        .required(false)
                        .help("Do not record this batch in the history database")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("history")
                .about("Show or clear recorded scans")
                .arg(
                    arg!(-n --"count" <N>)
                        .required(false)
                        .help("Number of recent scans to show")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                )
                .arg(
                    arg!(--"clear")
                        .required(false)
                        .help("Delete all recorded scans and batch sessions")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
