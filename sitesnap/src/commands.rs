use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitesnap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitesnap")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("capture")
                .about(
                    "Crawl a site from a seed URL and screenshot every capture-target page it \
                reaches.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to crawl")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"login")
                        .required(false)
                        .help("Log in before crawling (requires --username and --password)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"username" <USERNAME>)
                        .required(false)
                        .help("Login username"),
                )
                .arg(
                    arg!(--"password" <PASSWORD>)
                        .required(false)
                        .help("Login password"),
                )
                .arg(
                    arg!(--"login-url" <URL>)
                        .required(false)
                        .help("Login page URL (default: the seed URL)"),
                )
                .arg(
                    arg!(--"id-selector" <SELECTOR>)
                        .required(false)
                        .help("CSS selector for the username field (default: inferred from the page)"),
                )
                .arg(
                    arg!(--"pw-selector" <SELECTOR>)
                        .required(false)
                        .help("CSS selector for the password field (default: inferred from the page)"),
                )
                .arg(
                    arg!(--"btn-selector" <SELECTOR>)
                        .required(false)
                        .help("CSS selector for the submit control (default: inferred from the page)"),
                )
                .arg(
                    arg!(-m --"max-pages" <NUM>)
                        .required(false)
                        .help("Safety cap on the number of pages admitted to the crawl")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(-o --"out-dir" <PATH>)
                        .required(false)
                        .help("Directory for captured images (a date subfolder is created inside)")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .default_value("shots"),
                )
                .arg(
                    arg!(--"db" <PATH>)
                        .required(false)
                        .help("Directory holding the sitesnap database")
                        .default_value("~/.config/sitesnap/"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Navigation timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"exclude" <MARKER>)
                        .required(false)
                        .help("Extra URL substring to exclude from the crawl"),
                )
                .arg(
                    arg!(--"chrome" <PATH>)
                        .required(false)
                        .help("Chrome/Chromium executable to launch (default: auto-detect)"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Emit machine-readable JSON output")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("selectors")
                .about("Inspect a login page and report the inferred login-form selectors")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The login page URL to inspect")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"static")
                        .required(false)
                        .help("Fetch the page over plain HTTP instead of a rendered browser")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Fetch timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"chrome" <PATH>)
                        .required(false)
                        .help("Chrome/Chromium executable to launch (default: auto-detect)"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Emit machine-readable JSON output")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("list")
                .about("List stored captures, newest first")
                .arg(
                    arg!(--"db" <PATH>)
                        .required(false)
                        .help("Directory holding the sitesnap database")
                        .default_value("~/.config/sitesnap/"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Emit machine-readable JSON output")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
