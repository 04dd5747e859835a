use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitesnap_core::capture::{
    CaptureOptions, execute_capture, generate_capture_listing, generate_capture_report,
};
use sitesnap_core::data::Database;
use sitesnap_crawler::browser::{BrowserOptions, BrowserSession, PageDriver};
use sitesnap_crawler::fetch::{build_client, fetch_html};
use sitesnap_crawler::login::{LoginCredentials, LoginSelectors, detect_login_form};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub fn print_banner() {
    println!(
        "{}",
        r#"
          _ __
   _____(_) /____  _________  ____ _____
  / ___/ / __/ _ \/ ___/ __ \/ __ `/ __ \
 (__  ) / /_/  __(__  ) / / / /_/ / /_/ /
/____/_/\__/\___/____/_/ /_/\__,_/ .___/
                                /_/
"#
        .bright_cyan()
    );
    println!(
        "{}\n",
        format!("  v{} - crawl, settle, screenshot", env!("CARGO_PKG_VERSION")).dimmed()
    );
}

/// Resolve the database directory argument to the sqlite file path.
pub fn expand_db_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    Path::new(expanded.as_ref()).join("sitesnap.db")
}

/// The login page defaults to the seed when not given explicitly.
pub fn resolve_login_url(login_url: Option<&String>, seed: &Url) -> String {
    login_url
        .cloned()
        .unwrap_or_else(|| seed.as_str().to_string())
}

/// Explicit selector overrides from the command line; empty fields are
/// inferred from the login page at run time.
pub fn selectors_from_args(args: &ArgMatches) -> LoginSelectors {
    LoginSelectors {
        id_selector: args
            .get_one::<String>("id-selector")
            .cloned()
            .unwrap_or_default(),
        pw_selector: args
            .get_one::<String>("pw-selector")
            .cloned()
            .unwrap_or_default(),
        btn_selector: args
            .get_one::<String>("btn-selector")
            .cloned()
            .unwrap_or_default(),
    }
}

/// Human-readable selector inspection output.
pub fn format_selectors(found: &LoginSelectors) -> String {
    fn line(label: &str, value: &str) -> String {
        if value.is_empty() {
            format!("  {:<10} {}\n", label, "(not found)".yellow())
        } else {
            format!("  {:<10} {}\n", label, value.bright_white())
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", "Inferred login selectors".bold()));
    out.push_str(&line("username:", &found.id_selector));
    out.push_str(&line("password:", &found.pw_selector));
    out.push_str(&line("submit:", &found.btn_selector));
    out
}

fn make_spinner(msg: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(msg);
    spinner
}

pub async fn handle_capture(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url").unwrap();
    let json = sub_matches.get_flag("json");

    let login = if sub_matches.get_flag("login") {
        let username = sub_matches.get_one::<String>("username");
        let password = sub_matches.get_one::<String>("password");
        let (Some(username), Some(password)) = (username, password) else {
            eprintln!(
                "{} --login requires both --username and --password",
                "✗".red().bold()
            );
            std::process::exit(1);
        };
        Some(LoginCredentials {
            login_url: resolve_login_url(sub_matches.get_one::<String>("login-url"), url),
            selectors: selectors_from_args(sub_matches),
            username: username.clone(),
            password: password.clone(),
        })
    } else {
        None
    };

    let db_path = expand_db_path(sub_matches.get_one::<String>("db").unwrap());
    let out_dir = sub_matches
        .get_one::<std::path::PathBuf>("out-dir")
        .unwrap()
        .clone();

    let mut options = CaptureOptions::new(url.as_str(), db_path, out_dir);
    options.max_pages = *sub_matches.get_one::<usize>("max-pages").unwrap();
    options.timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap();
    options.exclusion_marker = sub_matches.get_one::<String>("exclude").cloned();
    options.browser.chrome_path = sub_matches.get_one::<String>("chrome").cloned();
    options.login = login;

    let spinner = (!json).then(|| make_spinner(format!("Capturing {}", url)));

    match execute_capture(options).await {
        Ok(report) => {
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            if json {
                let body = serde_json::json!({
                    "message": format!(
                        "Captured {} page(s) from {}",
                        report.captured, report.seed_url
                    ),
                    "count": report.captured,
                    "run_id": report.run_id,
                    "visited": report.visited,
                    "shots_dir": report.shots_dir,
                });
                println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
            } else {
                print!("{}", generate_capture_report(&report));
            }
        }
        Err(e) => {
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            if json {
                let body = serde_json::json!({
                    "message": "Capture failed",
                    "error": e.to_string(),
                });
                println!("{}", body);
            } else {
                eprintln!("{} Capture failed: {}", "✗".red().bold(), e);
            }
            std::process::exit(1);
        }
    }
}

pub async fn handle_selectors(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<Url>("url").unwrap();
    let static_fetch = sub_matches.get_flag("static");
    let timeout_secs = *sub_matches.get_one::<u64>("timeout").unwrap();
    let json = sub_matches.get_flag("json");

    let html = if static_fetch {
        fetch_static_html(url.as_str(), timeout_secs).await
    } else {
        let chrome = sub_matches.get_one::<String>("chrome").cloned();
        fetch_rendered_html(url.as_str(), timeout_secs, chrome).await
    };

    let html = match html {
        Ok(html) => html,
        Err(e) => {
            eprintln!("{} Failed to fetch {}: {}", "✗".red().bold(), url, e);
            std::process::exit(1);
        }
    };

    let found = detect_login_form(&html);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&found).unwrap_or_default()
        );
    } else {
        print!("{}", format_selectors(&found));
    }
}

async fn fetch_static_html(url: &str, timeout_secs: u64) -> anyhow::Result<String> {
    let client = build_client(timeout_secs)?;
    Ok(fetch_html(&client, url).await?)
}

async fn fetch_rendered_html(
    url: &str,
    timeout_secs: u64,
    chrome_path: Option<String>,
) -> anyhow::Result<String> {
    let options = BrowserOptions {
        chrome_path,
        ..BrowserOptions::default()
    };
    let session = BrowserSession::launch(&options).await?;
    let result = async {
        let mut page = session.new_page().await?;
        page.goto(url, Duration::from_secs(timeout_secs)).await?;
        page.content().await
    }
    .await;
    session.close().await;
    Ok(result?)
}

pub fn handle_list(sub_matches: &ArgMatches) {
    let db_path = expand_db_path(sub_matches.get_one::<String>("db").unwrap());
    let json = sub_matches.get_flag("json");

    if !Database::exists(&db_path) {
        eprintln!(
            "{} No capture database at {}. Run a capture first.",
            "✗".red().bold(),
            db_path.display()
        );
        std::process::exit(1);
    }

    let rows = match Database::new(&db_path).and_then(|db| db.list_captures()) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("{} Failed to read captures: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rows).unwrap_or_default());
    } else {
        print!("{}", generate_capture_listing(&rows));
    }
}
