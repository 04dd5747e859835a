// Capture run orchestration: browser lifecycle, crawl, persistence

use crate::data::{CaptureRow, Database};
use chrono::Local;
use colored::Colorize;
use serde::Serialize;
use sitesnap_crawler::browser::{BrowserOptions, BrowserSession};
use sitesnap_crawler::crawler::{CaptureSink, Crawler, DEFAULT_MAX_PAGES};
use sitesnap_crawler::login::LoginCredentials;
use sitesnap_crawler::naming::date_folder;
use sitesnap_crawler::result::CrawlSummary;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Options for one capture run.
pub struct CaptureOptions {
    pub seed_url: String,
    pub db_path: PathBuf,
    pub out_dir: PathBuf,
    pub max_pages: usize,
    pub timeout_secs: u64,
    pub exclusion_marker: Option<String>,
    /// Present when the site requires authentication before crawling.
    pub login: Option<LoginCredentials>,
    pub browser: BrowserOptions,
}

impl CaptureOptions {
    pub fn new(seed_url: &str, db_path: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            seed_url: seed_url.to_string(),
            db_path: db_path.into(),
            out_dir: out_dir.into(),
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: 30,
            exclusion_marker: None,
            login: None,
            browser: BrowserOptions::default(),
        }
    }
}

/// Outcome of a completed run, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub run_id: String,
    pub seed_url: String,
    pub shots_dir: String,
    pub visited: usize,
    pub captured: usize,
}

/// [`CaptureSink`] backed by the sqlite store, tagging every row with the
/// current run.
pub struct StoreSink {
    pub db: Database,
    pub run_id: String,
}

impl CaptureSink for StoreSink {
    fn record(&mut self, url: &str, image_path: &str) -> anyhow::Result<i64> {
        Ok(self.db.insert_capture(Some(&self.run_id), url, image_path)?)
    }
}

/// Run a full capture: open the store, launch the browser, crawl, and record
/// the run outcome. The browser is torn down on every exit path.
pub async fn execute_capture(options: CaptureOptions) -> anyhow::Result<CaptureReport> {
    if let Some(parent) = options.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::new(&options.db_path)?;
    let run_id = db.create_run(&options.seed_url)?;
    info!("Run {} started for {}", run_id, options.seed_url);

    let shots_dir = options.out_dir.join(date_folder(Local::now()));

    let mut crawler = Crawler::new(&options.seed_url, &shots_dir)?
        .with_max_pages(options.max_pages)
        .with_nav_timeout(Duration::from_secs(options.timeout_secs));
    if let Some(marker) = &options.exclusion_marker {
        crawler = crawler.with_exclusion_marker(marker.clone());
    }

    let mut sink = StoreSink {
        db,
        run_id: run_id.clone(),
    };

    let session = match BrowserSession::launch(&options.browser).await {
        Ok(session) => session,
        Err(e) => {
            sink.db.fail_run(&run_id)?;
            return Err(e.into());
        }
    };

    let result = crawl_with_session(&session, &mut crawler, &mut sink, options.login.as_ref()).await;
    session.close().await;

    match result {
        Ok(summary) => {
            sink.db.complete_run(&run_id)?;
            info!(
                "Run {} completed: {} visited, {} captured",
                run_id, summary.visited, summary.captured
            );
            Ok(CaptureReport {
                run_id,
                seed_url: options.seed_url,
                shots_dir: shots_dir.to_string_lossy().into_owned(),
                visited: summary.visited,
                captured: summary.captured,
            })
        }
        Err(e) => {
            sink.db.fail_run(&run_id)?;
            Err(e.into())
        }
    }
}

async fn crawl_with_session(
    session: &BrowserSession,
    crawler: &mut Crawler,
    sink: &mut StoreSink,
    login: Option<&LoginCredentials>,
) -> sitesnap_crawler::Result<CrawlSummary> {
    let mut page = session.new_page().await?;
    if let Some(creds) = login {
        crawler.login(&mut page, creds).await?;
    }
    crawler.run(&mut page, sink).await
}

/// Human-readable run summary for terminal output.
pub fn generate_capture_report(report: &CaptureReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "Capture run complete".green().bold()));
    out.push_str(&format!("  {} {}\n", "Seed:".bold(), report.seed_url));
    out.push_str(&format!("  {} {}\n", "Run:".bold(), report.run_id));
    out.push_str(&format!(
        "  {} {} visited, {} captured\n",
        "Pages:".bold(),
        report.visited,
        report.captured
    ));
    out.push_str(&format!("  {} {}\n", "Images:".bold(), report.shots_dir));
    out
}

/// Human-readable capture listing, newest first.
pub fn generate_capture_listing(rows: &[CaptureRow]) -> String {
    if rows.is_empty() {
        return format!("{}\n", "No captures stored yet".yellow());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        format!("{} stored capture(s)", rows.len()).bold()
    ));
    for row in rows {
        out.push_str(&format!(
            "  {} {}\n      {}\n",
            format!("[{}]", row.id).cyan(),
            row.url,
            row.image_path.dimmed()
        ));
    }
    out
}
