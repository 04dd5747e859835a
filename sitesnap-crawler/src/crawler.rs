use crate::browser::PageDriver;
use crate::error::{CrawlError, Result};
use crate::extract::extract_links;
use crate::login::{LoginCredentials, detect_login_form};
use crate::naming::{image_file_name, slugify};
use crate::result::{CrawlSummary, VisitRecord};
use crate::scope::{PageClassification, ScopePolicy, classify_url, find_tabs, refine_with_dom};
use crate::settle::{SettleConfig, settle};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Safety cap on total frontier admissions, seed included.
pub const DEFAULT_MAX_PAGES: usize = 100;

pub const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded wait for the login fields to appear.
const SELECTOR_WAIT: Duration = Duration::from_secs(10);

/// Pause after clicking a tab before its capture.
const TAB_SETTLE: Duration = Duration::from_secs(1);

/// Where successful captures get persisted. One record per captured page.
pub trait CaptureSink {
    fn record(&mut self, url: &str, image_path: &str) -> anyhow::Result<i64>;
}

/// Sequential crawl-and-capture orchestrator. Owns the frontier and visited
/// set for exactly one run; construct a fresh instance per run.
///
/// Frontier discipline: FIFO, so capture order is breadth-first shallow to
/// deep. A URL enters `visited` at dequeue time, before processing, so a
/// page that errors is never retried within the run.
pub struct Crawler {
    seed: String,
    scope: ScopePolicy,
    frontier: VecDeque<String>,
    visited: HashSet<String>,
    enqueued: usize,
    max_pages: usize,
    nav_timeout: Duration,
    login_grace: Duration,
    settle_config: SettleConfig,
    shots_dir: PathBuf,
}

impl Crawler {
    pub fn new(seed: &str, shots_dir: impl Into<PathBuf>) -> Result<Self> {
        let scope = ScopePolicy::from_seed(seed)?;
        let mut frontier = VecDeque::new();
        frontier.push_back(seed.to_string());
        Ok(Self {
            seed: seed.to_string(),
            scope,
            frontier,
            visited: HashSet::new(),
            enqueued: 1,
            max_pages: DEFAULT_MAX_PAGES,
            nav_timeout: DEFAULT_NAV_TIMEOUT,
            login_grace: Duration::from_secs(5),
            settle_config: SettleConfig::default(),
            shots_dir: shots_dir.into(),
        })
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn with_nav_timeout(mut self, timeout: Duration) -> Self {
        self.nav_timeout = timeout;
        self
    }

    pub fn with_login_grace(mut self, grace: Duration) -> Self {
        self.login_grace = grace;
        self
    }

    pub fn with_settle_config(mut self, config: SettleConfig) -> Self {
        self.settle_config = config;
        self
    }

    pub fn with_exclusion_marker(mut self, marker: impl Into<String>) -> Self {
        self.scope = self.scope.with_exclusion_marker(marker);
        self
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Run the login sequence once, before crawling. Selector gaps are
    /// filled by detection on the login page itself; selectors that still
    /// cannot be resolved, or fields that never appear, abort the run.
    pub async fn login<D: PageDriver>(&self, driver: &mut D, creds: &LoginCredentials) -> Result<()> {
        info!("Navigating to login page {}", creds.login_url);
        driver
            .goto(&creds.login_url, self.nav_timeout)
            .await
            .map_err(|e| CrawlError::Login(e.to_string()))?;

        let mut creds = creds.clone();
        if !creds.selectors.is_complete() {
            let html = driver
                .content()
                .await
                .map_err(|e| CrawlError::Login(e.to_string()))?;
            let detected = detect_login_form(&html);
            creds.fill_missing(&detected);
            if !creds.selectors.is_complete() {
                return Err(CrawlError::Login(
                    "could not infer login selectors; supply them explicitly".to_string(),
                ));
            }
            debug!(
                "Inferred login selectors: id='{}' pw='{}' btn='{}'",
                creds.selectors.id_selector, creds.selectors.pw_selector, creds.selectors.btn_selector
            );
        }

        for selector in [&creds.selectors.id_selector, &creds.selectors.pw_selector] {
            driver
                .wait_for_selector(selector, SELECTOR_WAIT)
                .await
                .map_err(|e| CrawlError::Login(e.to_string()))?;
        }

        driver
            .type_into(&creds.selectors.id_selector, &creds.username)
            .await
            .map_err(|e| CrawlError::Login(e.to_string()))?;
        driver
            .type_into(&creds.selectors.pw_selector, &creds.password)
            .await
            .map_err(|e| CrawlError::Login(e.to_string()))?;
        driver
            .click(&creds.selectors.btn_selector)
            .await
            .map_err(|e| CrawlError::Login(e.to_string()))?;

        if driver.wait_for_navigation(self.login_grace).await.unwrap_or(false) {
            info!("Login navigation observed");
        } else {
            // XHR-style logins never navigate; give the session a moment
            info!("No navigation after login submit; waiting out the grace period");
            tokio::time::sleep(self.login_grace).await;
        }

        Ok(())
    }

    /// Crawl until the frontier is exhausted. Per-URL failures are logged
    /// and recorded; only the pre-loop setup can fail the whole run.
    pub async fn run<D: PageDriver>(
        &mut self,
        driver: &mut D,
        sink: &mut dyn CaptureSink,
    ) -> Result<CrawlSummary> {
        tokio::fs::create_dir_all(&self.shots_dir).await?;
        info!(
            "Starting crawl of {} (cap {} pages)",
            self.scope.origin_domain(),
            self.max_pages
        );

        let mut records = Vec::new();

        while let Some(url) = self.frontier.pop_front() {
            if !self.visited.insert(url.clone()) {
                continue;
            }

            match self.process(driver, sink, &url).await {
                Ok(record) => {
                    debug!(
                        "Processed {} (captured: {}, links: {})",
                        url, record.captured, record.links_found
                    );
                    records.push(record);
                }
                Err(e) => {
                    warn!("Error processing {}: {}", url, e);
                    records.push(VisitRecord::with_error(url, e.to_string()));
                }
            }
        }

        let captured = records.iter().filter(|r| r.captured).count();
        info!(
            "Crawl complete: {} visited, {} captured",
            self.visited.len(),
            captured
        );

        Ok(CrawlSummary {
            visited: self.visited.len(),
            captured,
            records,
        })
    }

    async fn process<D: PageDriver>(
        &mut self,
        driver: &mut D,
        sink: &mut dyn CaptureSink,
        url: &str,
    ) -> Result<VisitRecord> {
        driver.goto(url, self.nav_timeout).await?;
        settle(driver, &self.settle_config).await?;

        let html = driver.content().await?;
        let classification = refine_with_dom(classify_url(url), &html);
        let mut record = VisitRecord::new(url.to_string(), classification);

        if classification.is_capture_target() {
            // Capture failures stay local to the page; its links still feed
            // the frontier.
            match self.capture(driver, url, None).await {
                Ok(image_path) => match sink.record(url, &image_path) {
                    Ok(_) => {
                        record.image_paths.push(image_path);
                        record.captured = true;
                        if classification == PageClassification::Tabbed {
                            self.capture_tabs(driver, url, &html, &mut record).await;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to record capture for {}: {}", url, e);
                        record.error = Some(CrawlError::Store(e.to_string()).to_string());
                    }
                },
                Err(e) => {
                    warn!("Capture failed for {}: {}", url, e);
                    record.error = Some(e.to_string());
                }
            }
        } else {
            debug!("Not a capture target, crawling links only: {}", url);
        }

        let links = extract_links(&html, url, &self.scope);
        record.links_found = links.len();
        for link in links {
            if self.visited.contains(&link) || self.frontier.contains(&link) {
                continue;
            }
            if self.enqueued >= self.max_pages {
                debug!("Frontier cap reached, dropping {}", link);
                continue;
            }
            self.frontier.push_back(link);
            self.enqueued += 1;
        }

        Ok(record)
    }

    /// Click through each tab and capture its state. Tab failures stay
    /// local to the tab.
    async fn capture_tabs<D: PageDriver>(
        &self,
        driver: &mut D,
        url: &str,
        html: &str,
        record: &mut VisitRecord,
    ) {
        let tabs = find_tabs(html);
        debug!("Found {} tabs on {}", tabs.len(), url);

        for (i, tab) in tabs.iter().enumerate() {
            let script = tab_click_script(&tab.selector, tab.index);
            if let Err(e) = driver.evaluate(&script).await {
                warn!("Tab {} click failed on {}: {}", i + 1, url, e);
                continue;
            }
            tokio::time::sleep(TAB_SETTLE).await;

            let suffix = format!("tab_{}_{}", i + 1, slugify(&tab.name));
            match self.capture(driver, url, Some(&suffix)).await {
                Ok(path) => record.image_paths.push(path),
                Err(e) => warn!("Tab {} capture failed on {}: {}", i + 1, url, e),
            }
        }
    }

    async fn capture<D: PageDriver>(
        &self,
        driver: &mut D,
        url: &str,
        suffix: Option<&str>,
    ) -> Result<String> {
        let png = driver
            .screenshot_full_page()
            .await
            .map_err(|e| CrawlError::Capture {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let millis = chrono::Utc::now().timestamp_millis();
        let file_name = image_file_name(url, suffix, millis);
        let path = self.shots_dir.join(&file_name);
        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| CrawlError::Capture {
                url: url.to_string(),
                reason: format!("write {}: {}", path.display(), e),
            })?;

        info!("Captured {} -> {}", url, path.display());
        Ok(path_to_string(&path))
    }
}

/// Fixed in-page click script, parameterized by plain data only: the
/// selector travels as a JSON string literal, never as code.
fn tab_click_script(selector: &str, index: usize) -> String {
    let quoted = serde_json::Value::String(selector.to_string()).to_string();
    format!(
        "(() => {{ const els = document.querySelectorAll({quoted}); \
         if (els[{index}]) {{ els[{index}].click(); return true; }} return false; }})()"
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
