use crate::error::{CrawlError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1920;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1080;

/// How often a bounded selector wait polls the page.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The crawl loop's view of a browser page. One implementation drives a real
/// headless Chrome tab; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Navigate and wait for the load to finish, bounded by `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Current DOM serialized to HTML.
    async fn content(&mut self) -> Result<String>;

    /// Evaluate a fixed script expression in the page, returning its value.
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value>;

    /// Poll until the selector matches an element or the timeout elapses.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    async fn type_into(&mut self, selector: &str, text: &str) -> Result<()>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Wait for a navigation event; `Ok(false)` when none arrives in time
    /// (asynchronous login flows legitimately never navigate).
    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<bool>;

    /// Full-page PNG of the current document.
    async fn screenshot_full_page(&mut self) -> Result<Vec<u8>>;
}

/// Launch options for the headless browser.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Explicit Chrome/Chromium executable; `None` auto-detects.
    pub chrome_path: Option<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            chrome_path: None,
        }
    }
}

/// One headless Chrome process and its CDP event loop. All pages created
/// from a session share cookies, which is what keeps the authenticated
/// crawl variant logged in across navigations.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        info!("Launching headless browser");

        let mut builder = BrowserConfig::builder()
            .window_size(options.viewport_width, options.viewport_height)
            .no_sandbox()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--hide-scrollbars")
            .arg("--mute-audio");

        if let Some(ref chrome_path) = options.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }

        let config = builder
            .build()
            .map_err(|e| CrawlError::InvalidInput(format!("browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config).await?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a fresh tab. The crawl uses a single tab for its whole lifetime.
    pub async fn new_page(&self) -> Result<ChromePage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromePage { page })
    }

    /// Close the browser and stop the event loop. Errors are logged, not
    /// surfaced: teardown runs on both success and failure paths.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            error!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process reap: {}", e);
        }
        self.handler_task.abort();
        info!("Browser shut down");
    }
}

/// [`PageDriver`] over a real chromiumoxide page.
pub struct ChromePage {
    page: Page,
}

impl PageDriver for ChromePage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let navigate = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(timeout, navigate).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(CrawlError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(CrawlError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {:?}", timeout),
            }),
        }
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        let result = self.page.evaluate(script).await?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CrawlError::Selector {
                    selector: selector.to_string(),
                    reason: format!("no match within {:?}", timeout),
                });
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn type_into(&mut self, selector: &str, text: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        Ok(())
    }

    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<bool> {
        match tokio::time::timeout(timeout, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) => {
                warn!("Navigation wait error: {}", e);
                Ok(false)
            }
            Err(_) => Ok(false),
        }
    }

    async fn screenshot_full_page(&mut self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder().full_page(true).build();
        Ok(self.page.screenshot(params).await?)
    }
}
