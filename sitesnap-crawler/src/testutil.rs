//! In-memory [`PageDriver`] fake shared by the unit tests.

use crate::browser::PageDriver;
use crate::error::{CrawlError, Result};
use crate::settle::SCROLL_HEIGHT_EXPR;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// A canned page the fake driver can navigate to.
pub struct FakePage {
    pub html: String,
    /// Successive `scrollHeight` readings; the last value repeats forever.
    pub heights: Vec<i64>,
    pub fail_navigation: bool,
}

impl FakePage {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            heights: Vec::new(),
            fail_navigation: false,
        }
    }

    pub fn with_heights(mut self, heights: Vec<i64>) -> Self {
        self.heights = heights;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }
}

/// Scripted browser: pages are registered up front, interactions are logged.
pub struct FakeDriver {
    pub pages: HashMap<String, FakePage>,
    pub current: Option<String>,
    pub visits: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub clicked: Vec<String>,
    pub evaluated: Vec<String>,
    pub navigate_after_click: bool,
    /// Selectors that `wait_for_selector` should report as never appearing.
    pub missing_selectors: HashSet<String>,
    height_idx: usize,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            current: None,
            visits: Vec::new(),
            typed: Vec::new(),
            clicked: Vec::new(),
            evaluated: Vec::new(),
            navigate_after_click: false,
            missing_selectors: HashSet::new(),
            height_idx: 0,
        }
    }

    pub fn add_page(&mut self, url: &str, page: FakePage) {
        self.pages.insert(url.to_string(), page);
    }

    pub async fn goto_ok(&mut self, url: &str) {
        self.goto(url, Duration::from_secs(5))
            .await
            .unwrap_or_else(|e| panic!("goto {} failed: {}", url, e));
    }

    fn current_page(&self) -> Result<&FakePage> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .ok_or_else(|| CrawlError::InvalidInput("no page loaded".to_string()))
    }
}

impl PageDriver for FakeDriver {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.visits.push(url.to_string());
        self.height_idx = 0;
        let Some(page) = self.pages.get(url) else {
            return Err(CrawlError::Navigation {
                url: url.to_string(),
                reason: "no such page registered".to_string(),
            });
        };
        if page.fail_navigation {
            return Err(CrawlError::Navigation {
                url: url.to_string(),
                reason: "simulated navigation failure".to_string(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.current_page()?.html.clone())
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        self.evaluated.push(script.to_string());
        if script == SCROLL_HEIGHT_EXPR {
            let heights = &self.current_page()?.heights;
            let height = if heights.is_empty() {
                1000
            } else {
                let idx = self.height_idx.min(heights.len() - 1);
                heights[idx]
            };
            self.height_idx += 1;
            return Ok(serde_json::json!(height));
        }
        Ok(serde_json::Value::Null)
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        if self.missing_selectors.contains(selector) {
            return Err(CrawlError::Selector {
                selector: selector.to_string(),
                reason: format!("no match within {:?}", timeout),
            });
        }
        Ok(())
    }

    async fn type_into(&mut self, selector: &str, text: &str) -> Result<()> {
        self.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.clicked.push(selector.to_string());
        Ok(())
    }

    async fn wait_for_navigation(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(self.navigate_after_click)
    }

    async fn screenshot_full_page(&mut self) -> Result<Vec<u8>> {
        self.current_page()?;
        Ok(b"\x89PNG\r\n\x1a\nfake-image-bytes".to_vec())
    }
}
