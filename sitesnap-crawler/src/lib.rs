//! Crawl-and-capture engine: scope policy, link extraction, page settling,
//! login-form inference, and the sequential crawl orchestrator over a
//! headless browser.

pub mod browser;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod login;
pub mod naming;
pub mod result;
pub mod scope;
pub mod settle;

#[cfg(test)]
pub(crate) mod testutil;

pub use browser::{BrowserOptions, BrowserSession, ChromePage, PageDriver};
pub use crawler::{CaptureSink, Crawler, DEFAULT_MAX_PAGES};
pub use error::{CrawlError, Result};
pub use login::{LoginCredentials, LoginSelectors, detect_login_form};
pub use result::{CrawlSummary, VisitRecord};
pub use scope::{PageClassification, ScopePolicy, classify_url, is_capture_target};
pub use settle::SettleConfig;
