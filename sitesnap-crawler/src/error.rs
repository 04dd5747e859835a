use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Capture failed for {url}: {reason}")]
    Capture { url: String, reason: String },

    #[error("Selector '{selector}' not found: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
