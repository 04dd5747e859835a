use crate::scope::PageClassification;
use serde::Serialize;

/// Outcome of processing one frontier URL.
#[derive(Debug, Clone, Serialize)]
pub struct VisitRecord {
    pub url: String,
    pub classification: PageClassification,
    pub captured: bool,
    pub image_paths: Vec<String>,
    pub links_found: usize,
    pub error: Option<String>,
}

impl VisitRecord {
    pub fn new(url: String, classification: PageClassification) -> Self {
        Self {
            url,
            classification,
            captured: false,
            image_paths: Vec::new(),
            links_found: 0,
            error: None,
        }
    }

    pub fn with_error(url: String, error: String) -> Self {
        Self {
            url,
            classification: PageClassification::Skip,
            captured: false,
            image_paths: Vec::new(),
            links_found: 0,
            error: Some(error),
        }
    }
}

/// Totals for a finished run. `captured` counts pages, not image files;
/// a tabbed page contributes several images but one captured page.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub visited: usize,
    pub captured: usize,
    pub records: Vec<VisitRecord>,
}
