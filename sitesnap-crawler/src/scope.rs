use crate::error::{CrawlError, Result};
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// Relative-path marker some target sites emit for non-page resources.
pub const DEFAULT_EXCLUSION_MARKER: &str = "&re/";

/// Board-list containers commonly used by the target sites.
const BOARD_SELECTORS: &str = "table.board_list, div.board_list, ul.board_list";

/// Tab containers, checked in order; the first selector with matches wins.
pub const TAB_SELECTORS: &[&str] = &[
    "ul.tabs li",
    "div.tab_menu a",
    "div.tabArea ul li",
    ".tab_content .tab",
    ".tab-menu li",
];

/// How a page should be treated at capture time. Derived from the URL shape
/// and refined by DOM inspection; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageClassification {
    MainIndex,
    ContentDetail,
    Board,
    Tabbed,
    Skip,
}

impl PageClassification {
    pub fn is_capture_target(self) -> bool {
        self != PageClassification::Skip
    }
}

/// A tab control on a tabbed page, addressable from in-page scripts.
#[derive(Debug, Clone)]
pub struct TabHandle {
    pub selector: String,
    pub index: usize,
    pub name: String,
}

/// Decides which URLs belong to the crawl. One policy per run, built from
/// the seed URL's host. Matching is exact: subdomains are out of scope, and
/// trailing-slash or query-order variants stay distinct URLs.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    origin_domain: String,
    exclusion_markers: Vec<String>,
}

impl ScopePolicy {
    pub fn new(origin_domain: impl Into<String>) -> Self {
        Self {
            origin_domain: origin_domain.into(),
            exclusion_markers: vec![DEFAULT_EXCLUSION_MARKER.to_string()],
        }
    }

    /// Build a policy from the seed URL, taking its host as the origin domain.
    pub fn from_seed(seed: &str) -> Result<Self> {
        let parsed = Url::parse(seed)
            .map_err(|e| CrawlError::InvalidInput(format!("invalid seed URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CrawlError::InvalidInput(format!(
                "seed URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| CrawlError::InvalidInput("seed URL has no host".to_string()))?;
        Ok(Self::new(host))
    }

    pub fn with_exclusion_marker(mut self, marker: impl Into<String>) -> Self {
        self.exclusion_markers.push(marker.into());
        self
    }

    pub fn origin_domain(&self) -> &str {
        &self.origin_domain
    }

    /// True iff the URL is eligible for traversal: http(s), exact host match,
    /// no fragment marker, no exclusion marker.
    pub fn is_in_scope(&self, url: &str) -> bool {
        if url.contains('#') {
            return false;
        }
        if self.exclusion_markers.iter().any(|m| url.contains(m.as_str())) {
            return false;
        }
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        parsed.host_str() == Some(self.origin_domain.as_str())
    }
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a URL by shape alone. The home page and `content.do` pages with
/// a numeric `key` parameter are capture targets; everything else is crawled
/// for links but skipped at capture time.
pub fn classify_url(url: &str) -> PageClassification {
    let Ok(parsed) = Url::parse(url) else {
        return PageClassification::Skip;
    };

    let path = parsed.path();
    if path == "/" || path.ends_with("/index.do") || path.ends_with("/index.php") {
        return PageClassification::MainIndex;
    }

    if path.ends_with("/content.do") {
        let mut key_numeric = false;
        let mut id_present = false;
        let mut id_numeric = false;
        for (k, v) in parsed.query_pairs() {
            match k.as_ref() {
                "key" => key_numeric = all_digits(&v),
                "id" => {
                    id_present = true;
                    id_numeric = all_digits(&v);
                }
                _ => {}
            }
        }
        // `id` without `key` is a chrome artifact, not a detail page
        if key_numeric && (!id_present || id_numeric) {
            return PageClassification::ContentDetail;
        }
    }

    PageClassification::Skip
}

/// True iff the rendered page at this URL should be screenshotted.
pub fn is_capture_target(url: &str) -> bool {
    classify_url(url).is_capture_target()
}

/// Refine a URL-shape classification with what the rendered DOM shows.
/// Board lists and tab structures override the shape-based class; pages that
/// are not capture targets stay skipped.
pub fn refine_with_dom(base: PageClassification, html: &str) -> PageClassification {
    if base == PageClassification::Skip {
        return base;
    }

    let document = Html::parse_document(html);
    let mut refined = base;

    let board = Selector::parse(BOARD_SELECTORS).unwrap();
    if document.select(&board).next().is_some() {
        refined = PageClassification::Board;
    }

    for tab_selector in TAB_SELECTORS {
        let selector = Selector::parse(tab_selector).unwrap();
        if document.select(&selector).next().is_some() {
            refined = PageClassification::Tabbed;
            break;
        }
    }

    refined
}

/// Locate the tab controls on a tabbed page. The first selector in
/// [`TAB_SELECTORS`] that matches anything provides all tabs.
pub fn find_tabs(html: &str) -> Vec<TabHandle> {
    let document = Html::parse_document(html);

    for tab_selector in TAB_SELECTORS {
        let selector = Selector::parse(tab_selector).unwrap();
        let tabs: Vec<TabHandle> = document
            .select(&selector)
            .enumerate()
            .map(|(index, element)| {
                let text = element.text().collect::<String>();
                let trimmed = text.trim();
                TabHandle {
                    selector: tab_selector.to_string(),
                    index,
                    name: if trimmed.is_empty() {
                        format!("Tab {}", index + 1)
                    } else {
                        trimmed.to_string()
                    },
                }
            })
            .collect();
        if !tabs.is_empty() {
            return tabs;
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_scope_accepts_same_host_http_and_https() {
        let scope = ScopePolicy::new("example.com");
        assert!(scope.is_in_scope("https://example.com/a"));
        assert!(scope.is_in_scope("http://example.com/a?b=1"));
    }

    #[test]
    fn in_scope_rejects_fragments_and_cross_host() {
        let scope = ScopePolicy::new("example.com");
        assert!(!scope.is_in_scope("https://example.com/a#b"));
        assert!(!scope.is_in_scope("https://other.com/a"));
        assert!(!scope.is_in_scope("https://sub.example.com/a"));
        assert!(!scope.is_in_scope("ftp://example.com/a"));
        assert!(!scope.is_in_scope("not a url"));
    }

    #[test]
    fn in_scope_rejects_exclusion_marker() {
        let scope = ScopePolicy::new("example.com");
        assert!(!scope.is_in_scope("https://example.com/page&re/thing"));
    }

    #[test]
    fn extra_exclusion_markers_apply() {
        let scope = ScopePolicy::new("example.com").with_exclusion_marker("/download/");
        assert!(!scope.is_in_scope("https://example.com/download/file.pdf"));
        assert!(scope.is_in_scope("https://example.com/page"));
    }

    #[test]
    fn from_seed_takes_host() {
        let scope = ScopePolicy::from_seed("https://example.com/index.do").unwrap();
        assert_eq!(scope.origin_domain(), "example.com");
    }

    #[test]
    fn from_seed_rejects_bad_input() {
        assert!(ScopePolicy::from_seed("not a url").is_err());
        assert!(ScopePolicy::from_seed("ftp://example.com/").is_err());
    }

    #[test]
    fn capture_target_patterns() {
        assert!(is_capture_target("https://site/x/content.do?key=5"));
        assert!(is_capture_target("https://site/x/content.do?key=5&id=9"));
        assert!(is_capture_target("https://site/x/index.do"));
        assert!(is_capture_target("https://site/"));
        assert!(!is_capture_target("https://site/x/content.do?id=9"));
        assert!(!is_capture_target("https://site/x/content.do?key=abc"));
        assert!(!is_capture_target("https://site/x/other.do?key=5"));
        assert!(!is_capture_target("https://site/about.html"));
    }

    #[test]
    fn classify_url_shapes() {
        assert_eq!(
            classify_url("https://site/index.do"),
            PageClassification::MainIndex
        );
        assert_eq!(
            classify_url("https://site/sub/content.do?key=12"),
            PageClassification::ContentDetail
        );
        assert_eq!(
            classify_url("https://site/nav/menu.do"),
            PageClassification::Skip
        );
    }

    #[test]
    fn dom_refinement_detects_board_and_tabs() {
        let board_html = r#"<html><body><table class="board_list"><tr><td>row</td></tr></table></body></html>"#;
        assert_eq!(
            refine_with_dom(PageClassification::ContentDetail, board_html),
            PageClassification::Board
        );

        let tabbed_html = r#"<html><body><ul class="tabs"><li>One</li><li>Two</li></ul></body></html>"#;
        assert_eq!(
            refine_with_dom(PageClassification::ContentDetail, tabbed_html),
            PageClassification::Tabbed
        );

        let plain_html = "<html><body><p>hello</p></body></html>";
        assert_eq!(
            refine_with_dom(PageClassification::MainIndex, plain_html),
            PageClassification::MainIndex
        );
    }

    #[test]
    fn skip_stays_skip_regardless_of_dom() {
        let tabbed_html = r#"<ul class="tabs"><li>One</li></ul>"#;
        assert_eq!(
            refine_with_dom(PageClassification::Skip, tabbed_html),
            PageClassification::Skip
        );
    }

    #[test]
    fn find_tabs_names_and_indexes() {
        let html = r#"<ul class="tabs"><li>Intro</li><li>  </li><li>Schedule</li></ul>"#;
        let tabs = find_tabs(html);
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs[0].name, "Intro");
        assert_eq!(tabs[1].name, "Tab 2");
        assert_eq!(tabs[2].index, 2);
        assert_eq!(tabs[0].selector, "ul.tabs li");
    }

    #[test]
    fn find_tabs_empty_page() {
        assert!(find_tabs("<html><body></body></html>").is_empty());
    }
}
