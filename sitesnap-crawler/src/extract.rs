use crate::scope::ScopePolicy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Collect every in-scope absolute URL reachable from the rendered page.
/// Relative hrefs resolve against the page's own URL, not the crawl origin.
/// Returns first-seen order with duplicates removed; a page with zero
/// anchors yields an empty vec.
pub fn extract_links(html: &str, page_url: &str, scope: &ScopePolicy) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchor = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchor) {
        if let Some(href) = element.value().attr("href")
            && let Some(absolute) = resolve_href(page_url, href)
        {
            if !scope.is_in_scope(&absolute) {
                debug!("Out of scope, skipping: {}", absolute);
                continue;
            }
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    links
}

/// Resolve an href against the page URL, discarding fragment-only and
/// pseudo-protocol entries.
fn resolve_href(base: &str, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let resolved = base_url.join(href).ok()?;
    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> ScopePolicy {
        ScopePolicy::new("example.com")
    }

    #[test]
    fn resolves_relative_hrefs_against_page_url() {
        let html = r#"<a href="detail.do?key=3">d</a><a href="/top.do">t</a>"#;
        let links = extract_links(html, "https://example.com/sub/list.do", &scope());
        assert_eq!(
            links,
            vec![
                "https://example.com/sub/detail.do?key=3".to_string(),
                "https://example.com/top.do".to_string(),
            ]
        );
    }

    #[test]
    fn zero_anchors_yields_empty() {
        let links = extract_links("<html><body><p>no links</p></body></html>", "https://example.com/", &scope());
        assert!(links.is_empty());
    }

    #[test]
    fn discards_fragments_and_pseudo_protocols() {
        let html = r##"
            <a href="#section">frag</a>
            <a href="javascript:void(0)">js</a>
            <a href="mailto:x@example.com">mail</a>
            <a href="tel:+123">tel</a>
            <a href="">empty</a>
            <a href="/real">real</a>
        "##;
        let links = extract_links(html, "https://example.com/", &scope());
        assert_eq!(links, vec!["https://example.com/real".to_string()]);
    }

    #[test]
    fn filters_cross_host_links() {
        let html = r#"<a href="https://other.com/a">x</a><a href="https://example.com/a">y</a>"#;
        let links = extract_links(html, "https://example.com/", &scope());
        assert_eq!(links, vec!["https://example.com/a".to_string()]);
    }

    #[test]
    fn deduplicates_preserving_first_seen_order() {
        let html = r#"
            <a href="/b">b</a>
            <a href="/a">a</a>
            <a href="/b">b again</a>
        "#;
        let links = extract_links(html, "https://example.com/", &scope());
        assert_eq!(
            links,
            vec![
                "https://example.com/b".to_string(),
                "https://example.com/a".to_string(),
            ]
        );
    }

    #[test]
    fn resolved_fragment_links_stay_out_of_scope() {
        let html = r#"<a href="/page#top">p</a>"#;
        let links = extract_links(html, "https://example.com/", &scope());
        assert!(links.is_empty());
    }
}
