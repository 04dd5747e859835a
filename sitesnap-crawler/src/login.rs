use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Keywords that mark a text input as the username field, matched against
/// `name` and `id` as-is and against `placeholder` case-insensitively.
const ID_KEYWORDS: &[&str] = &["id", "username", "userid", "loginid", "email"];

/// Visible-text keywords that mark a clickable as the login control.
const BUTTON_KEYWORDS: &[&str] = &["로그인", "login"];

/// Selectors inferred from a login page. Empty string means "not found";
/// callers treat that as manual input required, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginSelectors {
    pub id_selector: String,
    pub pw_selector: String,
    pub btn_selector: String,
}

impl LoginSelectors {
    pub fn is_complete(&self) -> bool {
        !self.id_selector.is_empty() && !self.pw_selector.is_empty() && !self.btn_selector.is_empty()
    }
}

/// Everything needed to run the login sequence once before crawling.
/// Transient: never persisted.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub login_url: String,
    pub selectors: LoginSelectors,
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    /// Fill any empty selector from a detected set, keeping explicit values.
    pub fn fill_missing(&mut self, detected: &LoginSelectors) {
        if self.selectors.id_selector.is_empty() {
            self.selectors.id_selector = detected.id_selector.clone();
        }
        if self.selectors.pw_selector.is_empty() {
            self.selectors.pw_selector = detected.pw_selector.clone();
        }
        if self.selectors.btn_selector.is_empty() {
            self.selectors.btn_selector = detected.btn_selector.clone();
        }
    }
}

/// Synthesize a CSS selector for a matched element: id wins, then
/// tag-plus-classes, then tag-plus-name, then the bare tag.
fn synthesize_selector(element: ElementRef<'_>) -> String {
    let value = element.value();

    if let Some(id) = value.attr("id")
        && !id.is_empty()
    {
        return format!("#{}", id);
    }

    let classes: Vec<&str> = value.classes().collect();
    if !classes.is_empty() {
        return format!("{}.{}", value.name(), classes.join("."));
    }

    if let Some(name) = value.attr("name")
        && !name.is_empty()
    {
        return format!("{}[name=\"{}\"]", value.name(), name);
    }

    value.name().to_string()
}

/// Infer username/password/submit selectors from a rendered login page.
///
/// Best effort per field, independently: the unique password input is the
/// anchor; a keyword match on name/id/placeholder picks the username field,
/// falling back to the first text-like input that is not the password; the
/// submit control is found by visible login text, falling back to any
/// submit-typed element.
pub fn detect_login_form(html: &str) -> LoginSelectors {
    let document = Html::parse_document(html);
    let mut found = LoginSelectors::default();

    let password = Selector::parse(r#"input[type="password"]"#).unwrap();
    if let Some(input) = document.select(&password).next() {
        found.pw_selector = synthesize_selector(input);
    }

    let text_like = Selector::parse(r#"input[type="text"], input:not([type])"#).unwrap();
    let text_inputs: Vec<ElementRef<'_>> = document.select(&text_like).collect();
    for input in &text_inputs {
        let name = input.value().attr("name").unwrap_or("");
        let id = input.value().attr("id").unwrap_or("");
        let placeholder = input
            .value()
            .attr("placeholder")
            .unwrap_or("")
            .to_lowercase();
        if ID_KEYWORDS
            .iter()
            .any(|k| name.contains(k) || id.contains(k) || placeholder.contains(k))
        {
            found.id_selector = synthesize_selector(*input);
            break;
        }
    }
    if found.id_selector.is_empty() {
        for input in &text_inputs {
            let candidate = synthesize_selector(*input);
            if candidate != found.pw_selector {
                found.id_selector = candidate;
                break;
            }
        }
    }

    let clickable =
        Selector::parse(r#"button, input[type="submit"], input[type="button"], a"#).unwrap();
    for element in document.select(&clickable) {
        let mut text = element.text().collect::<String>();
        if text.trim().is_empty()
            && let Some(value) = element.value().attr("value")
        {
            text = value.to_string();
        }
        let text = text.trim().to_lowercase();
        if BUTTON_KEYWORDS.iter().any(|k| text.contains(k)) {
            found.btn_selector = synthesize_selector(element);
            break;
        }
    }
    if found.btn_selector.is_empty() {
        let submit = Selector::parse(r#"button[type="submit"], input[type="submit"]"#).unwrap();
        if let Some(element) = document.select(&submit).next() {
            found.btn_selector = synthesize_selector(element);
        }
    }

    found
}
