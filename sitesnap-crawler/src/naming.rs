use chrono::{DateTime, Datelike, Local};
use url::Url;

/// Capture-date partition folder, e.g. `2026_08_29`.
pub fn date_folder(now: DateTime<Local>) -> String {
    format!("{}_{:02}_{:02}", now.year(), now.month(), now.day())
}

/// Deterministic image file name from the source URL's host and path plus a
/// capture timestamp: dots in the host and non-alphanumeric path characters
/// become underscores.
pub fn image_file_name(url: &str, suffix: Option<&str>, millis: i64) -> String {
    let (host, path) = match Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or("unknown").to_string(),
            parsed.path().to_string(),
        ),
        Err(_) => ("unknown".to_string(), String::new()),
    };

    let safe_host = host.replace('.', "_");
    let safe_path: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let suffix = suffix.map(|s| format!("_{}", slugify(s))).unwrap_or_default();

    format!("{}{}{}_{}.png", safe_host, safe_path, suffix, millis)
}

/// Lowercase alphanumerics, everything else collapsed to underscores. Used
/// for per-tab capture suffixes built from tab label text.
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
