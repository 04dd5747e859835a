use crate::browser::PageDriver;
use crate::error::Result;
use std::time::{Duration, Instant};
use tracing::debug;

/// Neutralizes scroll-triggered reveal animations (the AOS family) so the
/// capture shows final-state content. Guarded lookups throughout: pages
/// without the library are a no-op.
///
/// Script v1. Parameterized by nothing; keep it a fixed expression so the
/// page never executes serialized Rust-side closures.
pub const EFFECT_TEARDOWN_SCRIPT: &str = r#"
(() => {
    if (window.AOS) { window.AOS = null; }
    document.querySelectorAll('style, link[rel="stylesheet"]').forEach((tag) => {
        const inline = tag.innerHTML || '';
        const href = tag.href || '';
        if (inline.includes('aos') || href.includes('aos')) { tag.remove(); }
    });
    document.querySelectorAll('[data-aos]').forEach((el) => {
        el.removeAttribute('data-aos');
        el.style.opacity = '';
        el.style.transform = '';
    });
})()
"#;

pub const SCROLL_HEIGHT_EXPR: &str = "document.body.scrollHeight";
const SCROLL_TO_TOP_EXPR: &str = "window.scrollTo(0, 0)";

#[derive(Debug, Clone)]
pub struct SettleConfig {
    /// Pause between scroll steps while waiting for lazy content.
    pub scroll_interval: Duration,
    /// Hard wall-clock ceiling for the whole scroll loop.
    pub max_wait: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            scroll_interval: Duration::from_millis(200),
            max_wait: Duration::from_secs(5),
        }
    }
}

/// Drive a freshly navigated page to a visually stable state: tear down
/// scroll-reveal effects, then scroll toward the bottom until the document
/// height stops growing (or the ceiling elapses), then return to the top.
pub async fn settle<D: PageDriver>(driver: &mut D, config: &SettleConfig) -> Result<()> {
    driver.evaluate(EFFECT_TEARDOWN_SCRIPT).await?;

    let deadline = Instant::now() + config.max_wait;
    let mut last_height: i64 = -1;

    loop {
        let height = driver
            .evaluate(SCROLL_HEIGHT_EXPR)
            .await?
            .as_i64()
            .unwrap_or(0);

        if height <= last_height {
            debug!("Document height stable at {}", height);
            break;
        }
        if Instant::now() >= deadline {
            debug!("Settle ceiling reached at height {}", height);
            break;
        }

        last_height = height;
        driver
            .evaluate(&format!("window.scrollTo(0, {})", height))
            .await?;
        tokio::time::sleep(config.scroll_interval).await;
    }

    driver.evaluate(SCROLL_TO_TOP_EXPR).await?;
    Ok(())
}
