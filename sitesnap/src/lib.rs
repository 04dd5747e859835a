// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{expand_db_path, format_selectors, resolve_login_url};

// Re-export capture orchestration from sitesnap-core
pub use sitesnap_core::capture::{
    CaptureOptions, CaptureReport, execute_capture, generate_capture_listing,
    generate_capture_report,
};
