//! Capture store and run orchestration: sqlite persistence for capture
//! records plus the glue that drives a browser-backed crawl end to end.

pub mod capture;
pub mod data;

pub use capture::{CaptureOptions, CaptureReport, StoreSink, execute_capture};
pub use data::{CaptureRow, Database};
