//! Plain-text rendering of completed runs.

mod report;

pub use report::{format_report, format_series};
