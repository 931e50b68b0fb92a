pub mod log_report;
pub mod logging;
pub mod rotating_file;
pub mod text;

pub use log_report::LogReport;
pub use text::{tail_preview, to_spaced_json, truncate_text, PREVIEW_CHARS};
