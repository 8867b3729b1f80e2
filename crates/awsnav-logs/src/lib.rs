//! Log retrieval and formatting pipeline for awsnav
//!
//! Turns raw provider log events into display entries: severity
//! detection, embedded JSON extraction, timestamp normalization, and
//! the local tail-window policy applied after fetching.

mod format;
mod window;

pub use format::{LogFormatter, floor_char_boundary, format_timestamp, try_parse_json};
pub use window::{DEFAULT_LOOKBACK_MINUTES, DEFAULT_TAIL, apply_window};
