use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use awsnav_types::{EventTimestamp, FormattedLogEntry, LogLevel, RawLogEvent};

/// Cleaned messages longer than this with no JSON payload are truncated.
const MAX_MESSAGE_LEN: usize = 5000;

/// Formats raw provider log events into display entries
pub struct LogFormatter {
    level_field: Regex,
    bracketed: Regex,
    bare_word: Regex,
    ansi: Regex,
}

impl Default for LogFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFormatter {
    pub fn new() -> Self {
        Self {
            level_field: Regex::new(r#"(?i)"(?:level|severity)"\s*:\s*"(\w+)""#).unwrap(),
            bracketed: Regex::new(r"\[(\w+)\]").unwrap(),
            bare_word: Regex::new(r"(?i)\b(ERROR|WARN|WARNING|INFO|DEBUG|TRACE)\b").unwrap(),
            ansi: Regex::new(r"\x1B(?:\[[0-?]*[ -/]*[@-~]|[@-Z\\^_])").unwrap(),
        }
    }

    /// Format one raw event. Never fails; malformed content degrades to
    /// best-effort output with `Info` severity.
    pub fn format_entry(&self, event: &RawLogEvent) -> FormattedLogEntry {
        let mut message = self.strip_ansi(&event.message);
        let json_data = try_parse_json(&message);

        let level = match json_data
            .as_ref()
            .and_then(|v| v.get("level"))
            .and_then(Value::as_str)
        {
            Some(word) => LogLevel::parse(word).unwrap_or_default(),
            None => self.extract_level(&message),
        };

        if json_data.is_none() && message.len() > MAX_MESSAGE_LEN {
            let cut = floor_char_boundary(&message, MAX_MESSAGE_LEN);
            message.truncate(cut);
            message.push_str("...");
        }

        FormattedLogEntry {
            timestamp: format_timestamp(&event.timestamp),
            level,
            message,
            json_data,
        }
    }

    /// Detect a severity level in plain text. Patterns run in order and
    /// the first match of each is inspected; a match whose captured word
    /// is not a level falls through to the next pattern.
    pub fn extract_level(&self, message: &str) -> LogLevel {
        for pattern in [&self.level_field, &self.bracketed, &self.bare_word] {
            if let Some(caps) = pattern.captures(message) {
                if let Some(level) = LogLevel::parse(&caps[1]) {
                    return level;
                }
            }
        }

        let upper = message.to_uppercase();
        if ["ERROR", "EXCEPTION", "FAILED"]
            .iter()
            .any(|word| upper.contains(word))
        {
            return LogLevel::Error;
        }
        if upper.contains("WARN") {
            return LogLevel::Warn;
        }
        LogLevel::Info
    }

    fn strip_ansi(&self, message: &str) -> String {
        self.ansi.replace_all(message, "").into_owned()
    }
}

/// Extract the greedy first-`{`-to-last-`}` span and parse it as JSON.
/// Returns `None` on any failure.
pub fn try_parse_json(message: &str) -> Option<Value> {
    let start = message.find('{')?;
    let end = message.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&message[start..=end]).ok()
}

/// Render a timestamp for display, always in UTC. Numeric values above
/// 1e12 are epoch milliseconds, smaller ones epoch seconds. Text values
/// parse as RFC 3339; anything unparseable comes back unchanged.
pub fn format_timestamp(ts: &EventTimestamp) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M:%S";
    match ts {
        EventTimestamp::Millis(raw) => {
            let secs = if *raw > 1_000_000_000_000 {
                raw / 1000
            } else {
                *raw
            };
            match DateTime::<Utc>::from_timestamp(secs, 0) {
                Some(dt) => dt.format(DISPLAY).to_string(),
                None => raw.to_string(),
            }
        }
        EventTimestamp::Text(text) => match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => dt.with_timezone(&Utc).format(DISPLAY).to_string(),
            Err(_) => text.clone(),
        },
    }
}

/// Find the largest valid char boundary <= the given byte index
pub fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> FormattedLogEntry {
        LogFormatter::new().format_entry(&RawLogEvent {
            timestamp: EventTimestamp::Millis(1_700_000_000_000),
            message: message.to_string(),
        })
    }

    #[test]
    fn test_bracketed_level() {
        assert_eq!(entry("[ERROR] connection refused").level, LogLevel::Error);
        assert_eq!(entry("[debug] cache warm").level, LogLevel::Debug);
    }

    #[test]
    fn test_level_field_wins_over_text() {
        let e = entry(r#"something "level": "warning" [ERROR] trailing"#);
        assert_eq!(e.level, LogLevel::Warn);
    }

    #[test]
    fn test_non_level_capture_falls_through() {
        // The bracket pattern matches "[worker]" but the word is not a
        // level, so detection falls through to the bare-word pattern.
        assert_eq!(entry("[worker] INFO started").level, LogLevel::Info);
        // Nothing structured matches here; the substring scan catches FAILED.
        assert_eq!(entry("[worker] task FAILED hard").level, LogLevel::Error);
    }

    #[test]
    fn test_substring_fallbacks() {
        assert_eq!(entry("unhandled exception in handler").level, LogLevel::Error);
        assert_eq!(entry("low disk warning issued").level, LogLevel::Warn);
        assert_eq!(entry("request served in 12ms").level, LogLevel::Info);
    }

    #[test]
    fn test_json_payload_extracted_with_level() {
        let e = entry(r#"{"level":"warn","msg":"disk low"}"#);
        assert_eq!(e.level, LogLevel::Warn);
        let json = e.json_data.expect("payload should parse");
        assert_eq!(json["msg"], "disk low");
    }

    #[test]
    fn test_json_unmapped_level_defaults_to_info() {
        let e = entry(r#"{"level":"notice","msg":"hello"}"#);
        assert_eq!(e.level, LogLevel::Info);
        assert!(e.json_data.is_some());
    }

    #[test]
    fn test_json_embedded_in_prefix_text() {
        let e = entry(r#"2024-01-01 app[42]: {"level":"error","code":7}"#);
        assert_eq!(e.level, LogLevel::Error);
        assert!(e.json_data.is_some());
    }

    #[test]
    fn test_json_extractor_never_panics() {
        assert!(try_parse_json("{not json").is_none());
        assert!(try_parse_json("no braces at all").is_none());
        assert!(try_parse_json("} reversed {").is_none());
        assert!(try_parse_json("").is_none());
        assert!(try_parse_json(r#"{"ok":true}"#).is_some());
    }

    #[test]
    fn test_millis_timestamp_renders_utc() {
        let rendered = format_timestamp(&EventTimestamp::Millis(1_700_000_000_000));
        assert_eq!(rendered, "2023-11-14 22:13:20");
    }

    #[test]
    fn test_seconds_timestamp_renders_utc() {
        let rendered = format_timestamp(&EventTimestamp::Millis(1_700_000_000));
        assert_eq!(rendered, "2023-11-14 22:13:20");
    }

    #[test]
    fn test_text_timestamp_rfc3339() {
        let rendered = format_timestamp(&EventTimestamp::Text("2024-01-15T10:30:00Z".to_string()));
        assert_eq!(rendered, "2024-01-15 10:30:00");
    }

    #[test]
    fn test_text_timestamp_unparseable_passes_through() {
        let rendered = format_timestamp(&EventTimestamp::Text("yesterday".to_string()));
        assert_eq!(rendered, "yesterday");
    }

    #[test]
    fn test_ansi_codes_stripped() {
        let e = entry("\x1b[31mERROR\x1b[0m boom");
        assert_eq!(e.message, "ERROR boom");
        assert_eq!(e.level, LogLevel::Error);
    }

    #[test]
    fn test_long_plain_message_truncated() {
        let long = "x".repeat(6000);
        let e = entry(&long);
        assert!(e.message.ends_with("..."));
        assert_eq!(e.message.len(), MAX_MESSAGE_LEN + 3);
    }

    #[test]
    fn test_long_json_message_not_truncated() {
        let long = format!(r#"{{"filler":"{}"}}"#, "y".repeat(6000));
        let e = entry(&long);
        assert!(e.json_data.is_some());
        assert!(!e.message.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_utf8_boundaries() {
        let long = "é".repeat(4000);
        let e = entry(&long);
        assert!(e.message.ends_with("..."));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let event = RawLogEvent {
            timestamp: EventTimestamp::Millis(1_700_000_000_000),
            message: r#"[WARN] {"level":"error","id":1}"#.to_string(),
        };
        let formatter = LogFormatter::new();
        assert_eq!(formatter.format_entry(&event), formatter.format_entry(&event));
    }
}
