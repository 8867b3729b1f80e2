use awsnav_types::RawLogEvent;
use tracing::debug;

/// Default lookback window for log retrieval, in minutes.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;

/// Default number of events kept from the end of the window.
pub const DEFAULT_TAIL: usize = 50;

/// Apply the local window policy to an oldest-first batch of events:
/// an optional case-insensitive substring filter against the raw
/// message, then keep only the last `tail` events.
pub fn apply_window(
    events: Vec<RawLogEvent>,
    level_filter: Option<&str>,
    tail: usize,
) -> Vec<RawLogEvent> {
    let fetched = events.len();
    let mut kept: Vec<RawLogEvent> = match level_filter {
        Some(needle) if !needle.is_empty() => {
            let needle = needle.to_lowercase();
            events
                .into_iter()
                .filter(|e| e.message.to_lowercase().contains(&needle))
                .collect()
        }
        _ => events,
    };
    if kept.len() > tail {
        kept.drain(..kept.len() - tail);
    }
    debug!(fetched, kept = kept.len(), "applied log window");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsnav_types::EventTimestamp;

    fn events(messages: &[&str]) -> Vec<RawLogEvent> {
        messages
            .iter()
            .enumerate()
            .map(|(i, m)| RawLogEvent {
                timestamp: EventTimestamp::Millis(i as i64),
                message: m.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_tail_keeps_newest_events() {
        let batch: Vec<String> = (0..120).map(|i| format!("event {i}")).collect();
        let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
        let kept = apply_window(events(&refs), None, 50);
        assert_eq!(kept.len(), 50);
        assert_eq!(kept[0].message, "event 70");
        assert_eq!(kept[49].message, "event 119");
    }

    #[test]
    fn test_filter_applies_before_tail() {
        let mut batch: Vec<String> = (0..110).map(|i| format!("ok {i}")).collect();
        for i in 0..10 {
            batch.push(format!("ERROR failure {i}"));
        }
        let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
        let kept = apply_window(events(&refs), Some("ERROR"), 50);
        assert_eq!(kept.len(), 10);
        assert!(kept.iter().all(|e| e.message.contains("ERROR")));
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let kept = apply_window(
            events(&["an error occurred", "all fine", "[Error] again"]),
            Some("ERROR"),
            50,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let kept = apply_window(events(&["a", "b", "c"]), Some(""), 50);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_tail_larger_than_batch() {
        let kept = apply_window(events(&["a", "b"]), None, 50);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let kept = apply_window(events(&["info", "info"]), Some("ERROR"), 50);
        assert!(kept.is_empty());
    }
}
