//! CloudWatch Logs retrieval

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use awsnav_types::{EventTimestamp, RawLogEvent};

use crate::client::SessionContext;

/// Fetch one page of events from a log group, oldest first, starting
/// `lookback_minutes` in the past. Tail slicing and level filtering
/// happen locally afterwards.
pub async fn fetch_window(
    ctx: &SessionContext,
    log_group: &str,
    lookback_minutes: i64,
) -> Result<Vec<RawLogEvent>> {
    let start_time = Utc::now().timestamp_millis() - lookback_minutes * 60_000;

    let response = ctx
        .logs()
        .filter_log_events()
        .log_group_name(log_group)
        .start_time(start_time)
        .send()
        .await
        .with_context(|| format!("Failed to fetch logs from {log_group}"))?;

    let events: Vec<RawLogEvent> = response
        .events()
        .iter()
        .map(|event| RawLogEvent {
            timestamp: EventTimestamp::Millis(event.timestamp().unwrap_or(0)),
            message: event.message().unwrap_or_default().to_string(),
        })
        .collect();
    debug!(log_group, count = events.len(), "fetched log events");
    Ok(events)
}
