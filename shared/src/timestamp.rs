//! Timestamp normalization at the persistence boundary
//!
//! Stored records and client payloads carry timestamps as RFC 3339 strings,
//! epoch milliseconds, or `{ seconds, nanoseconds }` wrappers. They are turned
//! into `DateTime<Utc>` once, here, before reaching the stock core.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StockError, StockResult};

/// Any timestamp shape accepted from outside
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    EpochMillis(i64),
    Provider { seconds: i64, nanoseconds: u32 },
}

/// Normalize a raw timestamp into an instant
pub fn to_instant(raw: &RawTimestamp) -> StockResult<DateTime<Utc>> {
    match raw {
        RawTimestamp::Text(text) => parse_text(text),
        RawTimestamp::EpochMillis(millis) => Utc
            .timestamp_millis_opt(*millis)
            .single()
            .ok_or_else(|| StockError::InvalidTimestamp(millis.to_string())),
        RawTimestamp::Provider {
            seconds,
            nanoseconds,
        } => Utc
            .timestamp_opt(*seconds, *nanoseconds)
            .single()
            .ok_or_else(|| StockError::InvalidTimestamp(format!("{}s {}ns", seconds, nanoseconds))),
    }
}

fn parse_text(text: &str) -> StockResult<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    // A bare date means midnight UTC
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    Err(StockError::InvalidTimestamp(text.to_string()))
}
