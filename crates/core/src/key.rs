//! Key projections.
//!
//! Every index is keyed by an `i32` derived from a record through one of the
//! projections below. The projections are pure and total: a value that cannot
//! be interpreted maps to a fixed fallback key instead of failing the build.

use crate::error::{CoreError, Result};
use crate::record::Record;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Sort key stored in every index.
pub type Key = i32;

/// Layout of a record timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout of a day used as a range bound.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Key used for timestamps that fail to parse.
pub const INVALID_TIMESTAMP_KEY: Key = 0;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp as UTC and returns epoch seconds.
pub fn parse_timestamp(timestamp: &str) -> Result<i64> {
    NaiveDateTime::parse_from_str(timestamp.trim(), TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| CoreError::InvalidTimestamp(timestamp.to_string()))
}

/// Converts epoch seconds into a key.
pub fn epoch_to_key(seconds: i64) -> Result<Key> {
    Key::try_from(seconds).map_err(|_| CoreError::KeyOutOfRange(seconds))
}

/// Timestamp projection. Unparseable or out-of-range timestamps map to
/// `INVALID_TIMESTAMP_KEY`.
pub fn timestamp_to_key(timestamp: &str) -> Key {
    parse_timestamp(timestamp)
        .and_then(epoch_to_key)
        .unwrap_or(INVALID_TIMESTAMP_KEY)
}

/// Which end of a day a date bound refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayBound {
    /// `00:00:00`
    Start,
    /// `23:59:59`
    End,
}

/// Resolves a range bound to a key.
///
/// A bare `YYYY-MM-DD` expands to the start or the end of that day; a full
/// timestamp is used as given.
pub fn date_bound_to_key(date: &str, bound: DayBound) -> Result<Key> {
    let trimmed = date.trim();
    if let Ok(seconds) = parse_timestamp(trimmed) {
        return epoch_to_key(seconds);
    }

    let day = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(date.to_string()))?;
    let (hour, min, sec) = match bound {
        DayBound::Start => (0, 0, 0),
        DayBound::End => (23, 59, 59),
    };
    let time = NaiveTime::from_hms_opt(hour, min, sec)
        .ok_or_else(|| CoreError::InvalidDate(date.to_string()))?;
    epoch_to_key(day.and_time(time).and_utc().timestamp())
}

/// Price projection: integer cents, truncated toward zero.
///
/// `price_to_key(19.999) == 1999`. Non-finite prices saturate (NaN maps to 0).
pub fn price_to_key(price: f64) -> Key {
    (price * 100.0) as Key
}

/// 32-bit FNV-1a over raw bytes.
pub fn fnv1a(bytes: impl IntoIterator<Item = u8>) -> u32 {
    bytes.into_iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Name projection: FNV-1a of the ASCII-uppercased name.
pub fn name_key(name: &str) -> Key {
    fnv1a(name.bytes().map(|b| b.to_ascii_uppercase())) as Key
}

/// Named projection from a record to its key for one index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyProjection {
    Timestamp,
    Price,
    Name,
}

impl KeyProjection {
    /// All projections, in index build order.
    pub const ALL: [KeyProjection; 3] = [
        KeyProjection::Timestamp,
        KeyProjection::Price,
        KeyProjection::Name,
    ];

    /// Projects a record onto this key.
    pub fn project(&self, record: &Record) -> Key {
        match self {
            KeyProjection::Timestamp => timestamp_to_key(&record.timestamp),
            KeyProjection::Price => price_to_key(record.price),
            KeyProjection::Name => name_key(&record.name),
        }
    }

    /// Index name used in logs and responses.
    pub fn index_name(&self) -> &'static str {
        match self {
            KeyProjection::Timestamp => "timestamp",
            KeyProjection::Price => "price",
            KeyProjection::Name => "name",
        }
    }
}
