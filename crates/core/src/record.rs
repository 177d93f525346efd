//! Market record definitions.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handle of a record inside a `RecordStore`.
pub type RecordId = u32;

/// Asset class of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Stock,
    Crypto,
}

impl RecordType {
    /// Returns the wire tag of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Stock => "STOCK",
            RecordType::Crypto => "CRYPTO",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("STOCK") {
            Ok(RecordType::Stock)
        } else if s.eq_ignore_ascii_case("CRYPTO") {
            Ok(RecordType::Crypto)
        } else {
            Err(CoreError::UnknownRecordType(s.to_string()))
        }
    }
}

/// A single market tick.
///
/// Records are owned by the `RecordStore` and never modified after ingestion;
/// indexes refer to them by `RecordId`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub name: String,
    /// Ticker symbol. Stocks carry their name here as well.
    pub symbol: String,
    pub price: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    #[serde(rename = "type")]
    pub record_type: RecordType,
}

impl Record {
    /// Creates a new record.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        price: f64,
        high: f64,
        low: f64,
        volume: f64,
        record_type: RecordType,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            name: name.into(),
            symbol: symbol.into(),
            price,
            high,
            low,
            volume,
            record_type,
        }
    }

    /// Returns true if `ticker` equals the name or the symbol, ignoring case.
    pub fn matches_ticker(&self, ticker: &str) -> bool {
        self.name.eq_ignore_ascii_case(ticker) || self.symbol.eq_ignore_ascii_case(ticker)
    }

    /// Returns true if `needle` (already uppercased) occurs in the name or the
    /// symbol, ignoring case.
    pub fn contains_ticker(&self, needle: &str) -> bool {
        self.name.to_ascii_uppercase().contains(needle)
            || self.symbol.to_ascii_uppercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new(
            "2024-01-15 10:00:00",
            "Bitcoin",
            "BTC",
            42_500.5,
            0.0,
            0.0,
            1_200.0,
            RecordType::Crypto,
        )
    }

    #[test]
    fn test_record_type_from_str() {
        assert_eq!("STOCK".parse::<RecordType>().unwrap(), RecordType::Stock);
        assert_eq!("crypto".parse::<RecordType>().unwrap(), RecordType::Crypto);
        assert!(matches!(
            "bond".parse::<RecordType>(),
            Err(CoreError::UnknownRecordType(_))
        ));
    }

    #[test]
    fn test_record_type_display() {
        assert_eq!(RecordType::Stock.to_string(), "STOCK");
        assert_eq!(RecordType::Crypto.to_string(), "CRYPTO");
    }

    #[test]
    fn test_matches_ticker_ignores_case() {
        let record = sample();
        assert!(record.matches_ticker("btc"));
        assert!(record.matches_ticker("BITCOIN"));
        assert!(!record.matches_ticker("BT"));
    }

    #[test]
    fn test_contains_ticker() {
        let record = sample();
        assert!(record.contains_ticker("BIT"));
        assert!(record.contains_ticker("TC"));
        assert!(!record.contains_ticker("ETH"));
    }

    #[test]
    fn test_record_serializes_type_tag() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "CRYPTO");
        assert_eq!(json["symbol"], "BTC");
        assert_eq!(json["price"], 42_500.5);
    }
}
