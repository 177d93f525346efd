//! CSV ingestion for stock and crypto tick files.
//!
//! Both files start with a header line. Rows with fewer than
//! [`MIN_FIELDS`] fields, or whose numeric fields fail to parse, are skipped.

use crate::error::Result;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tickdex_core::{Record, RecordType};
use tracing::{debug, info, warn};

/// Minimum number of fields a row needs to be considered.
pub const MIN_FIELDS: usize = 9;

/// Column layout of an input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsvFormat {
    /// `0 timestamp, 1 name, 2 price, 3 high, 4 low, 7 volume`. The name
    /// doubles as the symbol.
    Stock,
    /// `0 timestamp, 1 name, 2 symbol, 3 price, 5 volume`. No high or low.
    Crypto,
}

impl CsvFormat {
    /// Type tag given to records of this format.
    pub fn record_type(&self) -> RecordType {
        match self {
            CsvFormat::Stock => RecordType::Stock,
            CsvFormat::Crypto => RecordType::Crypto,
        }
    }

    /// Converts one row into a record, or `None` if the row must be skipped.
    pub fn parse_row(&self, row: &StringRecord) -> Option<Record> {
        if row.len() < MIN_FIELDS {
            return None;
        }
        let number = |i: usize| row.get(i)?.parse::<f64>().ok();
        let timestamp = row.get(0)?;
        let name = row.get(1)?;

        let record = match self {
            CsvFormat::Stock => Record::new(
                timestamp,
                name,
                name,
                number(2)?,
                number(3)?,
                number(4)?,
                number(7)?,
                RecordType::Stock,
            ),
            CsvFormat::Crypto => Record::new(
                timestamp,
                name,
                row.get(2)?,
                number(3)?,
                0.0,
                0.0,
                number(5)?,
                RecordType::Crypto,
            ),
        };
        Some(record)
    }
}

/// Reads records from any CSV source, stopping after `max_rows` accepted
/// records when a limit is given.
pub fn read_records<R: Read>(
    reader: R,
    format: CsvFormat,
    max_rows: Option<usize>,
) -> Result<Vec<Record>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let limit = max_rows.unwrap_or(usize::MAX);
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut row = StringRecord::new();

    while records.len() < limit {
        match csv.read_record(&mut row) {
            Ok(true) => match format.parse_row(&row) {
                Some(record) => records.push(record),
                None => {
                    skipped += 1;
                    debug!(line = row.position().map(|p| p.line()), "skipping row");
                }
            },
            Ok(false) => break,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                skipped += 1;
                debug!(error = %err, "skipping unreadable row");
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, format = ?format, "skipped malformed rows");
    }
    Ok(records)
}

/// Loads a CSV file. A file that cannot be opened is reported and yields no
/// records.
pub fn load_file(path: &Path, format: CsvFormat, max_rows: Option<usize>) -> Result<Vec<Record>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not open data file");
            return Ok(Vec::new());
        }
    };

    let records = read_records(file, format, max_rows)?;
    info!(
        path = %path.display(),
        records = records.len(),
        "loaded {} records",
        format.record_type()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCKS: &str = "\
timestamp,name,close,high,low,open,adj_close,volume,exchange
2024-01-15 10:00:00,AAPL,185.92,186.40,183.92,184.35,185.92,65076600,NASDAQ
 2024-01-15 11:00:00 , MSFT , 390.27 ,391.00,388.10,389.00,390.27, 1200 ,NASDAQ
2024-01-15 12:00:00,GOOG,141.80,142.00
2024-01-15 13:00:00,TSLA,not-a-number,220.0,210.0,215.0,218.0,900,NASDAQ
2024-01-16 10:00:00,AMZN,155.20,156.00,154.00,154.50,155.20,4000,NASDAQ
";

    const CRYPTO: &str = "\
timestamp,name,symbol,price,market_cap,volume,change_24h,change_7d,rank
2024-01-15 10:00:00,Bitcoin,BTC,42500.50,833000000000,21000000000,1.2,3.4,1
2024-01-15 10:00:00,Ethereum,ETH,2510.10,301000000000,9000000000,0.5,1.1,2
";

    fn stocks(max_rows: Option<usize>) -> Vec<Record> {
        read_records(STOCKS.as_bytes(), CsvFormat::Stock, max_rows).unwrap()
    }

    #[test]
    fn test_stock_columns() {
        let records = stocks(None);
        let aapl = &records[0];
        assert_eq!(aapl.timestamp, "2024-01-15 10:00:00");
        assert_eq!(aapl.name, "AAPL");
        assert_eq!(aapl.symbol, "AAPL");
        assert_eq!(aapl.price, 185.92);
        assert_eq!(aapl.high, 186.40);
        assert_eq!(aapl.low, 183.92);
        assert_eq!(aapl.volume, 65_076_600.0);
        assert_eq!(aapl.record_type, RecordType::Stock);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let records = stocks(None);
        let msft = &records[1];
        assert_eq!(msft.timestamp, "2024-01-15 11:00:00");
        assert_eq!(msft.name, "MSFT");
        assert_eq!(msft.volume, 1200.0);
    }

    #[test]
    fn test_short_and_malformed_rows_skipped() {
        let names: Vec<String> = stocks(None).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["AAPL", "MSFT", "AMZN"]);
    }

    #[test]
    fn test_max_rows_counts_accepted_records() {
        assert_eq!(stocks(Some(2)).len(), 2);
        assert_eq!(stocks(Some(3)).len(), 3);
        assert!(stocks(Some(0)).is_empty());
    }

    #[test]
    fn test_crypto_columns() {
        let records = read_records(CRYPTO.as_bytes(), CsvFormat::Crypto, None).unwrap();
        assert_eq!(records.len(), 2);
        let btc = &records[0];
        assert_eq!(btc.name, "Bitcoin");
        assert_eq!(btc.symbol, "BTC");
        assert_eq!(btc.price, 42_500.50);
        assert_eq!(btc.high, 0.0);
        assert_eq!(btc.low, 0.0);
        assert_eq!(btc.volume, 21_000_000_000.0);
        assert_eq!(btc.record_type, RecordType::Crypto);
    }

    #[test]
    fn test_header_only() {
        let input = "timestamp,name,symbol,price,market_cap,volume,change_24h,change_7d,rank\n";
        assert!(read_records(input.as_bytes(), CsvFormat::Crypto, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_file_yields_nothing() {
        let path = Path::new("/nonexistent/tickdex/stocks.csv");
        assert!(load_file(path, CsvFormat::Stock, None).unwrap().is_empty());
    }
}
