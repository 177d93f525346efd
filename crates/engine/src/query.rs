//! Query engine: typed requests answered from the index manager.

use crate::error::Result;
use crate::manager::IndexManager;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tickdex_core::key::{self, DayBound};
use tickdex_core::{KeyProjection, Record};
use tracing::debug;

/// Maximum number of records returned by one query.
pub const MAX_RESULTS: usize = 500;

/// Index name reported when a ticker query falls back to scanning the store.
pub const SCAN: &str = "scan";

/// A request line, tagged by `queryType`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "queryType", rename_all = "camelCase")]
pub enum Request {
    /// Records whose name or symbol is `ticker`, ignoring case.
    Ticker { ticker: String },
    /// Records between the start of `start_date` and the end of `end_date`.
    #[serde(rename_all = "camelCase")]
    DateRange { start_date: String, end_date: String },
    /// Records priced within `[min_price, max_price]`.
    #[serde(rename_all = "camelCase")]
    PriceRange { min_price: f64, max_price: f64 },
    /// Re-measure and rewrite the perf snapshot.
    RunPerf,
}

impl Request {
    /// Wire name of the query type.
    pub fn query_type(&self) -> &'static str {
        match self {
            Request::Ticker { .. } => "ticker",
            Request::DateRange { .. } => "dateRange",
            Request::PriceRange { .. } => "priceRange",
            Request::RunPerf => "runPerf",
        }
    }
}

/// How a query was answered.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Index used, or `scan`.
    pub index: &'static str,
    /// Layout of the indexes.
    pub structure: &'static str,
    /// Number of records matched before truncation.
    pub matched: usize,
    pub truncated: bool,
    pub elapsed_micros: u64,
}

/// Answer to a ticker, date range or price range query.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse<'a> {
    pub results: Vec<&'a Record>,
    /// Number of records in the store.
    pub size: usize,
    pub query_type: &'static str,
    pub metrics: Metrics,
}

/// Answers queries against a built [`IndexManager`].
pub struct QueryEngine {
    manager: IndexManager,
}

impl QueryEngine {
    pub fn new(manager: IndexManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &IndexManager {
        &self.manager
    }

    /// Records matching `ticker` by name or symbol.
    ///
    /// Looks up the name index first and filters out hash collisions. When
    /// that finds nothing, every record is scanned for an exact or partial
    /// name or symbol match.
    pub fn ticker(&self, ticker: &str) -> Result<QueryResponse<'_>> {
        let started = Instant::now();
        let ticker = ticker.trim();
        let store = self.manager.store();

        let hash = key::name_key(ticker);
        let mut ids = self
            .manager
            .index(KeyProjection::Name)?
            .range_query(&hash, &hash);
        ids.sort_unstable();
        let hits: Vec<&Record> = store
            .resolve(ids)
            .filter(|record| record.matches_ticker(ticker))
            .collect();

        if !hits.is_empty() || ticker.is_empty() {
            return Ok(self.respond("ticker", KeyProjection::Name.index_name(), hits, started));
        }

        debug!(ticker, "no indexed match, scanning records");
        let needle = ticker.to_ascii_uppercase();
        let hits = store
            .iter()
            .map(|(_, record)| record)
            .filter(|record| record.matches_ticker(ticker) || record.contains_ticker(&needle))
            .collect();
        Ok(self.respond("ticker", SCAN, hits, started))
    }

    /// Records timestamped within `[start_date, end_date]`.
    ///
    /// A bare `YYYY-MM-DD` covers the whole day.
    pub fn date_range(&self, start_date: &str, end_date: &str) -> Result<QueryResponse<'_>> {
        let started = Instant::now();
        let low = key::date_bound_to_key(start_date, DayBound::Start)?;
        let high = key::date_bound_to_key(end_date, DayBound::End)?;
        self.range("dateRange", KeyProjection::Timestamp, low, high, started)
    }

    /// Records priced within `[min_price, max_price]`, compared in cents.
    pub fn price_range(&self, min_price: f64, max_price: f64) -> Result<QueryResponse<'_>> {
        let started = Instant::now();
        let low = key::price_to_key(min_price);
        let high = key::price_to_key(max_price);
        self.range("priceRange", KeyProjection::Price, low, high, started)
    }

    fn range(
        &self,
        query_type: &'static str,
        projection: KeyProjection,
        low: key::Key,
        high: key::Key,
        started: Instant,
    ) -> Result<QueryResponse<'_>> {
        let ids = self.manager.index(projection)?.range_query(&low, &high);
        let hits = self.manager.store().resolve(ids).collect();
        Ok(self.respond(query_type, projection.index_name(), hits, started))
    }

    fn respond<'a>(
        &'a self,
        query_type: &'static str,
        index: &'static str,
        mut results: Vec<&'a Record>,
        started: Instant,
    ) -> QueryResponse<'a> {
        let matched = results.len();
        results.truncate(MAX_RESULTS);
        QueryResponse {
            results,
            size: self.manager.len(),
            query_type,
            metrics: Metrics {
                index,
                structure: self.manager.layout().name(),
                matched,
                truncated: matched > MAX_RESULTS,
                elapsed_micros: started.elapsed().as_micros() as u64,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickdex_core::RecordType;
    use tickdex_index::Layout;

    fn stock(timestamp: &str, name: &str, price: f64) -> Record {
        Record::new(timestamp, name, name, price, price, price, 1.0, RecordType::Stock)
    }

    fn crypto(timestamp: &str, name: &str, symbol: &str, price: f64) -> Record {
        Record::new(timestamp, name, symbol, price, 0.0, 0.0, 1.0, RecordType::Crypto)
    }

    fn engine(layout: Layout) -> QueryEngine {
        let records = vec![
            stock("2024-01-15 10:00:00", "AAPL", 185.92),
            stock("2024-01-15 16:00:00", "MSFT", 390.27),
            stock("2024-01-16 09:30:00", "AAPL", 186.01),
            stock("2024-01-17 09:30:00", "GOOG", 141.80),
            crypto("2024-01-15 10:00:00", "Bitcoin", "BTC", 42_500.50),
            crypto("2024-01-16 00:00:00", "Ethereum", "ETH", 2_510.10),
        ];
        QueryEngine::new(IndexManager::build(layout, records))
    }

    fn names(response: &QueryResponse<'_>) -> Vec<String> {
        response.results.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_request_parsing() {
        let request: Request = serde_json::from_str(r#"{"queryType":"ticker","ticker":"AAPL"}"#).unwrap();
        assert_eq!(request, Request::Ticker { ticker: "AAPL".into() });

        let request: Request = serde_json::from_str(
            r#"{"queryType":"dateRange","startDate":"2024-01-15","endDate":"2024-01-16"}"#,
        )
        .unwrap();
        assert_eq!(request.query_type(), "dateRange");

        let request: Request =
            serde_json::from_str(r#"{"queryType":"priceRange","minPrice":100,"maxPrice":200.5}"#).unwrap();
        assert_eq!(request, Request::PriceRange { min_price: 100.0, max_price: 200.5 });

        let request: Request = serde_json::from_str(r#"{"queryType":"runPerf"}"#).unwrap();
        assert_eq!(request, Request::RunPerf);
    }

    #[test]
    fn test_request_rejects_unknown_type() {
        assert!(serde_json::from_str::<Request>(r#"{"queryType":"volume"}"#).is_err());
        assert!(serde_json::from_str::<Request>(r#"{"ticker":"AAPL"}"#).is_err());
        assert!(serde_json::from_str::<Request>(r#"{"queryType":"priceRange","minPrice":1}"#).is_err());
    }

    #[test]
    fn test_ticker_uses_name_index() {
        for layout in Layout::ALL {
            let engine = engine(layout);
            let response = engine.ticker("aapl").unwrap();
            assert_eq!(names(&response), vec!["AAPL", "AAPL"]);
            assert_eq!(response.results[0].timestamp, "2024-01-15 10:00:00");
            assert_eq!(response.metrics.index, "name");
            assert_eq!(response.metrics.structure, layout.name());
            assert_eq!(response.size, 6);
        }
    }

    #[test]
    fn test_ticker_falls_back_to_scan() {
        let engine = engine(Layout::BPlusTree);

        let response = engine.ticker("btc").unwrap();
        assert_eq!(names(&response), vec!["Bitcoin"]);
        assert_eq!(response.metrics.index, SCAN);

        let response = engine.ticker("ether").unwrap();
        assert_eq!(names(&response), vec!["Ethereum"]);

        let response = engine.ticker("NOPE").unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.metrics.matched, 0);
    }

    #[test]
    fn test_empty_ticker_matches_nothing() {
        let engine = engine(Layout::BTree);
        assert!(engine.ticker("  ").unwrap().results.is_empty());
    }

    #[test]
    fn test_date_range_covers_whole_days() {
        for layout in Layout::ALL {
            let engine = engine(layout);
            let response = engine.date_range("2024-01-15", "2024-01-15").unwrap();
            let mut found = names(&response);
            found.sort();
            assert_eq!(found, vec!["AAPL", "Bitcoin", "MSFT"]);
            assert_eq!(response.query_type, "dateRange");
            assert_eq!(response.metrics.index, "timestamp");

            let response = engine.date_range("2024-01-16", "2024-01-17").unwrap();
            assert_eq!(response.results.len(), 3);
        }
    }

    #[test]
    fn test_date_range_accepts_full_timestamps() {
        let engine = engine(Layout::BPlusTree);
        let response = engine
            .date_range("2024-01-15 10:00:00", "2024-01-15 10:00:00")
            .unwrap();
        assert_eq!(response.results.len(), 2);
    }

    #[test]
    fn test_date_range_rejects_bad_dates() {
        let engine = engine(Layout::BTree);
        assert!(engine.date_range("15/01/2024", "2024-01-16").is_err());
        assert!(engine.date_range("2024-01-15", "tomorrow").is_err());
    }

    #[test]
    fn test_inverted_date_range_is_empty() {
        let engine = engine(Layout::BPlusTree);
        assert!(engine.date_range("2024-01-17", "2024-01-15").unwrap().results.is_empty());
    }

    #[test]
    fn test_price_range_in_key_order() {
        for layout in Layout::ALL {
            let engine = engine(layout);
            let response = engine.price_range(100.0, 400.0).unwrap();
            let prices: Vec<f64> = response.results.iter().map(|r| r.price).collect();
            assert_eq!(prices, vec![141.80, 185.92, 186.01, 390.27]);
            assert_eq!(response.metrics.index, "price");
        }
    }

    #[test]
    fn test_price_range_bounds_are_inclusive() {
        let engine = engine(Layout::BTree);
        let response = engine.price_range(185.92, 186.01).unwrap();
        assert_eq!(response.results.len(), 2);
    }

    #[test]
    fn test_results_capped() {
        let records = (0..750).map(|i| stock("2024-02-01 12:00:00", "SPY", 400.0 + i as f64 / 100.0));
        for layout in Layout::ALL {
            let engine = QueryEngine::new(IndexManager::build(layout, records.clone()));

            let response = engine.price_range(0.0, 1_000.0).unwrap();
            assert_eq!(response.results.len(), MAX_RESULTS);
            assert_eq!(response.metrics.matched, 750);
            assert!(response.metrics.truncated);

            let response = engine.ticker("SPY").unwrap();
            assert_eq!(response.results.len(), MAX_RESULTS);
            assert_eq!(response.size, 750);
        }
    }

    #[test]
    fn test_response_serialization() {
        let engine = engine(Layout::BPlusTree);
        let response = engine.ticker("MSFT").unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["queryType"], "ticker");
        assert_eq!(json["size"], 6);
        assert_eq!(json["results"][0]["symbol"], "MSFT");
        assert_eq!(json["results"][0]["type"], "STOCK");
        assert_eq!(json["metrics"]["structure"], "bplustree");
        assert_eq!(json["metrics"]["truncated"], false);
        assert!(json["metrics"]["elapsedMicros"].is_u64());
    }
}
