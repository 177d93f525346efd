//! Line-oriented JSON query loop.
//!
//! Every non-blank input line is one request; every request gets exactly one
//! response line, flushed before the next line is read. Failures become
//! `{"error": "..."}` responses and the loop carries on.

use crate::error::Result;
use crate::perf::PerfSnapshot;
use crate::query::{QueryEngine, QueryResponse, Request};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// One response line.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response<'a> {
    Query(QueryResponse<'a>),
    Ack { ok: bool },
    Error { error: String },
}

impl Response<'_> {
    fn error(err: impl ToString) -> Self {
        Response::Error {
            error: err.to_string(),
        }
    }
}

/// Serves queries from a [`QueryEngine`].
pub struct Server {
    engine: QueryEngine,
    perf_output: PathBuf,
}

impl Server {
    /// Creates a server. `runPerf` requests rewrite `perf_output`.
    pub fn new(engine: QueryEngine, perf_output: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            perf_output: perf_output.into(),
        }
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    /// Answers one request line.
    pub fn handle_line(&self, line: &str) -> Response<'_> {
        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "malformed request");
                return Response::error(err);
            }
        };
        debug!(query_type = request.query_type(), "handling request");

        match self.handle(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(query_type = request.query_type(), error = %err, "request failed");
                Response::error(err)
            }
        }
    }

    fn handle(&self, request: &Request) -> Result<Response<'_>> {
        let response = match request {
            Request::Ticker { ticker } => self.engine.ticker(ticker)?,
            Request::DateRange {
                start_date,
                end_date,
            } => self.engine.date_range(start_date, end_date)?,
            Request::PriceRange {
                min_price,
                max_price,
            } => self.engine.price_range(*min_price, *max_price)?,
            Request::RunPerf => {
                PerfSnapshot::measure(self.engine.manager())?.write_to(&self.perf_output)?;
                return Ok(Response::Ack { ok: true });
            }
        };
        Ok(Response::Query(response))
    }

    /// Reads requests from `input` until end of input, writing one response
    /// line per request to `output`. Returns the number of requests served.
    ///
    /// A line that is not valid UTF-8 is answered with an error response.
    /// Only I/O failures on `input` or `output` end the loop early.
    pub fn serve<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<usize> {
        let mut served = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim_end()),
                Err(err) => {
                    warn!(error = %err, "request is not valid UTF-8");
                    Response::error(err)
                }
            };
            serde_json::to_writer(&mut output, &response)?;
            output.write_all(b"\n")?;
            output.flush()?;
            served += 1;
        }
        info!(served, "input closed");
        Ok(served)
    }
}
