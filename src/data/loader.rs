//! Chain loader for straddle-row CSV files.
//!
//! Loads option chain data from CSV files into the type system for the
//! terminal session. Each CSV row is one straddle row: strike-level
//! fields plus a `call_` and `put_` column group, with the following
//! schema:
//! - symbol, expiration, dte, strike, underlying_price
//! - call_bid, call_ask, call_bid_size, call_ask_size, call_volume,
//!   call_open_interest, call_iv, call_delta, call_gamma, call_theta,
//!   call_vega
//! - put_bid, put_ask, put_bid_size, put_ask_size, put_volume,
//!   put_open_interest, put_iv, put_delta, put_gamma, put_theta,
//!   put_vega

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use super::types::{ChainRow, Greeks, SideQuote};

/// Expected columns in chain CSV files.
pub const EXPECTED_COLUMNS: &[&str] = &[
    "symbol",
    "expiration",
    "dte",
    "strike",
    "underlying_price",
    "call_bid",
    "call_ask",
    "call_bid_size",
    "call_ask_size",
    "call_volume",
    "call_open_interest",
    "call_iv",
    "call_delta",
    "call_gamma",
    "call_theta",
    "call_vega",
    "put_bid",
    "put_ask",
    "put_bid_size",
    "put_ask_size",
    "put_volume",
    "put_open_interest",
    "put_iv",
    "put_delta",
    "put_gamma",
    "put_theta",
    "put_vega",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw CSV record before date and price parsing.
///
/// Price fields stay as strings so Decimal parses them exactly; a bid
/// of "1.2" must come out as 1.2, not the nearest f64.
#[derive(Debug, Deserialize)]
struct RawChainRecord {
    symbol: String,
    expiration: String,
    dte: i32,
    strike: String,
    underlying_price: String,
    call_bid: String,
    call_ask: String,
    call_bid_size: i64,
    call_ask_size: i64,
    call_volume: i64,
    call_open_interest: i64,
    call_iv: f64,
    call_delta: f64,
    call_gamma: f64,
    call_theta: f64,
    call_vega: f64,
    put_bid: String,
    put_ask: String,
    put_bid_size: i64,
    put_ask_size: i64,
    put_volume: i64,
    put_open_interest: i64,
    put_iv: f64,
    put_delta: f64,
    put_gamma: f64,
    put_theta: f64,
    put_vega: f64,
}

impl RawChainRecord {
    fn into_row(self) -> Result<ChainRow, LoaderError> {
        let expiration = parse_date("expiration", &self.expiration)?;

        Ok(ChainRow {
            symbol: self.symbol,
            expiration,
            dte: self.dte,
            strike: parse_decimal("strike", &self.strike)?,
            underlying_price: parse_decimal("underlying_price", &self.underlying_price)?,
            call: SideQuote {
                bid: parse_decimal("call_bid", &self.call_bid)?,
                ask: parse_decimal("call_ask", &self.call_ask)?,
                bid_size: self.call_bid_size,
                ask_size: self.call_ask_size,
                volume: self.call_volume,
                open_interest: self.call_open_interest,
                iv: self.call_iv,
                greeks: Greeks {
                    delta: self.call_delta,
                    gamma: self.call_gamma,
                    theta: self.call_theta,
                    vega: self.call_vega,
                },
            },
            put: SideQuote {
                bid: parse_decimal("put_bid", &self.put_bid)?,
                ask: parse_decimal("put_ask", &self.put_ask)?,
                bid_size: self.put_bid_size,
                ask_size: self.put_ask_size,
                volume: self.put_volume,
                open_interest: self.put_open_interest,
                iv: self.put_iv,
                greeks: Greeks {
                    delta: self.put_delta,
                    gamma: self.put_gamma,
                    theta: self.put_theta,
                    vega: self.put_vega,
                },
            },
        })
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, LoaderError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| LoaderError::InvalidData(format!("Invalid {}: '{}' ({})", field, value, e)))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, LoaderError> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| LoaderError::InvalidData(format!("Invalid {}: '{}' ({})", field, value, e)))
}

/// Load chain rows from a CSV file.
pub fn load_rows(path: &Path) -> Result<Vec<ChainRow>, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    read_rows(file)
}

/// Read chain rows from any CSV reader.
///
/// The header is validated against [`EXPECTED_COLUMNS`] before any row
/// parses; column order does not matter, missing columns do.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<ChainRow>, LoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for expected in EXPECTED_COLUMNS {
        if !headers.iter().any(|h| h == *expected) {
            return Err(LoaderError::InvalidData(format!(
                "Missing column: {}",
                expected
            )));
        }
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<RawChainRecord>() {
        rows.push(record?.into_row()?);
    }
    Ok(rows)
}

/// Distinct underlying symbols present in a row set, sorted.
pub fn underlyings(rows: &[ChainRow]) -> Vec<String> {
    let mut symbols: Vec<_> = rows.iter().map(|r| r.symbol.clone()).collect();
    symbols.sort();
    symbols.dedup();
    symbols
}
