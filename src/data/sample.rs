//! Bundled sample chain for demos and tests.
//!
//! Nine AAPL straddle rows across three expirations, shipped inside the
//! binary so `run` works with no data directory. The quotes are static;
//! a live feed would come in through the quote source port instead.

use super::loader::{read_rows, LoaderError};
use super::types::ChainRow;

const SAMPLE_CHAIN_CSV: &str = include_str!("sample_chain.csv");

/// Parse the bundled sample chain.
pub fn sample_rows() -> Result<Vec<ChainRow>, LoaderError> {
    read_rows(SAMPLE_CHAIN_CSV.as_bytes())
}
