//! Selection identity for chain cells.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::{ChainRow, OptionSide};

/// Identity of one selectable chain cell.
///
/// Two clicks on the same (expiration, strike, side) refer to the same
/// leg no matter which view produced them; this is the join key between
/// chain highlights and ticket rows. The underlying symbol is not part
/// of the key because selections never survive an underlying switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub expiration: NaiveDate,
    pub strike: Decimal,
    pub side: OptionSide,
}

impl SelectionKey {
    pub fn new(expiration: NaiveDate, strike: Decimal, side: OptionSide) -> Self {
        Self {
            expiration,
            strike,
            side,
        }
    }

    /// Key for one side of a chain row.
    pub fn from_row(row: &ChainRow, side: OptionSide) -> Self {
        Self::new(row.expiration, row.strike, side)
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.expiration, self.strike, self.side.as_str())
    }
}
