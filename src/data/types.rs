//! Core data types for the terminal's option chain.
//!
//! The chain is stored as straddle-style rows: one row per
//! (symbol, expiration, strike) carrying both the call and put quote.
//! That matches how the chain grid displays data, with calls on the
//! left of the strike column and puts on the right.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option side (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "C",
            Self::Put => "P",
        }
    }
}

/// Greeks for one side of a row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

/// Quote fields for one side (call or put) of a chain row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideQuote {
    /// Bid price
    pub bid: Decimal,

    /// Ask price
    pub ask: Decimal,

    /// Bid size (contracts)
    pub bid_size: i64,

    /// Ask size (contracts)
    pub ask_size: i64,

    /// Trading volume
    pub volume: i64,

    /// Open interest
    pub open_interest: i64,

    /// Mid implied volatility
    pub iv: f64,

    /// Greeks
    pub greeks: Greeks,
}

impl SideQuote {
    /// Mid price between bid and ask.
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }
}

/// One straddle row of the option chain.
///
/// This is the unit the chain grid renders and the unit a click
/// resolves against. Selection identity is (expiration, strike, side),
/// so a row yields at most two selectable cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRow {
    /// Underlying symbol (e.g., "AAPL")
    pub symbol: String,

    /// Option expiration date
    pub expiration: NaiveDate,

    /// Days to expiration
    pub dte: i32,

    /// Strike price
    pub strike: Decimal,

    /// Underlying price at quote time
    pub underlying_price: Decimal,

    /// Call side of the row
    pub call: SideQuote,

    /// Put side of the row
    pub put: SideQuote,
}

impl ChainRow {
    /// Get the quote for one side of the row.
    pub fn side(&self, side: OptionSide) -> &SideQuote {
        match side {
            OptionSide::Call => &self.call,
            OptionSide::Put => &self.put,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_option_side_parsing() {
        assert_eq!(OptionSide::from_str("C"), Some(OptionSide::Call));
        assert_eq!(OptionSide::from_str("P"), Some(OptionSide::Put));
        assert_eq!(OptionSide::from_str("call"), Some(OptionSide::Call));
        assert_eq!(OptionSide::from_str("PUT"), Some(OptionSide::Put));
        assert_eq!(OptionSide::from_str("X"), None);
    }

    #[test]
    fn test_mid_price() {
        let quote = SideQuote {
            bid: dec!(1.2),
            ask: dec!(1.3),
            ..Default::default()
        };
        assert_eq!(quote.mid(), dec!(1.25));
    }

    #[test]
    fn test_side_lookup() {
        let row = ChainRow {
            symbol: "AAPL".to_string(),
            expiration: NaiveDate::from_ymd_opt(2024, 7, 30).unwrap(),
            dte: 15,
            strike: dec!(150),
            underlying_price: dec!(172.5),
            call: SideQuote {
                bid: dec!(1.2),
                ..Default::default()
            },
            put: SideQuote {
                bid: dec!(1.1),
                ..Default::default()
            },
        };
        assert_eq!(row.side(OptionSide::Call).bid, dec!(1.2));
        assert_eq!(row.side(OptionSide::Put).bid, dec!(1.1));
    }
}
