//! Position book grouped by expiration.
//!
//! The positions grid renders one collapsible group per expiration
//! with strike-sorted rows inside. Position data is static fixture
//! content for now; a fill-tracking engine would feed this from the
//! order flow instead.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::OptionSide;

/// One open position row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRow {
    /// Underlying symbol
    pub symbol: String,

    /// Instrument expiration
    pub expiration: NaiveDate,

    /// Strike price
    pub strike: Decimal,

    /// Call or put
    pub side: OptionSide,

    /// Signed contract count (negative is short)
    pub position: i64,

    /// Current market value
    pub market_value: Decimal,

    /// Average entry price
    pub avg_price: Decimal,

    /// Last traded price
    pub last: Decimal,

    /// Profit and loss for the day
    pub daily_pnl: Decimal,

    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
}

impl PositionRow {
    /// Combined greeks figure shown in the first grid column.
    pub fn aggregated_greeks(&self) -> f64 {
        self.delta + self.gamma + self.vega
    }

    /// Instrument label, e.g. "AAPL 2024-08-30 150 C".
    pub fn instrument(&self) -> String {
        format!(
            "{} {} {} {}",
            self.symbol,
            self.expiration,
            self.strike,
            self.side.as_str()
        )
    }
}

/// Positions sharing one expiration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpirationGroup {
    pub expiration: NaiveDate,
    pub rows: Vec<PositionRow>,
}

/// All open positions, grouped for the portfolio grid.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    groups: Vec<ExpirationGroup>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group rows by expiration in first-seen order, sorting each
    /// group's rows by strike.
    pub fn from_rows(rows: Vec<PositionRow>) -> Self {
        let mut groups: Vec<ExpirationGroup> = Vec::new();
        for row in rows {
            match groups.iter_mut().find(|g| g.expiration == row.expiration) {
                Some(group) => group.rows.push(row),
                None => groups.push(ExpirationGroup {
                    expiration: row.expiration,
                    rows: vec![row],
                }),
            }
        }
        for group in &mut groups {
            group.rows.sort_by_key(|r| r.strike);
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[ExpirationGroup] {
        &self.groups
    }

    /// Total daily PnL across every group.
    pub fn total_pnl(&self) -> Decimal {
        self.groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .map(|r| r.daily_pnl)
            .sum()
    }

    /// Total row count across groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Demo book with nine positions across three expirations.
    pub fn sample() -> Self {
        fn position(
            symbol: &str,
            expiration: (i32, u32, u32),
            strike: i64,
            side: OptionSide,
            position: i64,
            market_value: i64,
            avg_price: i64,
            last: i64,
            daily_pnl: i64,
            delta: f64,
            gamma: f64,
            vega: f64,
        ) -> PositionRow {
            PositionRow {
                symbol: symbol.to_string(),
                expiration: NaiveDate::from_ymd_opt(expiration.0, expiration.1, expiration.2)
                    .unwrap_or_default(),
                strike: Decimal::from(strike),
                side,
                position,
                market_value: Decimal::from(market_value),
                avg_price: Decimal::from(avg_price),
                last: Decimal::from(last),
                daily_pnl: Decimal::from(daily_pnl),
                delta,
                gamma,
                vega,
            }
        }

        let call = OptionSide::Call;
        let put = OptionSide::Put;
        Self::from_rows(vec![
            position("AAPL", (2024, 8, 30), 150, call, 10, 5000, 145, 150, 100, 0.5, 0.1, 0.2),
            position("GOOGL", (2024, 8, 30), 2500, put, 5, 3000, 2550, 2500, -50, -0.4, 0.05, 0.15),
            position("TSLA", (2024, 8, 30), 700, call, 2, 1400, 690, 700, 200, 0.7, 0.12, 0.25),
            position("MSFT", (2024, 9, 30), 300, call, 15, 4500, 290, 300, 120, 0.6, 0.08, 0.22),
            position("NFLX", (2024, 9, 30), 500, put, 7, 2100, 520, 500, -30, -0.3, 0.06, 0.18),
            position("AMZN", (2024, 9, 30), 3500, call, 3, 9000, 3450, 3500, 180, 0.65, 0.1, 0.3),
            position("FB", (2024, 10, 30), 350, call, 8, 2800, 340, 350, 90, 0.55, 0.07, 0.2),
            position("NVDA", (2024, 10, 30), 600, put, 6, 3600, 610, 600, -10, -0.45, 0.09, 0.25),
            position("BABA", (2024, 10, 30), 200, call, 4, 800, 190, 200, 250, 0.75, 0.15, 0.35),
        ])
    }
}

/// Account margin figures shown above the positions grid.
///
/// Static placeholders, like the rest of the account surface; a margin
/// engine is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginSummary {
    pub net_value: Decimal,
    pub excess_liquidity: Decimal,
    pub maintenance_margin: Decimal,
}

impl Default for MarginSummary {
    fn default() -> Self {
        Self {
            net_value: Decimal::from(100_000),
            excess_liquidity: Decimal::from(50_000),
            maintenance_margin: Decimal::from(20_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let book = PositionBook::sample();
        let expirations: Vec<_> = book.groups().iter().map(|g| g.expiration).collect();
        assert_eq!(
            expirations,
            vec![date("2024-08-30"), date("2024-09-30"), date("2024-10-30")]
        );
    }

    #[test]
    fn test_rows_sorted_by_strike_within_group() {
        let book = PositionBook::sample();
        let first = &book.groups()[0];
        let symbols: Vec<_> = first.rows.iter().map(|r| r.symbol.as_str()).collect();
        // AAPL 150, TSLA 700, GOOGL 2500
        assert_eq!(symbols, vec!["AAPL", "TSLA", "GOOGL"]);
    }

    #[test]
    fn test_aggregated_greeks() {
        let book = PositionBook::sample();
        let aapl = &book.groups()[0].rows[0];
        assert!((aapl.aggregated_greeks() - 0.8).abs() < 1e-9);
        assert_eq!(aapl.instrument(), "AAPL 2024-08-30 150 C");
    }

    #[test]
    fn test_total_pnl() {
        let book = PositionBook::sample();
        // 100 - 50 + 200 + 120 - 30 + 180 + 90 - 10 + 250
        assert_eq!(book.total_pnl(), dec!(850));
        assert_eq!(book.len(), 9);
    }

    #[test]
    fn test_empty_book() {
        let book = PositionBook::new();
        assert!(book.is_empty());
        assert_eq!(book.total_pnl(), Decimal::ZERO);
    }
}
