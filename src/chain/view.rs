//! Option chain view model.
//!
//! Derives exactly what the chain grid needs from the full row set and
//! the selection store: which expiration tabs exist for the current
//! underlying, which rows are visible at the active tab, and which
//! cells are highlighted. Highlight state is a pure function of store
//! membership; nothing is cached here, so a highlight can never
//! outlive its ticket entry.

use chrono::NaiveDate;

use crate::data::{ChainRow, OptionSide};
use crate::selection::{MembershipChange, SelectionKey, SelectionStore};

/// Highlight flags for the two sides of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowHighlight {
    pub call: bool,
    pub put: bool,
}

/// View state for the option chain grid.
///
/// Holds only the two pieces of state the grid owns: the underlying
/// being displayed and the active expiration tab index. Row data comes
/// in per call so the view keeps no copy of the chain.
#[derive(Debug, Clone)]
pub struct ChainView {
    underlying: String,
    active_tab: usize,
}

impl ChainView {
    pub fn new(underlying: &str) -> Self {
        Self {
            underlying: underlying.to_string(),
            active_tab: 0,
        }
    }

    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    /// Switch underlying. The active tab resets to the first
    /// expiration of the new symbol.
    pub fn set_underlying(&mut self, underlying: &str) {
        self.underlying = underlying.to_string();
        self.active_tab = 0;
    }

    /// Select an expiration tab by index. The index is stored as
    /// given; an out-of-range tab simply renders an empty body.
    pub fn set_tab(&mut self, index: usize) {
        self.active_tab = index;
    }

    /// Distinct expirations for the current underlying in first-seen
    /// row order. Tab indices are positions in this sequence.
    pub fn expiration_tabs(&self, rows: &[ChainRow]) -> Vec<NaiveDate> {
        first_seen_expirations(rows, &self.underlying)
    }

    /// Rows at the active tab, in row-set order.
    ///
    /// Empty when the tab index is out of range for the current
    /// underlying, which happens transiently between an underlying
    /// switch and the controller resetting the tab.
    pub fn visible_rows<'a>(&self, rows: &'a [ChainRow]) -> Vec<&'a ChainRow> {
        let tabs = self.expiration_tabs(rows);
        let expiration = match tabs.get(self.active_tab) {
            Some(e) => *e,
            None => return Vec::new(),
        };
        rows.iter()
            .filter(|r| r.symbol == self.underlying && r.expiration == expiration)
            .collect()
    }

    /// Whether one cell is highlighted: true exactly when its key is
    /// in the store.
    pub fn is_highlighted(&self, row: &ChainRow, side: OptionSide, store: &SelectionStore) -> bool {
        store.contains(SelectionKey::from_row(row, side))
    }

    /// Highlight flags for both sides of a row.
    pub fn row_highlights(&self, row: &ChainRow, store: &SelectionStore) -> RowHighlight {
        RowHighlight {
            call: self.is_highlighted(row, OptionSide::Call, store),
            put: self.is_highlighted(row, OptionSide::Put, store),
        }
    }

    /// Click path for one cell: toggles membership in the store. The
    /// highlight follows automatically since it is derived.
    pub fn toggle_cell(
        &self,
        row: &ChainRow,
        side: OptionSide,
        store: &mut SelectionStore,
    ) -> MembershipChange {
        store.toggle(SelectionKey::from_row(row, side), row)
    }
}

/// Distinct expirations for one symbol, in first-seen row order.
///
/// The order deliberately follows the row set rather than sorting;
/// tabs appear in the order the data provider listed them.
pub fn first_seen_expirations(rows: &[ChainRow], symbol: &str) -> Vec<NaiveDate> {
    let mut seen: Vec<NaiveDate> = Vec::new();
    for row in rows.iter().filter(|r| r.symbol == symbol) {
        if !seen.contains(&row.expiration) {
            seen.push(row.expiration);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SideQuote;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn row(symbol: &str, expiration: &str, strike: Decimal) -> ChainRow {
        ChainRow {
            symbol: symbol.to_string(),
            expiration: NaiveDate::parse_from_str(expiration, "%Y-%m-%d").unwrap(),
            dte: 15,
            strike,
            underlying_price: dec!(172.5),
            call: SideQuote::default(),
            put: SideQuote::default(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_tabs_in_first_seen_order() {
        // Later expiration listed first: tabs must not sort it away
        let rows = vec![
            row("AAPL", "2024-09-30", dec!(180)),
            row("AAPL", "2024-07-30", dec!(150)),
            row("AAPL", "2024-09-30", dec!(185)),
            row("AAPL", "2024-08-30", dec!(165)),
        ];
        let view = ChainView::new("AAPL");
        assert_eq!(
            view.expiration_tabs(&rows),
            vec![date("2024-09-30"), date("2024-07-30"), date("2024-08-30")]
        );
    }

    #[test]
    fn test_tabs_filter_by_underlying() {
        let rows = vec![
            row("AAPL", "2024-07-30", dec!(150)),
            row("SPX", "2024-08-15", dec!(5400)),
            row("AAPL", "2024-08-30", dec!(165)),
        ];
        let view = ChainView::new("AAPL");
        assert_eq!(
            view.expiration_tabs(&rows),
            vec![date("2024-07-30"), date("2024-08-30")]
        );

        let view = ChainView::new("SPX");
        assert_eq!(view.expiration_tabs(&rows), vec![date("2024-08-15")]);
    }

    #[test]
    fn test_visible_rows_at_active_tab() {
        let rows = vec![
            row("AAPL", "2024-07-30", dec!(150)),
            row("AAPL", "2024-07-30", dec!(155)),
            row("AAPL", "2024-08-30", dec!(165)),
        ];
        let mut view = ChainView::new("AAPL");

        let visible: Vec<_> = view.visible_rows(&rows).iter().map(|r| r.strike).collect();
        assert_eq!(visible, vec![dec!(150), dec!(155)]);

        view.set_tab(1);
        let visible: Vec<_> = view.visible_rows(&rows).iter().map(|r| r.strike).collect();
        assert_eq!(visible, vec![dec!(165)]);
    }

    #[test]
    fn test_out_of_range_tab_renders_empty() {
        let rows = vec![row("AAPL", "2024-07-30", dec!(150))];
        let mut view = ChainView::new("AAPL");
        view.set_tab(5);
        assert!(view.visible_rows(&rows).is_empty());
    }

    #[test]
    fn test_no_rows_for_unknown_underlying() {
        let rows = vec![row("AAPL", "2024-07-30", dec!(150))];
        let view = ChainView::new("GOOGL");
        assert!(view.expiration_tabs(&rows).is_empty());
        assert!(view.visible_rows(&rows).is_empty());
    }

    #[test]
    fn test_highlight_follows_store_membership() {
        let rows = vec![row("AAPL", "2024-07-30", dec!(150))];
        let view = ChainView::new("AAPL");
        let mut store = SelectionStore::new();

        assert!(!view.is_highlighted(&rows[0], OptionSide::Call, &store));

        view.toggle_cell(&rows[0], OptionSide::Call, &mut store);
        assert!(view.is_highlighted(&rows[0], OptionSide::Call, &store));
        assert!(!view.is_highlighted(&rows[0], OptionSide::Put, &store));
        assert_eq!(
            view.row_highlights(&rows[0], &store),
            RowHighlight {
                call: true,
                put: false
            }
        );

        view.toggle_cell(&rows[0], OptionSide::Call, &mut store);
        assert!(!view.is_highlighted(&rows[0], OptionSide::Call, &store));
    }

    #[test]
    fn test_switching_underlying_resets_tab() {
        let mut view = ChainView::new("AAPL");
        view.set_tab(2);
        view.set_underlying("TSLA");
        assert_eq!(view.underlying(), "TSLA");
        assert_eq!(view.active_tab(), 0);
    }
}
