//! Selection store: the single source of truth for selected legs.
//!
//! Chain highlights and ticket rows are both derived from membership in
//! this one store, so they can never disagree. All mutation goes
//! through the operations here:
//!
//! 1. `toggle` flips membership for a cell (the chain click path)
//! 2. `set_quantity` / `set_action` edit an existing entry
//! 3. `remove` drops one entry, `clear` drops them all
//!
//! Entries keep insertion order, which is the order ticket rows render
//! in and the order batch orders list their legs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::data::{ChainRow, Greeks};

use super::key::SelectionKey;

/// Buy or sell a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "B" | "BUY" => Some(Self::Buy),
            "S" | "SELL" => Some(Self::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

impl Default for OrderAction {
    fn default() -> Self {
        Self::Buy
    }
}

/// Membership outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Added,
    Removed,
}

/// One selected leg with its editable order attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEntry {
    /// Identity of the selected cell
    pub key: SelectionKey,

    /// Underlying symbol, carried from the source row
    pub symbol: String,

    /// Contract count, always at least 1
    pub quantity: u32,

    /// Buy or sell
    pub action: OrderAction,

    /// Greeks captured from the source row at selection time
    pub greeks: Greeks,
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("No ticket entry for {0}")]
    NotFound(SelectionKey),
}

/// Insertion-ordered set of ticket entries, unique per selection key.
///
/// The revision counter bumps on every state change; views that cache
/// derived data can compare revisions instead of diffing entries.
#[derive(Debug, Default)]
pub struct SelectionStore {
    entries: Vec<TicketEntry>,
    revision: u64,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership for a cell.
    ///
    /// A cell not in the store enters with quantity 1, action Buy, and
    /// the greeks of the clicked side. A cell already in the store
    /// leaves, discarding any edits; toggling twice restores the state
    /// before the first toggle.
    pub fn toggle(&mut self, key: SelectionKey, row: &ChainRow) -> MembershipChange {
        self.revision += 1;
        match self.position(key) {
            Some(idx) => {
                self.entries.remove(idx);
                MembershipChange::Removed
            }
            None => {
                self.entries.push(TicketEntry {
                    key,
                    symbol: row.symbol.clone(),
                    quantity: 1,
                    action: OrderAction::Buy,
                    greeks: row.side(key.side).greeks.clone(),
                });
                MembershipChange::Added
            }
        }
    }

    /// Set the contract count for an existing entry.
    ///
    /// Values below 1 clamp to 1; a quantity of zero has no meaning on
    /// a ticket. Editing a key that is not selected is a caller bug and
    /// comes back as `NotFound`.
    pub fn set_quantity(&mut self, key: SelectionKey, value: i64) -> Result<(), SelectionError> {
        let entry = self.entry_mut(key)?;
        entry.quantity = u32::try_from(value.max(1)).unwrap_or(u32::MAX);
        self.revision += 1;
        Ok(())
    }

    /// Set buy/sell for an existing entry.
    pub fn set_action(&mut self, key: SelectionKey, action: OrderAction) -> Result<(), SelectionError> {
        let entry = self.entry_mut(key)?;
        entry.action = action;
        self.revision += 1;
        Ok(())
    }

    /// Remove one entry if present.
    ///
    /// Removing an absent key is a no-op, not an error; delete paths
    /// may race with a toggle that already dropped the entry.
    pub fn remove(&mut self, key: SelectionKey) -> Option<TicketEntry> {
        match self.position(key) {
            Some(idx) => {
                self.revision += 1;
                Some(self.entries.remove(idx))
            }
            None => None,
        }
    }

    /// Drop every entry, returning the removed keys in insertion order.
    ///
    /// Callers that own highlight state use the returned keys to fan
    /// out unhighlight notifications.
    pub fn clear(&mut self) -> Vec<SelectionKey> {
        if !self.entries.is_empty() {
            self.revision += 1;
        }
        self.entries.drain(..).map(|e| e.key).collect()
    }

    /// All entries in insertion order.
    pub fn list(&self) -> &[TicketEntry] {
        &self.entries
    }

    pub fn get(&self, key: SelectionKey) -> Option<&TicketEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: SelectionKey) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Monotonic change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn position(&self, key: SelectionKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    fn entry_mut(&mut self, key: SelectionKey) -> Result<&mut TicketEntry, SelectionError> {
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => Ok(entry),
            None => {
                warn!("Edit on unselected key {}", key);
                Err(SelectionError::NotFound(key))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChainRow, OptionSide, SideQuote};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn row(expiration: &str, strike: Decimal, call_delta: f64, put_delta: f64) -> ChainRow {
        ChainRow {
            symbol: "AAPL".to_string(),
            expiration: NaiveDate::parse_from_str(expiration, "%Y-%m-%d").unwrap(),
            dte: 15,
            strike,
            underlying_price: dec!(172.5),
            call: SideQuote {
                greeks: Greeks {
                    delta: call_delta,
                    ..Default::default()
                },
                ..Default::default()
            },
            put: SideQuote {
                greeks: Greeks {
                    delta: put_delta,
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    fn key_for(row: &ChainRow, side: OptionSide) -> SelectionKey {
        SelectionKey::from_row(row, side)
    }

    #[test]
    fn test_toggle_adds_with_defaults() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Call);

        assert_eq!(store.toggle(key, &row), MembershipChange::Added);
        let entry = store.get(key).unwrap();
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.action, OrderAction::Buy);
        assert_eq!(entry.symbol, "AAPL");
        assert_eq!(entry.greeks.delta, 0.5);
    }

    #[test]
    fn test_toggle_captures_clicked_side() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Put);

        store.toggle(key, &row);
        assert_eq!(store.get(key).unwrap().greeks.delta, -0.5);
    }

    #[test]
    fn test_toggle_twice_returns_to_prior_state() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Call);

        assert_eq!(store.toggle(key, &row), MembershipChange::Added);
        assert_eq!(store.toggle(key, &row), MembershipChange::Removed);
        assert!(store.is_empty());
        assert!(!store.contains(key));
    }

    #[test]
    fn test_no_duplicate_keys() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let call = key_for(&row, OptionSide::Call);
        let put = key_for(&row, OptionSide::Put);

        store.toggle(call, &row);
        store.toggle(put, &row);
        assert_eq!(store.len(), 2);

        // Toggling an existing key removes it rather than duplicating
        store.toggle(call, &row);
        assert_eq!(store.len(), 1);
        assert!(store.contains(put));
    }

    #[test]
    fn test_quantity_floor() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Call);
        store.toggle(key, &row);

        store.set_quantity(key, 0).unwrap();
        assert_eq!(store.get(key).unwrap().quantity, 1);

        store.set_quantity(key, -5).unwrap();
        assert_eq!(store.get(key).unwrap().quantity, 1);

        store.set_quantity(key, 7).unwrap();
        assert_eq!(store.get(key).unwrap().quantity, 7);
    }

    #[test]
    fn test_edit_missing_key_is_not_found() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Call);

        assert!(matches!(
            store.set_quantity(key, 5),
            Err(SelectionError::NotFound(_))
        ));
        assert!(matches!(
            store.set_action(key, OrderAction::Sell),
            Err(SelectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Call);
        store.toggle(key, &row);

        assert!(store.remove(key).is_some());
        assert!(store.remove(key).is_none());
        assert!(store.remove(key).is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = SelectionStore::new();
        let a = row("2024-07-30", dec!(150), 0.5, -0.5);
        let b = row("2024-07-30", dec!(155), 0.6, -0.6);
        let c = row("2024-08-30", dec!(165), 0.4, -0.4);

        store.toggle(key_for(&a, OptionSide::Call), &a);
        store.toggle(key_for(&b, OptionSide::Put), &b);
        store.toggle(key_for(&c, OptionSide::Call), &c);

        let strikes: Vec<_> = store.list().iter().map(|e| e.key.strike).collect();
        assert_eq!(strikes, vec![dec!(150), dec!(155), dec!(165)]);

        // Removing the middle entry keeps the rest in order
        store.remove(key_for(&b, OptionSide::Put));
        let strikes: Vec<_> = store.list().iter().map(|e| e.key.strike).collect();
        assert_eq!(strikes, vec![dec!(150), dec!(165)]);
    }

    #[test]
    fn test_clear_returns_keys_in_insertion_order() {
        let mut store = SelectionStore::new();
        let a = row("2024-07-30", dec!(150), 0.5, -0.5);
        let b = row("2024-08-30", dec!(165), 0.4, -0.4);
        let ka = key_for(&a, OptionSide::Call);
        let kb = key_for(&b, OptionSide::Put);

        store.toggle(ka, &a);
        store.toggle(kb, &b);

        assert_eq!(store.clear(), vec![ka, kb]);
        assert!(store.is_empty());
        assert_eq!(store.clear(), vec![]);
    }

    #[test]
    fn test_edits_discarded_on_reselect() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Call);

        store.toggle(key, &row);
        store.set_quantity(key, 9).unwrap();
        store.set_action(key, OrderAction::Sell).unwrap();

        store.toggle(key, &row);
        store.toggle(key, &row);
        let entry = store.get(key).unwrap();
        assert_eq!(entry.quantity, 1);
        assert_eq!(entry.action, OrderAction::Buy);
    }

    #[test]
    fn test_revision_bumps_on_change() {
        let mut store = SelectionStore::new();
        let row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = key_for(&row, OptionSide::Call);

        let r0 = store.revision();
        store.toggle(key, &row);
        let r1 = store.revision();
        assert!(r1 > r0);

        store.set_quantity(key, 3).unwrap();
        assert!(store.revision() > r1);

        // A no-op clear on an empty store does not bump
        store.clear();
        let r2 = store.revision();
        store.clear();
        assert_eq!(store.revision(), r2);
    }
}
