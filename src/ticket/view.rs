//! Order ticket view model.
//!
//! The ticket renders the selection store's entries as editable rows
//! and owns two fields of its own: the order kind and the limit price.
//! Submit packages everything into one batch order for the sink and
//! clears optimistically; the sink gives no acknowledgment, so there
//! is nothing to wait for. Cancel clears without placing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::{HighlightNotifier, OrderSink};
use crate::selection::{OrderAction, SelectionError, SelectionKey, SelectionStore, TicketEntry};

/// Shown in place of the rows table when nothing is selected.
pub const EMPTY_TICKET_MESSAGE: &str =
    "There are no values. You can enter one by clicking on the option chain.";

/// Market or limit execution for the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit,
}

impl OrderKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MARKET" | "MKT" => Some(Self::Market),
            "LIMIT" | "LMT" => Some(Self::Limit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "Market",
            Self::Limit => "Limit",
        }
    }
}

impl Default for OrderKind {
    fn default() -> Self {
        Self::Market
    }
}

/// Whether the ticket has rows to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    Empty,
    Populated,
}

/// A packaged batch order handed to the placement sink.
///
/// Legs are the store's entries at submit time, in insertion order.
/// The kind and limit price apply to the batch as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTicket {
    pub legs: Vec<TicketEntry>,
    pub kind: OrderKind,
    pub limit_price: Decimal,
}

/// View state for the order-entry ticket.
#[derive(Debug, Clone, Default)]
pub struct TicketView {
    kind: OrderKind,
    limit_price: Decimal,
}

impl TicketView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn limit_price(&self) -> Decimal {
        self.limit_price
    }

    pub fn set_kind(&mut self, kind: OrderKind) {
        self.kind = kind;
    }

    /// Set the batch limit price. Kept even while the kind is Market,
    /// matching a limit field that hides without losing its value.
    pub fn set_limit_price(&mut self, price: Decimal) {
        self.limit_price = price;
    }

    pub fn state(&self, store: &SelectionStore) -> TicketState {
        if store.is_empty() {
            TicketState::Empty
        } else {
            TicketState::Populated
        }
    }

    /// Submit is only available on a populated ticket.
    pub fn can_submit(&self, store: &SelectionStore) -> bool {
        !store.is_empty()
    }

    /// Quantity edit from raw field text. Non-numeric input coerces to
    /// 1, then the store applies its own floor of 1.
    pub fn edit_quantity(
        &self,
        store: &mut SelectionStore,
        key: SelectionKey,
        raw: &str,
    ) -> Result<(), SelectionError> {
        let value = raw.trim().parse::<i64>().unwrap_or(1);
        store.set_quantity(key, value)
    }

    /// Buy/sell edit for one row.
    pub fn edit_action(
        &self,
        store: &mut SelectionStore,
        key: SelectionKey,
        action: OrderAction,
    ) -> Result<(), SelectionError> {
        store.set_action(key, action)
    }

    /// Delete one row and drop its chain highlight.
    ///
    /// Deleting a key that is no longer selected is a no-op, but the
    /// unhighlight still fires so a stray highlight cannot stick.
    pub fn delete(
        &self,
        store: &mut SelectionStore,
        notifier: &mut dyn HighlightNotifier,
        key: SelectionKey,
    ) {
        store.remove(key);
        notifier.unhighlight(key);
    }

    /// Package the current rows into a batch order and place it.
    ///
    /// Returns false without placing anything when the ticket is
    /// empty. On placement the store clears, every leg's highlight
    /// drops, and the kind and limit price reset to Market and zero.
    /// The clear is not gated on any acknowledgment from the sink.
    pub fn submit(
        &mut self,
        store: &mut SelectionStore,
        sink: &mut dyn OrderSink,
        notifier: &mut dyn HighlightNotifier,
    ) -> bool {
        if store.is_empty() {
            return false;
        }

        let ticket = OrderTicket {
            legs: store.list().to_vec(),
            kind: self.kind,
            limit_price: self.limit_price,
        };
        debug!("Placing {} leg order ({})", ticket.legs.len(), self.kind.as_str());
        sink.place(ticket);

        for key in store.clear() {
            notifier.unhighlight(key);
        }
        self.kind = OrderKind::Market;
        self.limit_price = Decimal::ZERO;
        true
    }

    /// Drop every row without placing an order.
    ///
    /// Unlike submit, the kind and limit price keep their values.
    pub fn cancel(&self, store: &mut SelectionStore, notifier: &mut dyn HighlightNotifier) {
        for key in store.clear() {
            notifier.unhighlight(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChainRow, Greeks, OptionSide, SideQuote};
    use crate::ports::RecordingNotifier;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct CapturingSink {
        placed: Vec<OrderTicket>,
    }

    impl OrderSink for CapturingSink {
        fn place(&mut self, ticket: OrderTicket) {
            self.placed.push(ticket);
        }
    }

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

    #[test]
    fn test_empty_ticket_cannot_submit() {
        let mut ticket = TicketView::new();
        let mut store = SelectionStore::new();
        let mut sink = CapturingSink::default();
        let mut notifier = RecordingNotifier::new();

        assert_eq!(ticket.state(&store), TicketState::Empty);
        assert!(!ticket.can_submit(&store));
        assert!(!ticket.submit(&mut store, &mut sink, &mut notifier));
        assert!(sink.placed.is_empty());
        assert!(notifier.keys().is_empty());
    }

    #[test]
    fn test_two_leg_submit() {
        // Buy 5 calls, sell 1 put, as a single limit order
        let mut ticket = TicketView::new();
        let mut store = SelectionStore::new();
        let mut sink = CapturingSink::default();
        let mut notifier = RecordingNotifier::new();

        let call_row = row("2024-07-30", dec!(150), 0.5, -0.5);
        let put_row = row("2024-07-30", dec!(155), 0.6, -0.5);
        let call_key = SelectionKey::from_row(&call_row, OptionSide::Call);
        let put_key = SelectionKey::from_row(&put_row, OptionSide::Put);

        store.toggle(call_key, &call_row);
        store.toggle(put_key, &put_row);
        assert_eq!(ticket.state(&store), TicketState::Populated);

        ticket.edit_quantity(&mut store, call_key, "5").unwrap();
        ticket
            .edit_action(&mut store, put_key, OrderAction::Sell)
            .unwrap();
        ticket.set_kind(OrderKind::Limit);
        ticket.set_limit_price(dec!(2.35));

        assert!(ticket.submit(&mut store, &mut sink, &mut notifier));

        // One batch with both legs in insertion order
        assert_eq!(sink.placed.len(), 1);
        let placed = &sink.placed[0];
        assert_eq!(placed.kind, OrderKind::Limit);
        assert_eq!(placed.limit_price, dec!(2.35));
        assert_eq!(placed.legs.len(), 2);
        assert_eq!(placed.legs[0].key, call_key);
        assert_eq!(placed.legs[0].quantity, 5);
        assert_eq!(placed.legs[0].action, OrderAction::Buy);
        assert_eq!(placed.legs[0].greeks.delta, 0.5);
        assert_eq!(placed.legs[1].key, put_key);
        assert_eq!(placed.legs[1].quantity, 1);
        assert_eq!(placed.legs[1].action, OrderAction::Sell);
        assert_eq!(placed.legs[1].greeks.delta, -0.5);

        // Store cleared, both highlights dropped, fields reset
        assert!(store.is_empty());
        assert_eq!(notifier.keys(), &[call_key, put_key]);
        assert_eq!(ticket.kind(), OrderKind::Market);
        assert_eq!(ticket.limit_price(), Decimal::ZERO);
    }

    #[test]
    fn test_cancel_keeps_kind_and_limit() {
        let mut ticket = TicketView::new();
        let mut store = SelectionStore::new();
        let mut notifier = RecordingNotifier::new();

        let r = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = SelectionKey::from_row(&r, OptionSide::Call);
        store.toggle(key, &r);

        ticket.set_kind(OrderKind::Limit);
        ticket.set_limit_price(dec!(1.50));
        ticket.cancel(&mut store, &mut notifier);

        assert!(store.is_empty());
        assert_eq!(notifier.keys(), &[key]);
        assert_eq!(ticket.kind(), OrderKind::Limit);
        assert_eq!(ticket.limit_price(), dec!(1.50));
    }

    #[test]
    fn test_delete_removes_row_and_unhighlights() {
        let ticket = TicketView::new();
        let mut store = SelectionStore::new();
        let mut notifier = RecordingNotifier::new();

        let a = row("2024-07-30", dec!(150), 0.5, -0.5);
        let b = row("2024-07-30", dec!(155), 0.6, -0.6);
        let ka = SelectionKey::from_row(&a, OptionSide::Call);
        let kb = SelectionKey::from_row(&b, OptionSide::Put);
        store.toggle(ka, &a);
        store.toggle(kb, &b);

        ticket.delete(&mut store, &mut notifier, ka);
        assert!(!store.contains(ka));
        assert!(store.contains(kb));
        assert_eq!(notifier.keys(), &[ka]);
    }

    #[test]
    fn test_non_numeric_quantity_coerces_to_one() {
        let ticket = TicketView::new();
        let mut store = SelectionStore::new();

        let r = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = SelectionKey::from_row(&r, OptionSide::Call);
        store.toggle(key, &r);
        store.set_quantity(key, 8).unwrap();

        ticket.edit_quantity(&mut store, key, "abc").unwrap();
        assert_eq!(store.get(key).unwrap().quantity, 1);

        ticket.edit_quantity(&mut store, key, "").unwrap();
        assert_eq!(store.get(key).unwrap().quantity, 1);

        ticket.edit_quantity(&mut store, key, "-3").unwrap();
        assert_eq!(store.get(key).unwrap().quantity, 1);

        ticket.edit_quantity(&mut store, key, " 12 ").unwrap();
        assert_eq!(store.get(key).unwrap().quantity, 12);
    }

    #[test]
    fn test_submit_after_cancel_uses_kept_fields() {
        let mut ticket = TicketView::new();
        let mut store = SelectionStore::new();
        let mut sink = CapturingSink::default();
        let mut notifier = RecordingNotifier::new();

        let r = row("2024-07-30", dec!(150), 0.5, -0.5);
        let key = SelectionKey::from_row(&r, OptionSide::Call);

        store.toggle(key, &r);
        ticket.set_kind(OrderKind::Limit);
        ticket.set_limit_price(dec!(3.10));
        ticket.cancel(&mut store, &mut notifier);

        // Reselect and submit; the kept limit settings still apply
        store.toggle(key, &r);
        assert!(ticket.submit(&mut store, &mut sink, &mut notifier));
        assert_eq!(sink.placed[0].kind, OrderKind::Limit);
        assert_eq!(sink.placed[0].limit_price, dec!(3.10));
    }
}
