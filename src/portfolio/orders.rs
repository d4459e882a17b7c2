//! Order blotter: the in-memory order sink backing the Orders tab.
//!
//! Each placed batch unpacks into one record per leg. Records enter as
//! Pending and stay there; matching and fills belong to a simulation
//! engine behind the sink, not to the terminal core.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::OptionSide;
use crate::ports::OrderSink;
use crate::selection::OrderAction;
use crate::ticket::{OrderKind, OrderTicket};

/// Lifecycle of a recorded order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Filled,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Filled => "Filled",
            Self::Canceled => "Canceled",
        }
    }
}

/// Orders-tab status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Pending,
    Filled,
    Canceled,
}

impl StatusFilter {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Self::All),
            "pending" => Some(Self::Pending),
            "filled" => Some(Self::Filled),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub fn matches(&self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == OrderStatus::Pending,
            Self::Filled => status == OrderStatus::Filled,
            Self::Canceled => status == OrderStatus::Canceled,
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::All
    }
}

/// One recorded order leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub symbol: String,
    pub expiration: NaiveDate,
    pub strike: Decimal,
    pub side: OptionSide,
    pub action: OrderAction,
    pub quantity: u32,
    pub kind: OrderKind,

    /// Zero for market orders
    pub limit_price: Decimal,

    pub status: OrderStatus,
}

impl OrderRecord {
    /// Instrument label, e.g. "AAPL 2024-07-30 150 C".
    pub fn instrument(&self) -> String {
        format!(
            "{} {} {} {}",
            self.symbol, self.expiration, self.strike, self.side.as_str()
        )
    }
}

/// Records every placed ticket, one row per leg, in placement order.
#[derive(Debug, Clone, Default)]
pub struct OrderBlotter {
    records: Vec<OrderRecord>,
}

impl OrderBlotter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn with_status(&self, filter: StatusFilter) -> Vec<&OrderRecord> {
        self.records
            .iter()
            .filter(|r| filter.matches(r.status))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl OrderSink for OrderBlotter {
    fn place(&mut self, ticket: OrderTicket) {
        info!(
            "Order placed: {} legs, {}",
            ticket.legs.len(),
            ticket.kind.as_str()
        );
        let limit_price = match ticket.kind {
            OrderKind::Limit => ticket.limit_price,
            OrderKind::Market => Decimal::ZERO,
        };
        for leg in ticket.legs {
            self.records.push(OrderRecord {
                symbol: leg.symbol,
                expiration: leg.key.expiration,
                strike: leg.key.strike,
                side: leg.key.side,
                action: leg.action,
                quantity: leg.quantity,
                kind: ticket.kind,
                limit_price,
                status: OrderStatus::Pending,
            });
        }
    }
}
