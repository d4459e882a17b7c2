//! Collaborator contracts at the edge of the terminal core.
//!
//! The session core depends on, but does not implement, three
//! collaborators:
//!
//! 1. [`QuoteSource`] hands over already-fetched chain rows; fetching,
//!    caching, and transport live behind it
//! 2. [`OrderSink`] accepts packaged batch orders fire-and-forget;
//!    fills, rejects, and matching are not the core's concern
//! 3. [`HighlightNotifier`] hears about every key whose highlight must
//!    drop outside the chain's own click cycle
//!
//! Everything is synchronous. The core runs single-threaded and every
//! callback completes before the triggering operation returns.

use crate::data::ChainRow;
use crate::selection::SelectionKey;
use crate::ticket::OrderTicket;

/// Provider of the session's full, unfiltered row set.
pub trait QuoteSource {
    fn rows(&self) -> &[ChainRow];
}

/// Accepts packaged orders; no response surfaces back to the core.
pub trait OrderSink {
    fn place(&mut self, ticket: OrderTicket);
}

/// Receives one callback per key removed from the selection store by a
/// path other than a chain click.
pub trait HighlightNotifier {
    fn unhighlight(&mut self, key: SelectionKey);
}

/// Quote source over a pre-loaded row set.
#[derive(Debug, Clone, Default)]
pub struct FixtureQuoteSource {
    rows: Vec<ChainRow>,
}

impl FixtureQuoteSource {
    pub fn new(rows: Vec<ChainRow>) -> Self {
        Self { rows }
    }
}

impl QuoteSource for FixtureQuoteSource {
    fn rows(&self) -> &[ChainRow] {
        &self.rows
    }
}

/// Notifier that drops every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl HighlightNotifier for NoopNotifier {
    fn unhighlight(&mut self, _key: SelectionKey) {}
}

/// Notifier that records callbacks in arrival order.
///
/// Used by tests to assert exactly which keys were unhighlighted, and
/// by the interactive shell to echo highlight changes.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    keys: Vec<SelectionKey>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[SelectionKey] {
        &self.keys
    }

    /// Drain recorded keys, leaving the notifier empty.
    pub fn take(&mut self) -> Vec<SelectionKey> {
        std::mem::take(&mut self.keys)
    }
}

impl HighlightNotifier for RecordingNotifier {
    fn unhighlight(&mut self, key: SelectionKey) {
        self.keys.push(key);
    }
}
