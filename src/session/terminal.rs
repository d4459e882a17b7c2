//! Terminal session: the controller that owns the selection store.
//!
//! One session exists per simulation run. It owns the chain rows, the
//! store, both view states, and the playback panel, and every user
//! event flows through a method here:
//!
//! 1. Chain events: underlying picks, tab picks, cell clicks
//! 2. Ticket events: quantity/action edits, delete, kind and limit
//!    price, submit, cancel
//! 3. Simulation signals: reset, restart, finish, speed changes
//!
//! Everything is synchronous and single-threaded; each method returns
//! only after the store, views, and collaborator callbacks are fully
//! settled, so views never observe a half-applied transition.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chain::{ChainView, RowHighlight};
use crate::data::{ChainRow, OptionSide};
use crate::playback::PlaybackControls;
use crate::ports::{HighlightNotifier, OrderSink, QuoteSource};
use crate::selection::{
    MembershipChange, OrderAction, SelectionError, SelectionKey, SelectionStore, TicketEntry,
};
use crate::ticket::{OrderKind, TicketState, TicketView};

use super::config::TerminalConfig;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("No chain row for {symbol} {expiration} strike {strike}")]
    RowNotFound {
        symbol: String,
        expiration: NaiveDate,
        strike: Decimal,
    },
}

/// The simulated trading terminal for one run.
pub struct TerminalSession {
    config: TerminalConfig,
    rows: Vec<ChainRow>,
    store: SelectionStore,
    chain: ChainView,
    ticket: TicketView,
    playback: PlaybackControls,
    reset_generation: u64,
}

impl TerminalSession {
    /// Build a session from config and an already-fetched quote
    /// source. The chain starts on the configured default underlying
    /// with its first expiration tab active.
    pub fn new(config: TerminalConfig, source: &dyn QuoteSource) -> Self {
        let chain = ChainView::new(&config.default_symbol);
        let playback = PlaybackControls::with_speed(config.playback_speed);
        Self {
            rows: source.rows().to_vec(),
            chain,
            playback,
            config,
            store: SelectionStore::new(),
            ticket: TicketView::new(),
            reset_generation: 0,
        }
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn rows(&self) -> &[ChainRow] {
        &self.rows
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn chain(&self) -> &ChainView {
        &self.chain
    }

    pub fn ticket(&self) -> &TicketView {
        &self.ticket
    }

    pub fn playback(&self) -> &PlaybackControls {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackControls {
        &mut self.playback
    }

    /// Counter of simulation resets seen by this session. Bumps once
    /// per reset; downstream caches key their validity to this.
    pub fn reset_generation(&self) -> u64 {
        self.reset_generation
    }

    // === Chain ===

    pub fn expiration_tabs(&self) -> Vec<NaiveDate> {
        self.chain.expiration_tabs(&self.rows)
    }

    pub fn visible_rows(&self) -> Vec<&ChainRow> {
        self.chain.visible_rows(&self.rows)
    }

    pub fn row_highlights(&self, row: &ChainRow) -> RowHighlight {
        self.chain.row_highlights(row, &self.store)
    }

    /// Switch the displayed underlying.
    ///
    /// The tab resets to the first expiration, every selection drops,
    /// and each dropped key is unhighlighted through the notifier.
    /// This runs unconditionally, so re-picking the current underlying
    /// also wipes the ticket.
    pub fn select_underlying(&mut self, symbol: &str, notifier: &mut dyn HighlightNotifier) {
        info!("Underlying -> {}", symbol);
        self.chain.set_underlying(symbol);
        for key in self.store.clear() {
            notifier.unhighlight(key);
        }
    }

    /// Switch the active expiration tab. The index is taken as given;
    /// callers pass positions from [`Self::expiration_tabs`], and an
    /// out-of-range index renders an empty chain body.
    pub fn select_tab(&mut self, index: usize) {
        self.chain.set_tab(index);
    }

    /// Click on one cell of the chain grid.
    ///
    /// Resolves the row for the current underlying and toggles the
    /// cell's membership. A toggle that removes does not go through
    /// the notifier; the highlight is derived from membership and
    /// drops by itself.
    pub fn click_cell(
        &mut self,
        expiration: NaiveDate,
        strike: Decimal,
        side: OptionSide,
    ) -> Result<MembershipChange, SessionError> {
        let underlying = self.chain.underlying();
        let row = self
            .rows
            .iter()
            .find(|r| r.symbol == underlying && r.expiration == expiration && r.strike == strike);
        let row = match row {
            Some(r) => r,
            None => {
                warn!(
                    "Click on missing row {} {} {}",
                    underlying, expiration, strike
                );
                return Err(SessionError::RowNotFound {
                    symbol: underlying.to_string(),
                    expiration,
                    strike,
                });
            }
        };

        let key = SelectionKey::new(expiration, strike, side);
        let change = self.store.toggle(key, row);
        debug!("{:?} {}", change, key);
        Ok(change)
    }

    // === Ticket ===

    pub fn ticket_rows(&self) -> &[TicketEntry] {
        self.store.list()
    }

    pub fn ticket_state(&self) -> TicketState {
        self.ticket.state(&self.store)
    }

    pub fn set_quantity(&mut self, key: SelectionKey, value: i64) -> Result<(), SessionError> {
        Ok(self.store.set_quantity(key, value)?)
    }

    /// Quantity edit from raw ticket field text.
    pub fn edit_quantity(&mut self, key: SelectionKey, raw: &str) -> Result<(), SessionError> {
        Ok(self.ticket.edit_quantity(&mut self.store, key, raw)?)
    }

    pub fn set_action(&mut self, key: SelectionKey, action: OrderAction) -> Result<(), SessionError> {
        Ok(self.ticket.edit_action(&mut self.store, key, action)?)
    }

    pub fn delete_leg(&mut self, key: SelectionKey, notifier: &mut dyn HighlightNotifier) {
        self.ticket.delete(&mut self.store, notifier, key);
    }

    pub fn set_order_kind(&mut self, kind: OrderKind) {
        self.ticket.set_kind(kind);
    }

    pub fn set_limit_price(&mut self, price: Decimal) {
        self.ticket.set_limit_price(price);
    }

    /// Submit the ticket as one batch order. Returns false when the
    /// ticket is empty.
    pub fn submit(
        &mut self,
        sink: &mut dyn OrderSink,
        notifier: &mut dyn HighlightNotifier,
    ) -> bool {
        self.ticket.submit(&mut self.store, sink, notifier)
    }

    /// Drop the whole ticket without placing an order.
    pub fn cancel(&mut self, notifier: &mut dyn HighlightNotifier) {
        self.ticket.cancel(&mut self.store, notifier);
    }

    // === Simulation signals ===

    /// Simulation reset: market state is rebuilding, so selections
    /// drop wholesale.
    ///
    /// No per-key unhighlight fires here. Views rebuild from scratch
    /// against the bumped generation, and per-key callbacks into
    /// subscribers that are themselves resetting would be wasted work.
    /// Underlying and tab are left as they are.
    pub fn reset(&mut self) {
        let dropped = self.store.clear();
        self.reset_generation += 1;
        info!(
            "Simulation reset: dropped {} selections, generation {}",
            dropped.len(),
            self.reset_generation
        );
    }

    /// Restart from the playback panel: rewind the transport and reset
    /// the session.
    pub fn restart_simulation(&mut self) {
        self.playback.restart();
        self.reset();
    }

    /// Finish from the playback panel: the transport pins to the end.
    /// Selections stay; the run is over but the terminal still shows
    /// its final state.
    pub fn finish_simulation(&mut self) {
        self.playback.finish();
    }

    /// Change playback speed, persisting the new value into the
    /// session config.
    pub fn set_playback_speed(&mut self, speed: u32) {
        self.playback.set_speed(speed);
        self.config.playback_speed = self.playback.speed();
    }
}
