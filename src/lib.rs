pub mod chain;
pub mod data;
pub mod playback;
pub mod portfolio;
pub mod ports;
pub mod selection;
pub mod session;
pub mod ticket;

// Re-export commonly used types
pub use chain::{ChainView, RowHighlight};
pub use data::{ChainRow, Greeks, LoaderError, OptionSide, SideQuote};
pub use selection::{MembershipChange, OrderAction, SelectionError, SelectionKey, SelectionStore, TicketEntry};
pub use ticket::{OrderKind, OrderTicket, TicketState, TicketView, EMPTY_TICKET_MESSAGE};
pub use session::{SessionError, TerminalConfig, TerminalSession};
pub use ports::{FixtureQuoteSource, HighlightNotifier, NoopNotifier, OrderSink, QuoteSource, RecordingNotifier};
pub use playback::{PlaybackControls, PlaybackState};
pub use portfolio::{MarginSummary, OrderBlotter, OrderRecord, OrderStatus, PortfolioTab, PortfolioView, PositionBook, PositionRow, StatusFilter};
