pub mod view;

pub use view::{OrderKind, OrderTicket, TicketState, TicketView, EMPTY_TICKET_MESSAGE};
