pub mod key;
pub mod store;

pub use key::SelectionKey;
pub use store::{
    MembershipChange, OrderAction, SelectionError, SelectionStore, TicketEntry,
};
