pub mod view;

pub use view::{first_seen_expirations, ChainView, RowHighlight};
