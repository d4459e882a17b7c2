pub mod orders;
pub mod positions;
pub mod view;

pub use orders::{OrderBlotter, OrderRecord, OrderStatus, StatusFilter};
pub use positions::{ExpirationGroup, MarginSummary, PositionBook, PositionRow};
pub use view::{PortfolioTab, PortfolioView};
