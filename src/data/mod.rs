pub mod loader;
pub mod sample;
pub mod types;

pub use loader::{load_rows, read_rows, underlyings, LoaderError, EXPECTED_COLUMNS};
pub use sample::sample_rows;
pub use types::{ChainRow, Greeks, OptionSide, SideQuote};
