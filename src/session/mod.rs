pub mod config;
pub mod terminal;

pub use config::{ConfigError, TerminalConfig};
pub use terminal::{SessionError, TerminalSession};
