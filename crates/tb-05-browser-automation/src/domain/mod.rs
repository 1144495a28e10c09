//! Domain types for the browser automation worker.

pub mod commands;

pub use commands::{BrowserCommand, DEFAULT_SCREENSHOT_FILE};
