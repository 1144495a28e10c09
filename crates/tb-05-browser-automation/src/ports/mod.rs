//! Ports for the browser automation worker.

pub mod outbound;

pub use outbound::BrowserDriver;
