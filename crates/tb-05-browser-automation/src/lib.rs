//! # TB-05 Browser Automation
//!
//! Worker that drives a browser on behalf of agents, plus the typed caller.
//!
//! ```text
//!  BrowserClient ──browser_*──→ browser_tasks ──→ ServiceRuntime
//!        ▲                                             │
//!        └──────────── {success, data} ──── BrowserControlService
//!                                                      │ spawn_blocking, one at a time
//!                                              dyn BrowserDriver
//! ```
//!
//! The service answers every task with `{success, data}` or
//! `{success: false, error}`. A driver that reports `false` (navigation
//! failed, element not clicked) yields `success: false` with `data` and no
//! `error`.

pub mod client;
pub mod domain;
pub mod ports;
pub mod service;

pub use client::BrowserClient;
pub use domain::commands::BROWSER_TASK_TYPES;
pub use domain::{BrowserCommand, DEFAULT_SCREENSHOT_FILE};
pub use ports::BrowserDriver;
pub use service::{BrowserControlService, DEFAULT_SERVICE_NAME};
