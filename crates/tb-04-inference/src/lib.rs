//! # TB-04 Inference
//!
//! Worker that turns prompts into model output, plus the typed caller used
//! by agents.
//!
//! ```text
//!  InferenceClient ──analyze_content──→ llm_tasks ──→ ServiceRuntime
//!         ▲                                                │
//!         └────────────── {success, result} ───── InferenceService
//!                                                          │
//!                                               dyn InferenceProvider
//! ```
//!
//! ## Failure Replies
//!
//! | Condition | `error` |
//! |-----------|---------|
//! | no provider configured | `Inference provider not configured for <service>` |
//! | `content` missing or empty | `No content provided for analysis in task payload` |
//! | provider error | `Error during inference: <error>` |
//! | other task type | `Unsupported task type for <service>: <type>` |

pub mod client;
pub mod domain;
pub mod ports;
pub mod service;

pub use client::InferenceClient;
pub use domain::{InferenceRequest, ANALYZE_CONTENT};
pub use ports::InferenceProvider;
pub use service::{InferenceService, DEFAULT_SERVICE_NAME};
