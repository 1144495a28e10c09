//! # TB-02 Request/Reply Client
//!
//! Caller side of the correlation protocol. Embedded in every task producer.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                 RequestReplyClient                     │
//! │                                                        │
//! │  send() ──register──→ PendingRequestStore ◄──complete── ReplyListener
//! │    │                   (correlation id →   │           ▲
//! │    │                    oneshot sender)    │           │
//! │    └──publish Task──→ target task channel  │   private reply channel
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - At most one pending request per correlation id; reuse while
//!   outstanding is rejected.
//! - Exactly one resolution per correlation id: the entry is removed as it
//!   resolves, times out, or its caller goes away.
//! - Replies for unknown correlation ids are logged and dropped, never
//!   surfaced to any caller.
//! - A deadline bounds the wait only; the service may still finish and its
//!   late reply is dropped.

pub mod client;
pub mod domain;
pub mod ipc;

pub use client::{RequestReplyClient, DEFAULT_REQUEST_TIMEOUT};
pub use domain::{PendingError, PendingRequestStore, PendingStats, RequestError};
pub use ipc::ReplyListener;
