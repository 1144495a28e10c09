//! Bus-facing side of the client.

pub mod listener;

pub use listener::ReplyListener;
