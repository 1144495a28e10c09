//! Ports for the service runtime.

pub mod inbound;

pub use inbound::TaskService;
