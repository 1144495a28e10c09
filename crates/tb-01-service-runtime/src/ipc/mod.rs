//! Bus-facing side of the runtime.

pub mod dispatcher;

pub use dispatcher::TaskDispatcher;
