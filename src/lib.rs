//! Graceful draining for network servers.
//!
//! Hand a server implementing [`Shutdown`] to [`start_drain`] (or
//! [`start_drain_cancelable`]) and wait on the returned [`Drained`] handle:
//! it resolves once a termination signal arrived and the server finished
//! shutting down.

pub mod drain;
pub mod server;
pub mod shutdown;
pub mod signal;

pub use drain::{start_drain, start_drain_cancelable, DrainCoordinator, Drained, Phase, Trigger};
pub use server::HttpServer;
pub use shutdown::Shutdown;
pub use signal::{Signal, Signals};
