//! Protocol-agnostic interprocess messaging.
//!
//! One [`transport::Handle`] type covers every backend: ask
//! [`transport::create`] for a kind, `init` it with a matching config, then
//! `send`/`recv` until you `release` it.
//!
//! # Crate Structure
//!
//! - [`transport`]: the handle, its configs and the error taxonomy
//! - `queue` feature (default): the ZeroMQ backend

/// Re-export transport types.
pub mod transport {
    pub use cipc_transport::*;
}

pub use cipc_transport::{create, ErrorKind, Handle, TransportConfig, TransportError, TransportKind};
