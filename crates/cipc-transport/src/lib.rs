//! Protocol-agnostic IPC transport handle.
//!
//! Callers ask [`create`] for a handle of a given [`TransportKind`] and drive
//! it through the same four operations whatever the backend:
//! - TCP streams ([`StreamTransport`]) with bind/listen/accept or
//!   connect-with-backoff
//! - ZeroMQ sockets ([`QueueTransport`], behind the `queue` feature)
//!
//! Everything is blocking. Timeouts are the only cancellation mechanism.

pub mod backoff;
pub mod config;
pub mod error;
pub mod handle;
pub mod kind;
pub mod stream;
pub mod traits;

#[cfg(feature = "queue")]
pub mod queue;

pub use backoff::Backoff;
pub use config::{CurveKeys, Keepalive, Mode, QueueConfig, QueueRole, StreamConfig, TransportConfig};
pub use error::{ErrorKind, Result, TransportError};
pub use handle::{create, Handle};
pub use kind::TransportKind;
pub use stream::{Role, StreamTransport};
pub use traits::Transport;

#[cfg(feature = "queue")]
pub use queue::QueueTransport;
