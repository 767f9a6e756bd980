use crate::config::TransportConfig;
use crate::error::Result;
use crate::kind::TransportKind;

/// The four-operation contract every backend implements.
///
/// A backend starts without a context. `init` acquires it, `send` and `recv`
/// use it, `release` destroys it. Every failure inside `init` releases what
/// that call acquired before returning, so a failed backend holds nothing.
pub trait Transport: Send + std::fmt::Debug {
    /// Which kind of transport this backend implements.
    fn kind(&self) -> TransportKind;

    /// Whether a live context is held.
    fn is_initialized(&self) -> bool;

    /// Establish the channel described by `config`.
    fn init(&mut self, config: &TransportConfig) -> Result<()>;

    /// Transmit exactly `data`.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive into `buf[..buf.len() - 1]`, terminate with a zero byte, and
    /// return the number of data bytes stored.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Destroy the context, if any. Never fails observably.
    fn release(&mut self);
}
