use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::kind::TransportKind;
use crate::stream::StreamTransport;
use crate::traits::Transport;

/// A transport instance owning exactly one backend.
///
/// Drive it as `init` → `send`/`recv` any number of times → `release`.
/// `release` consumes the handle; dropping an unreleased handle releases it.
#[derive(Debug)]
pub struct Handle {
    backend: Box<dyn Transport>,
}

/// Create a handle for `kind`, or `None` when no backend implements it.
pub fn create(kind: TransportKind) -> Option<Handle> {
    let backend: Box<dyn Transport> = match kind {
        TransportKind::Stream => Box::new(StreamTransport::new()),
        #[cfg(feature = "queue")]
        TransportKind::Queue => Box::new(crate::queue::QueueTransport::new()),
        #[cfg(not(feature = "queue"))]
        TransportKind::Queue => return None,
        TransportKind::Rpc => return None,
    };
    debug!(%kind, "created transport handle");
    Some(Handle { backend })
}

impl Handle {
    /// Wrap an already constructed backend, e.g. one with custom backoff.
    pub fn from_backend(backend: Box<dyn Transport>) -> Self {
        Self { backend }
    }

    pub fn kind(&self) -> TransportKind {
        self.backend.kind()
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    /// Establish the channel. The config must match the handle's kind.
    pub fn init(&mut self, config: &TransportConfig) -> Result<()> {
        if config.kind() != self.kind() {
            return Err(TransportError::ConfigMismatch {
                expected: self.kind(),
                found: config.kind(),
            });
        }
        self.backend.init(config)
    }

    /// Send exactly `data`.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        self.backend.send(data)
    }

    /// Receive into `buf`, which is zero-terminated after the returned count.
    pub fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.backend.recv(buf)
    }

    /// Receive one message of at most `capacity - 1` bytes into a new buffer.
    pub fn recv_vec(&mut self, capacity: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| TransportError::Alloc {
                requested: capacity,
            })?;
        buf.resize(capacity, 0);

        let n = self.backend.recv(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Release the backend context and consume the handle.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.backend.release();
    }
}
