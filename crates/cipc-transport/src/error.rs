use std::fmt;
use std::net::SocketAddr;

use crate::kind::TransportKind;

/// Closed set of outcome kinds shared by every backend.
///
/// The integer codes follow the order of the C `cipc_err` enumeration, with
/// `0` reserved for success on the C surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Alloc,
    QueueContext,
    QueueSocket,
    QueueBind,
    QueueConnect,
    QueueSend,
    QueueRecv,
    StreamSocket,
    StreamBind,
    StreamListen,
    StreamAddress,
    StreamConnect,
    StreamSend,
    StreamRecv,
    StreamOption,
    NullArgument,
    QueueOption,
    InvalidConfig,
    AlreadyInitialized,
}

impl ErrorKind {
    /// Stable integer code for this kind.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::Alloc => 1,
            ErrorKind::QueueContext => 2,
            ErrorKind::QueueSocket => 3,
            ErrorKind::QueueBind => 4,
            ErrorKind::QueueConnect => 5,
            ErrorKind::QueueSend => 6,
            ErrorKind::QueueRecv => 7,
            ErrorKind::StreamSocket => 8,
            ErrorKind::StreamBind => 9,
            ErrorKind::StreamListen => 10,
            ErrorKind::StreamAddress => 11,
            ErrorKind::StreamConnect => 12,
            ErrorKind::StreamSend => 13,
            ErrorKind::StreamRecv => 14,
            ErrorKind::StreamOption => 15,
            ErrorKind::NullArgument => 16,
            ErrorKind::QueueOption => 17,
            ErrorKind::InvalidConfig => 18,
            ErrorKind::AlreadyInitialized => 19,
        }
    }

    /// The backend this kind belongs to, if it is backend-specific.
    pub fn backend(self) -> Option<TransportKind> {
        match self {
            ErrorKind::QueueContext
            | ErrorKind::QueueSocket
            | ErrorKind::QueueBind
            | ErrorKind::QueueConnect
            | ErrorKind::QueueSend
            | ErrorKind::QueueRecv
            | ErrorKind::QueueOption => Some(TransportKind::Queue),
            ErrorKind::StreamSocket
            | ErrorKind::StreamBind
            | ErrorKind::StreamListen
            | ErrorKind::StreamAddress
            | ErrorKind::StreamConnect
            | ErrorKind::StreamSend
            | ErrorKind::StreamRecv
            | ErrorKind::StreamOption => Some(TransportKind::Stream),
            ErrorKind::Alloc
            | ErrorKind::NullArgument
            | ErrorKind::InvalidConfig
            | ErrorKind::AlreadyInitialized => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Alloc => "allocation failure",
            ErrorKind::QueueContext => "queue context",
            ErrorKind::QueueSocket => "queue socket",
            ErrorKind::QueueBind => "queue bind",
            ErrorKind::QueueConnect => "queue connect",
            ErrorKind::QueueSend => "queue send",
            ErrorKind::QueueRecv => "queue receive",
            ErrorKind::StreamSocket => "stream socket",
            ErrorKind::StreamBind => "stream bind",
            ErrorKind::StreamListen => "stream listen",
            ErrorKind::StreamAddress => "stream address",
            ErrorKind::StreamConnect => "stream connect",
            ErrorKind::StreamSend => "stream send",
            ErrorKind::StreamRecv => "stream receive",
            ErrorKind::StreamOption => "stream socket option",
            ErrorKind::NullArgument => "null argument",
            ErrorKind::QueueOption => "queue socket option",
            ErrorKind::InvalidConfig => "invalid config",
            ErrorKind::AlreadyInitialized => "already initialized",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A buffer could not be allocated.
    #[error("failed to allocate {requested} bytes")]
    Alloc { requested: usize },

    /// A required argument or context was missing.
    #[error("required argument missing: {0}")]
    NullArgument(&'static str),

    /// The configuration does not match the handle's transport kind.
    #[error("config for {found} transport given to {expected} handle")]
    ConfigMismatch {
        expected: TransportKind,
        found: TransportKind,
    },

    /// The handle already owns a live context.
    #[error("{0} handle is already initialized")]
    AlreadyInitialized(TransportKind),

    /// Failed to create the stream socket.
    #[error("failed to create stream socket: {0}")]
    StreamSocket(#[source] std::io::Error),

    /// Failed to apply a stream socket option.
    #[error("failed to set stream option {option}: {source}")]
    StreamOption {
        option: &'static str,
        source: std::io::Error,
    },

    /// The host string is not a usable address.
    #[error("invalid stream address: {host:?}")]
    StreamAddress { host: String },

    /// Failed to bind the listening socket.
    #[error("failed to bind to {addr}: {source}")]
    StreamBind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to listen on the bound socket.
    #[error("failed to listen with backlog {backlog}: {source}")]
    StreamListen {
        backlog: i32,
        source: std::io::Error,
    },

    /// Failed to accept the incoming connection.
    #[error("failed to accept connection: {0}")]
    StreamAccept(#[source] std::io::Error),

    /// All connection attempts failed.
    #[error("failed to connect to {addr} after {attempts} attempts: {source}")]
    StreamConnect {
        addr: SocketAddr,
        attempts: u32,
        source: std::io::Error,
    },

    /// The write failed at the OS level.
    #[error("stream send failed: {0}")]
    StreamSend(#[source] std::io::Error),

    /// Fewer bytes than requested reached the socket.
    #[error("short stream write ({written} of {expected} bytes)")]
    StreamShortWrite { written: usize, expected: usize },

    /// The read failed at the OS level.
    #[error("stream receive failed: {0}")]
    StreamRecv(#[source] std::io::Error),

    /// The peer closed the connection.
    #[error("stream peer closed the connection")]
    StreamClosed,

    /// Failed to create or configure the queue context.
    #[cfg(feature = "queue")]
    #[error("failed to configure queue context: {0}")]
    QueueContext(#[source] zmq::Error),

    /// Failed to create the queue socket.
    #[cfg(feature = "queue")]
    #[error("failed to create {role} queue socket: {source}")]
    QueueSocket {
        role: crate::config::QueueRole,
        source: zmq::Error,
    },

    /// Failed to apply a queue socket option.
    #[cfg(feature = "queue")]
    #[error("failed to set queue option {option}: {source}")]
    QueueOption {
        option: &'static str,
        source: zmq::Error,
    },

    /// Failed to bind the queue socket.
    #[cfg(feature = "queue")]
    #[error("failed to bind queue socket to {endpoint}: {source}")]
    QueueBind { endpoint: String, source: zmq::Error },

    /// Failed to connect the queue socket.
    #[cfg(feature = "queue")]
    #[error("failed to connect queue socket to {endpoint}: {source}")]
    QueueConnect { endpoint: String, source: zmq::Error },

    /// The queue library rejected the send.
    #[cfg(feature = "queue")]
    #[error("queue send failed: {0}")]
    QueueSend(#[source] zmq::Error),

    /// The queue library rejected the receive.
    #[cfg(feature = "queue")]
    #[error("queue receive failed: {0}")]
    QueueRecv(#[source] zmq::Error),
}

impl TransportError {
    /// The closed outcome kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Alloc { .. } => ErrorKind::Alloc,
            TransportError::NullArgument(_) => ErrorKind::NullArgument,
            TransportError::ConfigMismatch { .. } => ErrorKind::InvalidConfig,
            TransportError::AlreadyInitialized(_) => ErrorKind::AlreadyInitialized,
            TransportError::StreamSocket(_) | TransportError::StreamAccept(_) => {
                ErrorKind::StreamSocket
            }
            TransportError::StreamOption { .. } => ErrorKind::StreamOption,
            TransportError::StreamAddress { .. } => ErrorKind::StreamAddress,
            TransportError::StreamBind { .. } => ErrorKind::StreamBind,
            TransportError::StreamListen { .. } => ErrorKind::StreamListen,
            TransportError::StreamConnect { .. } => ErrorKind::StreamConnect,
            TransportError::StreamSend(_) | TransportError::StreamShortWrite { .. } => {
                ErrorKind::StreamSend
            }
            TransportError::StreamRecv(_) | TransportError::StreamClosed => ErrorKind::StreamRecv,
            #[cfg(feature = "queue")]
            TransportError::QueueContext(_) => ErrorKind::QueueContext,
            #[cfg(feature = "queue")]
            TransportError::QueueSocket { .. } => ErrorKind::QueueSocket,
            #[cfg(feature = "queue")]
            TransportError::QueueOption { .. } => ErrorKind::QueueOption,
            #[cfg(feature = "queue")]
            TransportError::QueueBind { .. } => ErrorKind::QueueBind,
            #[cfg(feature = "queue")]
            TransportError::QueueConnect { .. } => ErrorKind::QueueConnect,
            #[cfg(feature = "queue")]
            TransportError::QueueSend(_) => ErrorKind::QueueSend,
            #[cfg(feature = "queue")]
            TransportError::QueueRecv(_) => ErrorKind::QueueRecv,
        }
    }

    /// Whether the failure came from an accept, send or receive timing out.
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::StreamAccept(err)
            | TransportError::StreamSend(err)
            | TransportError::StreamRecv(err) => matches!(
                err.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            #[cfg(feature = "queue")]
            TransportError::QueueSend(zmq::Error::EAGAIN)
            | TransportError::QueueRecv(zmq::Error::EAGAIN) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
