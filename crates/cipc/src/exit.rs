use std::fmt;
use std::io;

use cipc_transport::{ErrorKind, TransportError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = if err.is_timeout() {
        TIMEOUT
    } else {
        kind_code(err.kind())
    };
    CliError::new(code, format!("{context}: {err}"))
}

fn kind_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::InvalidConfig
        | ErrorKind::StreamAddress
        | ErrorKind::StreamOption
        | ErrorKind::QueueOption => USAGE,
        ErrorKind::Alloc | ErrorKind::NullArgument | ErrorKind::AlreadyInitialized => INTERNAL,
        _ => TRANSPORT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_124() {
        let err = TransportError::StreamRecv(io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(transport_error("receive failed", err).code, TIMEOUT);
    }

    #[test]
    fn connection_failures_map_to_transport_error() {
        let err = TransportError::StreamClosed;
        let cli = transport_error("receive failed", err);
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("receive failed: "));
    }

    #[test]
    fn bad_addresses_are_usage_errors() {
        let err = TransportError::StreamAddress {
            host: "nowhere".to_string(),
        };
        assert_eq!(transport_error("init failed", err).code, USAGE);
    }
}
