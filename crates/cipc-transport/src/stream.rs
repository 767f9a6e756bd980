//! TCP stream backend.
//!
//! Bind mode listens, accepts exactly one connection and drops the listener.
//! Connect mode retries with exponential backoff. No framing is applied:
//! `send` ships exactly the bytes given.

use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, info, warn};

use crate::backoff::{retry_while, Backoff};
use crate::config::{Mode, StreamConfig, TransportConfig, WILDCARD_HOST};
use crate::error::{Result, TransportError};
use crate::kind::TransportKind;
use crate::traits::Transport;

/// Which side of the connection this backend ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Accepted the connection (Bind mode).
    Server,
    /// Initiated the connection (Connect mode).
    Client,
}

#[derive(Debug)]
struct StreamContext {
    stream: TcpStream,
    role: Role,
    peer: SocketAddr,
}

/// Stream backend over a single TCP connection.
#[derive(Debug)]
pub struct StreamTransport {
    ctx: Option<StreamContext>,
    backoff: Backoff,
    sleep: fn(Duration),
}

impl StreamTransport {
    pub fn new() -> Self {
        Self::with_backoff(Backoff::default())
    }

    /// Use a custom connect backoff instead of 100ms doubling to 5s.
    pub fn with_backoff(backoff: Backoff) -> Self {
        Self {
            ctx: None,
            backoff,
            sleep: std::thread::sleep,
        }
    }

    /// Connection role, once initialized.
    pub fn role(&self) -> Option<Role> {
        self.ctx.as_ref().map(|ctx| ctx.role)
    }

    /// Address of the connected peer, once initialized.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.ctx.as_ref().map(|ctx| ctx.peer)
    }

    fn open(&self, config: &StreamConfig) -> Result<StreamContext> {
        let ctx = match config.mode {
            Mode::Bind => bind_and_accept(config)?,
            Mode::Connect => connect_with_retry(config, &self.backoff, self.sleep)?,
        };

        if config.nodelay {
            ctx.stream
                .set_nodelay(true)
                .map_err(|source| TransportError::StreamOption {
                    option: "TCP_NODELAY",
                    source,
                })?;
        }

        Ok(ctx)
    }

    fn context(&mut self) -> Result<&mut StreamContext> {
        self.ctx
            .as_mut()
            .ok_or(TransportError::NullArgument("context"))
    }
}

impl Default for StreamTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for StreamTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    fn is_initialized(&self) -> bool {
        self.ctx.is_some()
    }

    fn init(&mut self, config: &TransportConfig) -> Result<()> {
        let config = match config {
            TransportConfig::Stream(config) => config,
            other => {
                return Err(TransportError::ConfigMismatch {
                    expected: TransportKind::Stream,
                    found: other.kind(),
                })
            }
        };
        if self.ctx.is_some() {
            return Err(TransportError::AlreadyInitialized(TransportKind::Stream));
        }

        self.ctx = Some(self.open(config)?);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        let ctx = self.context()?;
        write_once(&mut ctx.stream, data)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let ctx = self.context()?;
        read_terminated(&mut ctx.stream, buf)
    }

    fn release(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            let _ = ctx.stream.shutdown(Shutdown::Both);
            debug!(peer = %ctx.peer, role = ?ctx.role, "released stream connection");
        }
    }
}

fn bind_and_accept(config: &StreamConfig) -> Result<StreamContext> {
    let addr = bind_addr(config)?;
    let listener = open_socket(addr, config)?;

    if config.reuse_address {
        listener
            .set_reuse_address(true)
            .map_err(|source| TransportError::StreamOption {
                option: "SO_REUSEADDR",
                source,
            })?;
    }
    listener
        .bind(&SockAddr::from(addr))
        .map_err(|source| TransportError::StreamBind { addr, source })?;
    listener
        .listen(config.backlog)
        .map_err(|source| TransportError::StreamListen {
            backlog: config.backlog,
            source,
        })?;
    info!(%addr, backlog = config.backlog, "listening for stream connection");

    let (accepted, peer) = listener.accept().map_err(TransportError::StreamAccept)?;
    drop(listener);

    apply_timeouts(&accepted, config)?;
    let peer = peer
        .as_socket()
        .unwrap_or_else(|| SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0));
    info!(%peer, "accepted stream connection, listener released");

    Ok(StreamContext {
        stream: TcpStream::from(accepted),
        role: Role::Server,
        peer,
    })
}

fn connect_with_retry(
    config: &StreamConfig,
    backoff: &Backoff,
    sleep: fn(Duration),
) -> Result<StreamContext> {
    let addr = connect_addr(config)?;
    let target = SockAddr::from(addr);

    // Socket and option failures surface before the first attempt.
    let mut first = Some(open_socket(addr, config)?);

    let connected = retry_while(backoff, config.retries, sleep, is_connect_failure, |attempt| {
        let socket = match first.take() {
            Some(socket) => socket,
            None => open_socket(addr, config)?,
        };
        match socket.connect(&target) {
            Ok(()) => Ok(socket),
            Err(source) => {
                debug!(%addr, attempt, error = %source, "stream connect attempt failed");
                Err(TransportError::StreamConnect {
                    addr,
                    attempts: attempt + 1,
                    source,
                })
            }
        }
    });

    match connected {
        Ok(socket) => {
            info!(%addr, "connected stream");
            Ok(StreamContext {
                stream: TcpStream::from(socket),
                role: Role::Client,
                peer: addr,
            })
        }
        Err(exhausted) if is_connect_failure(&exhausted.last_error) => {
            warn!(%addr, attempts = exhausted.attempts, "stream connect retries exhausted");
            Err(exhausted.last_error)
        }
        Err(aborted) => {
            warn!(%addr, attempts = aborted.attempts, error = %aborted.last_error, "stream connect aborted");
            Err(aborted.last_error)
        }
    }
}

/// Only a refused or failed `connect` is worth another attempt.
fn is_connect_failure(err: &TransportError) -> bool {
    matches!(err, TransportError::StreamConnect { .. })
}

fn open_socket(addr: SocketAddr, config: &StreamConfig) -> Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(TransportError::StreamSocket)?;
    apply_timeouts(&socket, config)?;
    Ok(socket)
}

fn apply_timeouts(socket: &Socket, config: &StreamConfig) -> Result<()> {
    let send = timeout_duration("SO_SNDTIMEO", config.send_timeout_ms)?;
    socket
        .set_write_timeout(send)
        .map_err(|source| TransportError::StreamOption {
            option: "SO_SNDTIMEO",
            source,
        })?;

    let recv = timeout_duration("SO_RCVTIMEO", config.recv_timeout_ms)?;
    socket
        .set_read_timeout(recv)
        .map_err(|source| TransportError::StreamOption {
            option: "SO_RCVTIMEO",
            source,
        })?;
    Ok(())
}

/// A zero timeout would silently mean "block forever" at the OS level.
fn timeout_duration(option: &'static str, timeout_ms: Option<u64>) -> Result<Option<Duration>> {
    match timeout_ms {
        None => Ok(None),
        Some(0) => Err(TransportError::StreamOption {
            option,
            source: std::io::Error::new(IoErrorKind::InvalidInput, "timeout must be non-zero"),
        }),
        Some(ms) => Ok(Some(Duration::from_millis(ms))),
    }
}

fn bind_addr(config: &StreamConfig) -> Result<SocketAddr> {
    let host = config.host.trim();
    if host.is_empty() || host == WILDCARD_HOST {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.port));
    }
    parse_ip(host).map(|ip| SocketAddr::new(ip, config.port))
}

fn connect_addr(config: &StreamConfig) -> Result<SocketAddr> {
    let host = config.host.trim();
    if host.eq_ignore_ascii_case("localhost") {
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), config.port));
    }
    parse_ip(host).map(|ip| SocketAddr::new(ip, config.port))
}

fn parse_ip(host: &str) -> Result<IpAddr> {
    host.parse::<IpAddr>()
        .map_err(|_| TransportError::StreamAddress {
            host: host.to_string(),
        })
}

/// One write call; anything short of the full payload is a send error.
pub(crate) fn write_once<W: Write>(writer: &mut W, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    loop {
        match writer.write(data) {
            Ok(n) if n == data.len() => return Ok(()),
            Ok(written) => {
                return Err(TransportError::StreamShortWrite {
                    written,
                    expected: data.len(),
                })
            }
            Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::StreamSend(err)),
        }
    }
}

/// Read at most `buf.len() - 1` bytes and terminate them with a zero byte.
pub(crate) fn read_terminated<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let Some(capacity) = buf.len().checked_sub(1) else {
        return Err(TransportError::NullArgument("buffer"));
    };
    if capacity == 0 {
        buf[0] = 0;
        return Err(TransportError::StreamRecv(std::io::Error::new(
            IoErrorKind::InvalidInput,
            "receive buffer has no room for data",
        )));
    }
    loop {
        match reader.read(&mut buf[..capacity]) {
            Ok(0) => return Err(TransportError::StreamClosed),
            Ok(n) => {
                buf[n] = 0;
                return Ok(n);
            }
            Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
            Err(err) => return Err(TransportError::StreamRecv(err)),
        }
    }
}
