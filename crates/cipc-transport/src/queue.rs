//! ZeroMQ queue backend.
//!
//! Message boundaries and reconnection belong to the library. This backend
//! translates [`QueueConfig`] into socket options and exposes the same
//! four-operation contract as the stream backend.

use tracing::{debug, info};
use zmq::{Context, Socket, SocketType};

use crate::config::{CurveKeys, Keepalive, Mode, QueueConfig, QueueRole, TransportConfig};
use crate::error::{Result, TransportError};
use crate::kind::TransportKind;
use crate::traits::Transport;

struct QueueContext {
    context: Context,
    socket: Socket,
    role: QueueRole,
    endpoint: String,
}

impl std::fmt::Debug for QueueContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueContext")
            .field("role", &self.role)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Linked libzmq version as `(major, minor, patch)`.
pub fn library_version() -> (i32, i32, i32) {
    zmq::version()
}

/// Queue backend over one ZeroMQ context and socket.
#[derive(Debug, Default)]
pub struct QueueTransport {
    ctx: Option<QueueContext>,
}

impl QueueTransport {
    pub fn new() -> Self {
        Self { ctx: None }
    }

    /// Socket role, once initialized.
    pub fn role(&self) -> Option<QueueRole> {
        self.ctx.as_ref().map(|ctx| ctx.role)
    }

    fn context(&mut self) -> Result<&mut QueueContext> {
        self.ctx
            .as_mut()
            .ok_or(TransportError::NullArgument("context"))
    }
}

impl Transport for QueueTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Queue
    }

    fn is_initialized(&self) -> bool {
        self.ctx.is_some()
    }

    fn init(&mut self, config: &TransportConfig) -> Result<()> {
        let config = match config {
            TransportConfig::Queue(config) => config,
            other => {
                return Err(TransportError::ConfigMismatch {
                    expected: TransportKind::Queue,
                    found: other.kind(),
                })
            }
        };
        if self.ctx.is_some() {
            return Err(TransportError::AlreadyInitialized(TransportKind::Queue));
        }

        self.ctx = Some(open(config)?);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        let ctx = self.context()?;
        ctx.socket.send(data, 0).map_err(TransportError::QueueSend)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let ctx = self.context()?;
        let Some(capacity) = buf.len().checked_sub(1) else {
            return Err(TransportError::NullArgument("buffer"));
        };

        // A zero-length receive still dequeues the message.
        let size = ctx
            .socket
            .recv_into(&mut buf[..capacity], 0)
            .map_err(TransportError::QueueRecv)?;
        // The library reports the full message size; longer messages are truncated.
        let stored = size.min(capacity);
        if stored < size {
            debug!(size, capacity, "queue message truncated to buffer");
        }
        buf[stored] = 0;
        Ok(stored)
    }

    fn release(&mut self) {
        if let Some(QueueContext {
            context,
            socket,
            role,
            endpoint,
        }) = self.ctx.take()
        {
            drop(socket);
            drop(context);
            debug!(%role, %endpoint, "released queue socket and context");
        }
    }
}

fn open(config: &QueueConfig) -> Result<QueueContext> {
    let context = Context::new();
    if let Some(threads) = config.io_threads {
        context
            .set_io_threads(threads)
            .map_err(TransportError::QueueContext)?;
    }

    let socket = context
        .socket(socket_type(config.role))
        .map_err(|source| TransportError::QueueSocket {
            role: config.role,
            source,
        })?;

    apply_options(&socket, config)?;

    match config.mode {
        Mode::Bind => socket
            .bind(&config.address)
            .map_err(|source| TransportError::QueueBind {
                endpoint: config.address.clone(),
                source,
            })?,
        Mode::Connect => {
            socket
                .connect(&config.address)
                .map_err(|source| TransportError::QueueConnect {
                    endpoint: config.address.clone(),
                    source,
                })?
        }
    }
    info!(role = %config.role, mode = %config.mode, endpoint = %config.address, "queue socket ready");

    Ok(QueueContext {
        context,
        socket,
        role: config.role,
        endpoint: config.address.clone(),
    })
}

fn socket_type(role: QueueRole) -> SocketType {
    match role {
        QueueRole::Req => SocketType::REQ,
        QueueRole::Rep => SocketType::REP,
        QueueRole::Dealer => SocketType::DEALER,
        QueueRole::Router => SocketType::ROUTER,
        QueueRole::Pub => SocketType::PUB,
        QueueRole::Sub => SocketType::SUB,
        QueueRole::XPub => SocketType::XPUB,
        QueueRole::XSub => SocketType::XSUB,
        QueueRole::Push => SocketType::PUSH,
        QueueRole::Pull => SocketType::PULL,
        QueueRole::Pair => SocketType::PAIR,
    }
}

fn option(option: &'static str, result: zmq::Result<()>) -> Result<()> {
    result.map_err(|source| TransportError::QueueOption { option, source })?;
    debug!(option, "applied queue option");
    Ok(())
}

/// `None` maps to the library's "block forever" value.
fn timeout_ms(name: &'static str, timeout: Option<u64>) -> Result<i32> {
    match timeout {
        None => Ok(-1),
        Some(ms) => i32::try_from(ms).map_err(|_| TransportError::QueueOption {
            option: name,
            source: zmq::Error::EINVAL,
        }),
    }
}

fn apply_options(socket: &Socket, config: &QueueConfig) -> Result<()> {
    option(
        "ZMQ_SNDTIMEO",
        socket.set_sndtimeo(timeout_ms("ZMQ_SNDTIMEO", config.send_timeout_ms)?),
    )?;
    option(
        "ZMQ_RCVTIMEO",
        socket.set_rcvtimeo(timeout_ms("ZMQ_RCVTIMEO", config.recv_timeout_ms)?),
    )?;

    if let Some(linger) = config.linger_ms {
        option("ZMQ_LINGER", socket.set_linger(linger))?;
    }
    if let Some(hwm) = config.send_hwm {
        option("ZMQ_SNDHWM", socket.set_sndhwm(hwm))?;
    }
    if let Some(hwm) = config.recv_hwm {
        option("ZMQ_RCVHWM", socket.set_rcvhwm(hwm))?;
    }
    if let Some(interval) = config.reconnect_interval_ms {
        option("ZMQ_RECONNECT_IVL", socket.set_reconnect_ivl(interval))?;
    }
    if let Some(interval_max) = config.reconnect_interval_max_ms {
        option(
            "ZMQ_RECONNECT_IVL_MAX",
            socket.set_reconnect_ivl_max(interval_max),
        )?;
    }
    if config.ipv6 {
        option("ZMQ_IPV6", socket.set_ipv6(true))?;
    }
    if let Some(keepalive) = &config.keepalive {
        apply_keepalive(socket, keepalive)?;
    }
    if config.router_mandatory && config.role == QueueRole::Router {
        option("ZMQ_ROUTER_MANDATORY", socket.set_router_mandatory(true))?;
    }
    if let Some(max) = config.max_message_size {
        option("ZMQ_MAXMSGSIZE", socket.set_maxmsgsize(max))?;
    }
    if let Some(identity) = &config.identity {
        option("ZMQ_IDENTITY", socket.set_identity(identity))?;
    }
    if let Some(keys) = &config.curve {
        apply_curve(socket, keys)?;
    }
    if config.role == QueueRole::Sub {
        apply_subscriptions(socket, &config.subscriptions)?;
    }
    Ok(())
}

fn apply_keepalive(socket: &Socket, keepalive: &Keepalive) -> Result<()> {
    option(
        "ZMQ_TCP_KEEPALIVE",
        socket.set_tcp_keepalive(i32::from(keepalive.enabled)),
    )?;
    if let Some(idle) = keepalive.idle_secs {
        option("ZMQ_TCP_KEEPALIVE_IDLE", socket.set_tcp_keepalive_idle(idle))?;
    }
    if let Some(count) = keepalive.count {
        option("ZMQ_TCP_KEEPALIVE_CNT", socket.set_tcp_keepalive_cnt(count))?;
    }
    if let Some(interval) = keepalive.interval_secs {
        option(
            "ZMQ_TCP_KEEPALIVE_INTVL",
            socket.set_tcp_keepalive_intvl(interval),
        )?;
    }
    Ok(())
}

fn apply_curve(socket: &Socket, keys: &CurveKeys) -> Result<()> {
    match &keys.server_key {
        Some(server_key) => option(
            "ZMQ_CURVE_SERVERKEY",
            socket.set_curve_serverkey(server_key.as_bytes()),
        )?,
        None => option("ZMQ_CURVE_SERVER", socket.set_curve_server(true))?,
    }
    option(
        "ZMQ_CURVE_PUBLICKEY",
        socket.set_curve_publickey(keys.public_key.as_bytes()),
    )?;
    option(
        "ZMQ_CURVE_SECRETKEY",
        socket.set_curve_secretkey(keys.secret_key.as_bytes()),
    )
}

/// An empty topic list subscribes to everything.
fn apply_subscriptions(socket: &Socket, topics: &[Vec<u8>]) -> Result<()> {
    if topics.is_empty() {
        return option("ZMQ_SUBSCRIBE", socket.set_subscribe(b""));
    }
    for topic in topics {
        option("ZMQ_SUBSCRIBE", socket.set_subscribe(topic))?;
    }
    Ok(())
}
