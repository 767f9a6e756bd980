//! Plain-data configuration for each backend.
//!
//! Nothing here performs I/O. Builders fill in the defaults below and the
//! `with_*` setters override individual fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::TransportKind;

pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_RECV_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CONNECT_RETRIES: u32 = 3;
pub const DEFAULT_BACKLOG: i32 = 1;
pub const DEFAULT_RECONNECT_INTERVAL_MS: i32 = 10;
pub const DEFAULT_RECONNECT_INTERVAL_MAX_MS: i32 = 5000;
pub const DEFAULT_LINGER_MS: i32 = 0;

/// Host string that binds every local interface.
pub const WILDCARD_HOST: &str = "*";

/// Whether a backend binds or connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Bind,
    Connect,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Bind => f.write_str("bind"),
            Mode::Connect => f.write_str("connect"),
        }
    }
}

/// Configuration for the TCP stream backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// IP literal to bind or connect to. `"*"` binds every interface.
    pub host: String,
    pub port: u16,
    pub mode: Mode,
    /// Send timeout in milliseconds. `None` blocks indefinitely.
    pub send_timeout_ms: Option<u64>,
    /// Receive timeout in milliseconds. `None` blocks indefinitely.
    pub recv_timeout_ms: Option<u64>,
    /// Additional connect attempts after the first (Connect mode only).
    pub retries: u32,
    /// Listen backlog (Bind mode only).
    pub backlog: i32,
    /// Set `SO_REUSEADDR` before binding (Bind mode only).
    pub reuse_address: bool,
    /// Disable Nagle's algorithm on the connected stream.
    pub nodelay: bool,
}

impl StreamConfig {
    /// Listen on every interface at `port` and accept one connection.
    pub fn bind(port: u16) -> Self {
        Self::new(WILDCARD_HOST, port, Mode::Bind)
    }

    /// Connect to `host:port`, retrying with backoff.
    pub fn connect(host: impl Into<String>, port: u16) -> Self {
        Self::new(host, port, Mode::Connect)
    }

    pub fn new(host: impl Into<String>, port: u16, mode: Mode) -> Self {
        Self {
            host: host.into(),
            port,
            mode,
            send_timeout_ms: Some(DEFAULT_SEND_TIMEOUT_MS),
            recv_timeout_ms: Some(DEFAULT_RECV_TIMEOUT_MS),
            retries: DEFAULT_CONNECT_RETRIES,
            backlog: DEFAULT_BACKLOG,
            reuse_address: true,
            nodelay: false,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_send_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.send_timeout_ms = timeout_ms;
        self
    }

    pub fn with_recv_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.recv_timeout_ms = timeout_ms;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    pub fn with_reuse_address(mut self, reuse: bool) -> Self {
        self.reuse_address = reuse;
        self
    }

    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

/// ZeroMQ socket role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueRole {
    Req,
    Rep,
    Dealer,
    Router,
    Pub,
    Sub,
    XPub,
    XSub,
    Push,
    Pull,
    Pair,
}

impl fmt::Display for QueueRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueRole::Req => "REQ",
            QueueRole::Rep => "REP",
            QueueRole::Dealer => "DEALER",
            QueueRole::Router => "ROUTER",
            QueueRole::Pub => "PUB",
            QueueRole::Sub => "SUB",
            QueueRole::XPub => "XPUB",
            QueueRole::XSub => "XSUB",
            QueueRole::Push => "PUSH",
            QueueRole::Pull => "PULL",
            QueueRole::Pair => "PAIR",
        };
        f.write_str(name)
    }
}

/// TCP keepalive settings forwarded to the queue library.
///
/// `None` fields keep the operating system default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keepalive {
    pub enabled: bool,
    pub idle_secs: Option<i32>,
    pub count: Option<i32>,
    pub interval_secs: Option<i32>,
}

impl Keepalive {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            idle_secs: None,
            count: None,
            interval_secs: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::enabled()
        }
    }
}

/// CURVE key triple, Z85-encoded.
///
/// Without a `server_key` the socket acts as the CURVE server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveKeys {
    pub public_key: String,
    pub secret_key: String,
    pub server_key: Option<String>,
}

impl fmt::Debug for CurveKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveKeys")
            .field("public_key", &self.public_key)
            .field(
                "secret_key",
                &format_args!("<redacted:{} bytes>", self.secret_key.len()),
            )
            .field("server_key", &self.server_key)
            .finish()
    }
}

/// Configuration for the ZeroMQ queue backend.
///
/// Options left as `None` keep the library default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// ZeroMQ endpoint, e.g. `tcp://127.0.0.1:5555` or `ipc:///tmp/q`.
    pub address: String,
    pub role: QueueRole,
    pub mode: Mode,
    /// Send timeout in milliseconds. `None` blocks indefinitely.
    pub send_timeout_ms: Option<u64>,
    /// Receive timeout in milliseconds. `None` blocks indefinitely.
    pub recv_timeout_ms: Option<u64>,
    pub linger_ms: Option<i32>,
    pub send_hwm: Option<i32>,
    pub recv_hwm: Option<i32>,
    pub reconnect_interval_ms: Option<i32>,
    pub reconnect_interval_max_ms: Option<i32>,
    pub ipv6: bool,
    pub keepalive: Option<Keepalive>,
    /// Only applied to the Router role.
    pub router_mandatory: bool,
    pub max_message_size: Option<i64>,
    pub identity: Option<Vec<u8>>,
    pub curve: Option<CurveKeys>,
    /// Topic filters. Only applied to the Sub role.
    pub subscriptions: Vec<Vec<u8>>,
    /// Context I/O thread count.
    pub io_threads: Option<i32>,
}

impl QueueConfig {
    pub fn new(address: impl Into<String>, role: QueueRole, mode: Mode) -> Self {
        Self {
            address: address.into(),
            role,
            mode,
            send_timeout_ms: Some(DEFAULT_SEND_TIMEOUT_MS),
            recv_timeout_ms: Some(DEFAULT_RECV_TIMEOUT_MS),
            linger_ms: Some(DEFAULT_LINGER_MS),
            send_hwm: None,
            recv_hwm: None,
            reconnect_interval_ms: Some(DEFAULT_RECONNECT_INTERVAL_MS),
            reconnect_interval_max_ms: Some(DEFAULT_RECONNECT_INTERVAL_MAX_MS),
            ipv6: false,
            keepalive: None,
            router_mandatory: false,
            max_message_size: None,
            identity: None,
            curve: None,
            subscriptions: Vec::new(),
            io_threads: None,
        }
    }

    /// Request role, connecting.
    pub fn request(address: impl Into<String>) -> Self {
        Self::new(address, QueueRole::Req, Mode::Connect)
    }

    /// Reply role, binding.
    pub fn reply(address: impl Into<String>) -> Self {
        Self::new(address, QueueRole::Rep, Mode::Bind)
    }

    /// Publisher role, binding.
    pub fn publisher(address: impl Into<String>) -> Self {
        Self::new(address, QueueRole::Pub, Mode::Bind)
    }

    /// Subscriber role, connecting. Receives everything until a topic is added.
    pub fn subscriber(address: impl Into<String>) -> Self {
        Self::new(address, QueueRole::Sub, Mode::Connect)
    }

    /// Push role, connecting.
    pub fn push(address: impl Into<String>) -> Self {
        Self::new(address, QueueRole::Push, Mode::Connect)
    }

    /// Pull role, binding.
    pub fn pull(address: impl Into<String>) -> Self {
        Self::new(address, QueueRole::Pull, Mode::Bind)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_send_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.send_timeout_ms = timeout_ms;
        self
    }

    pub fn with_recv_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.recv_timeout_ms = timeout_ms;
        self
    }

    pub fn with_linger(mut self, linger_ms: Option<i32>) -> Self {
        self.linger_ms = linger_ms;
        self
    }

    pub fn with_hwm(mut self, send_hwm: Option<i32>, recv_hwm: Option<i32>) -> Self {
        self.send_hwm = send_hwm;
        self.recv_hwm = recv_hwm;
        self
    }

    pub fn with_reconnect_interval(mut self, interval_ms: Option<i32>) -> Self {
        self.reconnect_interval_ms = interval_ms;
        self
    }

    pub fn with_reconnect_interval_max(mut self, interval_max_ms: Option<i32>) -> Self {
        self.reconnect_interval_max_ms = interval_max_ms;
        self
    }

    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    pub fn with_keepalive(mut self, keepalive: Keepalive) -> Self {
        self.keepalive = Some(keepalive);
        self
    }

    pub fn with_router_mandatory(mut self, mandatory: bool) -> Self {
        self.router_mandatory = mandatory;
        self
    }

    pub fn with_max_message_size(mut self, max: Option<i64>) -> Self {
        self.max_message_size = max;
        self
    }

    pub fn with_identity(mut self, identity: impl Into<Vec<u8>>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_curve(mut self, keys: CurveKeys) -> Self {
        self.curve = Some(keys);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<Vec<u8>>) -> Self {
        self.subscriptions.push(topic.into());
        self
    }

    pub fn with_io_threads(mut self, threads: i32) -> Self {
        self.io_threads = Some(threads);
        self
    }
}

/// Configuration for any backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum TransportConfig {
    Stream(StreamConfig),
    Queue(QueueConfig),
}

impl TransportConfig {
    /// The transport kind this config belongs to.
    pub fn kind(&self) -> TransportKind {
        match self {
            TransportConfig::Stream(_) => TransportKind::Stream,
            TransportConfig::Queue(_) => TransportKind::Queue,
        }
    }
}

impl From<StreamConfig> for TransportConfig {
    fn from(config: StreamConfig) -> Self {
        TransportConfig::Stream(config)
    }
}

impl From<QueueConfig> for TransportConfig {
    fn from(config: QueueConfig) -> Self {
        TransportConfig::Queue(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_builders_fill_defaults() {
        let bind = StreamConfig::bind(7000);
        assert_eq!(bind.host, WILDCARD_HOST);
        assert_eq!(bind.mode, Mode::Bind);
        assert_eq!(bind.backlog, DEFAULT_BACKLOG);
        assert_eq!(bind.send_timeout_ms, Some(5000));

        let connect = StreamConfig::connect("127.0.0.1", 7000)
            .with_retries(7)
            .with_recv_timeout(None);
        assert_eq!(connect.mode, Mode::Connect);
        assert_eq!(connect.retries, 7);
        assert_eq!(connect.recv_timeout_ms, None);
        assert_eq!(connect.send_timeout_ms, Some(5000));
    }

    #[test]
    fn queue_role_builders() {
        let req = QueueConfig::request("tcp://127.0.0.1:5555");
        assert_eq!((req.role, req.mode), (QueueRole::Req, Mode::Connect));
        let rep = QueueConfig::reply("tcp://*:5555");
        assert_eq!((rep.role, rep.mode), (QueueRole::Rep, Mode::Bind));
        assert_eq!(rep.reconnect_interval_ms, Some(10));
        assert_eq!(rep.reconnect_interval_max_ms, Some(5000));
        let publisher = QueueConfig::publisher("tcp://*:5556");
        assert_eq!(
            (publisher.role, publisher.mode),
            (QueueRole::Pub, Mode::Bind)
        );
        let sub = QueueConfig::subscriber("tcp://127.0.0.1:5556")
            .with_topic("alerts")
            .with_topic(b"metrics".to_vec());
        assert_eq!((sub.role, sub.mode), (QueueRole::Sub, Mode::Connect));
        assert_eq!(sub.subscriptions.len(), 2);
    }

    #[test]
    fn queue_setters_override_single_fields() {
        let cfg = QueueConfig::request("tcp://127.0.0.1:5555")
            .with_send_timeout(Some(250))
            .with_reconnect_interval_max(Some(1000));
        assert_eq!(cfg.send_timeout_ms, Some(250));
        assert_eq!(cfg.recv_timeout_ms, Some(DEFAULT_RECV_TIMEOUT_MS));
        assert_eq!(cfg.reconnect_interval_ms, Some(DEFAULT_RECONNECT_INTERVAL_MS));
        assert_eq!(cfg.reconnect_interval_max_ms, Some(1000));
    }

    #[test]
    fn curve_debug_redacts_secret() {
        let keys = CurveKeys {
            public_key: "pub".to_string(),
            secret_key: "super-secret".to_string(),
            server_key: None,
        };
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted:12 bytes>"));
    }

    #[test]
    fn transport_config_is_tagged_by_kind() {
        let cfg: TransportConfig = StreamConfig::bind(9000).into();
        assert_eq!(cfg.kind(), TransportKind::Stream);

        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["transport"], "stream");
        assert_eq!(json["mode"], "bind");

        let back: TransportConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, cfg);
    }
}
