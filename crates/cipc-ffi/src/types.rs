use std::os::raw::{c_char, c_int};

use cipc_transport::Handle;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipcErr {
    Ok = 0,
    BadAlloc = 1,
    BadZmqContext = 2,
    BadZmqSocket = 3,
    BadZmqBind = 4,
    BadZmqConnect = 5,
    BadZmqSend = 6,
    BadZmqRecv = 7,
    BadTcpSocket = 8,
    BadTcpBind = 9,
    BadTcpListen = 10,
    BadTcpAddress = 11,
    BadTcpConnect = 12,
    BadTcpSend = 13,
    BadTcpRecv = 14,
    BadTcpSocketOpt = 15,
    NullPtr = 16,
    BadZmqSocketOpt = 17,
    BadConfig = 18,
    AlreadyInitialized = 19,
    Internal = 99,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipcProtocol {
    Zmq = 0,
    Tcp = 1,
    Grpc = 2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipcMode {
    Bind = 0,
    Connect = 1,
}

// libzmq socket type values.
pub const CIPC_ZMQ_PAIR: c_int = 0;
pub const CIPC_ZMQ_PUB: c_int = 1;
pub const CIPC_ZMQ_SUB: c_int = 2;
pub const CIPC_ZMQ_REQ: c_int = 3;
pub const CIPC_ZMQ_REP: c_int = 4;
pub const CIPC_ZMQ_DEALER: c_int = 5;
pub const CIPC_ZMQ_ROUTER: c_int = 6;
pub const CIPC_ZMQ_PULL: c_int = 7;
pub const CIPC_ZMQ_PUSH: c_int = 8;
pub const CIPC_ZMQ_XPUB: c_int = 9;
pub const CIPC_ZMQ_XSUB: c_int = 10;

/// TCP stream configuration. Negative timeouts block indefinitely.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CipcStreamConfig {
    pub host: *const c_char,
    pub port: c_int,
    pub mode: CipcMode,
    pub sockopt_sndtimeo: c_int,
    pub sockopt_rcvtimeo: c_int,
    pub sockopt_retries: c_int,
    pub backlog: c_int,
}

/// ZeroMQ configuration.
///
/// Negative numeric options keep the library default, except timeouts where
/// a negative value blocks indefinitely. Null pointers leave the option unset.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CipcQueueConfig {
    pub address: *const c_char,
    pub socket_type: c_int,
    pub mode: CipcMode,
    pub sockopt_sndtimeo: c_int,
    pub sockopt_rcvtimeo: c_int,
    pub sockopt_linger: c_int,
    pub sockopt_sndhwm: c_int,
    pub sockopt_rcvhwm: c_int,
    pub sockopt_reconnect_ivl: c_int,
    pub sockopt_reconnect_ivl_max: c_int,
    pub sockopt_ipv6: bool,
    pub sockopt_tcp_keepalive: c_int,
    pub sockopt_tcp_keepalive_idle: c_int,
    pub sockopt_tcp_keepalive_cnt: c_int,
    pub sockopt_tcp_keepalive_intvl: c_int,
    pub sockopt_router_mandatory: bool,
    pub sockopt_maxmsgsize: i64,
    pub identity: *const u8,
    pub identity_len: usize,
    pub curve_public_key: *const c_char,
    pub curve_secret_key: *const c_char,
    pub curve_server_key: *const c_char,
    pub topics: *const *const c_char,
    pub num_topics: usize,
}

/// Opaque handle returned by `cipc_create`.
pub struct CipcHandle {
    pub(crate) handle: Handle,
}
