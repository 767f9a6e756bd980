use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use cipc_transport::config::{
    DEFAULT_BACKLOG, DEFAULT_CONNECT_RETRIES, DEFAULT_LINGER_MS, DEFAULT_RECONNECT_INTERVAL_MAX_MS,
    DEFAULT_RECONNECT_INTERVAL_MS, DEFAULT_RECV_TIMEOUT_MS, DEFAULT_SEND_TIMEOUT_MS,
};
use cipc_transport::{CurveKeys, Keepalive, Mode, QueueConfig, QueueRole, StreamConfig};

use crate::error;
use crate::types::{
    CipcErr, CipcMode, CipcQueueConfig, CipcStreamConfig, CIPC_ZMQ_DEALER, CIPC_ZMQ_PAIR,
    CIPC_ZMQ_PUB, CIPC_ZMQ_PULL, CIPC_ZMQ_PUSH, CIPC_ZMQ_REP, CIPC_ZMQ_REQ, CIPC_ZMQ_ROUTER,
    CIPC_ZMQ_SUB, CIPC_ZMQ_XPUB, CIPC_ZMQ_XSUB,
};

/// Convert a required C string argument into UTF-8 `&str`.
///
/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
unsafe fn required_str_arg<'a>(value: *const c_char, name: &str) -> Result<&'a str, CipcErr> {
    if value.is_null() {
        return Err(error::set_null_ptr(name));
    }

    let as_cstr = {
        // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
        unsafe { CStr::from_ptr(value) }
    };

    as_cstr
        .to_str()
        .map_err(|_| error::set_bad_config(format!("{name} must be valid UTF-8")))
}

/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
unsafe fn optional_str_arg(value: *const c_char, name: &str) -> Result<Option<String>, CipcErr> {
    if value.is_null() {
        return Ok(None);
    }
    // SAFETY: Forwarded caller guarantee.
    unsafe { required_str_arg(value, name) }.map(|s| Some(s.to_string()))
}

fn mode_from_c(mode: CipcMode) -> Mode {
    match mode {
        CipcMode::Bind => Mode::Bind,
        CipcMode::Connect => Mode::Connect,
    }
}

fn timeout_from_c(timeout_ms: c_int) -> Option<u64> {
    u64::try_from(timeout_ms).ok()
}

fn optional_from_c(value: c_int) -> Option<i32> {
    (value >= 0).then_some(value)
}

fn role_from_c(socket_type: c_int) -> Result<QueueRole, CipcErr> {
    let role = match socket_type {
        CIPC_ZMQ_PAIR => QueueRole::Pair,
        CIPC_ZMQ_PUB => QueueRole::Pub,
        CIPC_ZMQ_SUB => QueueRole::Sub,
        CIPC_ZMQ_REQ => QueueRole::Req,
        CIPC_ZMQ_REP => QueueRole::Rep,
        CIPC_ZMQ_DEALER => QueueRole::Dealer,
        CIPC_ZMQ_ROUTER => QueueRole::Router,
        CIPC_ZMQ_PULL => QueueRole::Pull,
        CIPC_ZMQ_PUSH => QueueRole::Push,
        CIPC_ZMQ_XPUB => QueueRole::XPub,
        CIPC_ZMQ_XSUB => QueueRole::XSub,
        other => {
            return Err(error::set_bad_config(format!(
                "unknown socket_type {other}"
            )))
        }
    };
    Ok(role)
}

/// # Safety
/// Pointer fields of `config` must satisfy the `CipcStreamConfig` contract.
pub(crate) unsafe fn stream_config_from_c(
    config: &CipcStreamConfig,
) -> Result<StreamConfig, CipcErr> {
    // SAFETY: Forwarded caller guarantee.
    let host = unsafe { required_str_arg(config.host, "host") }?;
    let port = u16::try_from(config.port)
        .map_err(|_| error::set_bad_config(format!("port out of range: {}", config.port)))?;

    let retries = u32::try_from(config.sockopt_retries).map_err(|_| {
        error::set_bad_config(format!(
            "sockopt_retries must not be negative: {}",
            config.sockopt_retries
        ))
    })?;
    if config.backlog < 0 {
        return Err(error::set_bad_config(format!(
            "backlog must not be negative: {}",
            config.backlog
        )));
    }

    Ok(StreamConfig::new(host, port, mode_from_c(config.mode))
        .with_send_timeout(timeout_from_c(config.sockopt_sndtimeo))
        .with_recv_timeout(timeout_from_c(config.sockopt_rcvtimeo))
        .with_retries(retries)
        .with_backlog(config.backlog))
}

/// # Safety
/// Pointer fields of `config` must satisfy the `CipcQueueConfig` contract:
/// strings NUL-terminated, `identity` readable for `identity_len` bytes,
/// `topics` readable for `num_topics` C strings.
pub(crate) unsafe fn queue_config_from_c(config: &CipcQueueConfig) -> Result<QueueConfig, CipcErr> {
    // SAFETY: Forwarded caller guarantee.
    let address = unsafe { required_str_arg(config.address, "address") }?;
    let role = role_from_c(config.socket_type)?;

    let mut out = QueueConfig::new(address, role, mode_from_c(config.mode))
        .with_send_timeout(timeout_from_c(config.sockopt_sndtimeo))
        .with_recv_timeout(timeout_from_c(config.sockopt_rcvtimeo))
        .with_linger(optional_from_c(config.sockopt_linger))
        .with_hwm(
            optional_from_c(config.sockopt_sndhwm),
            optional_from_c(config.sockopt_rcvhwm),
        )
        .with_reconnect_interval(optional_from_c(config.sockopt_reconnect_ivl))
        .with_reconnect_interval_max(optional_from_c(config.sockopt_reconnect_ivl_max))
        .with_ipv6(config.sockopt_ipv6)
        .with_router_mandatory(config.sockopt_router_mandatory)
        .with_max_message_size((config.sockopt_maxmsgsize >= 0).then_some(config.sockopt_maxmsgsize));

    if config.sockopt_tcp_keepalive >= 0 {
        out = out.with_keepalive(Keepalive {
            enabled: config.sockopt_tcp_keepalive > 0,
            idle_secs: optional_from_c(config.sockopt_tcp_keepalive_idle),
            count: optional_from_c(config.sockopt_tcp_keepalive_cnt),
            interval_secs: optional_from_c(config.sockopt_tcp_keepalive_intvl),
        });
    }

    if config.identity_len > 0 {
        if config.identity.is_null() {
            return Err(error::set_null_ptr("identity"));
        }
        // SAFETY: Pointer and length are validated above and owned by caller for the call duration.
        let identity = unsafe { std::slice::from_raw_parts(config.identity, config.identity_len) };
        out = out.with_identity(identity);
    }

    // SAFETY: Forwarded caller guarantee.
    let public_key = unsafe { optional_str_arg(config.curve_public_key, "curve_public_key") }?;
    // SAFETY: Forwarded caller guarantee.
    let secret_key = unsafe { optional_str_arg(config.curve_secret_key, "curve_secret_key") }?;
    // SAFETY: Forwarded caller guarantee.
    let server_key = unsafe { optional_str_arg(config.curve_server_key, "curve_server_key") }?;
    match (public_key, secret_key) {
        (Some(public_key), Some(secret_key)) => {
            out = out.with_curve(CurveKeys {
                public_key,
                secret_key,
                server_key,
            });
        }
        (None, None) if server_key.is_none() => {}
        _ => {
            return Err(error::set_bad_config(
                "curve keys require both public and secret key",
            ))
        }
    }

    if config.num_topics > 0 {
        if config.topics.is_null() {
            return Err(error::set_null_ptr("topics"));
        }
        // SAFETY: Pointer and length are validated above and owned by caller for the call duration.
        let topics = unsafe { std::slice::from_raw_parts(config.topics, config.num_topics) };
        for &topic in topics {
            if topic.is_null() {
                return Err(error::set_null_ptr("topic"));
            }
            // SAFETY: Each topic is a caller-provided NUL-terminated C string.
            let bytes = unsafe { CStr::from_ptr(topic) }.to_bytes();
            out = out.with_topic(bytes);
        }
    }

    Ok(out)
}

/// Stream config with default timeouts, retries and backlog.
#[no_mangle]
pub extern "C" fn cipc_stream_config_default(
    host: *const c_char,
    port: c_int,
    mode: CipcMode,
) -> CipcStreamConfig {
    CipcStreamConfig {
        host,
        port,
        mode,
        sockopt_sndtimeo: DEFAULT_SEND_TIMEOUT_MS as c_int,
        sockopt_rcvtimeo: DEFAULT_RECV_TIMEOUT_MS as c_int,
        sockopt_retries: DEFAULT_CONNECT_RETRIES as c_int,
        backlog: DEFAULT_BACKLOG,
    }
}

/// Queue config with default timeouts and reconnect interval.
#[no_mangle]
pub extern "C" fn cipc_queue_config_default(
    address: *const c_char,
    socket_type: c_int,
    mode: CipcMode,
) -> CipcQueueConfig {
    CipcQueueConfig {
        address,
        socket_type,
        mode,
        sockopt_sndtimeo: DEFAULT_SEND_TIMEOUT_MS as c_int,
        sockopt_rcvtimeo: DEFAULT_RECV_TIMEOUT_MS as c_int,
        sockopt_linger: DEFAULT_LINGER_MS,
        sockopt_sndhwm: -1,
        sockopt_rcvhwm: -1,
        sockopt_reconnect_ivl: DEFAULT_RECONNECT_INTERVAL_MS,
        sockopt_reconnect_ivl_max: DEFAULT_RECONNECT_INTERVAL_MAX_MS,
        sockopt_ipv6: false,
        sockopt_tcp_keepalive: -1,
        sockopt_tcp_keepalive_idle: -1,
        sockopt_tcp_keepalive_cnt: -1,
        sockopt_tcp_keepalive_intvl: -1,
        sockopt_router_mandatory: false,
        sockopt_maxmsgsize: -1,
        identity: std::ptr::null(),
        identity_len: 0,
        curve_public_key: std::ptr::null(),
        curve_secret_key: std::ptr::null(),
        curve_server_key: std::ptr::null(),
        topics: std::ptr::null(),
        num_topics: 0,
    }
}

/// Request role, connecting.
#[no_mangle]
pub extern "C" fn cipc_queue_config_req(address: *const c_char) -> CipcQueueConfig {
    cipc_queue_config_default(address, CIPC_ZMQ_REQ, CipcMode::Connect)
}

/// Reply role, binding.
#[no_mangle]
pub extern "C" fn cipc_queue_config_rep(address: *const c_char) -> CipcQueueConfig {
    cipc_queue_config_default(address, CIPC_ZMQ_REP, CipcMode::Bind)
}

/// # Safety
/// `config` must be null or point to a writable `CipcQueueConfig`.
#[no_mangle]
pub unsafe extern "C" fn cipc_queue_config_set_sndtimeo(config: *mut CipcQueueConfig, value: c_int) {
    // SAFETY: Pointer validity is guaranteed by the caller.
    if let Some(config) = unsafe { config.as_mut() } {
        config.sockopt_sndtimeo = value;
    }
}

/// # Safety
/// `config` must be null or point to a writable `CipcQueueConfig`.
#[no_mangle]
pub unsafe extern "C" fn cipc_queue_config_set_rcvtimeo(config: *mut CipcQueueConfig, value: c_int) {
    // SAFETY: Pointer validity is guaranteed by the caller.
    if let Some(config) = unsafe { config.as_mut() } {
        config.sockopt_rcvtimeo = value;
    }
}

/// # Safety
/// `config` must be null or point to a writable `CipcQueueConfig`.
#[no_mangle]
pub unsafe extern "C" fn cipc_queue_config_set_reconnect_ivl_max(
    config: *mut CipcQueueConfig,
    value: c_int,
) {
    // SAFETY: Pointer validity is guaranteed by the caller.
    if let Some(config) = unsafe { config.as_mut() } {
        config.sockopt_reconnect_ivl_max = value;
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;

    #[test]
    fn stream_config_conversion() {
        let host = CString::new("127.0.0.1").unwrap();
        let mut raw = cipc_stream_config_default(host.as_ptr(), 7001, CipcMode::Connect);
        raw.sockopt_rcvtimeo = -1;
        raw.sockopt_retries = 5;

        let cfg = unsafe { stream_config_from_c(&raw) }.unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 7001);
        assert_eq!(cfg.mode, Mode::Connect);
        assert_eq!(cfg.send_timeout_ms, Some(DEFAULT_SEND_TIMEOUT_MS));
        assert_eq!(cfg.recv_timeout_ms, None);
        assert_eq!(cfg.retries, 5);
    }

    #[test]
    fn stream_config_rejects_bad_port_and_null_host() {
        let host = CString::new("127.0.0.1").unwrap();
        let raw = cipc_stream_config_default(host.as_ptr(), 70_000, CipcMode::Bind);
        assert_eq!(
            unsafe { stream_config_from_c(&raw) }.unwrap_err(),
            CipcErr::BadConfig
        );

        let raw = cipc_stream_config_default(std::ptr::null(), 7000, CipcMode::Bind);
        assert_eq!(
            unsafe { stream_config_from_c(&raw) }.unwrap_err(),
            CipcErr::NullPtr
        );
    }

    #[test]
    fn stream_config_rejects_negative_retries_and_backlog() {
        let host = CString::new("127.0.0.1").unwrap();
        let mut raw = cipc_stream_config_default(host.as_ptr(), 7000, CipcMode::Connect);
        raw.sockopt_retries = -1;
        assert_eq!(
            unsafe { stream_config_from_c(&raw) }.unwrap_err(),
            CipcErr::BadConfig
        );

        let mut raw = cipc_stream_config_default(host.as_ptr(), 7000, CipcMode::Bind);
        raw.backlog = -3;
        assert_eq!(
            unsafe { stream_config_from_c(&raw) }.unwrap_err(),
            CipcErr::BadConfig
        );

        raw.backlog = 0;
        assert_eq!(unsafe { stream_config_from_c(&raw) }.unwrap().backlog, 0);
    }

    #[test]
    fn queue_config_conversion_with_topics() {
        let address = CString::new("tcp://127.0.0.1:5556").unwrap();
        let alerts = CString::new("alerts").unwrap();
        let metrics = CString::new("metrics").unwrap();
        let topics = [alerts.as_ptr(), metrics.as_ptr()];

        let mut raw = cipc_queue_config_default(address.as_ptr(), CIPC_ZMQ_SUB, CipcMode::Connect);
        raw.topics = topics.as_ptr();
        raw.num_topics = topics.len();
        raw.sockopt_tcp_keepalive = 1;
        raw.sockopt_tcp_keepalive_idle = 30;
        unsafe { cipc_queue_config_set_reconnect_ivl_max(&mut raw, 2500) };

        let cfg = unsafe { queue_config_from_c(&raw) }.unwrap();
        assert_eq!(cfg.role, QueueRole::Sub);
        assert_eq!(cfg.subscriptions, vec![b"alerts".to_vec(), b"metrics".to_vec()]);
        assert_eq!(cfg.reconnect_interval_max_ms, Some(2500));
        assert_eq!(cfg.send_hwm, None);
        let keepalive = cfg.keepalive.unwrap();
        assert!(keepalive.enabled);
        assert_eq!(keepalive.idle_secs, Some(30));
        assert_eq!(keepalive.count, None);
    }

    #[test]
    fn req_and_rep_builders() {
        let address = CString::new("tcp://127.0.0.1:5555").unwrap();
        let req = cipc_queue_config_req(address.as_ptr());
        assert_eq!((req.socket_type, req.mode), (CIPC_ZMQ_REQ, CipcMode::Connect));
        let rep = cipc_queue_config_rep(address.as_ptr());
        assert_eq!((rep.socket_type, rep.mode), (CIPC_ZMQ_REP, CipcMode::Bind));
        assert_eq!(rep.sockopt_reconnect_ivl, 10);
    }

    #[test]
    fn unknown_socket_type_is_bad_config() {
        let address = CString::new("tcp://127.0.0.1:5555").unwrap();
        let raw = cipc_queue_config_default(address.as_ptr(), 42, CipcMode::Bind);
        assert_eq!(
            unsafe { queue_config_from_c(&raw) }.unwrap_err(),
            CipcErr::BadConfig
        );
    }

    #[test]
    fn half_curve_triple_is_bad_config() {
        let address = CString::new("tcp://127.0.0.1:5555").unwrap();
        let public = CString::new("rq:rM>}U?@Lns47E1%kR.o@n%FcmmsL/@{H8]yf7").unwrap();
        let mut raw = cipc_queue_config_req(address.as_ptr());
        raw.curve_public_key = public.as_ptr();
        assert_eq!(
            unsafe { queue_config_from_c(&raw) }.unwrap_err(),
            CipcErr::BadConfig
        );
    }
}
