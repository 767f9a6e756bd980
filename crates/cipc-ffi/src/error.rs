use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use cipc_transport::{ErrorKind, TransportError};

use crate::types::CipcErr;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::new("").expect("empty CString should be valid"));
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new("").expect("empty CString should be valid");
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized)
            .unwrap_or_else(|_| CString::new("internal error").expect("literal is valid"));
    });
}

pub(crate) fn set_null_ptr(name: &str) -> CipcErr {
    set_error_message(format!("{name} cannot be null"));
    CipcErr::NullPtr
}

pub(crate) fn set_bad_config(message: impl Into<String>) -> CipcErr {
    set_error_message(message);
    CipcErr::BadConfig
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_transport_error(err: &TransportError) -> CipcErr {
    set_error_message(err.to_string());
    CipcErr::from(err.kind())
}

impl From<ErrorKind> for CipcErr {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Alloc => CipcErr::BadAlloc,
            ErrorKind::QueueContext => CipcErr::BadZmqContext,
            ErrorKind::QueueSocket => CipcErr::BadZmqSocket,
            ErrorKind::QueueBind => CipcErr::BadZmqBind,
            ErrorKind::QueueConnect => CipcErr::BadZmqConnect,
            ErrorKind::QueueSend => CipcErr::BadZmqSend,
            ErrorKind::QueueRecv => CipcErr::BadZmqRecv,
            ErrorKind::StreamSocket => CipcErr::BadTcpSocket,
            ErrorKind::StreamBind => CipcErr::BadTcpBind,
            ErrorKind::StreamListen => CipcErr::BadTcpListen,
            ErrorKind::StreamAddress => CipcErr::BadTcpAddress,
            ErrorKind::StreamConnect => CipcErr::BadTcpConnect,
            ErrorKind::StreamSend => CipcErr::BadTcpSend,
            ErrorKind::StreamRecv => CipcErr::BadTcpRecv,
            ErrorKind::StreamOption => CipcErr::BadTcpSocketOpt,
            ErrorKind::NullArgument => CipcErr::NullPtr,
            ErrorKind::QueueOption => CipcErr::BadZmqSocketOpt,
            ErrorKind::InvalidConfig => CipcErr::BadConfig,
            ErrorKind::AlreadyInitialized => CipcErr::AlreadyInitialized,
        }
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
