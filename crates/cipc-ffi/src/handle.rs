use std::ffi::c_void;
use std::os::raw::c_char;

use cipc_transport::{Handle, TransportConfig, TransportKind};

use crate::config;
use crate::error;
use crate::types::{CipcErr, CipcHandle, CipcProtocol, CipcQueueConfig, CipcStreamConfig};

fn with_handle_mut(handle: *mut CipcHandle, f: impl FnOnce(&mut Handle) -> CipcErr) -> CipcErr {
    if handle.is_null() {
        return error::set_null_ptr("handle");
    }

    let handle_ref = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *handle }
    };

    f(&mut handle_ref.handle)
}

fn protocol_kind(protocol: CipcProtocol) -> TransportKind {
    match protocol {
        CipcProtocol::Zmq => TransportKind::Queue,
        CipcProtocol::Tcp => TransportKind::Stream,
        CipcProtocol::Grpc => TransportKind::Rpc,
    }
}

/// Allocate an uninitialized handle for `protocol`.
///
/// Returns null for protocols without a backend.
#[no_mangle]
pub extern "C" fn cipc_create(protocol: CipcProtocol) -> *mut CipcHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        match cipc_transport::create(protocol_kind(protocol)) {
            Some(handle) => Box::into_raw(Box::new(CipcHandle { handle })),
            None => {
                error::set_error_message(format!("protocol {protocol:?} is not implemented"));
                std::ptr::null_mut()
            }
        }
    })
}

/// Establish the handle's channel.
///
/// # Safety
/// `handle` must be a handle returned by `cipc_create`. `config` must point to a
/// `CipcStreamConfig` for TCP handles or a `CipcQueueConfig` for ZMQ handles,
/// with its pointer fields valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn cipc_init(handle: *mut CipcHandle, config: *const c_void) -> CipcErr {
    crate::ffi_boundary(CipcErr::Internal, || {
        error::clear_error_state();

        if config.is_null() {
            return error::set_null_ptr("config");
        }

        with_handle_mut(handle, |handle| {
            let parsed: Result<TransportConfig, CipcErr> = match handle.kind() {
                TransportKind::Stream => {
                    // SAFETY: Caller passes a CipcStreamConfig for TCP handles.
                    let raw = unsafe { &*(config as *const CipcStreamConfig) };
                    // SAFETY: Forwarded caller guarantee on pointer fields.
                    unsafe { config::stream_config_from_c(raw) }.map(Into::into)
                }
                TransportKind::Queue => {
                    // SAFETY: Caller passes a CipcQueueConfig for ZMQ handles.
                    let raw = unsafe { &*(config as *const CipcQueueConfig) };
                    // SAFETY: Forwarded caller guarantee on pointer fields.
                    unsafe { config::queue_config_from_c(raw) }.map(Into::into)
                }
                TransportKind::Rpc => Err(error::set_bad_config("rpc transport is reserved")),
            };

            let parsed = match parsed {
                Ok(cfg) => cfg,
                Err(code) => return code,
            };

            match handle.init(&parsed) {
                Ok(()) => CipcErr::Ok,
                Err(err) => error::map_transport_error(&err),
            }
        })
    })
}

/// Send `len` bytes from `data`.
///
/// # Safety
/// `handle` must be a valid handle. `data` must be non-null and readable for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn cipc_send(
    handle: *mut CipcHandle,
    data: *const c_char,
    len: usize,
) -> CipcErr {
    crate::ffi_boundary(CipcErr::Internal, || {
        error::clear_error_state();

        if data.is_null() {
            return error::set_null_ptr("data");
        }

        with_handle_mut(handle, |handle| {
            // SAFETY: Caller guarantees `data` is readable for `len` bytes.
            let payload = unsafe { std::slice::from_raw_parts(data as *const u8, len) };
            match handle.send(payload) {
                Ok(()) => CipcErr::Ok,
                Err(err) => error::map_transport_error(&err),
            }
        })
    })
}

/// Receive at most `capacity - 1` bytes into `buf` and zero-terminate it.
///
/// The stored byte count is written to `len_out` when it is non-null.
///
/// # Safety
/// `handle` must be a valid handle. `buf` must be non-null and writable for
/// `capacity` bytes. `len_out` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn cipc_recv(
    handle: *mut CipcHandle,
    buf: *mut c_char,
    capacity: usize,
    len_out: *mut usize,
) -> CipcErr {
    crate::ffi_boundary(CipcErr::Internal, || {
        error::clear_error_state();

        if buf.is_null() {
            return error::set_null_ptr("buf");
        }

        with_handle_mut(handle, |handle| {
            // SAFETY: Caller guarantees `buf` is writable for `capacity` bytes.
            let out = unsafe { std::slice::from_raw_parts_mut(buf as *mut u8, capacity) };
            match handle.recv(out) {
                Ok(n) => {
                    // SAFETY: Caller guarantees `len_out` is null or writable.
                    if let Some(len_out) = unsafe { len_out.as_mut() } {
                        *len_out = n;
                    }
                    CipcErr::Ok
                }
                Err(err) => error::map_transport_error(&err),
            }
        })
    })
}

/// Release the handle's channel and free it.
///
/// # Safety
/// `handle` must be null or a handle previously returned by `cipc_create`,
/// not already freed.
#[no_mangle]
pub unsafe extern "C" fn cipc_free(handle: *mut CipcHandle) {
    crate::ffi_boundary((), || {
        if handle.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by cipc_create.
        let boxed = unsafe { Box::from_raw(handle) };
        boxed.handle.release();
    });
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::config::cipc_stream_config_default;
    use crate::types::CipcMode;

    fn last_error() -> String {
        // SAFETY: cipc_last_error returns a pointer to a thread-local CString.
        unsafe { CStr::from_ptr(crate::cipc_last_error()) }
            .to_string_lossy()
            .into_owned()
    }

    fn free_port() -> u16 {
        TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[test]
    fn grpc_is_not_implemented() {
        assert!(cipc_create(CipcProtocol::Grpc).is_null());
        assert!(last_error().contains("not implemented"));
    }

    #[test]
    fn null_arguments_report_null_ptr() {
        let mut buf = [0 as c_char; 8];
        unsafe {
            assert_eq!(
                cipc_send(std::ptr::null_mut(), c"x".as_ptr(), 1),
                CipcErr::NullPtr
            );
            assert_eq!(
                cipc_recv(std::ptr::null_mut(), buf.as_mut_ptr(), 8, std::ptr::null_mut()),
                CipcErr::NullPtr
            );
            assert_eq!(
                cipc_init(std::ptr::null_mut(), std::ptr::null()),
                CipcErr::NullPtr
            );
            cipc_free(std::ptr::null_mut());
        }
        assert!(last_error().contains("cannot be null"));
    }

    #[test]
    fn send_before_init_is_null_ptr() {
        let handle = cipc_create(CipcProtocol::Tcp);
        assert!(!handle.is_null());
        unsafe {
            assert_eq!(cipc_send(handle, c"x".as_ptr(), 1), CipcErr::NullPtr);
            cipc_free(handle);
        }
    }

    #[test]
    fn stream_round_trip_through_c_api() {
        let port = free_port();

        let server = thread::spawn(move || {
            let host = CString::new("127.0.0.1").unwrap();
            let cfg = cipc_stream_config_default(host.as_ptr(), port as i32, CipcMode::Bind);
            let handle = cipc_create(CipcProtocol::Tcp);
            let mut buf = [0 as c_char; 64];
            let mut len = 0usize;
            unsafe {
                assert_eq!(
                    cipc_init(handle, &cfg as *const _ as *const c_void),
                    CipcErr::Ok
                );
                assert_eq!(
                    cipc_recv(handle, buf.as_mut_ptr(), buf.len(), &mut len),
                    CipcErr::Ok
                );
                assert_eq!(cipc_send(handle, c"pong".as_ptr(), 4), CipcErr::Ok);
                cipc_free(handle);
            }
            let text = unsafe { CStr::from_ptr(buf.as_ptr()) };
            (text.to_bytes().to_vec(), len)
        });

        let host = CString::new("127.0.0.1").unwrap();
        let mut cfg = cipc_stream_config_default(host.as_ptr(), port as i32, CipcMode::Connect);
        cfg.sockopt_retries = 10;
        let handle = cipc_create(CipcProtocol::Tcp);
        let mut buf = [0 as c_char; 64];
        let mut len = 0usize;
        unsafe {
            assert_eq!(
                cipc_init(handle, &cfg as *const _ as *const c_void),
                CipcErr::Ok
            );
            assert_eq!(cipc_send(handle, c"ping".as_ptr(), 4), CipcErr::Ok);
            assert_eq!(
                cipc_recv(handle, buf.as_mut_ptr(), buf.len(), &mut len),
                CipcErr::Ok
            );
            cipc_free(handle);
        }
        assert_eq!(len, 4);
        assert_eq!(unsafe { CStr::from_ptr(buf.as_ptr()) }.to_bytes(), b"pong");

        let (received, server_len) = server.join().unwrap();
        assert_eq!(received, b"ping");
        assert_eq!(server_len, 4);
    }

    #[test]
    fn bad_address_maps_to_tcp_address_code() {
        let host = CString::new("not-an-ip").unwrap();
        let cfg = cipc_stream_config_default(host.as_ptr(), 9, CipcMode::Connect);
        let handle = cipc_create(CipcProtocol::Tcp);
        unsafe {
            assert_eq!(
                cipc_init(handle, &cfg as *const _ as *const c_void),
                CipcErr::BadTcpAddress
            );
            cipc_free(handle);
        }
        assert!(!last_error().is_empty());
    }
}
