//! cipc-ffi: C-ABI exports for the cipc transport handle.

mod config;
mod error;
mod handle;
mod types;

use std::panic::AssertUnwindSafe;

pub use config::{
    cipc_queue_config_default, cipc_queue_config_rep, cipc_queue_config_req,
    cipc_queue_config_set_rcvtimeo, cipc_queue_config_set_reconnect_ivl_max,
    cipc_queue_config_set_sndtimeo, cipc_stream_config_default,
};
pub use handle::{cipc_create, cipc_free, cipc_init, cipc_recv, cipc_send};
pub use types::{
    CipcErr, CipcHandle, CipcMode, CipcProtocol, CipcQueueConfig, CipcStreamConfig,
    CIPC_ZMQ_DEALER, CIPC_ZMQ_PAIR, CIPC_ZMQ_PUB, CIPC_ZMQ_PULL, CIPC_ZMQ_PUSH, CIPC_ZMQ_REP,
    CIPC_ZMQ_REQ, CIPC_ZMQ_ROUTER, CIPC_ZMQ_SUB, CIPC_ZMQ_XPUB, CIPC_ZMQ_XSUB,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Message describing the last failure on the calling thread.
///
/// The pointer stays valid until the next cipc call on the same thread.
#[no_mangle]
pub extern "C" fn cipc_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    #[test]
    fn last_error_is_empty_after_success() {
        let handle = cipc_create(CipcProtocol::Tcp);
        assert!(!handle.is_null());
        let ptr = cipc_last_error();
        assert!(!ptr.is_null());

        // SAFETY: cipc_last_error returns a pointer to a thread-local CString.
        let text = unsafe { CStr::from_ptr(ptr).to_str().unwrap() };
        assert!(text.is_empty());

        // SAFETY: handle came from cipc_create.
        unsafe { cipc_free(handle) };
    }

    #[test]
    fn panics_are_contained() {
        let code = ffi_boundary(CipcErr::Internal, || panic!("boom"));
        assert_eq!(code, CipcErr::Internal);
        // SAFETY: cipc_last_error returns a pointer to a thread-local CString.
        let text = unsafe { CStr::from_ptr(cipc_last_error()) };
        assert!(text.to_str().unwrap().contains("panic"));
    }
}
