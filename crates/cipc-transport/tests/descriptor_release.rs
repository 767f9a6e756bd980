//! Runs as its own test binary so the descriptor count is not disturbed by
//! other tests.
#![cfg(target_os = "linux")]

use std::net::TcpListener;

use cipc_transport::{create, ErrorKind, StreamConfig, TransportKind};

fn open_descriptors() -> usize {
    std::fs::read_dir("/proc/self/fd")
        .expect("procfs should be available")
        .count()
}

#[test]
fn failed_init_leaves_no_descriptor_behind() {
    let occupied = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind should succeed");
    let port = occupied
        .local_addr()
        .expect("listener should have a local address")
        .port();

    let before = open_descriptors();

    // Socket created, bind fails.
    let mut handle = create(TransportKind::Stream).expect("stream backend exists");
    let err = handle
        .init(&StreamConfig::bind(port).with_host("127.0.0.1").into())
        .expect_err("port is taken");
    assert_eq!(err.kind(), ErrorKind::StreamBind);
    handle.release();
    assert_eq!(open_descriptors(), before);

    // Socket created, option fails.
    let mut handle = create(TransportKind::Stream).expect("stream backend exists");
    let err = handle
        .init(
            &StreamConfig::connect("127.0.0.1", port)
                .with_recv_timeout(Some(0))
                .into(),
        )
        .expect_err("zero timeout is rejected");
    assert_eq!(err.kind(), ErrorKind::StreamOption);
    drop(handle);
    assert_eq!(open_descriptors(), before);

    // Every connect attempt fails.
    drop(occupied);
    let before = open_descriptors();
    let mut handle = create(TransportKind::Stream).expect("stream backend exists");
    let err = handle
        .init(&StreamConfig::connect("127.0.0.1", port).with_retries(1).into())
        .expect_err("nothing listens");
    assert_eq!(err.kind(), ErrorKind::StreamConnect);
    handle.release();
    assert_eq!(open_descriptors(), before);
}
