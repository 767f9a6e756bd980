use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cipc_transport::{create, Mode, StreamConfig, TransportConfig, TransportError, TransportKind};
use tracing::{debug, info};

use crate::cmd::ListenArgs;
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

/// Receive timeout used to notice Ctrl-C between messages.
const POLL_INTERVAL_MS: u64 = 250;

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config: TransportConfig = StreamConfig::new(&args.host, args.port, Mode::Bind)
        .with_backlog(args.backlog)
        .with_recv_timeout(Some(POLL_INTERVAL_MS))
        .into();
    let endpoint = format!("tcp://{}:{}", args.host, args.port);
    let capacity = args.max_size.saturating_add(1);
    let mut received = 0usize;

    // Each handle accepts exactly one peer, so rebind after every disconnect.
    while running.load(Ordering::SeqCst) {
        let mut handle = create(TransportKind::Stream)
            .ok_or_else(|| CliError::new(INTERNAL, "stream transport unavailable"))?;
        info!(%endpoint, "waiting for connection");
        match handle.init(&config) {
            Ok(()) => {}
            // The receive timeout also bounds accept; rebind and recheck Ctrl-C.
            Err(err) if err.is_timeout() => continue,
            Err(err) => return Err(transport_error("bind failed", err)),
        }

        while running.load(Ordering::SeqCst) {
            let payload = match handle.recv_vec(capacity) {
                Ok(payload) => payload,
                Err(err) if err.is_timeout() => continue,
                Err(TransportError::StreamClosed) => {
                    debug!(%endpoint, "peer disconnected");
                    break;
                }
                Err(err) => return Err(transport_error("receive failed", err)),
            };

            print_message(&payload, TransportKind::Stream, &endpoint, format);
            if args.echo {
                handle
                    .send(&payload)
                    .map_err(|err| transport_error("echo failed", err))?;
            }

            received = received.saturating_add(1);
            if args.count.is_some_and(|count| received >= count) {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
