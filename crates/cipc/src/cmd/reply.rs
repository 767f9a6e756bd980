use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cipc_transport::{create, QueueConfig, TransportConfig, TransportKind};
use tracing::info;

use crate::cmd::listen::install_ctrlc_handler;
use crate::cmd::ReplyArgs;
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

const POLL_INTERVAL_MS: u64 = 250;

pub fn run(args: ReplyArgs, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config: TransportConfig = QueueConfig::reply(&args.address)
        .with_recv_timeout(Some(POLL_INTERVAL_MS))
        .into();
    let mut handle = create(TransportKind::Queue)
        .ok_or_else(|| CliError::new(INTERNAL, "queue transport unavailable"))?;
    handle
        .init(&config)
        .map_err(|err| transport_error("bind failed", err))?;
    info!(address = %args.address, "reply socket bound");

    let capacity = args.max_size.saturating_add(1);
    let mut answered = 0usize;

    while running.load(Ordering::SeqCst) {
        let request = match handle.recv_vec(capacity) {
            Ok(request) => request,
            Err(err) if err.is_timeout() => continue,
            Err(err) => return Err(transport_error("receive failed", err)),
        };

        print_message(&request, TransportKind::Queue, &args.address, format);
        handle
            .send(&request)
            .map_err(|err| transport_error("reply failed", err))?;

        answered = answered.saturating_add(1);
        if args.count.is_some_and(|count| answered >= count) {
            break;
        }
    }

    handle.release();
    Ok(SUCCESS)
}
