use cipc_transport::{create, QueueConfig, TransportConfig, TransportKind};
use tracing::debug;

use crate::cmd::{duration_ms, parse_duration, RequestArgs};
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: RequestArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = duration_ms(parse_duration(&args.timeout)?);
    let payload = args.payload.resolve()?;

    let config: TransportConfig = QueueConfig::request(&args.address)
        .with_send_timeout(Some(timeout))
        .with_recv_timeout(Some(timeout))
        .into();
    let mut handle = create(TransportKind::Queue)
        .ok_or_else(|| CliError::new(INTERNAL, "queue transport unavailable"))?;
    handle
        .init(&config)
        .map_err(|err| transport_error("connect failed", err))?;
    debug!(address = %args.address, "request socket connected");

    handle
        .send(&payload)
        .map_err(|err| transport_error("send failed", err))?;
    let reply = handle
        .recv_vec(args.max_size.saturating_add(1))
        .map_err(|err| transport_error("receive failed", err))?;
    print_message(&reply, TransportKind::Queue, &args.address, format);

    handle.release();
    Ok(SUCCESS)
}
