use cipc_transport::{create, StreamConfig, TransportConfig, TransportKind};
use tracing::info;

use crate::cmd::{duration_ms, parse_duration, SendArgs};
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let payload = args.payload.resolve()?;

    let config: TransportConfig = StreamConfig::connect(&args.host, args.port)
        .with_retries(args.retries)
        .with_recv_timeout(Some(duration_ms(wait_timeout)))
        .into();
    let endpoint = format!("tcp://{}:{}", args.host, args.port);

    let mut handle = create(TransportKind::Stream)
        .ok_or_else(|| CliError::new(INTERNAL, "stream transport unavailable"))?;
    handle
        .init(&config)
        .map_err(|err| transport_error("connect failed", err))?;
    info!(%endpoint, "connected");

    handle
        .send(&payload)
        .map_err(|err| transport_error("send failed", err))?;

    if args.wait {
        let reply = handle
            .recv_vec(args.max_size.saturating_add(1))
            .map_err(|err| transport_error("receive failed", err))?;
        print_message(&reply, TransportKind::Stream, &endpoint, format);
    }

    handle.release();
    Ok(SUCCESS)
}
