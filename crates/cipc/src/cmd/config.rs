use cipc_transport::{QueueConfig, StreamConfig, TransportConfig};

use crate::cmd::{ConfigArgs, ConfigTarget};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub fn run(args: ConfigArgs, format: OutputFormat) -> CliResult<i32> {
    print_value(&resolve(args.target), format);
    Ok(SUCCESS)
}

fn resolve(target: ConfigTarget) -> TransportConfig {
    match target {
        ConfigTarget::StreamBind { port } => StreamConfig::bind(port).into(),
        ConfigTarget::StreamConnect { host, port } => StreamConfig::connect(host, port).into(),
        ConfigTarget::QueueRequest { address } => QueueConfig::request(address).into(),
        ConfigTarget::QueueReply { address } => QueueConfig::reply(address).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_bind_uses_wildcard_host() {
        let json = serde_json::to_value(resolve(ConfigTarget::StreamBind { port: 7000 })).unwrap();
        assert_eq!(json["transport"], "stream");
        assert_eq!(json["host"], "*");
        assert_eq!(json["mode"], "bind");
        assert_eq!(json["backlog"], 1);
    }

    #[test]
    fn queue_request_connects_as_req() {
        let json = serde_json::to_value(resolve(ConfigTarget::QueueRequest {
            address: "tcp://127.0.0.1:5555".to_string(),
        }))
        .unwrap();
        assert_eq!(json["transport"], "queue");
        assert_eq!(json["role"], "req");
        assert_eq!(json["mode"], "connect");
        assert_eq!(json["send_timeout_ms"], 5000);
    }
}
