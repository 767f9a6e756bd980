use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod config;
pub mod listen;
pub mod reply;
pub mod request;
pub mod send;
pub mod version;

/// Receive buffer size used when `--max-size` is not given.
pub const DEFAULT_MAX_SIZE: usize = 64 * 1024;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept one stream connection and print received messages.
    Listen(ListenArgs),
    /// Connect to a stream listener and send one message.
    Send(SendArgs),
    /// Bind a queue reply socket and echo requests.
    Reply(ReplyArgs),
    /// Connect a queue request socket, send one message and print the reply.
    Request(RequestArgs),
    /// Print the resolved default configuration for a transport.
    Config(ConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Reply(args) => reply::run(args, format),
        Command::Request(args) => request::run(args, format),
        Command::Config(args) => config::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Message body given on the command line.
#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// JSON payload, validated before sending.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "json"])]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        if let Some(json) = &self.json {
            serde_json::from_str::<serde_json::Value>(json).map_err(|err| {
                CliError::new(DATA_INVALID, format!("--json is not valid JSON: {err}"))
            })?;
            return Ok(json.as_bytes().to_vec());
        }
        if let Some(data) = &self.data {
            return Ok(data.as_bytes().to_vec());
        }
        if let Some(path) = &self.file {
            return fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
        }
        Err(CliError::new(
            USAGE,
            "one of --data, --json or --file is required",
        ))
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Local address to bind. `*` binds every interface.
    #[arg(long, env = "CIPC_HOST", default_value = "*")]
    pub host: String,
    /// Port to listen on.
    #[arg(long, short = 'p', env = "CIPC_PORT")]
    pub port: u16,
    /// Listen backlog.
    #[arg(long, default_value_t = cipc_transport::config::DEFAULT_BACKLOG)]
    pub backlog: i32,
    /// Send every received message back to the peer.
    #[arg(long)]
    pub echo: bool,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Largest message accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: usize,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Host to connect to.
    #[arg(long, env = "CIPC_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Port to connect to.
    #[arg(long, short = 'p', env = "CIPC_PORT")]
    pub port: u16,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Connect attempts after the first failed one.
    #[arg(long, default_value_t = cipc_transport::config::DEFAULT_CONNECT_RETRIES)]
    pub retries: u32,
    /// Wait for one reply and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the reply when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
    /// Largest reply accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: usize,
}

#[derive(Args, Debug)]
pub struct ReplyArgs {
    /// Queue endpoint to bind, e.g. tcp://*:5555.
    #[arg(long, short = 'a', env = "CIPC_ADDRESS")]
    pub address: String,
    /// Exit after answering N requests.
    #[arg(long)]
    pub count: Option<usize>,
    /// Largest request accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: usize,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Queue endpoint to connect to, e.g. tcp://127.0.0.1:5555.
    #[arg(long, short = 'a', env = "CIPC_ADDRESS")]
    pub address: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Maximum time to wait for the reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Largest reply accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: usize,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub target: ConfigTarget,
}

#[derive(Subcommand, Debug)]
pub enum ConfigTarget {
    /// Stream listener on every interface.
    StreamBind {
        #[arg(long, short = 'p', env = "CIPC_PORT")]
        port: u16,
    },
    /// Stream client.
    StreamConnect {
        #[arg(long, env = "CIPC_HOST", default_value = "127.0.0.1")]
        host: String,
        #[arg(long, short = 'p', env = "CIPC_PORT")]
        port: u16,
    },
    /// Queue request socket, connecting.
    QueueRequest {
        #[arg(long, short = 'a', env = "CIPC_ADDRESS")]
        address: String,
    },
    /// Queue reply socket, binding.
    QueueReply {
        #[arg(long, short = 'a', env = "CIPC_ADDRESS")]
        address: String,
    },
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Millisecond timeout for a transport config.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
