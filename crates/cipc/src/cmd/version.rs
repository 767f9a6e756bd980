use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("cipc {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: cipc");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("CIPC_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "transports: stream=true, queue={}, rpc=false",
        cfg!(feature = "queue")
    );
    if cfg!(feature = "queue") {
        let (major, minor, patch) = zmq_version();
        println!("libzmq: {major}.{minor}.{patch}");
    }

    Ok(SUCCESS)
}

#[cfg(feature = "queue")]
fn zmq_version() -> (i32, i32, i32) {
    cipc_transport::queue::library_version()
}

#[cfg(not(feature = "queue"))]
fn zmq_version() -> (i32, i32, i32) {
    (0, 0, 0)
}
