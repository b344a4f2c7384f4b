use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Runtime configuration for the `users-tonic-server` binary.
///
/// Every value can be supplied as a CLI flag or through the environment (a
/// `.env` file is loaded first). Defaults match the demo setup: plain TCP on
/// port 9090 and no artificial delay between streamed users.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "users-tonic-server",
    version,
    about = "A gRPC user directory demonstrating every streaming shape"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix
    /// socket).
    ///
    /// Example: "0.0.0.0:9090" or "/tmp/users-tonic.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:9090"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a
    /// file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// Capacity of the channel between a stream's feeder task and the gRPC
    /// response.
    ///
    /// Lower values make a slow consumer push back sooner; higher values let
    /// the feeder run further ahead.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 16)]
    pub stream_buffer_size: usize,

    /// Delay, in milliseconds, between users emitted by `ListUsers`.
    ///
    /// Purely illustrative: makes the server stream visible to a human
    /// watching the client. `0` disables it.
    ///
    /// Environment variable: `LIST_PACING_MS`
    #[arg(long, env = "LIST_PACING_MS", default_value_t = 0)]
    pub list_pacing_ms: u64,

    /// Seconds to wait for in-flight streams to drain on shutdown before
    /// they are cancelled.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub stream_buffer_size: usize,
    pub list_pacing: Duration,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            stream_buffer_size: args.stream_buffer_size,
            list_pacing: Duration::from_millis(args.list_pacing_ms),
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}
