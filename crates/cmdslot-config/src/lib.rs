//! Shared configuration for the `cmdslotd` command server.
//!
//! Settings are resolved from command-line arguments first, then from
//! `CMDSLOT_*` environment variables, and finally from the `DEFAULT_*`
//! constants. The only positional argument is the listening port so the
//! binary keeps the familiar `cmdslotd [PORT]` invocation; the remaining
//! settings are optional tuning flags.

mod defaults;
mod endpoint;
mod logging;

use std::ffi::OsString;

use clap::Parser;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BUFFER_SIZE, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT,
};
pub use endpoint::ListenAddress;
pub use logging::{LogFormat, LogFormatParseError, LogSettings};

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// TCP address the accept loop binds to.
    pub listen: ListenAddress,
    /// Number of connection slots, and so the number of concurrent peers.
    pub max_connections: usize,
    /// Size of each worker's receive buffer in bytes.
    pub buffer_size: usize,
    /// Log filter and format.
    pub logging: LogSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenAddress::new(DEFAULT_HOST, DEFAULT_PORT),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            logging: LogSettings::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the `clap` error when arguments fail to parse, including the
    /// synthetic errors raised for `--help` and `--version`.
    pub fn load() -> Result<Self, clap::Error> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list. The first item is
    /// treated as the binary name.
    ///
    /// # Errors
    ///
    /// Returns the `clap` error when arguments fail to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        CliArgs::try_parse_from(args).map(Self::from)
    }

    /// Address the server listens on.
    pub fn listen(&self) -> &ListenAddress {
        &self.listen
    }

    /// Number of connection slots.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Receive buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Log filter and format.
    pub fn logging(&self) -> &LogSettings {
        &self.logging
    }
}

/// Command-line surface of `cmdslotd`.
#[derive(Parser, Debug)]
#[command(
    name = "cmdslotd",
    version,
    about = "Connection-slotted command server"
)]
struct CliArgs {
    /// TCP port to listen on.
    #[arg(value_name = "PORT", env = "CMDSLOT_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Interface address to bind when listening on TCP.
    #[arg(long, env = "CMDSLOT_HOST", default_value = DEFAULT_HOST)]
    host: String,
    /// Maximum number of simultaneously connected peers.
    #[arg(
        long,
        env = "CMDSLOT_MAX_CONNECTIONS",
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        value_parser = parse_positive
    )]
    max_connections: usize,
    /// Receive buffer size per connection, in bytes.
    #[arg(
        long,
        env = "CMDSLOT_BUFFER_SIZE",
        default_value_t = DEFAULT_BUFFER_SIZE,
        value_parser = parse_positive
    )]
    buffer_size: usize,
    /// `tracing` filter directive, for example `cmdslotd=debug`.
    #[arg(long, env = "CMDSLOT_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,
    /// Log output format (`json` or `compact`).
    #[arg(long, env = "CMDSLOT_LOG_FORMAT", default_value_t = LogFormat::default())]
    log_format: LogFormat,
}

impl From<CliArgs> for Config {
    fn from(args: CliArgs) -> Self {
        Self {
            listen: ListenAddress::new(args.host, args.port),
            max_connections: args.max_connections,
            buffer_size: args.buffer_size,
            logging: LogSettings::new(args.log_filter, args.log_format),
        }
    }
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("value must be at least 1".to_string()),
        Ok(parsed) => Ok(parsed),
        Err(error) => Err(error.to_string()),
    }
}
