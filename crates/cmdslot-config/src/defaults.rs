/// Port used when none is supplied on the command line.
pub const DEFAULT_PORT: u16 = 8080;

/// Interface the server binds to unless `--host` says otherwise.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Number of connection slots available to concurrent peers.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Size of the per-connection receive buffer in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// `tracing` filter directive applied when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";
