//! Structured reporting of server lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use cmdslot_config::Config;

use crate::server::ServerError;
use crate::shutdown::ShutdownCause;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Observer for server lifecycle events.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before the endpoint is bound.
    fn starting(&self, config: &Config);

    /// Invoked once the accept loop is running on `local_addr`.
    fn listening(&self, config: &Config, local_addr: SocketAddr);

    /// Invoked when startup or shutdown fails.
    fn failed(&self, error: &ServerError);

    /// Invoked when the server has been told to stop.
    fn stopping(&self, cause: ShutdownCause);

    /// Invoked after the accept loop has exited.
    fn stopped(&self);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn starting(&self, config: &Config) {
        (**self).starting(config);
    }

    fn listening(&self, config: &Config, local_addr: SocketAddr) {
        (**self).listening(config, local_addr);
    }

    fn failed(&self, error: &ServerError) {
        (**self).failed(error);
    }

    fn stopping(&self, cause: ShutdownCause) {
        (**self).stopping(cause);
    }

    fn stopped(&self) {
        (**self).stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl LifecycleReporter for StructuredLifecycleReporter {
    fn starting(&self, config: &Config) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "server_starting",
            address = %config.listen(),
            "starting command server"
        );
    }

    fn listening(&self, config: &Config, local_addr: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "server_listening",
            address = %local_addr,
            max_connections = config.max_connections(),
            buffer_size = config.buffer_size(),
            "command server listening"
        );
    }

    fn failed(&self, error: &ServerError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "server_failed",
            error = %error,
            "command server failed"
        );
    }

    fn stopping(&self, cause: ShutdownCause) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "server_stopping",
            %cause,
            "no longer accepting connections"
        );
    }

    fn stopped(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "server_stopped",
            "command server stopped"
        );
    }
}
