//! Local destination for retrieved file contents and captured process output.

use std::io::{self, Write};

use tracing::debug;

use super::DISPATCH_TARGET;

/// Receives output that stays on the server rather than going to the peer.
pub trait OutputSink: Send + Sync {
    /// Called once per chunk read by a retrieve command.
    fn retrieved(&self, chunk: &[u8]);

    /// Called with the full captured output of a run command.
    fn command_output(&self, output: &str);
}

/// Sink that prints to the server's standard output.
///
/// Retrieved chunks are prefixed with `Sending: ` and each captured output
/// line with `Result: `.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn retrieved(&self, chunk: &[u8]) {
        let mut stdout = io::stdout().lock();
        report(
            stdout
                .write_all(b"Sending: ")
                .and_then(|()| stdout.write_all(chunk))
                .and_then(|()| stdout.flush()),
        );
    }

    fn command_output(&self, output: &str) {
        let mut stdout = io::stdout().lock();
        for line in output.split_inclusive('\n') {
            if let Err(error) = write!(stdout, "Result: {line}") {
                report(Err(error));
                return;
            }
        }
        report(stdout.flush());
    }
}

fn report(result: io::Result<()>) {
    if let Err(error) = result {
        debug!(target: DISPATCH_TARGET, %error, "failed to write to local sink");
    }
}
