//! Executes parsed commands.

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::Arc;

use tracing::debug;

use crate::command::{Command, CommandKind};

use super::{
    DISPATCH_TARGET, FileReader, FileWriter, OutputSink, ProcessRunner, StdoutSink, SystemFiles,
    SystemProcessRunner,
};

/// Largest chunk handed to the sink by a retrieve command. Chunks end at a
/// newline or at this size, whichever comes first.
pub const RETRIEVE_CHUNK_BYTES: usize = 1023;

/// Runs commands against the configured capabilities.
#[derive(Clone)]
pub struct CommandDispatcher {
    reader: Arc<dyn FileReader>,
    writer: Arc<dyn FileWriter>,
    runner: Arc<dyn ProcessRunner>,
    sink: Arc<dyn OutputSink>,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("CommandDispatcher").finish_non_exhaustive()
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::system()
    }
}

impl CommandDispatcher {
    /// Builds a dispatcher from explicit capabilities.
    pub fn new(
        reader: Arc<dyn FileReader>,
        writer: Arc<dyn FileWriter>,
        runner: Arc<dyn ProcessRunner>,
        sink: Arc<dyn OutputSink>,
    ) -> Self {
        Self {
            reader,
            writer,
            runner,
            sink,
        }
    }

    /// Dispatcher backed by the local filesystem, the platform shell and
    /// standard output.
    pub fn system() -> Self {
        Self::new(
            Arc::new(SystemFiles),
            Arc::new(SystemFiles),
            Arc::new(SystemProcessRunner),
            Arc::new(StdoutSink),
        )
    }

    /// Local sink receiving retrieved and captured output.
    pub fn sink(&self) -> &dyn OutputSink {
        self.sink.as_ref()
    }

    /// Executes `command`.
    ///
    /// Only [`CommandKind::Run`] produces a result: the captured output,
    /// which is empty when the command could not be started.
    pub fn dispatch(&self, command: &Command) -> Option<String> {
        debug!(
            target: DISPATCH_TARGET,
            kind = %command.kind(),
            argument_len = command.argument().len(),
            "dispatching command"
        );
        match command.kind() {
            CommandKind::Retrieve => {
                self.retrieve(command.argument());
                None
            }
            CommandKind::Store => {
                self.store(command.argument());
                None
            }
            CommandKind::Run => Some(self.run(command.argument())),
            CommandKind::Unknown => {
                debug!(
                    target: DISPATCH_TARGET,
                    keyword = command.keyword(),
                    "ignoring unknown command"
                );
                None
            }
        }
    }

    fn retrieve(&self, path: &str) {
        let file = match self.reader.open(path) {
            Ok(file) => file,
            Err(error) => {
                debug!(target: DISPATCH_TARGET, path, %error, "retrieve skipped");
                return;
            }
        };
        let mut reader = BufReader::new(file);
        let mut chunk = Vec::with_capacity(RETRIEVE_CHUNK_BYTES);
        loop {
            chunk.clear();
            let mut limited = Read::by_ref(&mut reader).take(RETRIEVE_CHUNK_BYTES as u64);
            match limited.read_until(b'\n', &mut chunk) {
                Ok(0) => break,
                Ok(_) => self.sink.retrieved(&chunk),
                Err(error) => {
                    debug!(target: DISPATCH_TARGET, path, %error, "retrieve interrupted");
                    break;
                }
            }
        }
    }

    fn store(&self, argument: &str) {
        let Some((path, body)) = argument.split_once(char::is_whitespace) else {
            debug!(target: DISPATCH_TARGET, "store skipped: no body separator");
            return;
        };
        let result = self
            .writer
            .create(path)
            .and_then(|mut file| file.write_all(body.as_bytes()).and_then(|()| file.flush()));
        if let Err(error) = result {
            debug!(target: DISPATCH_TARGET, path, %error, "store failed");
        }
    }

    fn run(&self, command_line: &str) -> String {
        match self.runner.run(command_line) {
            Ok(lines) => lines.collect(),
            Err(error) => {
                debug!(target: DISPATCH_TARGET, %error, "run failed to start");
                String::new()
            }
        }
    }
}
