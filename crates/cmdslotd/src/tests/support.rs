//! Shared test doubles and helpers.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::dispatch::{
    CommandDispatcher, OutputSink, ProcessOutput, ProcessRunner, SystemFiles,
};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Sink that records everything it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    chunks: Mutex<Vec<Vec<u8>>>,
    outputs: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub(crate) fn chunks(&self) -> Vec<Vec<u8>> {
        self.chunks.lock().expect("chunks lock").clone()
    }

    pub(crate) fn outputs(&self) -> Vec<String> {
        self.outputs.lock().expect("outputs lock").clone()
    }
}

impl OutputSink for RecordingSink {
    fn retrieved(&self, chunk: &[u8]) {
        self.chunks.lock().expect("chunks lock").push(chunk.to_vec());
    }

    fn command_output(&self, output: &str) {
        self.outputs
            .lock()
            .expect("outputs lock")
            .push(output.to_string());
    }
}

/// Process runner with canned behaviour.
#[derive(Debug, Clone)]
pub(crate) enum ScriptedRunner {
    /// Every command prints these lines.
    Lines(Vec<String>),
    /// Every command prints `<command-line> ran`.
    Echo,
    /// Every command fails to start.
    Failing,
}

impl ScriptedRunner {
    pub(crate) fn lines(lines: &[&str]) -> Self {
        Self::Lines(lines.iter().map(ToString::to_string).collect())
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command_line: &str) -> io::Result<ProcessOutput> {
        match self {
            Self::Lines(lines) => Ok(Box::new(lines.clone().into_iter())),
            Self::Echo => Ok(Box::new(std::iter::once(format!("{command_line} ran\n")))),
            Self::Failing => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}

/// Dispatcher using the real filesystem, a scripted runner and a recording
/// sink.
pub(crate) fn dispatcher_with(sink: Arc<RecordingSink>, runner: ScriptedRunner) -> CommandDispatcher {
    CommandDispatcher::new(
        Arc::new(SystemFiles),
        Arc::new(SystemFiles),
        Arc::new(runner),
        sink,
    )
}

/// Polls `condition` for up to two seconds.
pub(crate) fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + CLIENT_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

/// Blocking protocol client for loopback tests.
pub(crate) struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    pub(crate) fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect client");
        stream
            .set_read_timeout(Some(CLIENT_TIMEOUT))
            .expect("set read timeout");
        Self { stream }
    }

    /// Sends one record and returns the acknowledgement.
    pub(crate) fn exchange(&mut self, record: &str) -> Vec<u8> {
        self.stream
            .write_all(record.as_bytes())
            .expect("send record");
        let mut ack = Vec::new();
        let mut buffer = [0_u8; 512];
        while !ack.ends_with(record.as_bytes()) {
            let read = self.stream.read(&mut buffer).expect("read acknowledgement");
            if read == 0 {
                break;
            }
            ack.extend_from_slice(&buffer[..read]);
        }
        ack
    }

    /// True when the server has closed the connection without a reply.
    pub(crate) fn closed_by_server(&mut self) -> bool {
        let mut buffer = [0_u8; 16];
        match self.stream.read(&mut buffer) {
            Ok(0) => true,
            Ok(_) => false,
            Err(error) => error.kind() == io::ErrorKind::ConnectionReset,
        }
    }
}
