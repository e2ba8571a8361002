//! Behavioural tests for command dispatch through a live connection.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use cmdslot_config::{Config, ListenAddress};

use crate::server::{Server, ServerHandle};
use crate::worker::compose_ack;

use super::support::{RecordingSink, ScriptedRunner, TestClient, dispatcher_with};

struct DispatchWorld {
    workspace: TempDir,
    sink: Arc<RecordingSink>,
    server: Option<ServerHandle>,
    client: Option<TestClient>,
    last_record: Option<String>,
    last_ack: Option<Vec<u8>>,
}

impl DispatchWorld {
    fn new() -> Self {
        Self {
            workspace: TempDir::new().expect("temp dir"),
            sink: Arc::new(RecordingSink::default()),
            server: None,
            client: None,
            last_record: None,
            last_ack: None,
        }
    }

    fn start(&mut self, runner: ScriptedRunner) {
        let config = Config {
            listen: ListenAddress::new("127.0.0.1", 0),
            ..Config::default()
        };
        let dispatcher = dispatcher_with(Arc::clone(&self.sink), runner);
        let handle = Server::with_dispatcher(config, dispatcher)
            .start()
            .expect("server should start");
        let addr = handle.local_addr();
        self.client = Some(TestClient::connect(addr));
        self.server = Some(handle);
    }

    fn path(&self, name: &str) -> PathBuf {
        self.workspace.path().join(name)
    }

    fn send(&mut self, record: String) {
        let client = self.client.as_mut().expect("client should be connected");
        self.last_ack = Some(client.exchange(&record));
        self.last_record = Some(record);
    }
}

impl Drop for DispatchWorld {
    fn drop(&mut self) {
        self.client = None;
        if let Some(server) = self.server.take() {
            let _ = server.stop();
        }
    }
}

#[fixture]
fn world() -> RefCell<DispatchWorld> {
    RefCell::new(DispatchWorld::new())
}

#[given("a running command server")]
fn given_server(world: &RefCell<DispatchWorld>) {
    world.borrow_mut().start(ScriptedRunner::Echo);
}

#[given("a running command server whose commands cannot start")]
fn given_failing_server(world: &RefCell<DispatchWorld>) {
    world.borrow_mut().start(ScriptedRunner::Failing);
}

#[given("a file \"{name}\" containing \"{content}\"")]
fn given_file(world: &RefCell<DispatchWorld>, name: String, content: String) {
    fs::write(world.borrow().path(&name), content).expect("write fixture file");
}

#[when("the peer stores \"{body}\" in \"{name}\"")]
fn when_store(world: &RefCell<DispatchWorld>, body: String, name: String) {
    let path = world.borrow().path(&name);
    world
        .borrow_mut()
        .send(format!("PUT {} {body}\n", path.display()));
}

#[when("the peer retrieves \"{name}\"")]
fn when_retrieve(world: &RefCell<DispatchWorld>, name: String) {
    let path = world.borrow().path(&name);
    world
        .borrow_mut()
        .send(format!("GET {}\n", path.display()));
}

#[when("the peer runs \"{command_line}\"")]
fn when_run(world: &RefCell<DispatchWorld>, command_line: String) {
    world.borrow_mut().send(format!("EXEC {command_line}\n"));
}

#[when("the peer sends \"{record}\"")]
fn when_send(world: &RefCell<DispatchWorld>, record: String) {
    world.borrow_mut().send(format!("{record}\n"));
}

#[then("the file \"{name}\" contains \"{content}\"")]
fn then_file_contains(world: &RefCell<DispatchWorld>, name: String, content: String) {
    let written = fs::read_to_string(world.borrow().path(&name)).expect("read stored file");
    assert_eq!(written, content);
}

#[then("the local sink received \"{content}\"")]
fn then_sink_received(world: &RefCell<DispatchWorld>, content: String) {
    let received = world.borrow().sink.chunks().concat();
    assert_eq!(String::from_utf8_lossy(&received), content);
}

#[then("the local sink received no chunks")]
fn then_sink_empty(world: &RefCell<DispatchWorld>) {
    assert!(world.borrow().sink.chunks().is_empty());
}

#[then("the local output is \"{output}\"")]
fn then_output_is(world: &RefCell<DispatchWorld>, output: String) {
    assert_eq!(world.borrow().sink.outputs(), vec![format!("{output}\n")]);
}

#[then("the local output is empty")]
fn then_output_empty(world: &RefCell<DispatchWorld>) {
    assert_eq!(world.borrow().sink.outputs(), vec![String::new()]);
}

#[then("the peer received only an acknowledgement")]
fn then_only_ack(world: &RefCell<DispatchWorld>) {
    let world = world.borrow();
    let record = world.last_record.as_deref().expect("a record was sent");
    let ack = world.last_ack.as_deref().expect("an ack was received");
    assert_eq!(ack, compose_ack("127.0.0.1", record.as_bytes()).as_slice());
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "Storing a file writes the body verbatim"
)]
fn store_writes_body(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "Retrieving a file emits its contents locally"
)]
fn retrieve_emits_locally(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "Retrieving a missing file emits nothing"
)]
fn retrieve_missing_is_silent(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "Running a command captures its output locally"
)]
fn run_captures_locally(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "A command that cannot start produces empty output"
)]
fn run_failure_is_silent(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "Unknown keywords are acknowledged and ignored"
)]
fn unknown_keyword_ignored(world: RefCell<DispatchWorld>) {
    drop(world);
}
