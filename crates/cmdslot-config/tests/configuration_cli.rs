//! Command-line parsing for the server configuration.

use rstest::rstest;

use cmdslot_config::{
    Config, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_CONNECTIONS, ListenAddress, LogFormat,
};

fn load(args: &[&str]) -> Result<Config, clap::Error> {
    Config::load_from_iter(std::iter::once("cmdslotd").chain(args.iter().copied()))
}

#[test]
fn defaults_listen_on_loopback_port_8080() {
    let config = load(&[]).expect("defaults should parse");
    assert_eq!(config.listen(), &ListenAddress::new("127.0.0.1", 8080));
    assert_eq!(config.max_connections(), DEFAULT_MAX_CONNECTIONS);
    assert_eq!(config.buffer_size(), DEFAULT_BUFFER_SIZE);
    assert_eq!(config.logging().filter(), "info");
    assert_eq!(config.logging().format(), LogFormat::Json);
}

#[test]
fn positional_port_selects_tcp_port() {
    let config = load(&["9090"]).expect("port should parse");
    assert_eq!(config.listen(), &ListenAddress::new("127.0.0.1", 9090));
}

#[test]
fn host_flag_changes_bind_address() {
    let config = load(&["--host", "0.0.0.0", "7000"]).expect("host should parse");
    assert_eq!(config.listen(), &ListenAddress::new("0.0.0.0", 7000));
}

#[test]
fn unix_socket_endpoints_are_not_accepted() {
    let error = load(&["--listen", "unix:///tmp/cmdslot.sock", "--max-connections", "3"])
        .expect_err("only a tcp port can be configured");
    assert_eq!(error.kind(), clap::error::ErrorKind::UnknownArgument);
}

#[test]
fn tuning_flags_are_applied() {
    let config = load(&[
        "--max-connections",
        "2",
        "--buffer-size",
        "64",
        "--log-format",
        "compact",
        "--log-filter",
        "cmdslotd=debug",
    ])
    .expect("flags should parse");
    assert_eq!(config.max_connections(), 2);
    assert_eq!(config.buffer_size(), 64);
    assert_eq!(config.logging().format(), LogFormat::Compact);
    assert_eq!(config.logging().filter(), "cmdslotd=debug");
}

#[rstest]
#[case(&["not-a-port"])]
#[case(&["70000"])]
#[case(&["--max-connections", "0"])]
#[case(&["--buffer-size", "0"])]
#[case(&["9090", "9091"])]
#[case(&["--log-format", "pretty"])]
fn rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(load(args).is_err(), "{args:?} should be rejected");
}
