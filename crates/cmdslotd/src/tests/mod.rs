//! Cross-module test suites for the command server.

mod dispatch_behaviour;
pub(crate) mod support;
