//! Crate-internal test doubles for the port traits.

mod fake_runner;
mod scripted_client;

pub(crate) use fake_runner::{FakeRunner, failing_report, passing_report};
pub(crate) use scripted_client::ScriptedClient;
