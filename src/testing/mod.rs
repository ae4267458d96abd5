//! Test utilities: an in-process ADB server, shell mocks and fixtures

pub mod fake_server;
pub mod fixtures;
pub mod mocks;

pub use fake_server::{FakeAdbServer, FakeState};
pub use fixtures::*;
pub use mocks::MockShell;
