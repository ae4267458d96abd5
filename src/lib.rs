//! Client for the ADB server's host protocol and its file sync sub-protocol.

pub mod adb;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod output;
pub mod progress;

pub use adb::{AdbConnection, ShellCloser, ShellStream, SyncSession};
pub use device::{AdbClient, Device, DeviceManager};
pub use error::{AdbError, Result};

#[cfg(test)]
pub mod testing;


#[cfg(test)]
mod error_test;
