pub mod connection;
pub mod protocol;
pub mod server;
pub mod shell;
pub mod sync;

pub use connection::AdbConnection;
pub use protocol::{SyncId, SYNC_MAX_PAYLOAD};
pub use server::AdbServer;
pub use shell::{ShellCloser, ShellStream};
pub use sync::SyncSession;

// Re-export commonly used types
pub use crate::error::Result;


#[cfg(test)]
mod protocol_test;
