use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while talking to the ADB server or a device behind it.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("Cannot connect to ADB server at {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("ADB protocol error: {0}")]
    Protocol(String),

    /// The server or device answered `FAIL`; the payload is the remote reason verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("ADB connection error: {0}")]
    Io(#[from] io::Error),

    #[error("File transfer failed: {0}")]
    Transfer(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Connection closed")]
    Closed,

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("No device found matching ID: {0}")]
    DeviceNotFound(String),

    #[error("No devices found")]
    NoDevicesFound,

    #[error("Multiple devices found. Please specify a serial")]
    MultipleDevicesFound,

    #[error("{0}")]
    App(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdbError {
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        AdbError::Protocol(msg.into())
    }

    /// True when the peer explicitly refused the request with `FAIL`.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AdbError::Rejected(_))
    }

    /// The remote-supplied reason, if the peer sent one.
    pub fn remote_reason(&self) -> Option<&str> {
        match self {
            AdbError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdbError>;
