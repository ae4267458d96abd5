use crate::adb::connection::AdbConnection;
use crate::adb::protocol::SYNC_MAX_PAYLOAD;
use crate::adb::server::AdbServer;
use crate::config::Config;
use crate::core::types::ForwardRule;
use crate::device::handle::Device;
use crate::error::{AdbError, Result};
use log::*;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:5037";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection factory for one ADB server.
///
/// Hands out a fresh [`AdbConnection`] per logical operation. The server
/// address never changes after construction; clones share nothing mutable.
#[derive(Debug, Clone)]
pub struct AdbClient {
    address: String,
    connect_timeout: Duration,
    chunk_size: usize,
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

impl AdbClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            chunk_size: SYNC_MAX_PAYLOAD,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.address())
            .with_connect_timeout(config.connect_timeout())
            .with_chunk_size(config.sync.chunk_size)
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Outgoing `DATA` chunk size for pushes, `1..=SYNC_MAX_PAYLOAD`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_size > SYNC_MAX_PAYLOAD {
            return Err(AdbError::InvalidArgument(format!(
                "sync chunk size must be between 1 and {}, got {}",
                SYNC_MAX_PAYLOAD, chunk_size
            )));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Open a new connection to the server.
    pub async fn connect(&self) -> Result<AdbConnection> {
        AdbConnection::open_with_timeout(&self.address, self.connect_timeout).await
    }

    /// Run a host command whose reply is a hex-length-prefixed string.
    pub async fn execute_command(&self, command: &str) -> Result<String> {
        let mut conn = self.connect().await?;
        conn.request(command).await?;
        let reply = conn.read_length_prefixed_string().await?;
        conn.close().await;
        Ok(reply)
    }

    /// Run a host command that only answers with a status.
    pub async fn execute_and_verify(&self, command: &str) -> Result<()> {
        let mut conn = self.connect().await?;
        conn.request(command).await?;
        conn.close().await;
        Ok(())
    }

    /// Protocol version of the running server (`host:version`).
    pub async fn server_version(&self) -> Result<u32> {
        let reply = self.execute_command("host:version").await?;
        u32::from_str_radix(reply.trim(), 16)
            .map_err(|_| AdbError::protocol(format!("invalid version reply {:?}", reply)))
    }

    /// Every device the server knows about, with its `devices -l` attributes.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        let reply = self.execute_command("host:devices-l").await?;
        let devices: Vec<Device> = parse_device_list(&reply)
            .into_iter()
            .map(|(serial, attributes)| Device::new(self.clone(), serial, attributes))
            .collect();
        debug!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Look up one device by exact serial.
    pub async fn device(&self, serial: &str) -> Result<Device> {
        self.devices()
            .await?
            .into_iter()
            .find(|d| d.serial() == serial)
            .ok_or_else(|| AdbError::DeviceNotFound(serial.to_string()))
    }

    /// A handle for `serial` without asking the server first.
    pub fn device_handle(&self, serial: impl Into<String>) -> Device {
        Device::new(self.clone(), serial.into(), HashMap::new())
    }

    /// All forward rules across devices (`host:list-forward`).
    pub async fn forward_list(&self) -> Result<Vec<ForwardRule>> {
        let reply = self.execute_command("host:list-forward").await?;
        Ok(ForwardRule::parse_list(&reply))
    }

    pub async fn forward_kill_all(&self) -> Result<()> {
        self.execute_and_verify("host:killforward-all").await
    }

    /// Ask the server to exit (`host:kill`).
    pub async fn kill_server(&self) -> Result<()> {
        info!("Stopping ADB server at {}", self.address);
        self.execute_and_verify("host:kill").await
    }

    pub async fn is_running(&self) -> bool {
        AdbServer::is_running(&self.address).await
    }
}

/// Parse `host:devices-l` output: `<serial> <state> key:value ...` per line.
///
/// The state word is kept under the `state` attribute.
pub fn parse_device_list(output: &str) -> Vec<(String, HashMap<String, String>)> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let mut attributes = HashMap::new();
            if let Some(state) = fields.next() {
                attributes.insert("state".to_string(), state.to_string());
            }
            for field in fields {
                if let Some((key, value)) = field.split_once(':') {
                    attributes.insert(key.to_string(), value.to_string());
                }
            }
            Some((serial.to_string(), attributes))
        })
        .collect()
}
