use crate::adb::connection::AdbConnection;
use crate::adb::protocol::{self, SyncId};
use crate::adb::shell::ShellStream;
use crate::adb::sync::SyncSession;
use crate::core::types::{DeviceState, DirectoryEntry, FileStat, ForwardRule, DEFAULT_FILE_MODE};
use crate::device::client::AdbClient;
use crate::error::{AdbError, Result};
use crate::progress::{NoOpProgress, ProgressReporter};
use chrono::{DateTime, Utc};
use log::*;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};

/// Port adbd listens on after `tcpip`
pub const ADB_DAEMON_PORT: u16 = 5555;

/// A device reachable through the ADB server.
///
/// Every operation opens its own connection, switches it to this device with
/// `host:transport:<serial>` and closes it when done.
#[derive(Debug, Clone)]
pub struct Device {
    client: AdbClient,
    serial: String,
    attributes: HashMap<String, String>,
}

impl Device {
    pub fn new(client: AdbClient, serial: String, attributes: HashMap<String, String>) -> Self {
        Self {
            client,
            serial,
            attributes,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn product(&self) -> Option<&str> {
        self.attribute("product")
    }

    pub fn model(&self) -> Option<&str> {
        self.attribute("model")
    }

    pub fn usb(&self) -> Option<&str> {
        self.attribute("usb")
    }

    pub fn transport_id(&self) -> Option<&str> {
        self.attribute("transport_id")
    }

    /// State word from the listing this handle came from, if any.
    pub fn listed_state(&self) -> Option<DeviceState> {
        self.attribute("state").map(DeviceState::from_server)
    }

    pub fn is_usb(&self) -> bool {
        self.usb().is_some_and(|usb| !usb.is_empty())
    }

    // Host-serial queries: answered by the server without a device transport.

    pub async fn state(&self) -> Result<DeviceState> {
        let reply = self.host_serial("get-state").await?;
        Ok(DeviceState::from_server(&reply))
    }

    pub async fn device_path(&self) -> Result<String> {
        self.host_serial("get-devpath").await
    }

    /// Forward `local` on the host to `remote` on the device, e.g. `tcp:8080`.
    pub async fn forward(&self, local: &str, remote: &str, no_rebind: bool) -> Result<()> {
        let command = if no_rebind {
            format!("host-serial:{}:forward:norebind:{};{}", self.serial, local, remote)
        } else {
            format!("host-serial:{}:forward:{};{}", self.serial, local, remote)
        };
        self.client.execute_and_verify(&command).await
    }

    pub async fn forward_tcp(&self, local_port: u16, remote_port: u16, no_rebind: bool) -> Result<()> {
        self.forward(
            &format!("tcp:{}", local_port),
            &format!("tcp:{}", remote_port),
            no_rebind,
        )
        .await
    }

    /// Forward rules that belong to this device.
    pub async fn forward_list(&self) -> Result<Vec<ForwardRule>> {
        let rules = self.client.forward_list().await?;
        Ok(rules.into_iter().filter(|r| r.serial == self.serial).collect())
    }

    pub async fn forward_kill(&self, local: &str) -> Result<()> {
        self.client
            .execute_and_verify(&format!("host-serial:{}:killforward:{}", self.serial, local))
            .await
    }

    async fn host_serial(&self, subcommand: &str) -> Result<String> {
        self.client
            .execute_command(&format!("host-serial:{}:{}", self.serial, subcommand))
            .await
    }

    // Device transport operations.

    /// Open a connection already switched to this device.
    pub async fn transport(&self) -> Result<AdbConnection> {
        let mut conn = self.client.connect().await?;
        conn.request(&format!("host:transport:{}", self.serial)).await?;
        Ok(conn)
    }

    async fn sync_session(&self) -> Result<SyncSession> {
        let conn = self.transport().await?;
        conn.into_sync().await?.with_chunk_size(self.client.chunk_size())
    }

    /// Run `shell:<command>` and return everything it printed.
    pub async fn execute_and_collect(&self, command: &str) -> Result<Vec<u8>> {
        debug!("{}: shell {}", self.serial, command);
        let mut conn = self.transport().await?;
        conn.request(&format!("shell:{}", command)).await?;
        let output = conn.read_all_bytes().await?;
        conn.close().await;
        Ok(output)
    }

    /// Run `shell:<command>` and hand back the live session as a line stream.
    ///
    /// The caller owns the connection from here on; dropping or closing the
    /// stream releases it.
    pub async fn execute_and_stream(&self, command: &str) -> Result<ShellStream> {
        debug!("{}: streaming shell {}", self.serial, command);
        let mut conn = self.transport().await?;
        conn.request(&format!("shell:{}", command)).await?;
        conn.into_line_stream()
    }

    /// Convenience over [`Device::execute_and_collect`]: joins `args` and decodes the output.
    pub async fn shell(&self, command: &str, args: &[&str]) -> Result<String> {
        let command = if args.is_empty() {
            command.to_string()
        } else {
            format!("{} {}", command, args.join(" "))
        };
        if command.trim().is_empty() {
            return Err(AdbError::InvalidArgument(
                "adb shell: command cannot be empty".to_string(),
            ));
        }
        let raw = self.execute_and_collect(&command).await?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Restart adbd listening on TCP `port`.
    pub async fn enable_tcpip(&self, port: Option<u16>) -> Result<()> {
        let port = port.unwrap_or(ADB_DAEMON_PORT);
        let mut conn = self.transport().await?;
        conn.request(&format!("tcpip:{}", port)).await?;
        conn.close().await;
        Ok(())
    }

    /// Entries of a remote directory, in the order the device sent them.
    pub async fn list_directory(&self, remote_path: &str) -> Result<Vec<DirectoryEntry>> {
        let mut sync = self.sync_session().await?;
        let result = sync.list(remote_path).await;
        sync.close().await;
        result
    }

    pub async fn stat(&self, remote_path: &str) -> Result<FileStat> {
        let mut sync = self.sync_session().await?;
        let result = sync.stat(remote_path).await;
        sync.close().await;
        result
    }

    /// Push `source` to `remote_path`, creating it with `mode` and `modified`.
    pub async fn push<R>(
        &self,
        source: &mut R,
        remote_path: &str,
        modified: DateTime<Utc>,
        mode: u32,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        self.push_with_progress(source, remote_path, modified, mode, &NoOpProgress)
            .await
    }

    pub async fn push_with_progress<R>(
        &self,
        source: &mut R,
        remote_path: &str,
        modified: DateTime<Utc>,
        mode: u32,
        progress: &dyn ProgressReporter,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        debug!("{}: push -> {}", self.serial, remote_path);
        let mut sync = self.sync_session().await?;
        let result = async {
            sync.send(SyncId::Send, &protocol::send_request_payload(remote_path, mode))
                .await?;
            let sent = sync.send_stream_with_progress(source, progress).await?;
            sync.send_status(SyncId::Done, unix_seconds(modified)).await?;
            sync.verify_status().await?;
            Ok::<u64, AdbError>(sent)
        }
        .await;
        sync.close().await;
        progress.finish();

        let sent = result?;
        info!("Pushed {} bytes to {}:{}", sent, self.serial, remote_path);
        Ok(())
    }

    /// Push a local file, keeping its modification time.
    pub async fn push_file(&self, local: &Path, remote_path: &str) -> Result<()> {
        self.push_file_with_progress(local, remote_path, &NoOpProgress).await
    }

    pub async fn push_file_with_progress(
        &self,
        local: &Path,
        remote_path: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        let mut file = File::open(local)
            .await
            .map_err(|e| AdbError::Transfer(format!("Cannot open {}: {}", local.display(), e)))?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(AdbError::InvalidArgument(format!(
                "can only push regular files: {}",
                local.display()
            )));
        }
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        progress.start(metadata.len());
        self.push_with_progress(&mut file, remote_path, modified, DEFAULT_FILE_MODE, progress)
            .await
    }

    /// Copy `remote_path` into `dest`.
    pub async fn pull<W>(&self, remote_path: &str, dest: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        self.pull_with_progress(remote_path, dest, &NoOpProgress).await
    }

    pub async fn pull_with_progress<W>(
        &self,
        remote_path: &str,
        dest: &mut W,
        progress: &dyn ProgressReporter,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        debug!("{}: pull <- {}", self.serial, remote_path);
        let mut sync = self.sync_session().await?;
        let result = async {
            sync.send(SyncId::Recv, remote_path).await?;
            sync.write_stream_with_progress(dest, progress).await
        }
        .await;
        sync.close().await;
        progress.finish();

        let received = result?;
        info!("Pulled {} bytes from {}:{}", received, self.serial, remote_path);
        Ok(())
    }

    /// Pull into a local file. A failed pull leaves no partial file behind.
    pub async fn pull_file(&self, remote_path: &str, local: &Path) -> Result<()> {
        self.pull_file_with_progress(remote_path, local, &NoOpProgress).await
    }

    pub async fn pull_file_with_progress(
        &self,
        remote_path: &str,
        local: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        let mut file = File::create(local)
            .await
            .map_err(|e| AdbError::Transfer(format!("Cannot create {}: {}", local.display(), e)))?;

        let result = self.pull_with_progress(remote_path, &mut file, progress).await;
        drop(file);

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(local).await {
                warn!("Could not remove partial file {}: {}", local.display(), e);
            }
        }
        result
    }
}

/// Seconds since the epoch as carried by sync frames, clamped to `u32`.
pub fn unix_seconds(time: DateTime<Utc>) -> u32 {
    time.timestamp().clamp(0, i64::from(u32::MAX)) as u32
}
