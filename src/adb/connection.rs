use crate::adb::protocol::{self, STATUS_FAIL, STATUS_OKAY};
use crate::adb::shell::ShellStream;
use crate::adb::sync::SyncSession;
use crate::error::{AdbError, Result};
use log::*;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One connection to the ADB server speaking the host command protocol.
///
/// The protocol is strictly request/response, so every operation takes
/// `&mut self`. Any failure closes the underlying stream: a connection that
/// has seen an error is never reused.
pub struct AdbConnection<S = TcpStream> {
    stream: Option<S>,
    peer: String,
}

impl AdbConnection<TcpStream> {
    /// Open a socket to the ADB server. No protocol exchange happens yet.
    pub async fn open(address: &str) -> Result<Self> {
        Self::open_with_timeout(address, DEFAULT_CONNECT_TIMEOUT).await
    }

    pub async fn open_with_timeout(address: &str, timeout: Duration) -> Result<Self> {
        debug!("=== Creating new ADB connection to {} ===", address);

        let address = normalize_address(address);
        let connect = async {
            let resolved = resolve(&address).await?;
            debug!("Resolved address: {:?}", resolved);
            TcpStream::connect(resolved).await
        };

        let stream = match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(AdbError::Connection { address, source }),
            Err(_) => return Err(AdbError::Timeout(timeout)),
        };
        stream.set_nodelay(true)?;
        debug!("Connection established");

        Ok(Self::from_stream(stream, address))
    }
}

impl<S> AdbConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already-established stream.
    pub fn from_stream(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream: Some(stream),
            peer: peer.into(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Send `<hex length><command>` as a single write.
    pub async fn send_command(&mut self, command: &str) -> Result<()> {
        debug!("Sending command: {}", command);
        let frame = protocol::encode_host_command(command)?;
        self.write_all(&frame).await
    }

    /// Read the 4-byte status that answers every host command.
    ///
    /// `OKAY` succeeds; `FAIL` is followed by a hex-framed reason which becomes
    /// [`AdbError::Rejected`]; anything else is a framing violation.
    pub async fn verify_response(&mut self) -> Result<()> {
        let mut status = [0u8; 4];
        self.read_exact(&mut status).await?;
        trace!("Status: {:?}", String::from_utf8_lossy(&status));

        if &status == STATUS_OKAY {
            return Ok(());
        }

        if &status == STATUS_FAIL {
            let reason = self.read_length_prefixed_string().await?;
            debug!("Server rejected request: {}", reason);
            self.abandon();
            return Err(AdbError::Rejected(reason));
        }

        self.abandon();
        Err(AdbError::protocol(format!(
            "expected OKAY or FAIL, got {:?}",
            String::from_utf8_lossy(&status)
        )))
    }

    /// Send a command and verify that it was accepted.
    pub async fn request(&mut self, command: &str) -> Result<()> {
        self.send_command(command).await?;
        self.verify_response().await
    }

    /// Read a 4-hex-digit length prefix.
    pub async fn read_hex_length(&mut self) -> Result<usize> {
        let mut len = [0u8; 4];
        self.read_exact(&mut len).await?;
        let decoded = protocol::decode_hex_length(&len);
        self.check(decoded)
    }

    /// Read a hex-length-prefixed UTF-8 string (invalid sequences are replaced).
    pub async fn read_length_prefixed_string(&mut self) -> Result<String> {
        let len = self.read_hex_length().await?;
        let mut payload = vec![0u8; len];
        self.read_exact(&mut payload).await?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    /// Read until the peer closes the connection.
    pub async fn read_all_bytes(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let result = self.stream_mut()?.read_to_end(&mut out).await;
        self.check(result.map_err(AdbError::from))?;
        debug!("Read {} bytes before EOF", out.len());
        // The peer is gone; nothing more can be exchanged.
        self.stream = None;
        Ok(out)
    }

    /// Hand the connection to a line reader for a long-running shell.
    pub fn into_line_stream(mut self) -> Result<ShellStream<S>> {
        let stream = self.stream.take().ok_or(AdbError::Closed)?;
        Ok(ShellStream::new(stream))
    }

    /// Switch the connection into sync mode.
    ///
    /// The connection is consumed: once `sync:` is accepted only sync frames
    /// may cross this socket.
    pub async fn into_sync(mut self) -> Result<SyncSession<S>> {
        self.request("sync:").await?;
        Ok(SyncSession::new(self))
    }

    /// Release the socket. Safe to call any number of times.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Ignoring shutdown error on {}: {}", self.peer, e);
            }
            debug!("Connection to {} closed", self.peer);
        }
    }

    pub(crate) async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let result = self.stream_mut()?.write_all(buf).await;
        self.check(result.map_err(AdbError::from))
    }

    pub(crate) async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let result = self.stream_mut()?.read_exact(buf).await;
        self.check(result.map(|_| ()).map_err(AdbError::from))
    }

    /// Single read of up to `buf.len()` bytes; `Ok(0)` means EOF.
    pub(crate) async fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.stream_mut()?.read(buf).await;
        self.check(result.map_err(AdbError::from))
    }

    pub(crate) fn abandon(&mut self) {
        if self.stream.take().is_some() {
            debug!("Dropping connection to {} after failure", self.peer);
        }
    }

    fn stream_mut(&mut self) -> Result<&mut S> {
        self.stream.as_mut().ok_or(AdbError::Closed)
    }

    fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.abandon();
        }
        result
    }
}

fn normalize_address(address: &str) -> String {
    match address.strip_prefix("localhost:") {
        Some(port) => format!("127.0.0.1:{}", port),
        None => address.to_string(),
    }
}

async fn resolve(address: &str) -> std::io::Result<SocketAddr> {
    lookup_host(address).await?.next().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Could not resolve address")
    })
}
