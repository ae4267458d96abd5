use crate::adb::connection::AdbConnection;
use crate::adb::protocol::{
    self, SyncHeader, SyncId, SYNC_HEADER_LEN, SYNC_MAX_PAYLOAD,
};
use crate::core::types::{DirectoryEntry, FileStat};
use crate::error::{AdbError, Result};
use crate::progress::{NoOpProgress, ProgressReporter};
use log::*;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Bytes a real server sends after the listing `DONE` header.
const LISTING_DONE_TAIL: usize = 12;

/// A connection that has been switched into sync mode with `sync:`.
///
/// Owns the connection it was created from; host commands can no longer be
/// issued on it.
pub struct SyncSession<S = TcpStream> {
    conn: AdbConnection<S>,
    chunk_size: usize,
    listing_done: bool,
    done_tail_pending: bool,
}

impl<S> SyncSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(conn: AdbConnection<S>) -> Self {
        Self {
            conn,
            chunk_size: SYNC_MAX_PAYLOAD,
            listing_done: false,
            done_tail_pending: false,
        }
    }

    /// Use a smaller outgoing `DATA` chunk than the protocol maximum.
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

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Write one request frame: `<id><LE length><payload>`.
    pub async fn send(&mut self, id: SyncId, payload: &str) -> Result<()> {
        debug!("Sending sync command: {} {}", id, payload);
        if payload.len() > protocol::MAX_HOST_PAYLOAD {
            return Err(AdbError::InvalidArgument(format!(
                "sync path of {} bytes is too long",
                payload.len()
            )));
        }
        if id == SyncId::List {
            self.listing_done = false;
        }
        let frame = protocol::encode_sync_frame(id, payload.as_bytes())?;
        self.conn.write_all(&frame).await
    }

    /// Write a header-only frame whose word is `value` (`DONE` + mtime on push).
    pub async fn send_status(&mut self, id: SyncId, value: u32) -> Result<()> {
        trace!("Sending sync status: {} {}", id, value);
        self.conn
            .write_all(&protocol::encode_sync_status(id, value))
            .await
    }

    /// Read the next entry of a `LIST` reply.
    ///
    /// Returns `Ok(None)` once `DONE` or an all-zero `DENT` arrives, and on
    /// every call after that until another `LIST` is sent. Entries come back
    /// in the order the peer sent them.
    pub async fn read_directory_entry(&mut self) -> Result<Option<DirectoryEntry>> {
        if self.listing_done {
            return Ok(None);
        }

        let header = self.read_header().await?;
        match header.id {
            SyncId::Dent => {
                // mode | size | mtime | name length, the mode riding in the header word.
                let mut rest = [0u8; 12];
                self.conn.read_exact(&mut rest).await?;
                let size = le_u32(&rest[0..4]);
                let mtime = le_u32(&rest[4..8]);
                let name_len = le_u32(&rest[8..12]) as usize;
                let name_len = self.check(protocol::check_inbound_length(SyncId::Dent, name_len))?;

                if header.word == 0 && size == 0 && mtime == 0 && name_len == 0 {
                    trace!("Zero DENT ends the listing");
                    self.listing_done = true;
                    return Ok(None);
                }

                let mut name = vec![0u8; name_len];
                self.conn.read_exact(&mut name).await?;
                let entry = DirectoryEntry {
                    name: String::from_utf8_lossy(&name).into_owned(),
                    mode: header.word,
                    size,
                    mtime,
                };
                trace!("DENT {:?}", entry);
                Ok(Some(entry))
            }
            SyncId::Done => {
                // The zeroed record after DONE is optional. It is skipped
                // before the next reply is read, so a peer that sends a bare
                // header and hangs up still ends the listing cleanly.
                self.listing_done = true;
                self.done_tail_pending = true;
                Ok(None)
            }
            other => self.fail(AdbError::protocol(format!(
                "expected DENT or DONE while listing, got {}",
                other
            ))),
        }
    }

    /// Send `LIST` for `path` and drain the reply.
    pub async fn list(&mut self, path: &str) -> Result<Vec<DirectoryEntry>> {
        self.send(SyncId::List, path).await?;
        let mut entries = Vec::new();
        while let Some(entry) = self.read_directory_entry().await? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Stream `source` to the peer as `DATA` frames of at most `chunk_size` bytes.
    pub async fn send_stream<R>(&mut self, source: &mut R) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.send_stream_with_progress(source, &NoOpProgress).await
    }

    pub async fn send_stream_with_progress<R>(
        &mut self,
        source: &mut R,
        progress: &dyn ProgressReporter,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut buffer = vec![0u8; self.chunk_size];
        let mut sent = 0u64;

        loop {
            let read = match source.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.conn.abandon();
                    return Err(AdbError::Transfer(format!("Read error: {}", e)));
                }
            };

            let frame = protocol::encode_sync_frame(SyncId::Data, &buffer[..read])?;
            self.conn.write_all(&frame).await?;
            sent += read as u64;
            progress.inc(read as u64);
        }

        debug!("Sent {} bytes in DATA frames", sent);
        Ok(sent)
    }

    /// Read the peer's verdict on a push: `OKAY` or `FAIL <reason>`.
    pub async fn verify_status(&mut self) -> Result<()> {
        let header = self.read_header().await?;
        match header.id {
            SyncId::Okay => {
                // Real servers send a zero length; skip whatever is declared.
                let len = self.check(protocol::check_inbound_length(SyncId::Okay, header.word as usize))?;
                let mut discard = vec![0u8; len];
                self.conn.read_exact(&mut discard).await
            }
            SyncId::Fail => {
                let reason = self.read_fail_reason(header.word).await?;
                self.fail(AdbError::Rejected(reason))
            }
            other => self.fail(AdbError::protocol(format!(
                "expected OKAY or FAIL, got {}",
                other
            ))),
        }
    }

    /// Copy `DATA` payloads into `dest` until `DONE`.
    ///
    /// A connection that ends before `DONE` is a failed transfer, never a
    /// short success.
    pub async fn write_stream<W>(&mut self, dest: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.write_stream_with_progress(dest, &NoOpProgress).await
    }

    pub async fn write_stream_with_progress<W>(
        &mut self,
        dest: &mut W,
        progress: &dyn ProgressReporter,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut received = 0u64;
        let mut buffer = Vec::new();

        loop {
            let header = self.read_header().await.map_err(truncated)?;
            match header.id {
                SyncId::Data => {
                    let len = self.check(protocol::check_inbound_length(
                        SyncId::Data,
                        header.word as usize,
                    ))?;
                    buffer.resize(len, 0);
                    self.conn.read_exact(&mut buffer).await.map_err(truncated)?;

                    if let Err(e) = dest.write_all(&buffer).await {
                        self.conn.abandon();
                        return Err(AdbError::Transfer(format!("Write error: {}", e)));
                    }
                    received += len as u64;
                    progress.inc(len as u64);
                }
                SyncId::Done => break,
                SyncId::Fail => {
                    let reason = self.read_fail_reason(header.word).await?;
                    return self.fail(AdbError::Rejected(reason));
                }
                other => {
                    return self.fail(AdbError::protocol(format!(
                        "expected DATA or DONE, got {}",
                        other
                    )))
                }
            }
        }

        if let Err(e) = dest.flush().await {
            self.conn.abandon();
            return Err(AdbError::Transfer(format!("Write error: {}", e)));
        }
        debug!("Received {} bytes before DONE", received);
        Ok(received)
    }

    /// Query mode, size and modification time of a remote path.
    pub async fn stat(&mut self, path: &str) -> Result<FileStat> {
        self.send(SyncId::Stat, path).await?;

        let header = self.read_header().await?;
        if header.id != SyncId::Stat {
            return self.fail(AdbError::protocol(format!(
                "expected STAT reply, got {}",
                header.id
            )));
        }

        let mut rest = [0u8; 8];
        self.conn.read_exact(&mut rest).await?;
        Ok(FileStat {
            mode: header.word,
            size: le_u32(&rest[0..4]),
            mtime: le_u32(&rest[4..8]),
        })
    }

    /// Leave sync mode with `QUIT` and release the socket.
    pub async fn close(mut self) {
        if self.conn.is_open() {
            if let Err(e) = self.send_status(SyncId::Quit, 0).await {
                debug!("QUIT not delivered: {}", e);
            }
        }
        self.conn.close().await;
    }

    async fn read_header(&mut self) -> Result<SyncHeader> {
        if self.done_tail_pending {
            self.skip_done_tail().await?;
        }
        let mut bytes = [0u8; SYNC_HEADER_LEN];
        self.conn.read_exact(&mut bytes).await?;
        let header = SyncHeader::decode(&bytes);
        let header = self.check(header)?;
        trace!("Sync frame {} word={}", header.id, header.word);
        Ok(header)
    }

    async fn skip_done_tail(&mut self) -> Result<()> {
        self.done_tail_pending = false;
        let mut tail = [0u8; LISTING_DONE_TAIL];
        let mut filled = 0;
        while filled < LISTING_DONE_TAIL {
            match self.conn.read_some(&mut tail[filled..]).await? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(())
    }

    async fn read_fail_reason(&mut self, len: u32) -> Result<String> {
        let len = self.check(protocol::check_inbound_length(SyncId::Fail, len as usize))?;
        let mut reason = vec![0u8; len];
        self.conn.read_exact(&mut reason).await?;
        Ok(String::from_utf8_lossy(&reason).into_owned())
    }

    fn check<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.conn.abandon();
        }
        result
    }

    fn fail<T>(&mut self, err: AdbError) -> Result<T> {
        self.conn.abandon();
        Err(err)
    }
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn truncated(err: AdbError) -> AdbError {
    match err {
        AdbError::Io(e) if e.kind() == ErrorKind::UnexpectedEof => {
            AdbError::Transfer("connection closed before DONE".to_string())
        }
        other => other,
    }
}
