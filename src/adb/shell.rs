use crate::error::{AdbError, Result};
use log::*;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio::sync::watch;

/// Line-by-line reader over a shell session that stays open until the remote
/// process exits.
///
/// Lines are yielded without their `\n` / `\r\n` terminator. The sequence ends
/// when the peer closes the socket and cannot be restarted.
pub struct ShellStream<S = TcpStream> {
    reader: Option<BufReader<S>>,
    closed: watch::Receiver<bool>,
    closer: ShellCloser,
}

/// Handle that closes a [`ShellStream`] from another task, waking a pending read.
#[derive(Clone, Debug)]
pub struct ShellCloser {
    tx: Arc<watch::Sender<bool>>,
}

impl ShellCloser {
    pub fn close(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }
}

impl<S> ShellStream<S>
where
    S: AsyncRead + Unpin + Send,
{
    pub(crate) fn new(stream: S) -> Self {
        let (tx, closed) = watch::channel(false);
        Self {
            reader: Some(BufReader::new(stream)),
            closed,
            closer: ShellCloser { tx: Arc::new(tx) },
        }
    }

    pub fn closer(&self) -> ShellCloser {
        self.closer.clone()
    }

    /// Next line of output, `Ok(None)` at EOF.
    ///
    /// If the stream is closed (here or through a [`ShellCloser`]) while this
    /// call is waiting, it returns [`AdbError::Closed`] right away.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        if *self.closed.borrow_and_update() {
            self.release();
            return Err(AdbError::Closed);
        }

        let Self { reader, closed, .. } = self;
        let Some(reader) = reader.as_mut() else {
            return Ok(None);
        };

        let mut raw = Vec::new();
        let outcome = tokio::select! {
            biased;
            _ = closed.changed() => None,
            read = reader.read_until(b'\n', &mut raw) => Some(read),
        };

        match outcome {
            None => {
                self.release();
                Err(AdbError::Closed)
            }
            Some(Err(e)) => {
                self.release();
                Err(AdbError::Io(e))
            }
            Some(Ok(0)) => {
                debug!("Shell stream reached EOF");
                self.release();
                Ok(None)
            }
            Some(Ok(_)) => {
                if raw.last() == Some(&b'\n') {
                    raw.pop();
                    if raw.last() == Some(&b'\r') {
                        raw.pop();
                    }
                }
                Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
            }
        }
    }

    /// Drain every remaining line.
    pub async fn collect_lines(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await? {
            lines.push(line);
        }
        Ok(lines)
    }

    /// Close the session and release the socket.
    pub fn close(&mut self) {
        self.closer.close();
        self.release();
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    fn release(&mut self) {
        if self.reader.take().is_some() {
            debug!("Shell stream released");
        }
    }
}
