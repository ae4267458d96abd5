use crate::error::{AdbError, Result};
use bytes::{BufMut, BytesMut};
use std::fmt;

/// Host status word for an accepted request
pub const STATUS_OKAY: &[u8; 4] = b"OKAY";
/// Host status word for a rejected request; followed by a hex-framed reason
pub const STATUS_FAIL: &[u8; 4] = b"FAIL";

/// Largest payload a 4-hex-digit host frame can describe
pub const MAX_HOST_PAYLOAD: usize = 0xFFFF;

/// Largest sync payload the ADB server accepts (`SYNC_DATA_MAX`)
pub const SYNC_MAX_PAYLOAD: usize = 64 * 1024;

/// `<4-byte id><4-byte little-endian word>`
pub const SYNC_HEADER_LEN: usize = 8;

/// Build a host command frame: `<4 lowercase hex digits><command bytes>`.
pub fn encode_host_command(command: &str) -> Result<BytesMut> {
    let len = command.len();
    if len > MAX_HOST_PAYLOAD {
        return Err(AdbError::InvalidArgument(format!(
            "host command is {} bytes, at most {} fit in a frame",
            len, MAX_HOST_PAYLOAD
        )));
    }

    let mut buf = BytesMut::with_capacity(4 + len);
    buf.put_slice(format!("{:04x}", len).as_bytes());
    buf.put_slice(command.as_bytes());
    Ok(buf)
}

/// Parse a 4-hex-digit length prefix (either case).
pub fn decode_hex_length(bytes: &[u8; 4]) -> Result<usize> {
    if !bytes.iter().all(u8::is_ascii_hexdigit) {
        return Err(AdbError::protocol(format!(
            "invalid hex length prefix {:?}",
            String::from_utf8_lossy(bytes)
        )));
    }
    // All four bytes are ASCII hex digits, so both conversions succeed.
    let text = std::str::from_utf8(bytes).map_err(|e| AdbError::protocol(e.to_string()))?;
    usize::from_str_radix(text, 16).map_err(|e| AdbError::protocol(e.to_string()))
}

/// Sync sub-protocol message identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncId {
    List,
    Dent,
    Send,
    Recv,
    Data,
    Done,
    Stat,
    Okay,
    Fail,
    Quit,
}

impl SyncId {
    pub const fn as_bytes(&self) -> &'static [u8; 4] {
        match self {
            SyncId::List => b"LIST",
            SyncId::Dent => b"DENT",
            SyncId::Send => b"SEND",
            SyncId::Recv => b"RECV",
            SyncId::Data => b"DATA",
            SyncId::Done => b"DONE",
            SyncId::Stat => b"STAT",
            SyncId::Okay => b"OKAY",
            SyncId::Fail => b"FAIL",
            SyncId::Quit => b"QUIT",
        }
    }

    pub fn from_bytes(bytes: &[u8; 4]) -> Option<Self> {
        match bytes {
            b"LIST" => Some(SyncId::List),
            b"DENT" => Some(SyncId::Dent),
            b"SEND" => Some(SyncId::Send),
            b"RECV" => Some(SyncId::Recv),
            b"DATA" => Some(SyncId::Data),
            b"DONE" => Some(SyncId::Done),
            b"STAT" => Some(SyncId::Stat),
            b"OKAY" => Some(SyncId::Okay),
            b"FAIL" => Some(SyncId::Fail),
            b"QUIT" => Some(SyncId::Quit),
            _ => None,
        }
    }
}

impl fmt::Display for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Every id is plain ASCII.
        f.write_str(std::str::from_utf8(self.as_bytes()).unwrap_or("????"))
    }
}

/// The fixed 8-byte head of every sync message.
///
/// For `DATA`, `FAIL` and client requests `word` is the payload length. For
/// `DENT` and `STAT` replies it is the first field of the record (the mode),
/// and for `DONE` it carries the modification time on push and is zero
/// everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncHeader {
    pub id: SyncId,
    pub word: u32,
}

impl SyncHeader {
    pub fn decode(bytes: &[u8; SYNC_HEADER_LEN]) -> Result<Self> {
        let id_bytes = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let id = SyncId::from_bytes(&id_bytes).ok_or_else(|| {
            AdbError::protocol(format!(
                "unknown sync id {:?}",
                String::from_utf8_lossy(&id_bytes)
            ))
        })?;
        let word = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Ok(Self { id, word })
    }

    pub fn encode(&self) -> [u8; SYNC_HEADER_LEN] {
        let mut out = [0u8; SYNC_HEADER_LEN];
        out[..4].copy_from_slice(self.id.as_bytes());
        out[4..].copy_from_slice(&self.word.to_le_bytes());
        out
    }
}

/// Build a length-framed sync message.
pub fn encode_sync_frame(id: SyncId, payload: &[u8]) -> Result<BytesMut> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        AdbError::InvalidArgument(format!("sync payload of {} bytes is too large", payload.len()))
    })?;

    let mut buf = BytesMut::with_capacity(SYNC_HEADER_LEN + payload.len());
    buf.put_slice(&SyncHeader { id, word: len }.encode());
    buf.put_slice(payload);
    Ok(buf)
}

/// Build a header-only sync message whose word is a value rather than a length.
pub fn encode_sync_status(id: SyncId, value: u32) -> [u8; SYNC_HEADER_LEN] {
    SyncHeader { id, word: value }.encode()
}

/// Payload of a `SEND` request: `<remote path>,<decimal mode>`.
pub fn send_request_payload(remote_path: &str, mode: u32) -> String {
    format!("{},{}", remote_path, mode)
}

/// Reject inbound lengths larger than the protocol allows before allocating.
pub fn check_inbound_length(id: SyncId, len: usize) -> Result<usize> {
    if len > SYNC_MAX_PAYLOAD {
        return Err(AdbError::protocol(format!(
            "{} frame declares {} bytes, limit is {}",
            id, len, SYNC_MAX_PAYLOAD
        )));
    }
    Ok(len)
}
