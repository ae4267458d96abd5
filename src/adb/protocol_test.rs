use super::protocol::*;
use crate::error::AdbError;

#[test]
fn test_host_frame_declares_exact_length() {
    for command in ["host:version", "", "shell:echo 'Hello 世界'", "host:transport:emulator-5554"] {
        let frame = encode_host_command(command).unwrap();
        let (prefix, payload) = frame.split_at(4);
        let declared = usize::from_str_radix(std::str::from_utf8(prefix).unwrap(), 16).unwrap();
        assert_eq!(declared, command.len());
        assert_eq!(payload, command.as_bytes());
    }
}

#[test]
fn test_host_frame_uses_lowercase_hex() {
    let command = "x".repeat(0xab);
    let frame = encode_host_command(&command).unwrap();
    assert_eq!(&frame[..4], b"00ab");
}

#[test]
fn test_host_frame_at_limit() {
    let command = "a".repeat(MAX_HOST_PAYLOAD);
    let frame = encode_host_command(&command).unwrap();
    assert_eq!(&frame[..4], b"ffff");
    assert_eq!(frame.len(), 4 + MAX_HOST_PAYLOAD);
}

#[test]
fn test_host_frame_over_limit_is_caller_error() {
    let command = "a".repeat(MAX_HOST_PAYLOAD + 1);
    assert!(matches!(
        encode_host_command(&command),
        Err(AdbError::InvalidArgument(_))
    ));
}

#[test]
fn test_decode_hex_length() {
    assert_eq!(decode_hex_length(b"0004").unwrap(), 4);
    assert_eq!(decode_hex_length(b"00FF").unwrap(), 255);
    assert_eq!(decode_hex_length(b"ffff").unwrap(), 0xffff);
    assert!(matches!(decode_hex_length(b"00g1"), Err(AdbError::Protocol(_))));
    assert!(matches!(decode_hex_length(b" 001"), Err(AdbError::Protocol(_))));
}

#[test]
fn test_sync_frame_is_little_endian() {
    let frame = encode_sync_frame(SyncId::List, b"/sdcard").unwrap();
    assert_eq!(&frame[..4], b"LIST");
    assert_eq!(&frame[4..8], &[7, 0, 0, 0]);
    assert_eq!(&frame[8..], b"/sdcard");
}

#[test]
fn test_sync_status_carries_value() {
    let frame = encode_sync_status(SyncId::Done, 0x0102_0304);
    assert_eq!(&frame, b"DONE\x04\x03\x02\x01");
}

#[test]
fn test_sync_header_decode() {
    let header = SyncHeader::decode(b"DATA\x00\x00\x01\x00").unwrap();
    assert_eq!(header.id, SyncId::Data);
    assert_eq!(header.word, 65536);

    assert!(matches!(
        SyncHeader::decode(b"WHAT\x00\x00\x00\x00"),
        Err(AdbError::Protocol(_))
    ));
}

#[test]
fn test_sync_id_names() {
    for id in [
        SyncId::List,
        SyncId::Dent,
        SyncId::Send,
        SyncId::Recv,
        SyncId::Data,
        SyncId::Done,
        SyncId::Stat,
        SyncId::Okay,
        SyncId::Fail,
        SyncId::Quit,
    ] {
        assert_eq!(SyncId::from_bytes(id.as_bytes()), Some(id));
        assert_eq!(id.to_string().as_bytes(), id.as_bytes());
    }
}

#[test]
fn test_send_request_payload_uses_decimal_mode() {
    assert_eq!(
        send_request_payload("/data/local/tmp/app.apk", 0o664),
        "/data/local/tmp/app.apk,436"
    );
}

#[test]
fn test_inbound_length_bound() {
    assert_eq!(check_inbound_length(SyncId::Data, SYNC_MAX_PAYLOAD).unwrap(), SYNC_MAX_PAYLOAD);
    assert!(check_inbound_length(SyncId::Data, SYNC_MAX_PAYLOAD + 1).is_err());
}
