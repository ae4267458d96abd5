use crate::core::types::DirectoryEntry;
use crate::device::client::AdbClient;
use crate::device::handle::Device;
use std::collections::HashMap;

/// Handle for `serial` that never touches a server
pub fn test_device(serial: &str) -> Device {
    let mut attributes = HashMap::new();
    attributes.insert("state".to_string(), "device".to_string());
    attributes.insert("model".to_string(), "TestModel".to_string());
    attributes.insert("product".to_string(), "TestProduct".to_string());
    Device::new(AdbClient::default(), serial.to_string(), attributes)
}

pub fn test_devices() -> Vec<Device> {
    vec![
        test_device("emulator-5554"),
        test_device("abc123def456"),
        test_device("192.168.1.100:5555"),
    ]
}

pub fn file_entry(name: &str, size: u32, mtime: u32) -> DirectoryEntry {
    DirectoryEntry {
        name: name.to_string(),
        mode: 0o100644,
        size,
        mtime,
    }
}

pub fn dir_entry(name: &str) -> DirectoryEntry {
    DirectoryEntry {
        name: name.to_string(),
        mode: 0o040755,
        size: 4096,
        mtime: 1_700_000_000,
    }
}

/// Deterministic bytes that make misordered chunks visible
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
