use crate::device::client::AdbClient;
use crate::device::handle::Device;
use crate::error::{AdbError, Result};
use log::debug;

/// Unified device selection
///
/// Provides consistent device discovery and selection across all commands.
#[derive(Clone)]
pub struct DeviceManager {
    client: AdbClient,
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new(AdbClient::default())
    }
}

impl DeviceManager {
    pub fn new(client: AdbClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AdbClient {
        &self.client
    }

    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        debug!("DeviceManager::list_devices() - {}", self.client.address());
        self.client.devices().await
    }

    /// Find a device by partial serial; an exact match always wins.
    pub async fn find_device(&self, partial_id: &str) -> Result<Device> {
        let devices = self.list_devices().await?;
        select_by_partial_id(devices, partial_id)
    }

    /// Get the only attached device, or error if none or several
    pub async fn get_single_device(&self) -> Result<Device> {
        let mut devices = self.list_devices().await?;
        match devices.len() {
            0 => Err(AdbError::NoDevicesFound),
            1 => Ok(devices.remove(0)),
            _ => Err(AdbError::MultipleDevicesFound),
        }
    }

    /// Uses `device_id` if provided, otherwise requires a single device
    pub async fn get_target_device(&self, device_id: Option<&str>) -> Result<Device> {
        match device_id {
            Some(id) => self.find_device(id).await,
            None => self.get_single_device().await,
        }
    }
}

pub(crate) fn select_by_partial_id(devices: Vec<Device>, partial_id: &str) -> Result<Device> {
    if let Some(exact) = devices.iter().find(|d| d.serial() == partial_id) {
        return Ok(exact.clone());
    }

    let needle = partial_id.to_lowercase();
    let mut matches: Vec<Device> = devices
        .into_iter()
        .filter(|d| d.serial().to_lowercase().contains(&needle))
        .collect();

    match matches.len() {
        0 => Err(AdbError::DeviceNotFound(partial_id.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(AdbError::MultipleDevicesFound),
    }
}
