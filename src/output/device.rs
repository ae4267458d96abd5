use crate::core::types::ForwardRule;
use crate::device::Device;
use crate::output::TableFormat;
use serde::Serialize;

/// What `devices` prints for one device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRow {
    pub serial: String,
    pub state: String,
    pub model: String,
    pub product: String,
    pub transport_id: String,
}

impl From<&Device> for DeviceRow {
    fn from(device: &Device) -> Self {
        Self {
            serial: device.serial().to_string(),
            state: device
                .listed_state()
                .map(|s| s.to_string())
                .unwrap_or_default(),
            model: device.model().unwrap_or_default().to_string(),
            product: device.product().unwrap_or_default().to_string(),
            transport_id: device.transport_id().unwrap_or_default().to_string(),
        }
    }
}

impl TableFormat for DeviceRow {
    fn headers() -> Vec<&'static str> {
        vec!["SERIAL", "STATE", "MODEL", "PRODUCT", "TRANSPORT"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.serial.clone(),
            self.state.clone(),
            self.model.clone(),
            self.product.clone(),
            self.transport_id.clone(),
        ]
    }
}

impl TableFormat for ForwardRule {
    fn headers() -> Vec<&'static str> {
        vec!["SERIAL", "LOCAL", "REMOTE"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.serial.clone(), self.local.clone(), self.remote.clone()]
    }
}
