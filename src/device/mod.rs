pub mod apps;
pub mod client;
pub mod handle;
pub mod manager;

pub use apps::{AppManager, InstallOptions, ShellExecutor};
pub use client::AdbClient;
pub use handle::Device;
pub use manager::DeviceManager;
