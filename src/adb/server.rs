use crate::error::{AdbError, Result};
use log::*;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::sleep;

const SERVER_START_DELAY: Duration = Duration::from_secs(1);
const SERVER_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

/// Management of the local `adb` server process
pub struct AdbServer;

impl AdbServer {
    fn adb_command() -> String {
        std::env::var("ADB_PATH").unwrap_or_else(|_| "adb".to_string())
    }

    /// Start the ADB server with `adb -P <port> start-server`
    pub async fn start(port: u16) -> Result<()> {
        info!("Starting ADB server on port {}", port);

        let output = Command::new(Self::adb_command())
            .args(["-P", &port.to_string(), "start-server"])
            .output()
            .await
            .map_err(|e| AdbError::App(format!("Failed to execute adb command: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdbError::App(format!("Failed to start ADB server: {}", stderr)));
        }

        info!("ADB server started successfully");

        // Give the server time to fully start
        sleep(SERVER_START_DELAY).await;

        Ok(())
    }

    /// Check whether something accepts connections at `address`
    pub async fn is_running(address: &str) -> bool {
        match tokio::time::timeout(SERVER_CHECK_TIMEOUT, TcpStream::connect(address)).await {
            Ok(Ok(_)) => {
                debug!("ADB server is running at {}", address);
                true
            }
            _ => {
                debug!("ADB server is not running at {}", address);
                false
            }
        }
    }
}
