use crate::device::handle::Device;
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use log::*;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Where APKs are staged before `pm install`
pub const DEVICE_TEMP_PATH: &str = "/data/local/tmp";

static RE_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"package:(\S+)").expect("static regex")
});
static RE_PROCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\S+)\r*\n").expect("static regex")
});

/// The two device operations application management is built from
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    async fn run_shell(&self, command: &str) -> Result<String>;
    async fn upload(&self, local: &Path, remote: &str) -> Result<()>;
}

#[async_trait]
impl ShellExecutor for Device {
    async fn run_shell(&self, command: &str) -> Result<String> {
        self.shell(command, &[]).await
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        self.push_file(local, remote).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// `-r`: replace an existing installation
    pub reinstall: bool,
    /// Raw `pm install` flags; when set, `reinstall` is ignored
    pub flags: Vec<String>,
}

/// Install, launch and stop applications by driving `pm`, `am` and `monkey`.
pub struct AppManager<'a, E: ShellExecutor + ?Sized> {
    exec: &'a E,
}

impl<'a, E: ShellExecutor + ?Sized> AppManager<'a, E> {
    pub fn new(exec: &'a E) -> Self {
        Self { exec }
    }

    pub async fn install(&self, apk_path: &Path, options: &InstallOptions) -> Result<()> {
        let apk_name = apk_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !apk_name.to_lowercase().ends_with(".apk") {
            return Err(AdbError::InvalidArgument(format!(
                "apk file must have an extension of '.apk': {}",
                apk_path.display()
            )));
        }

        let remote_path = format!("{}/{}", DEVICE_TEMP_PATH, apk_name);
        self.exec
            .upload(apk_path, &remote_path)
            .await
            .map_err(|e| AdbError::App(format!("apk push: {}", e)))?;

        let command = if !options.flags.is_empty() {
            format!("pm install {} {}", options.flags.join(" "), remote_path)
        } else if options.reinstall {
            format!("pm install -r {}", remote_path)
        } else {
            format!("pm install {}", remote_path)
        };

        let output = self
            .exec
            .run_shell(&command)
            .await
            .map_err(|e| AdbError::App(format!("apk install: {}", e)))?;
        if !output.contains("Success") {
            return Err(AdbError::App(format!("apk installed: {}", output.trim())));
        }

        info!("Installed {}", apk_name);
        Ok(())
    }

    pub async fn uninstall(&self, package: &str, keep_data_and_cache: bool) -> Result<()> {
        let command = if keep_data_and_cache {
            format!("pm uninstall -k {}", package)
        } else {
            format!("pm uninstall {}", package)
        };

        let output = self
            .exec
            .run_shell(&command)
            .await
            .map_err(|e| AdbError::App(format!("apk uninstall: {}", e)))?;
        if !output.contains("Success") {
            return Err(AdbError::App(format!("apk uninstalled: {}", output.trim())));
        }
        Ok(())
    }

    pub async fn launch(&self, package: &str) -> Result<()> {
        let output = self
            .exec
            .run_shell(&format!(
                "monkey -p {} -c android.intent.category.LAUNCHER 1",
                package
            ))
            .await?;
        if output.contains("monkey aborted") {
            return Err(AdbError::App(format!("app launch: {}", output.trim())));
        }
        Ok(())
    }

    pub async fn terminate(&self, package: &str) -> Result<()> {
        self.exec
            .run_shell(&format!("am force-stop {}", package))
            .await
            .map(|_| ())
    }

    /// Installed packages that currently have a process, in `pm list` order.
    pub async fn list_running(&self) -> Result<Vec<String>> {
        let packages = self.exec.run_shell("pm list packages").await?;
        let processes = self.exec.run_shell("ps; ps -A").await?;

        let process_names: Vec<&str> = RE_PROCESS
            .captures_iter(&processes)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        Ok(RE_PACKAGE
            .captures_iter(&packages)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .filter(|pkg| process_names.contains(pkg))
            .map(str::to_string)
            .collect())
    }

    /// Force-stop every running app except `exclude`. Returns what was stopped.
    pub async fn terminate_all(&self, exclude: &[&str]) -> Result<Vec<String>> {
        let mut stopped = Vec::new();
        for package in self.list_running().await? {
            if exclude.contains(&package.as_str()) {
                continue;
            }
            match self.terminate(&package).await {
                Ok(()) => stopped.push(package),
                Err(e) => warn!("Could not stop {}: {}", package, e),
            }
        }
        Ok(stopped)
    }
}

impl Device {
    pub fn apps(&self) -> AppManager<'_, Device> {
        AppManager::new(self)
    }
}
