use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::device::InstallOptions;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub struct InstallCommand;

#[derive(Debug, Clone)]
pub struct InstallArgs {
    pub apk: PathBuf,
    pub reinstall: bool,
    pub flags: Vec<String>,
}

impl InstallCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for InstallCommand {
    type Args = InstallArgs;

    async fn run(&self, ctx: &CommandContext, args: InstallArgs) -> Result<()> {
        let device = ctx.target_device().await?;
        let options = InstallOptions {
            reinstall: args.reinstall,
            flags: args.flags,
        };
        device.apps().install(&args.apk, &options).await?;
        ctx.formatter()
            .success(&format!("Installed {} on {}", args.apk.display(), device.serial()));
        Ok(())
    }
}

pub struct UninstallCommand;

#[derive(Debug, Clone)]
pub struct UninstallArgs {
    pub package: String,
    pub keep_data: bool,
}

impl UninstallCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for UninstallCommand {
    type Args = UninstallArgs;

    async fn run(&self, ctx: &CommandContext, args: UninstallArgs) -> Result<()> {
        let device = ctx.target_device().await?;
        device
            .apps()
            .uninstall(&args.package, args.keep_data)
            .await?;
        ctx.formatter()
            .success(&format!("Removed {} from {}", args.package, device.serial()));
        Ok(())
    }
}
