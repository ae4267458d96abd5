use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::types::OutputFormat;
use crate::error::{AdbError, Result};
use crate::progress::{IndicatifProgress, ProgressReporter};
use async_trait::async_trait;
use log::debug;
use serde_json::json;
use std::path::PathBuf;

pub struct PushCommand;

#[derive(Debug, Clone)]
pub struct PushArgs {
    pub local: PathBuf,
    pub remote: String,
}

impl PushCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for PushCommand {
    type Args = PushArgs;

    async fn run(&self, ctx: &CommandContext, args: PushArgs) -> Result<()> {
        let file_name = args
            .local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                AdbError::InvalidArgument(format!("not a file: {}", args.local.display()))
            })?;

        let device = ctx.target_device().await?;

        // `adb push f /sdcard/` and `adb push f /sdcard` both land in the directory.
        let remote = if args.remote.ends_with('/') || device.stat(&args.remote).await?.is_dir() {
            format!("{}/{}", args.remote.trim_end_matches('/'), file_name)
        } else {
            args.remote.clone()
        };
        debug!("Pushing {} to {}", args.local.display(), remote);

        let progress: Box<dyn ProgressReporter> = if ctx.should_show_progress() {
            Box::new(IndicatifProgress::file_transfer(&file_name, 0))
        } else {
            Box::new(IndicatifProgress::hidden())
        };
        device
            .push_file_with_progress(&args.local, &remote, progress.as_ref())
            .await?;

        let formatter = ctx.formatter();
        match ctx.output_format {
            OutputFormat::Json => formatter.json(&json!({
                "serial": device.serial(),
                "local": args.local,
                "remote": remote,
            })),
            OutputFormat::Table => {
                formatter.success(&format!(
                    "{} -> {}:{}",
                    args.local.display(),
                    device.serial(),
                    remote
                ));
                Ok(())
            }
        }
    }
}
