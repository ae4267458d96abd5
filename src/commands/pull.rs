use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::types::OutputFormat;
use crate::error::{AdbError, Result};
use crate::progress::{IndicatifProgress, ProgressReporter};
use async_trait::async_trait;
use log::debug;
use serde_json::json;
use std::path::{Path, PathBuf};

pub struct PullCommand;

#[derive(Debug, Clone)]
pub struct PullArgs {
    pub remote: String,
    pub local: Option<PathBuf>,
}

impl PullCommand {
    pub fn new() -> Self {
        Self
    }
}

/// Where a pull of `remote` should land given the optional `local` argument.
pub fn local_destination(remote: &str, local: Option<&Path>) -> Result<PathBuf> {
    let base_name = remote
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AdbError::InvalidArgument(format!("no file name in {}", remote)))?;

    Ok(match local {
        Some(path) if path.is_dir() => path.join(base_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(base_name),
    })
}

#[async_trait]
impl SubCommand for PullCommand {
    type Args = PullArgs;

    async fn run(&self, ctx: &CommandContext, args: PullArgs) -> Result<()> {
        let local = local_destination(&args.remote, args.local.as_deref())?;
        let device = ctx.target_device().await?;

        let stat = device.stat(&args.remote).await?;
        if !stat.exists() {
            return Err(AdbError::Rejected(format!(
                "remote object '{}' does not exist",
                args.remote
            )));
        }
        if stat.is_dir() {
            return Err(AdbError::InvalidArgument(format!(
                "{} is a directory",
                args.remote
            )));
        }
        debug!("Pulling {} ({} bytes) to {}", args.remote, stat.size, local.display());

        let name = local.display().to_string();
        let progress: Box<dyn ProgressReporter> = if ctx.should_show_progress() {
            Box::new(IndicatifProgress::file_transfer(&name, u64::from(stat.size)))
        } else {
            Box::new(IndicatifProgress::hidden())
        };
        device
            .pull_file_with_progress(&args.remote, &local, progress.as_ref())
            .await?;

        let formatter = ctx.formatter();
        match ctx.output_format {
            OutputFormat::Json => formatter.json(&json!({
                "serial": device.serial(),
                "remote": args.remote,
                "local": local,
                "size": stat.size,
            })),
            OutputFormat::Table => {
                formatter.success(&format!("{}:{} -> {}", device.serial(), args.remote, name));
                Ok(())
            }
        }
    }
}
