use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::types::OutputFormat;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;
use std::io::Write;

pub struct ShellCommand;

#[derive(Debug, Clone)]
pub struct ShellArgs {
    pub command: Vec<String>,
}

impl ShellCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for ShellCommand {
    type Args = ShellArgs;

    async fn run(&self, ctx: &CommandContext, args: ShellArgs) -> Result<()> {
        let device = ctx.target_device().await?;
        let command = args.command.join(" ");

        match ctx.output_format {
            OutputFormat::Json => {
                let output = device.shell(&command, &[]).await?;
                ctx.formatter().json(&json!({
                    "serial": device.serial(),
                    "command": command,
                    "output": output,
                }))
            }
            OutputFormat::Table => {
                let output = device.execute_and_collect(&command).await?;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&output)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }
}
