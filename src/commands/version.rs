use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::types::OutputFormat;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;

pub struct VersionCommand;

impl VersionCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for VersionCommand {
    type Args = ();

    async fn run(&self, ctx: &CommandContext, _args: ()) -> Result<()> {
        let client = ctx.manager.client();
        let version = client.server_version().await?;
        let formatter = ctx.formatter();

        match ctx.output_format {
            OutputFormat::Json => formatter.json(&json!({
                "address": client.address(),
                "version": version,
            })),
            OutputFormat::Table => {
                println!("Android Debug Bridge protocol version {}", version);
                Ok(())
            }
        }
    }
}
