use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::types::OutputFormat;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;

pub struct StateCommand;

impl StateCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for StateCommand {
    type Args = ();

    async fn run(&self, ctx: &CommandContext, _args: ()) -> Result<()> {
        let device = ctx.target_device().await?;
        let state = device.state().await?;

        match ctx.output_format {
            OutputFormat::Json => ctx.formatter().json(&json!({
                "serial": device.serial(),
                "state": state,
            })),
            OutputFormat::Table => {
                println!("{}", state);
                Ok(())
            }
        }
    }
}
