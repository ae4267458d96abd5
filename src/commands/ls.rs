use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::Result;
use async_trait::async_trait;

pub struct LsCommand;

#[derive(Debug, Clone)]
pub struct LsArgs {
    pub path: String,
}

impl LsCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for LsCommand {
    type Args = LsArgs;

    async fn run(&self, ctx: &CommandContext, args: LsArgs) -> Result<()> {
        let device = ctx.target_device().await?;
        let mut entries = device.list_directory(&args.path).await?;
        entries.retain(|e| e.name != "." && e.name != "..");

        ctx.formatter().render(ctx.output_format, &entries)
    }
}
