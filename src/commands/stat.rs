use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::Result;
use crate::output::StatView;
use async_trait::async_trait;

pub struct StatCommand;

#[derive(Debug, Clone)]
pub struct StatArgs {
    pub path: String,
}

impl StatCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for StatCommand {
    type Args = StatArgs;

    async fn run(&self, ctx: &CommandContext, args: StatArgs) -> Result<()> {
        let device = ctx.target_device().await?;
        let stat = device.stat(&args.path).await?;

        let view = StatView::new(&args.path, &stat);
        ctx.formatter().render(ctx.output_format, &[view])
    }
}
