use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::Result;
use crate::output::DeviceRow;
use async_trait::async_trait;
use log::debug;

pub struct DevicesCommand;

impl DevicesCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for DevicesCommand {
    type Args = ();

    async fn run(&self, ctx: &CommandContext, _args: ()) -> Result<()> {
        let devices = ctx.manager.list_devices().await?;
        debug!("{} devices attached", devices.len());

        let rows: Vec<DeviceRow> = devices.iter().map(DeviceRow::from).collect();
        ctx.formatter().render(ctx.output_format, &rows)
    }
}
