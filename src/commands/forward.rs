use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::Result;
use async_trait::async_trait;
use colored::*;

pub struct ForwardCommand;

#[derive(Debug, Clone)]
pub enum ForwardArgs {
    Add {
        local: String,
        remote: String,
        no_rebind: bool,
    },
    List {
        all: bool,
    },
    Kill {
        local: Option<String>,
        all: bool,
    },
}

impl ForwardCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for ForwardCommand {
    type Args = ForwardArgs;

    async fn run(&self, ctx: &CommandContext, args: ForwardArgs) -> Result<()> {
        let formatter = ctx.formatter();

        match args {
            ForwardArgs::Add {
                local,
                remote,
                no_rebind,
            } => {
                let device = ctx.target_device().await?;
                device.forward(&local, &remote, no_rebind).await?;
                formatter.success(&format!(
                    "{} {} {}:{}",
                    local,
                    "->".dimmed(),
                    device.serial(),
                    remote
                ));
            }
            ForwardArgs::List { all } => {
                let rules = if all {
                    ctx.manager.client().forward_list().await?
                } else {
                    ctx.target_device().await?.forward_list().await?
                };
                formatter.render(ctx.output_format, &rules)?;
            }
            ForwardArgs::Kill { all: true, .. } => {
                ctx.manager.client().forward_kill_all().await?;
                formatter.success("Removed all forward rules");
            }
            ForwardArgs::Kill { local, all: false } => {
                let local = local.unwrap_or_default();
                let device = ctx.target_device().await?;
                device.forward_kill(&local).await?;
                formatter.success(&format!("Removed {}", local));
            }
        }
        Ok(())
    }
}
