use crate::cli::{Cli, Commands, OutputType};
use crate::commands::{
    app::{InstallArgs, InstallCommand, UninstallArgs, UninstallCommand},
    devices::DevicesCommand,
    forward::{ForwardArgs, ForwardCommand},
    ls::{LsArgs, LsCommand},
    pull::{PullArgs, PullCommand},
    push::{PushArgs, PushCommand},
    server::{ServerArgs, ServerCommand},
    shell::{ShellArgs, ShellCommand},
    stat::{StatArgs, StatCommand},
    state::StateCommand,
    stream::{StreamArgs, StreamCommand},
    version::VersionCommand,
    SubCommand,
};
use crate::config::Config;
use crate::core::context::CommandContext;
use crate::core::types::OutputFormat;
use crate::device::{AdbClient, DeviceManager};
use crate::error::Result;
use log::debug;

/// Routes parsed CLI arguments to their command
pub struct CommandRunner {
    ctx: CommandContext,
}

impl CommandRunner {
    /// Build the context from `~/.adbwire.toml` with CLI flags on top.
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = Config::load().with_overrides(cli.host.as_deref(), cli.port, cli.timeout);
        config.validate()?;
        debug!("Using ADB server at {}", config.address());

        let client = AdbClient::from_config(&config)?;
        let output_format = match cli.output {
            OutputType::Table => OutputFormat::Table,
            OutputType::Json => OutputFormat::Json,
        };

        let ctx = CommandContext::new(DeviceManager::new(client))
            .with_serial(cli.serial.clone())
            .with_output_format(output_format)
            .with_quiet(cli.quiet);
        Ok(Self { ctx })
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        debug!("CommandRunner::run() called with command: {:?}", command);
        let ctx = &self.ctx;

        match command {
            Commands::Devices => DevicesCommand::new().run(ctx, ()).await,
            Commands::Version => VersionCommand::new().run(ctx, ()).await,
            Commands::State => StateCommand::new().run(ctx, ()).await,
            Commands::Shell { command } => ShellCommand::new().run(ctx, ShellArgs { command }).await,
            Commands::Stream { command, duration } => {
                StreamCommand::new()
                    .run(ctx, StreamArgs { command, duration })
                    .await
            }
            Commands::Ls { path } => LsCommand::new().run(ctx, LsArgs { path }).await,
            Commands::Stat { path } => StatCommand::new().run(ctx, StatArgs { path }).await,
            Commands::Push { local, remote } => {
                PushCommand::new().run(ctx, PushArgs { local, remote }).await
            }
            Commands::Pull { remote, local } => {
                PullCommand::new().run(ctx, PullArgs { remote, local }).await
            }
            Commands::Forward {
                local,
                remote,
                no_rebind,
            } => {
                let args = ForwardArgs::Add {
                    local,
                    remote,
                    no_rebind,
                };
                ForwardCommand::new().run(ctx, args).await
            }
            Commands::ForwardList { all } => {
                ForwardCommand::new().run(ctx, ForwardArgs::List { all }).await
            }
            Commands::ForwardKill { local, all } => {
                ForwardCommand::new()
                    .run(ctx, ForwardArgs::Kill { local, all })
                    .await
            }
            Commands::Install {
                apk,
                reinstall,
                flags,
            } => {
                let args = InstallArgs {
                    apk,
                    reinstall,
                    flags,
                };
                InstallCommand::new().run(ctx, args).await
            }
            Commands::Uninstall { package, keep_data } => {
                UninstallCommand::new()
                    .run(ctx, UninstallArgs { package, keep_data })
                    .await
            }
            Commands::Server { operation } => {
                ServerCommand::new().run(ctx, ServerArgs { operation }).await
            }
        }
    }
}
