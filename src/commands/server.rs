use crate::adb::AdbServer;
use crate::cli::ServerOperation;
use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use colored::*;

pub struct ServerCommand;

#[derive(Debug, Clone)]
pub struct ServerArgs {
    pub operation: ServerOperation,
}

impl ServerCommand {
    pub fn new() -> Self {
        Self
    }
}

fn port_of(address: &str) -> Result<u16> {
    address
        .rsplit_once(':')
        .and_then(|(_, port)| port.parse().ok())
        .ok_or_else(|| AdbError::Config(format!("no port in server address {}", address)))
}

#[async_trait]
impl SubCommand for ServerCommand {
    type Args = ServerArgs;

    async fn run(&self, ctx: &CommandContext, args: ServerArgs) -> Result<()> {
        let client = ctx.manager.client();
        let formatter = ctx.formatter();

        match args.operation {
            ServerOperation::Start => {
                if client.is_running().await {
                    formatter.message(&format!("ADB server already running at {}", client.address()));
                    return Ok(());
                }
                AdbServer::start(port_of(client.address())?).await?;
                formatter.success("ADB server started");
            }
            ServerOperation::Kill => {
                client.kill_server().await?;
                formatter.success("ADB server stopped");
            }
            ServerOperation::Status => {
                if client.is_running().await {
                    println!("{} ADB server is running at {}", "●".green(), client.address());
                } else {
                    println!("{} ADB server is not running", "●".red());
                }
            }
        }
        Ok(())
    }
}
