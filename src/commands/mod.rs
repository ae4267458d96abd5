use crate::core::context::CommandContext;
use crate::error::Result;
use async_trait::async_trait;

/// Base trait for all subcommands
#[async_trait]
pub trait SubCommand {
    type Args: Send;

    async fn run(&self, ctx: &CommandContext, args: Self::Args) -> Result<()>;
}

pub mod app;
pub mod devices;
pub mod forward;
pub mod ls;
pub mod pull;
pub mod push;
pub mod runner;
pub mod server;
pub mod shell;
pub mod state;
pub mod stat;
pub mod stream;
pub mod version;

pub use runner::CommandRunner;
