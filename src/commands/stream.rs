use crate::commands::SubCommand;
use crate::core::context::CommandContext;
use crate::core::types::OutputFormat;
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use log::*;
use serde_json::json;
use std::time::Duration;

pub struct StreamCommand;

#[derive(Debug, Clone)]
pub struct StreamArgs {
    pub command: Vec<String>,
    pub duration: Option<u64>,
}

impl StreamCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SubCommand for StreamCommand {
    type Args = StreamArgs;

    async fn run(&self, ctx: &CommandContext, args: StreamArgs) -> Result<()> {
        let device = ctx.target_device().await?;
        let command = args.command.join(" ");

        let mut stream = device.execute_and_stream(&command).await?;
        let closer = stream.closer();

        // Ctrl-C and the optional deadline both end the stream the same way.
        let interrupt = closer.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupted, closing shell stream");
                interrupt.close();
            }
        });
        if let Some(secs) = args.duration {
            let deadline = closer.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                debug!("Stream duration of {}s elapsed", secs);
                deadline.close();
            });
        }

        let mut count = 0u64;
        loop {
            match stream.next_line().await {
                Ok(Some(line)) => {
                    count += 1;
                    match ctx.output_format {
                        OutputFormat::Json => println!("{}", json!({ "line": line })),
                        OutputFormat::Table => println!("{}", line),
                    }
                }
                Ok(None) => break,
                Err(AdbError::Closed) => break,
                Err(e) => return Err(e),
            }
        }

        closer.close();
        debug!("Streamed {} lines from '{}'", count, command);
        Ok(())
    }
}
