use adbwire::cli::Cli;
use adbwire::commands::CommandRunner;
use adbwire::output::OutputFormatter;
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let result = match CommandRunner::new(&cli) {
        Ok(runner) => runner.run(cli.command()).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::new().error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
