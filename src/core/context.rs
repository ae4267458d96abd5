use crate::core::types::OutputFormat;
use crate::device::{Device, DeviceManager};
use crate::error::Result;
use crate::output::OutputFormatter;

/// Shared context for all commands
#[derive(Clone)]
pub struct CommandContext {
    pub manager: DeviceManager,
    /// `-s/--serial`, possibly partial
    pub serial: Option<String>,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    pub fn new(manager: DeviceManager) -> Self {
        Self {
            manager,
            serial: None,
            output_format: OutputFormat::Table,
            quiet: false,
        }
    }

    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// The device named by `--serial`, or the only attached one.
    pub async fn target_device(&self) -> Result<Device> {
        self.manager.get_target_device(self.serial.as_deref()).await
    }

    pub fn formatter(&self) -> OutputFormatter {
        OutputFormatter::new().with_quiet(self.quiet)
    }

    /// Progress bars and status lines are suppressed for quiet and JSON output
    pub fn should_show_progress(&self) -> bool {
        !self.quiet && self.output_format != OutputFormat::Json
    }
}
