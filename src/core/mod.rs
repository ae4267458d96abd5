pub mod context;
pub mod types;

pub use context::CommandContext;
pub use types::{DeviceState, DirectoryEntry, FileStat, ForwardRule, OutputFormat, DEFAULT_FILE_MODE};
