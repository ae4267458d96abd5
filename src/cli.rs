use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputType {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// ADB server hostname (overrides ~/.adbwire.toml)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// ADB server port (overrides ~/.adbwire.toml)
    #[arg(long, short = 'p', global = true)]
    pub port: Option<u16>,

    /// Connection timeout in seconds
    #[arg(long, short = 't', global = true)]
    pub timeout: Option<u64>,

    /// Device serial, can be partial (required if multiple devices are connected)
    #[arg(long, short = 's', global = true)]
    pub serial: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputType::Table)]
    pub output: OutputType,

    /// Suppress progress bars and status messages
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Lists attached devices
    Devices,

    /// Prints the ADB server protocol version
    Version,

    /// Prints the device state
    State,

    /// Runs a shell command and prints its output once it exits
    Shell {
        #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Runs a shell command and prints its output line by line
    Stream {
        /// Stop after this many seconds
        #[arg(long, short = 'd')]
        duration: Option<u64>,

        #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Lists a remote directory
    Ls {
        #[arg(default_value = "/sdcard")]
        path: String,
    },

    /// Shows type, mode, size and modification time of a remote path
    Stat { path: String },

    /// Copies a local file to the device
    Push {
        local: PathBuf,
        remote: String,
    },

    /// Copies a remote file from the device
    Pull {
        remote: String,
        local: Option<PathBuf>,
    },

    /// Forwards a local socket to the device, e.g. `tcp:8080 tcp:80`
    Forward {
        local: String,
        remote: String,
        /// Fail if the local socket is already forwarded
        #[arg(long)]
        no_rebind: bool,
    },

    /// Lists forward rules
    ForwardList {
        /// Include rules of every device
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Removes a forward rule, or all of them with --all
    ForwardKill {
        #[arg(required_unless_present = "all")]
        local: Option<String>,
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Installs an APK
    Install {
        apk: PathBuf,
        /// Replace an existing installation
        #[arg(long, short = 'r')]
        reinstall: bool,
        /// Extra `pm install` flags, e.g. `-g -t`
        #[arg(long = "flag", allow_hyphen_values = true)]
        flags: Vec<String>,
    },

    /// Removes a package
    Uninstall {
        package: String,
        /// Keep the data and cache directories
        #[arg(long, short = 'k')]
        keep_data: bool,
    },

    /// Manage the ADB server
    Server {
        #[arg(value_enum)]
        operation: ServerOperation,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerOperation {
    Start,
    Kill,
    Status,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Devices)
    }
}
