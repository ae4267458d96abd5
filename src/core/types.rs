use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// File type constants (from stat.h)
const S_IFMT: u32 = 0o170000; // bit mask for the file type bit field
const S_IFSOCK: u32 = 0o140000; // socket
const S_IFLNK: u32 = 0o120000; // symbolic link
const S_IFREG: u32 = 0o100000; // regular file
const S_IFBLK: u32 = 0o060000; // block device
const S_IFDIR: u32 = 0o040000; // directory
const S_IFCHR: u32 = 0o020000; // character device
const S_IFIFO: u32 = 0o010000; // FIFO

/// Mode used for pushed files when the caller does not pick one.
pub const DEFAULT_FILE_MODE: u32 = 0o664;

/// Device state as reported by `host-serial:<serial>:get-state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Online,
    Offline,
    Unauthorized,
    Disconnected,
    Unknown,
}

impl DeviceState {
    /// Map the server's state word. An empty reply means the device went away.
    pub fn from_server(s: &str) -> Self {
        match s.trim() {
            "" => DeviceState::Disconnected,
            "device" => DeviceState::Online,
            "offline" => DeviceState::Offline,
            "unauthorized" => DeviceState::Unauthorized,
            _ => DeviceState::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeviceState::Online => "online",
            DeviceState::Offline => "offline",
            DeviceState::Unauthorized => "unauthorized",
            DeviceState::Disconnected => "disconnected",
            DeviceState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A port-forward binding known to the ADB server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRule {
    pub serial: String,
    pub local: String,
    pub remote: String,
}

impl ForwardRule {
    /// Parse one `host:list-forward` line: `<serial> <local> <remote>`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(serial), Some(local), Some(remote), None) => Some(Self {
                serial: serial.to_string(),
                local: local.to_string(),
                remote: remote.to_string(),
            }),
            _ => None,
        }
    }

    pub fn parse_list(output: &str) -> Vec<Self> {
        output.lines().filter_map(Self::parse_line).collect()
    }
}

/// One entry of a sync `LIST` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub mode: u32,
    pub size: u32,
    /// Seconds since the Unix epoch
    pub mtime: u32,
}

impl DirectoryEntry {
    /// Tests only the 0o040000 bit, as a listing's directory flag does.
    /// Use [`file_type`](Self::file_type) to tell sockets and block devices apart.
    pub fn is_dir(&self) -> bool {
        self.mode & S_IFDIR == S_IFDIR
    }

    pub fn is_file(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    pub fn is_symlink(&self) -> bool {
        self.mode & S_IFMT == S_IFLNK
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        timestamp(self.mtime)
    }

    pub fn file_type(&self) -> &'static str {
        file_type(self.mode)
    }

    pub fn permissions_string(&self) -> String {
        permissions_string(self.mode)
    }
}

/// Reply to a sync `STAT` request. A path that does not exist stats as all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub mode: u32,
    pub size: u32,
    pub mtime: u32,
}

impl FileStat {
    pub fn exists(&self) -> bool {
        self.mode != 0 || self.size != 0 || self.mtime != 0
    }

    pub fn is_dir(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    pub fn is_file(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        timestamp(self.mtime)
    }

    pub fn file_type(&self) -> &'static str {
        file_type(self.mode)
    }

    pub fn permissions_string(&self) -> String {
        permissions_string(self.mode)
    }
}

fn timestamp(secs: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(i64::from(secs), 0).unwrap_or_default()
}

pub fn file_type(mode: u32) -> &'static str {
    match mode & S_IFMT {
        S_IFSOCK => "socket",
        S_IFLNK => "symlink",
        S_IFREG => "file",
        S_IFBLK => "block",
        S_IFDIR => "directory",
        S_IFCHR => "char",
        S_IFIFO => "fifo",
        _ => "unknown",
    }
}

/// `ls -l` style rendering, e.g. `drwxr-x--x`
pub fn permissions_string(mode: u32) -> String {
    let kind = match mode & S_IFMT {
        S_IFIFO => 'p',
        S_IFCHR => 'c',
        S_IFDIR => 'd',
        S_IFBLK => 'b',
        S_IFREG => '-',
        S_IFLNK => 'l',
        S_IFSOCK => 's',
        _ => '?',
    };

    let mut out = String::with_capacity(10);
    out.push(kind);
    out.push_str(&permission_triplet(mode >> 6, mode & 0o4000 != 0, 's'));
    out.push_str(&permission_triplet(mode >> 3, mode & 0o2000 != 0, 's'));
    out.push_str(&permission_triplet(mode, mode & 0o1000 != 0, 't'));
    out
}

fn permission_triplet(bits: u32, special: bool, special_char: char) -> String {
    let mut triplet = String::with_capacity(3);
    triplet.push(if bits & 4 != 0 { 'r' } else { '-' });
    triplet.push(if bits & 2 != 0 { 'w' } else { '-' });
    triplet.push(match (bits & 1 != 0, special) {
        (false, false) => '-',
        (true, false) => 'x',
        (false, true) => special_char.to_ascii_uppercase(),
        (true, true) => special_char,
    });
    triplet
}

/// How command results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
