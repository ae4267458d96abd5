use crate::core::types::{DirectoryEntry, FileStat};
use crate::output::TableFormat;
use serde::Serialize;

/// Human-readable size: `0B`, `512B`, `1.5K`, `3.2M`
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "K", "M", "G", "T"];

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{}{}", size, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}

fn format_mtime(entry_time: chrono::DateTime<chrono::Utc>) -> String {
    entry_time.format("%Y-%m-%d %H:%M").to_string()
}

impl TableFormat for DirectoryEntry {
    fn headers() -> Vec<&'static str> {
        vec!["PERMISSIONS", "SIZE", "MODIFIED", "NAME"]
    }

    fn row(&self) -> Vec<String> {
        // Full type check: sockets and block devices also carry the 0o040000 bit.
        let name = if self.file_type() == "directory" {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        };
        vec![
            self.permissions_string(),
            format_size(u64::from(self.size)),
            format_mtime(self.modified_at()),
            name,
        ]
    }
}

/// `stat` result paired with the path it describes
#[derive(Debug, Clone, Serialize)]
pub struct StatView {
    pub path: String,
    pub exists: bool,
    pub file_type: String,
    pub permissions: String,
    pub size: u32,
    pub mtime: u32,
    pub modified: String,
}

impl StatView {
    pub fn new(path: &str, stat: &FileStat) -> Self {
        Self {
            path: path.to_string(),
            exists: stat.exists(),
            file_type: stat.file_type().to_string(),
            permissions: stat.permissions_string(),
            size: stat.size,
            mtime: stat.mtime,
            modified: stat.modified_at().to_rfc3339(),
        }
    }
}

impl TableFormat for StatView {
    fn headers() -> Vec<&'static str> {
        vec!["PATH", "TYPE", "PERMISSIONS", "SIZE", "MODIFIED"]
    }

    fn row(&self) -> Vec<String> {
        if !self.exists {
            return vec![
                self.path.clone(),
                "missing".to_string(),
                String::new(),
                String::new(),
                String::new(),
            ];
        }
        vec![
            self.path.clone(),
            self.file_type.clone(),
            self.permissions.clone(),
            self.size.to_string(),
            self.modified.clone(),
        ]
    }
}
