use crate::device::apps::ShellExecutor;
use crate::error::{AdbError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Scripted stand-in for a device's shell, recording every call
#[derive(Default)]
pub struct MockShell {
    pub responses: HashMap<String, String>,
    pub fail_upload: Option<String>,
    pub commands: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<(String, String)>>,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, command: &str, output: &str) -> Self {
        self.responses
            .insert(command.to_string(), output.to_string());
        self
    }

    pub fn fail_uploads(mut self, reason: &str) -> Self {
        self.fail_upload = Some(reason.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShellExecutor for MockShell {
    async fn run_shell(&self, command: &str) -> Result<String> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(self.responses.get(command).cloned().unwrap_or_default())
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        if let Some(reason) = &self.fail_upload {
            return Err(AdbError::Rejected(reason.clone()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((local.display().to_string(), remote.to_string()));
        Ok(())
    }
}
