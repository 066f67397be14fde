use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use videoqueue::queue::QueueItem;

/// Note passed to the processing command when the item has none.
pub const DEFAULT_NOTE: &str = "Uploaded via Automation";
/// Longest failure detail stored on an item.
pub const MAX_DETAIL_CHARS: usize = 200;

#[derive(Debug)]
pub struct ProcessError {
    pub code: &'static str,
    pub message: String,
}

impl ProcessError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Text stored as the item's `error_detail`.
    pub fn detail(&self) -> String {
        truncate_chars(&format!("{}: {}", self.code, self.message.trim()), MAX_DETAIL_CHARS)
    }
}

/// Does the actual work for one claimed item.
#[async_trait]
pub trait VideoProcessor: Send + Sync {
    async fn process(&self, item: &QueueItem) -> Result<(), ProcessError>;
}

/// Runs an operator-supplied program once per item:
/// `<program> <args...> <source_url> <note>`, with `VQ_ITEM_ID` in its
/// environment. Exit status 0 means done.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProcessor {
    /// Splits `command_line` on whitespace. `None` when it is blank.
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl VideoProcessor for CommandProcessor {
    async fn process(&self, item: &QueueItem) -> Result<(), ProcessError> {
        let note = item.note.as_deref().unwrap_or(DEFAULT_NOTE);

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&item.source_url)
            .arg(note)
            .env("VQ_ITEM_ID", item.id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessError::new("SPAWN_FAILED", format!("{}: {e}", self.program)))?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(|e| ProcessError::new("IO", e.to_string()))?,
            Err(_) => {
                return Err(ProcessError::new(
                    "TIMEOUT",
                    format!("processing timeout after {}s", self.timeout.as_secs()),
                ))
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = if stderr.trim().is_empty() {
            stdout.into_owned()
        } else {
            stderr.into_owned()
        };
        let message = if message.trim().is_empty() {
            format!("exited with {}", output.status)
        } else {
            message
        };
        Err(ProcessError::new("COMMAND_FAILED", message))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
