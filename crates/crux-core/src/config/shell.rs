//! Shell execution capability used by command substitution

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{CruxError, CruxResult};

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a command line and captures its output.
///
/// Implementations must give up once `limit` has elapsed.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn exec(&self, command: &str, limit: Duration) -> CruxResult<CommandOutput>;
}

/// Executes commands through the platform shell (`sh -c` / `cmd /C`)
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    working_dir: Option<std::path::PathBuf>,
}

impl SystemShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands from the given directory
    pub fn in_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }

    fn build(&self, command: &str) -> Command {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandExecutor for SystemShell {
    async fn exec(&self, command: &str, limit: Duration) -> CruxResult<CommandOutput> {
        debug!("Executing substitution command: {}", command);

        let mut child = self
            .build(command)
            .spawn()
            .map_err(|e| CruxError::io(format!("Failed to spawn command: {}", e)))?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();

        let run = async move {
            let stdout_future = async move {
                let mut output = String::new();
                if let Some(mut handle) = stdout_handle {
                    handle.read_to_string(&mut output).await.ok();
                }
                output
            };
            let stderr_future = async move {
                let mut output = String::new();
                if let Some(mut handle) = stderr_handle {
                    handle.read_to_string(&mut output).await.ok();
                }
                output
            };
            let (stdout, stderr) = tokio::join!(stdout_future, stderr_future);
            let status = child.wait().await;
            (status, stdout, stderr)
        };

        match timeout(limit, run).await {
            Ok((Ok(status), stdout, stderr)) => {
                if status.success() {
                    Ok(CommandOutput { stdout, stderr })
                } else {
                    Err(CruxError::other(format!(
                        "command exited with {}: {}",
                        status,
                        stderr.trim()
                    )))
                }
            }
            Ok((Err(e), _, _)) => Err(CruxError::io(format!("Failed to wait for command: {}", e))),
            Err(_) => {
                warn!("Substitution command timed out after {:?}", limit);
                Err(CruxError::other(format!(
                    "command timed out after {} seconds",
                    limit.as_secs()
                )))
            }
        }
    }
}
