//! Fallback resolution through an external command-line tool.

use crate::config::PlaybackConfig;
use crate::error::{ErrorKind, PlaybackError, Result};
use crate::media::MediaReference;
use crate::traits::{ResolutionOutcome, ResolutionStrategy, ResolveAttempt, StreamResolver};
use async_trait::async_trait;
use core_async::process::{is_launch_failure, Command, Stdio};
use core_async::time::timeout;
use core_runtime::logging::redact_stream_url;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs `<program> -f best --get-url --no-warnings --no-playlist -- <source>`
/// and takes the first non-blank stdout line as the stream URL.
///
/// The child gets its own process group (Unix) or no console window
/// (Windows). If it outlives the timeout, the whole tree is killed.
#[derive(Debug, Clone)]
pub struct SubprocessResolver {
    program: String,
    timeout: Duration,
}

impl SubprocessResolver {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.fallback_program.clone(), config.fallback_timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn arguments(source: &str) -> [&str; 7] {
        [
            "-f",
            "best",
            "--get-url",
            "--no-warnings",
            "--no-playlist",
            "--",
            source,
        ]
    }

    fn command(&self, source: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(Self::arguments(source))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        command
    }

    /// Run the tool and return the direct stream URL.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::SubprocessUnavailable`] if the tool cannot be launched
    /// - [`PlaybackError::SubprocessTimeout`] if it runs past the timeout
    /// - [`PlaybackError::NoStreamFound`] if it printed no URL
    pub async fn run(&self, source: &str) -> Result<String> {
        let child = self.command(source).spawn().map_err(|e| {
            let detail = if is_launch_failure(&e) {
                format!("{} is not installed or not executable ({})", self.program, e)
            } else {
                format!("failed to start {}: {}", self.program, e)
            };
            PlaybackError::SubprocessUnavailable(detail)
        })?;
        let pid = child.id();
        debug!(program = %self.program, pid, "Fallback resolver started");

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_tree(pid).await;
                }
                return Err(PlaybackError::SubprocessTimeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                program = %self.program,
                status = %output.status,
                stderr = %stderr.trim(),
                "Fallback resolver exited unsuccessfully"
            );
        }

        first_url_line(&String::from_utf8_lossy(&output.stdout))
            .map(str::to_string)
            .ok_or_else(|| PlaybackError::NoStreamFound(source.to_string()))
    }
}

#[async_trait]
impl StreamResolver for SubprocessResolver {
    async fn resolve(
        &self,
        reference: &MediaReference,
        _attempt: ResolveAttempt,
    ) -> ResolutionOutcome {
        match self.run(reference.source()).await {
            Ok(url) => {
                info!(url = %redact_stream_url(&url), "Fallback resolver returned a stream");
                ResolutionOutcome::Resolved {
                    url,
                    strategy: ResolutionStrategy::Fallback,
                }
            }
            Err(error) => {
                warn!(source = reference.source(), %error, "Fallback resolution failed");
                ResolutionOutcome::failed(error.kind().unwrap_or(ErrorKind::SubprocessUnavailable))
            }
        }
    }
}

/// First non-blank line, trimmed.
fn first_url_line(stdout: &str) -> Option<&str> {
    stdout.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Kill the child and everything it spawned.
#[cfg(unix)]
async fn kill_process_tree(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(error) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(pid, %error, "Process group already gone");
    }
}

#[cfg(windows)]
async fn kill_process_tree(pid: u32) {
    let pid = pid.to_string();
    let result = Command::new("taskkill")
        .args(["/PID", pid.as_str(), "/T", "/F"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .creation_flags(CREATE_NO_WINDOW)
        .status()
        .await;
    if let Err(error) = result {
        warn!(pid = %pid, %error, "taskkill failed");
    }
}

#[cfg(not(any(unix, windows)))]
async fn kill_process_tree(_pid: u32) {}
