//! Frame samples streamed out of a running `ffprobe`
//!
//! One child process per stream. Stdout is read a line at a time and decoded
//! lazily, so the child is only ever as far ahead of the checker as the pipe
//! buffer allows. Stderr is drained in the background so the child never
//! blocks on it; the first few KiB are kept for diagnostics.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;

use super::DetectError;
use super::checker::FrameSource;
use super::locator::ResourceLocator;
use super::sample::FrameSample;

/// Per-frame fields requested from ffprobe, in the order it prints them
pub const FRAME_ENTRIES: &str = "frame=pts_time,width,height,pix_fmt";

const STDERR_CAPTURE_LIMIT: u64 = 4 * 1024;
const STDERR_GRACE: Duration = Duration::from_secs(1);

/// Build the fixed ffprobe invocation: video streams only, errors only, one
/// headerless CSV record per decoded frame.
pub fn ffprobe_command(program: &Path, locator: &ResourceLocator) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(["-v", "error"])
        .args(["-select_streams", "v"])
        .args(["-show_entries", FRAME_ENTRIES])
        .args(["-of", "csv=p=0"])
        .args(["-i", locator.as_str()]);
    cmd
}

pub struct FrameSampleStream {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
    pid: Option<u32>,
    exit: Option<ExitStatus>,
}

impl FrameSampleStream {
    /// Spawn ffprobe for `locator`.
    pub fn open(program: &Path, locator: &ResourceLocator) -> Result<Self, DetectError> {
        Self::spawn(ffprobe_command(program, locator))
    }

    /// Spawn an already prepared analyzer command. Stdio is overridden: stdin
    /// is closed, stdout and stderr are piped.
    pub fn spawn(mut command: Command) -> Result<Self, DetectError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(DetectError::Spawn)?;
        let stdout = child.stdout.take().ok_or_else(|| {
            DetectError::Spawn(std::io::Error::other("analyzer stdout was not captured"))
        })?;
        let stderr = child.stderr.take().map(|pipe| tokio::spawn(drain_stderr(pipe)));
        let pid = child.id();

        Ok(Self {
            child,
            lines: BufReader::new(stdout).lines(),
            stderr,
            pid,
            exit: None,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Kill the child and wait for it to exit.
    ///
    /// Safe to call repeatedly; once the child has been reaped later calls
    /// return the recorded status without touching the process again.
    pub async fn cancel(&mut self) -> Result<ExitStatus, DetectError> {
        if let Some(status) = self.exit {
            return Ok(status);
        }
        if let Err(e) = self.child.start_kill() {
            // Already exited on its own; waiting below still reaps it
            tracing::debug!(pid = ?self.pid, "analyzer kill failed: {}", e);
        }
        self.reap().await
    }

    /// Wait for a child whose output has been fully consumed.
    pub async fn finish(&mut self) -> Result<ExitStatus, DetectError> {
        if let Some(status) = self.exit {
            return Ok(status);
        }
        self.reap().await
    }

    /// Collected stderr. Only complete once the child has exited.
    pub async fn take_stderr(&mut self) -> String {
        let Some(handle) = self.stderr.take() else {
            return String::new();
        };
        match tokio::time::timeout(STDERR_GRACE, handle).await {
            Ok(Ok(text)) => text,
            _ => String::new(),
        }
    }

    async fn reap(&mut self) -> Result<ExitStatus, DetectError> {
        let status = self.child.wait().await.map_err(DetectError::AnalyzerIo)?;
        self.exit = Some(status);
        Ok(status)
    }
}

impl FrameSource for FrameSampleStream {
    async fn next_sample(&mut self) -> Result<Option<FrameSample>, DetectError> {
        if self.exit.is_some() {
            return Ok(None);
        }
        match self
            .lines
            .next_line()
            .await
            .map_err(DetectError::AnalyzerIo)?
        {
            Some(line) => FrameSample::parse_record(&line).map(Some),
            None => Ok(None),
        }
    }
}

async fn drain_stderr(pipe: ChildStderr) -> String {
    let mut captured = Vec::new();
    let mut head = pipe.take(STDERR_CAPTURE_LIMIT);
    let _ = head.read_to_end(&mut captured).await;

    let mut rest = head.into_inner();
    let _ = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await;

    String::from_utf8_lossy(&captured).trim().to_string()
}
