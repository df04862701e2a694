//! Spawning the external tool and streaming its output
//!
//! Both standard streams are read by their own task and merged into one channel
//! in arrival order per stream. Lines are split on `\n` and on `\r`, because the
//! tool redraws its progress line with carriage returns when it is not on a terminal.

use crate::command::ArgumentVector;
use crate::error::{ProcessError, Result};
use crate::types::{ExitOutcome, OutputStream};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

const LINE_CHANNEL_CAPACITY: usize = 256;
const READ_CHUNK: usize = 8 * 1024;

/// A line of output tagged with its stream
pub type OutputLine = (OutputStream, String);

/// Handle to a spawned external tool
///
/// Dropping the handle kills the process.
#[derive(Debug)]
pub struct RunningProcess {
    program: PathBuf,
    child: Child,
    lines: mpsc::Receiver<OutputLine>,
}

/// Spawn `program` with `args`, capturing stdout and stderr
pub fn spawn(program: &Path, args: &ArgumentVector) -> Result<RunningProcess> {
    let mut child = Command::new(program)
        .args(args.as_slice())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProcessError::SpawnFailed {
            program: program.display().to_string(),
            reason: e.to_string(),
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or(ProcessError::MissingPipe("stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or(ProcessError::MissingPipe("stderr"))?;

    let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
    forward_lines(stdout, OutputStream::Stdout, tx.clone());
    forward_lines(stderr, OutputStream::Stderr, tx);

    tracing::debug!(
        program = %program.display(),
        pid = ?child.id(),
        args = args.len(),
        "Spawned external tool"
    );

    Ok(RunningProcess {
        program: program.to_path_buf(),
        child,
        lines: rx,
    })
}

impl RunningProcess {
    /// OS process id, while the process is still running
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Next line from either stream; `None` once both streams are closed
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        self.lines.recv().await
    }

    /// Lines already received but not yet taken, without waiting for more
    pub fn drain_ready(&mut self) -> Vec<OutputLine> {
        let mut lines = Vec::new();
        while let Ok(line) = self.lines.try_recv() {
            lines.push(line);
        }
        lines
    }

    /// Wait for the process to exit and reap it
    pub async fn wait(&mut self) -> Result<ExitOutcome> {
        let status = self.child.wait().await?;
        let outcome = ExitOutcome::from(status);
        tracing::debug!(
            program = %self.program.display(),
            code = ?outcome.code,
            "External tool exited"
        );
        Ok(outcome)
    }

    /// Ask the process to stop
    ///
    /// On unix this sends `SIGTERM` so the tool can close its files; elsewhere the
    /// process is killed outright.
    pub fn terminate(&mut self) -> Result<()> {
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            let pid = libc::pid_t::try_from(pid)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
            // SAFETY: kill(2) takes plain integers and has no memory-safety
            // preconditions. The pid belongs to a child we have not reaped yet,
            // so it cannot have been recycled for another process.
            let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
            if rc != 0 {
                return Err(std::io::Error::last_os_error().into());
            }
            return Ok(());
        }

        self.kill()
    }

    /// Kill the process without waiting for it
    pub fn kill(&mut self) -> Result<()> {
        match self.child.start_kill() {
            Ok(()) => Ok(()),
            // Already exited
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Output of a process run to completion
#[derive(Clone, Debug, Default)]
pub struct Captured {
    /// Every stdout line, in order
    pub stdout: Vec<String>,
    /// Every stderr line, in order
    pub stderr: Vec<String>,
    /// How the process ended
    pub exit: Option<ExitOutcome>,
}

impl Captured {
    /// Stdout joined back with newlines
    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }

    /// `Ok(self)` on exit code 0, otherwise the matching [`ProcessError`]
    pub fn into_result(self) -> Result<Self> {
        match self.exit.and_then(|e| e.code) {
            Some(0) => Ok(self),
            Some(code) => Err(ProcessError::NonZeroExit { code }.into()),
            None => Err(ProcessError::Crashed.into()),
        }
    }
}

/// Spawn, collect every line, and wait for exit
///
/// `on_line` sees each line as it arrives, before the process has finished.
pub async fn run_to_completion<F>(
    program: &Path,
    args: &ArgumentVector,
    mut on_line: F,
) -> Result<Captured>
where
    F: FnMut(OutputStream, &str),
{
    let mut process = spawn(program, args)?;
    let mut captured = Captured::default();

    while let Some((stream, line)) = process.next_line().await {
        on_line(stream, &line);
        match stream {
            OutputStream::Stdout => captured.stdout.push(line),
            OutputStream::Stderr => captured.stderr.push(line),
        }
    }

    captured.exit = Some(process.wait().await?);
    Ok(captured)
}

fn forward_lines<R>(mut reader: R, stream: OutputStream, tx: mpsc::Sender<OutputLine>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut splitter = LineSplitter::default();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(error = %e, ?stream, "Failed to read process output");
                    break;
                }
            };
            for line in splitter.push(&buf[..n]) {
                if tx.send((stream, line)).await.is_err() {
                    return;
                }
            }
        }
        if let Some(line) = splitter.finish() {
            let _ = tx.send((stream, line)).await;
        }
    });
}

/// Incremental splitter on `\n` and `\r`
///
/// Empty segments (from `\r\n` or blank lines) are dropped. Invalid UTF-8 is
/// replaced rather than rejected.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &b in bytes {
            if b == b'\n' || b == b'\r' {
                if !self.pending.is_empty() {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
            } else {
                self.pending.push(b);
            }
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}
