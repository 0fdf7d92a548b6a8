//! Helpers for running child processes with bounded output and an optional timeout.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 1_000_000;

/// A child process to run: argv plus working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub argv: Vec<String>,
    /// Working directory; inherits the caller's when `None`.
    pub workdir: Option<PathBuf>,
}

impl CommandRequest {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            workdir: None,
        }
    }

    pub fn in_dir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// The argv joined with spaces, for logs and error messages.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

/// Captured child process output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Stdout followed by stderr, for parsers that do not care which stream was used.
    pub fn combined_lossy(&self) -> String {
        let mut out = self.stdout_lossy();
        out.push_str(&self.stderr_lossy());
        out
    }

    /// Human-readable exit status (`exit code 2`, `timed out`, ...).
    pub fn status_label(&self) -> String {
        if self.timed_out {
            return "timed out".to_string();
        }
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Abstraction over process execution so callers can be tested without spawning.
pub trait CommandRunner {
    /// Run the request to completion. Errors only when the process could not be run
    /// at all; a non-zero exit is reported through [`CommandOutput::success`].
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput>;
}

/// Runner that spawns real child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Kill the child after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            timeout: None,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
        }
    }
}

impl ProcessRunner {
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, request: &CommandRequest) -> Result<CommandOutput> {
        let (program, args) = request
            .argv
            .split_first()
            .ok_or_else(|| anyhow!("empty command line"))?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &request.workdir {
            cmd.current_dir(dir);
        }
        run_command(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run `{}`", request.command_line()))
    }
}

/// Run a command and capture stdout/stderr without risking pipe deadlocks.
///
/// Output is read concurrently while the child runs. `output_limit_bytes` bounds the amount of
/// stdout/stderr stored in memory (bytes beyond this are discarded while still draining the pipe).
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs()), output_limit_bytes))]
pub fn run_command(
    mut cmd: Command,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    let mut timed_out = false;
    let status = match timeout {
        None => child.wait().context("wait for command")?,
        Some(limit) => match child.wait_timeout(limit).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
                timed_out = true;
                child.kill().context("kill command")?;
                child.wait().context("wait command after kill")?
            }
        },
    };

    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        success: status.success() && !timed_out,
        code: status.code(),
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
