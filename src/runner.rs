use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    time::{Duration, Instant},
};

use crate::{
    command::CommandModel,
    foundation::error::{FfgraphError, FfgraphResult},
    progress::{self, Progress},
};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

// Only the tail of a parsed progress pipe is kept for error messages.
const MAX_DIAGNOSTIC_BYTES: usize = 64 * 1024;

/// Which child pipe carries the `-progress` key=value stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStream {
    /// `-progress pipe:2`, or ffmpeg's default diagnostics channel.
    #[default]
    Stderr,
    /// `-progress pipe:1`.
    Stdout,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub binary: PathBuf,
    /// Kill the process after this many milliseconds; `None` waits forever.
    pub timeout_ms: Option<u64>,
    pub progress_stream: ProgressStream,
    /// Create missing parent directories of file outputs before spawning.
    pub create_output_dirs: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            timeout_ms: None,
            progress_stream: ProgressStream::Stderr,
            create_output_dirs: true,
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> FfgraphResult<()> {
        if self.binary.as_os_str().is_empty() {
            return Err(FfgraphError::validation("runner: binary path cannot be empty"));
        }
        if self.timeout_ms == Some(0) {
            return Err(FfgraphError::validation(
                "runner: timeout must be non-zero when set",
            ));
        }
        Ok(())
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_progress_stream(mut self, stream: ProgressStream) -> Self {
        self.progress_stream = stream;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Builds the OS command for a rendered argv. Swapped out in tests.
pub trait CommandLauncher: Send + Sync {
    fn command(&self, binary: &Path, args: &[String]) -> Command;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLauncher;

impl CommandLauncher for SystemLauncher {
    fn command(&self, binary: &Path, args: &[String]) -> Command {
        let mut cmd = Command::new(binary);
        cmd.args(args);
        cmd
    }
}

/// Runs a [`CommandModel`] through the external binary.
pub struct Runner<L = SystemLauncher> {
    config: RunnerConfig,
    launcher: L,
}

impl Runner<SystemLauncher> {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            launcher: SystemLauncher,
        }
    }
}

impl Default for Runner<SystemLauncher> {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl<L: CommandLauncher> Runner<L> {
    pub fn with_launcher(config: RunnerConfig, launcher: L) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs to completion, discarding progress.
    pub fn run(&self, cmd: &CommandModel) -> FfgraphResult<()> {
        self.execute(cmd, None::<fn(Progress)>)
    }

    /// Runs to completion while a parser thread feeds progress snapshots to `sink`.
    pub fn run_with_progress<F>(&self, cmd: &CommandModel, sink: F) -> FfgraphResult<()>
    where
        F: FnMut(Progress) + Send,
    {
        self.execute(cmd, Some(sink))
    }

    fn execute<F>(&self, cmd: &CommandModel, sink: Option<F>) -> FfgraphResult<()>
    where
        F: FnMut(Progress) + Send,
    {
        self.config.validate()?;
        let args = cmd.render()?;

        if self.config.create_output_dirs {
            for path in cmd.output_paths().filter(|p| is_filesystem_path(p)) {
                ensure_parent_dir(Path::new(path))?;
            }
        }

        let mut command = self.launcher.command(&self.config.binary, &args);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::info!(binary = %self.config.binary.display(), args = args.len(), "spawning");
        let mut child = command.spawn().map_err(|e| {
            FfgraphError::process(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.config.binary.display()
            ))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stream = self.config.progress_stream;
        let timeout = self.config.timeout();

        let (status, diagnostics) = std::thread::scope(|s| {
            let (progress_pipe, other_pipe): (Option<Box<dyn Read + Send>>, _) = match stream {
                ProgressStream::Stderr => (boxed(stderr), boxed(stdout)),
                ProgressStream::Stdout => (boxed(stdout), boxed(stderr)),
            };

            let other = s.spawn(move || drain(other_pipe));
            let progress = s.spawn(move || match (progress_pipe, sink) {
                (Some(pipe), Some(sink)) => {
                    let mut tee = Tee::new(pipe, MAX_DIAGNOSTIC_BYTES);
                    progress::feed(&mut tee, sink);
                    tee.into_tail()
                }
                (pipe, _) => drain(pipe),
            });

            let status = wait(&mut child, timeout);
            let other = other.join().unwrap_or_else(|_| {
                tracing::warn!("pipe drain thread panicked");
                Vec::new()
            });
            let progress = progress.join().unwrap_or_else(|_| {
                tracing::warn!("progress thread panicked");
                Vec::new()
            });

            let diagnostics = match stream {
                ProgressStream::Stderr => progress,
                ProgressStream::Stdout => other,
            };
            (status, diagnostics)
        });

        let status = status?;
        tracing::debug!(%status, "process exited");
        if !status.success() {
            let text = String::from_utf8_lossy(&diagnostics);
            return Err(FfgraphError::process(format!(
                "'{}' failed ({}): {}",
                self.config.binary.display(),
                status,
                text.trim()
            )));
        }
        Ok(())
    }
}

/// Passes reads through while keeping the last `cap` bytes seen.
struct Tee<R> {
    inner: R,
    tail: Vec<u8>,
    cap: usize,
}

impl<R: Read> Tee<R> {
    fn new(inner: R, cap: usize) -> Self {
        Self {
            inner,
            tail: Vec::new(),
            cap,
        }
    }

    fn into_tail(self) -> Vec<u8> {
        self.tail
    }
}

impl<R: Read> Read for Tee<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.tail.extend_from_slice(&buf[..n]);
        if self.tail.len() > self.cap {
            let excess = self.tail.len() - self.cap;
            self.tail.drain(..excess);
        }
        Ok(n)
    }
}

fn boxed<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Box<dyn Read + Send>> {
    pipe.map(|p| Box::new(p) as Box<dyn Read + Send>)
}

fn drain(pipe: Option<Box<dyn Read + Send>>) -> Vec<u8> {
    let mut bytes = Vec::new();
    if let Some(mut pipe) = pipe
        && let Err(e) = pipe.read_to_end(&mut bytes)
    {
        tracing::debug!(error = %e, "pipe drain stopped early");
    }
    bytes
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> FfgraphResult<ExitStatus> {
    let Some(timeout) = timeout else {
        return child
            .wait()
            .map_err(|e| FfgraphError::process(format!("failed to wait for process: {e}")));
    };

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                kill(child);
                return Err(FfgraphError::process(format!(
                    "failed to poll process: {e}"
                )));
            }
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(?timeout, "process timed out, killing it");
            kill(child);
            return Err(FfgraphError::Timeout(timeout));
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "kill failed");
    }
    let _ = child.wait();
}

// `pipe:1`, `-`, and URLs are not files we can create directories for.
fn is_filesystem_path(path: &str) -> bool {
    !(path == "-" || path.starts_with("pipe:") || path.contains("://"))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FfgraphResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `binary -version` runs successfully.
pub fn is_binary_available(binary: &Path) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
