use std::io::{ErrorKind, Read};
use std::time::Duration;

/// Bytes requested per `read` call in [`feed`].
pub const READ_CHUNK_SIZE: usize = 1024;

// A stream that never sends a newline is not a progress stream; stop buffering.
const MAX_PENDING_BYTES: usize = 64 * 1024;

/// One sample of ffmpeg's `-progress` output.
///
/// Fields absent from a block (or whose value failed to parse) stay `None`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Progress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_time_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
}

impl Progress {
    /// Parses a block of `key=value` lines into one snapshot.
    pub fn from_block(text: &str) -> Self {
        let mut progress = Self::default();
        for line in text.lines() {
            progress.apply_line(line);
        }
        progress
    }

    /// Applies one `key=value` line. Returns `false` for lines without `=` or
    /// with an unknown key. A value that fails to parse leaves its field as is.
    pub fn apply_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        let Some((key, value)) = line.split_once('=') else {
            return false;
        };
        let value = value.trim();

        match key.trim() {
            "frame" => set_parsed(&mut self.frame, value),
            "fps" => set_parsed(&mut self.fps, value),
            "bitrate" => self.bitrate = Some(value.to_string()),
            "total_size" => set_parsed(&mut self.total_size, value),
            "out_time" => self.out_time = Some(value.to_string()),
            "out_time_ms" => set_parsed(&mut self.out_time_ms, value),
            "speed" => self.speed = Some(value.to_string()),
            "progress" => self.progress = Some(value.to_string()),
            _ => return false,
        }
        true
    }

    /// Worth reporting: frames were produced or ffmpeg closed a block.
    pub fn is_ready(&self) -> bool {
        self.frame.is_some_and(|f| f > 0)
            || self.progress.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// ffmpeg's final block (`progress=end`).
    pub fn is_end(&self) -> bool {
        self.progress.as_deref() == Some("end")
    }

    /// Output timestamp. ffmpeg's `out_time_ms` is in microseconds despite its name.
    pub fn elapsed(&self) -> Option<Duration> {
        self.out_time_ms
            .and_then(|us| u64::try_from(us).ok())
            .map(Duration::from_micros)
    }
}

fn set_parsed<T: std::str::FromStr>(field: &mut Option<T>, value: &str) {
    if let Ok(v) = value.parse() {
        *field = Some(v);
    }
}

/// Incremental parser over raw progress bytes.
///
/// Each [`ProgressParser::push`] is one read batch: the complete lines it closes are
/// folded into a single snapshot. A trailing partial line is kept and completed by
/// the next push.
#[derive(Debug, Default)]
pub struct ProgressParser {
    pending: Vec<u8>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Option<Progress> {
        self.pending.extend_from_slice(chunk);

        let Some(end) = self.pending.iter().rposition(|&b| b == b'\n') else {
            if self.pending.len() > MAX_PENDING_BYTES {
                tracing::debug!(
                    bytes = self.pending.len(),
                    "discarding unterminated progress data"
                );
                self.pending.clear();
            }
            return None;
        };

        let complete: Vec<u8> = self.pending.drain(..=end).collect();
        ready(Progress::from_block(&String::from_utf8_lossy(&complete)))
    }

    /// Flushes a final line that was never newline-terminated.
    pub fn finish(&mut self) -> Option<Progress> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        ready(Progress::from_block(&String::from_utf8_lossy(&rest)))
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn ready(progress: Progress) -> Option<Progress> {
    progress.is_ready().then_some(progress)
}

/// Reads `reader` to the end in [`READ_CHUNK_SIZE`] chunks and hands every ready
/// snapshot to `sink`. Read errors end the stream quietly.
///
/// Returns the number of snapshots delivered.
pub fn feed<R, F>(mut reader: R, mut sink: F) -> usize
where
    R: Read,
    F: FnMut(Progress),
{
    let mut parser = ProgressParser::new();
    let mut buf = [0u8; READ_CHUNK_SIZE];
    let mut delivered = 0usize;

    let mut deliver = |progress: Progress| {
        tracing::trace!(?progress, "progress snapshot");
        sink(progress);
        delivered += 1;
    };

    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                tracing::debug!("progress stream closed");
                break;
            }
            Ok(n) => {
                if let Some(progress) = parser.push(&buf[..n]) {
                    deliver(progress);
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, "progress stream read failed");
                break;
            }
        }
    }

    if let Some(progress) = parser.finish() {
        deliver(progress);
    }
    delivered
}
