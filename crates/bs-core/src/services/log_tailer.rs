use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{BuildServerError, Result};

/// Hard ceiling on lines returned by one tail request.
pub const MAX_TAIL_LINES: usize = 10_000;

/// Lines returned when the caller does not ask for a count.
pub const DEFAULT_TAIL_LINES: i64 = 100;

const CHUNK_SIZE: u64 = 8 * 1024;

/// Clamp a caller-supplied line count into `0..=MAX_TAIL_LINES`.
pub fn clamp_line_count(requested: i64) -> usize {
    requested.clamp(0, MAX_TAIL_LINES as i64) as usize
}

/// Where build logs are read from.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// The last `line_count` lines of `repository`'s log, oldest first.
    /// A log that does not exist yet is empty.
    async fn read_tail(&self, repository: &str, line_count: usize) -> Result<Vec<String>>;
}

/// Reads `<data_dir>/logs/<repository>.log`.
pub struct FileLogSource {
    logs_directory: PathBuf,
}

impl FileLogSource {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            logs_directory: data_dir.join("logs"),
        }
    }

    pub fn log_path(&self, repository: &str) -> PathBuf {
        self.logs_directory.join(format!("{repository}.log"))
    }
}

#[async_trait]
impl LogSource for FileLogSource {
    async fn read_tail(&self, repository: &str, line_count: usize) -> Result<Vec<String>> {
        let path = self.log_path(repository);
        tokio::task::spawn_blocking(move || read_tail(&path, line_count))
            .await
            .map_err(|e| BuildServerError::Io(std::io::Error::other(e)))?
            .map_err(BuildServerError::from)
    }
}

/// Read the last `line_count` lines of a file, walking backwards from the end
/// in fixed-size chunks so only the requested window is ever buffered.
pub fn read_tail(file_path: &Path, line_count: usize) -> std::io::Result<Vec<String>> {
    if line_count == 0 {
        return Ok(Vec::new());
    }
    let mut file = match File::open(file_path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut position = file.metadata()?.len();
    let mut buffer: Vec<u8> = Vec::new();
    let mut newlines = 0;

    // One newline more than the window guarantees its first line is whole.
    while position > 0 && newlines <= line_count {
        let chunk_len = CHUNK_SIZE.min(position);
        position -= chunk_len;
        file.seek(SeekFrom::Start(position))?;

        let mut chunk = vec![0u8; chunk_len as usize];
        file.read_exact(&mut chunk)?;
        newlines += chunk.iter().filter(|&&b| b == b'\n').count();

        chunk.extend_from_slice(&buffer);
        buffer = chunk;
    }

    let text = String::from_utf8_lossy(&buffer);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(line_count);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}
