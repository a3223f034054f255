//! Append-only JSON-Lines output shared by all workers

use reviewgraph_domain::ExtractionResult;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

/// The output file behind a write lock
///
/// Each append writes one complete line and flushes before the lock is
/// released, so concurrent workers never interleave partial lines. A failed
/// append truncates the file back to where it started.
pub struct ResultSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl ResultSink {
    /// Open `path` for appending, creating it if needed
    ///
    /// A file left with a torn, unterminated last line gets a newline first so
    /// the next result starts on its own line.
    pub async fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let needs_newline = ends_without_newline(&path).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if needs_newline {
            file.write_all(b"\n").await?;
            file.flush().await?;
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `result` as one newline-terminated line
    pub async fn append(&self, result: &ExtractionResult) -> std::io::Result<()> {
        let mut line = result.to_json_line().map_err(std::io::Error::other)?;
        line.push('\n');

        let mut file = self.file.lock().await;
        append_line(&mut *file, line.as_bytes()).await
    }
}

/// The file operations an append relies on
trait LineTarget {
    async fn size(&mut self) -> std::io::Result<u64>;
    async fn write_line(&mut self, bytes: &[u8]) -> std::io::Result<()>;
    async fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

impl LineTarget for File {
    async fn size(&mut self) -> std::io::Result<u64> {
        Ok(self.metadata().await?.len())
    }

    async fn write_line(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.write_all(bytes).await?;
        self.flush().await
    }

    async fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len).await
    }
}

/// Write `bytes`, or leave the file as long as it was before
async fn append_line<F: LineTarget>(file: &mut F, bytes: &[u8]) -> std::io::Result<()> {
    let start = file.size().await?;
    if let Err(e) = file.write_line(bytes).await {
        if let Err(rollback) = file.truncate(start).await {
            warn!("Could not drop partial output line: {}", rollback);
        }
        return Err(e);
    }
    Ok(())
}

async fn ends_without_newline(path: &Path) -> std::io::Result<bool> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if file.metadata().await?.len() == 0 {
        return Ok(false);
    }

    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}
