//! Destination sinks: where a transfer's bytes end up.
//!
//! A sink is owned by exactly one transfer. `close` and `abort` consume the
//! boxed sink, so a transfer can finish it at most once; dropping a sink
//! without either must still release its resources.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};

use super::filename::{MAX_NAME_ATTEMPTS, candidate_path, safe_filename};

/// A writable destination accepting ordered chunks.
#[async_trait]
pub trait DestinationSink: Send {
    /// Where the bytes are going, for logs and error context.
    fn target(&self) -> &Path;

    /// Writes one chunk. Resolves once the chunk is accepted.
    async fn write(&mut self, chunk: Bytes) -> io::Result<()>;

    /// Exposes the sink as a raw async writer for direct connection.
    ///
    /// Sinks returning `None` are always fed chunk by chunk.
    fn as_async_write(&mut self) -> Option<&mut (dyn AsyncWrite + Send + Unpin)> {
        None
    }

    /// Finishes the destination after the last chunk.
    async fn close(self: Box<Self>) -> io::Result<()>;

    /// Abandons the destination after a failure. Written bytes are kept.
    async fn abort(self: Box<Self>);
}

/// Opens one destination per transfer.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    /// Opens a destination for `filename`.
    async fn open(&self, filename: &str) -> io::Result<Box<dyn DestinationSink>>;

    /// Whether sinks from this factory can be connected directly to a source.
    fn supports_direct_connect(&self) -> bool {
        false
    }
}

/// Saves each transfer as a new file inside one directory.
#[derive(Debug, Clone)]
pub struct DirectorySinkFactory {
    dir: PathBuf,
}

impl DirectorySinkFactory {
    /// Creates a factory writing into `dir` (created on first open).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SinkFactory for DirectorySinkFactory {
    #[instrument(level = "debug", skip(self), fields(dir = %self.dir.display()))]
    async fn open(&self, filename: &str) -> io::Result<Box<dyn DestinationSink>> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = safe_filename(filename);

        // create_new claims the name atomically, so concurrent opens of the
        // same name each end up with their own suffix.
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = candidate_path(&self.dir, &name, attempt);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    debug!(path = %path.display(), "opened destination file");
                    return Ok(Box::new(FileSink::new(path, file)));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "no free name for {name} after {MAX_NAME_ATTEMPTS} attempts in {}",
                self.dir.display()
            ),
        ))
    }

    fn supports_direct_connect(&self) -> bool {
        true
    }
}

/// A buffered file destination.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Wraps an already opened file.
    #[must_use]
    pub fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: BufWriter::new(file),
        }
    }
}

#[async_trait]
impl DestinationSink for FileSink {
    fn target(&self) -> &Path {
        &self.path
    }

    async fn write(&mut self, chunk: Bytes) -> io::Result<()> {
        self.writer.write_all(&chunk).await
    }

    fn as_async_write(&mut self) -> Option<&mut (dyn AsyncWrite + Send + Unpin)> {
        Some(&mut self.writer)
    }

    async fn close(mut self: Box<Self>) -> io::Result<()> {
        self.writer.shutdown().await
    }

    async fn abort(mut self: Box<Self>) {
        // Push out what was buffered so the truncated file matches what was received.
        if let Err(e) = self.writer.flush().await {
            debug!(path = %self.path.display(), error = %e, "flush during abort failed");
        }
        warn!(
            path = %self.path.display(),
            "transfer aborted; destination may hold a truncated file"
        );
    }
}
