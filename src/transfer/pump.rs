//! Byte transfer from a response body into a destination sink.
//!
//! Two interchangeable strategies implement [`StreamTransfer`]:
//!
//! - [`DirectConnect`] hands the body to `tokio::io::copy` against the sink's
//!   own writer, so the writer's flow control paces the source.
//! - [`ManualPump`] reads one chunk, writes it, waits for the write, and only
//!   then asks for the next chunk. At most one chunk is in flight.
//!
//! Both write chunks in source order, close the sink exactly once on success
//! and abort it exactly once on a read or write failure.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio_util::io::StreamReader;
use tracing::{debug, trace};

use super::error::TransferError;
use super::sink::DestinationSink;

/// A response body: ordered chunks of unknown total length.
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Counters for one finished transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Bytes accepted by the sink.
    pub bytes_written: u64,
    /// Non-empty chunks read from the source.
    pub chunks: u64,
}

/// Moves every byte of a source into a sink and produces one outcome.
#[async_trait]
pub trait StreamTransfer: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the transfer to completion or first failure.
    ///
    /// # Errors
    ///
    /// `ReadFailed`, `WriteFailed` or `CloseFailed` carrying the originating
    /// IO error.
    async fn transfer(
        &self,
        source: BodyStream,
        sink: Box<dyn DestinationSink>,
    ) -> Result<TransferStats, TransferError>;
}

/// Chunk-by-chunk read/write loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualPump;

#[async_trait]
impl StreamTransfer for ManualPump {
    fn name(&self) -> &'static str {
        "pump"
    }

    async fn transfer(
        &self,
        mut source: BodyStream,
        mut sink: Box<dyn DestinationSink>,
    ) -> Result<TransferStats, TransferError> {
        let mut stats = TransferStats::default();

        while let Some(next) = source.next().await {
            let chunk = match next {
                Ok(chunk) => chunk,
                Err(e) => {
                    sink.abort().await;
                    return Err(TransferError::read(e));
                }
            };
            if chunk.is_empty() {
                continue;
            }

            let len = chunk.len() as u64;
            if let Err(e) = sink.write(chunk).await {
                let target = sink.target().to_path_buf();
                sink.abort().await;
                return Err(TransferError::write(target, e));
            }
            stats.bytes_written += len;
            stats.chunks += 1;
            trace!(chunk = stats.chunks, len, "chunk written");
        }

        finish(sink, stats).await
    }
}

/// Connects the body straight to the sink's async writer.
///
/// Falls back to [`ManualPump`] for sinks that expose no writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectConnect;

#[async_trait]
impl StreamTransfer for DirectConnect {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn transfer(
        &self,
        source: BodyStream,
        mut sink: Box<dyn DestinationSink>,
    ) -> Result<TransferStats, TransferError> {
        let Some(writer) = sink.as_async_write() else {
            debug!("sink exposes no writer; pumping chunks manually");
            return ManualPump.transfer(source, sink).await;
        };

        // io::copy reports read and write errors alike; tag the source side.
        let read_failed = AtomicBool::new(false);
        let chunks = AtomicU64::new(0);
        let tagged = source.inspect(|item| match item {
            Ok(chunk) if !chunk.is_empty() => {
                chunks.fetch_add(1, Ordering::Relaxed);
            }
            Ok(_) => {}
            Err(_) => read_failed.store(true, Ordering::Relaxed),
        });
        let mut reader = StreamReader::new(tagged);

        match tokio::io::copy(&mut reader, writer).await {
            Ok(bytes_written) => {
                let stats = TransferStats {
                    bytes_written,
                    chunks: chunks.load(Ordering::Relaxed),
                };
                finish(sink, stats).await
            }
            Err(e) => {
                let error = if read_failed.load(Ordering::Relaxed) {
                    TransferError::read(e)
                } else {
                    TransferError::write(sink.target().to_path_buf(), e)
                };
                sink.abort().await;
                Err(error)
            }
        }
    }
}

async fn finish(
    sink: Box<dyn DestinationSink>,
    stats: TransferStats,
) -> Result<TransferStats, TransferError> {
    let target = sink.target().to_path_buf();
    sink.close()
        .await
        .map_err(|e| TransferError::close(target, e))?;
    Ok(stats)
}

/// Which [`StreamTransfer`] a pipeline uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferStrategy {
    /// Direct connect when the sink factory supports it, else manual pumping.
    #[default]
    Auto,
    /// Always direct connect.
    Direct,
    /// Always pump manually.
    Pump,
}

impl TransferStrategy {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Direct => "direct",
            Self::Pump => "pump",
        }
    }

    /// Picks the implementation given the sink factory's capability flag.
    #[must_use]
    pub fn select(self, direct_capable: bool) -> Arc<dyn StreamTransfer> {
        match self {
            Self::Direct => Arc::new(DirectConnect),
            Self::Pump => Arc::new(ManualPump),
            Self::Auto if direct_capable => Arc::new(DirectConnect),
            Self::Auto => Arc::new(ManualPump),
        }
    }
}

impl fmt::Display for TransferStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "direct" => Ok(Self::Direct),
            "pump" => Ok(Self::Pump),
            other => Err(format!(
                "unknown transfer strategy '{other}' (expected auto, direct or pump)"
            )),
        }
    }
}
