//! Error types for the transfer pipeline.
//!
//! Every failure is terminal for the transfer it belongs to. Nothing in this
//! crate retries; the variant tells the caller which stage gave up.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::pipeline::PipelineState;

/// Errors that end a transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The request could not be built (empty input, unusable API base).
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request inputs.
        reason: String,
    },

    /// Transport-level failure (DNS, connect, TLS, timeout).
    #[error("request to {url} failed: {source}")]
    RequestFailed {
        /// The URL that was requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("request to {url} failed with HTTP {status}")]
    UnsuccessfulStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response carried no usable Content-Disposition filename.
    #[error("response has no usable filename header: {reason}")]
    MissingFilenameHeader {
        /// Why the header could not be used.
        reason: &'static str,
    },

    /// The destination could not be opened for the resolved filename.
    #[error("failed to open destination for {filename}: {source}")]
    SinkOpenFailed {
        /// The resolved filename.
        filename: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Reading the next chunk from the response body failed.
    #[error("failed to read response body: {source}")]
    ReadFailed {
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Writing a chunk to the destination failed.
    #[error("failed to write to {}: {source}", target.display())]
    WriteFailed {
        /// The destination being written.
        target: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Closing the destination failed after the last chunk.
    #[error("failed to close {}: {source}", target.display())]
    CloseFailed {
        /// The destination being closed.
        target: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The caller abandoned the transfer before it finished.
    #[error("transfer cancelled")]
    Cancelled,
}

impl TransferError {
    /// Creates an invalid request error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Creates a transport failure error.
    pub fn request_failed(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::RequestFailed {
            url: url.into(),
            source,
        }
    }

    /// Creates a non-success status error.
    pub fn unsuccessful_status(url: impl Into<String>, status: u16) -> Self {
        Self::UnsuccessfulStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a missing or malformed disposition header error.
    #[must_use]
    pub fn missing_filename(reason: &'static str) -> Self {
        Self::MissingFilenameHeader { reason }
    }

    /// Creates a sink open error.
    pub fn sink_open(filename: impl Into<String>, source: io::Error) -> Self {
        Self::SinkOpenFailed {
            filename: filename.into(),
            source,
        }
    }

    /// Creates a body read error.
    #[must_use]
    pub fn read(source: io::Error) -> Self {
        Self::ReadFailed { source }
    }

    /// Creates a sink write error.
    pub fn write(target: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFailed {
            target: target.into(),
            source,
        }
    }

    /// Creates a sink close error.
    pub fn close(target: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CloseFailed {
            target: target.into(),
            source,
        }
    }

    /// Returns true for failures of the outbound request itself.
    #[must_use]
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::UnsuccessfulStatus { .. }
        )
    }

    /// The pipeline state in which this error is raised.
    #[must_use]
    pub fn stage(&self) -> PipelineState {
        match self {
            Self::InvalidRequest { .. } | Self::Cancelled => PipelineState::Idle,
            Self::RequestFailed { .. } | Self::UnsuccessfulStatus { .. } => {
                PipelineState::Requesting
            }
            Self::MissingFilenameHeader { .. } | Self::SinkOpenFailed { .. } => {
                PipelineState::ResolvingName
            }
            Self::ReadFailed { .. } | Self::WriteFailed { .. } | Self::CloseFailed { .. } => {
                PipelineState::Streaming
            }
        }
    }
}
