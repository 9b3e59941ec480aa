//! Streaming transfer pipeline.
//!
//! One transfer issues one request to the parsing service, names the output
//! from the `Content-Disposition` header, and moves the response body into a
//! destination sink without buffering the whole payload.
//!
//! # Components
//!
//! - [`RequestIssuer`] / [`HttpClient`] - outbound GET, yields a [`ResponseDescriptor`]
//! - [`resolve_filename`] - filename from the disposition header
//! - [`SinkFactory`] / [`DirectorySinkFactory`] - where the bytes go
//! - [`StreamTransfer`] - [`DirectConnect`] or [`ManualPump`]
//! - [`Pipeline`] / [`ParserClient`] - the orchestration state machine
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use uncut_edges_core::parser::{DEFAULT_API_URL, ParserKind};
//! use uncut_edges_core::transfer::{
//!     DirectorySinkFactory, HttpClient, ParserClient, TransferStrategy,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ParserClient::new(
//!     DEFAULT_API_URL,
//!     Arc::new(HttpClient::new()?),
//!     Arc::new(DirectorySinkFactory::new("./downloads")),
//!     TransferStrategy::Auto,
//! );
//! let report = client.parse(ParserKind::Penn, "81431-p3hk28", Some("1-3")).await?;
//! println!("Saved {} bytes to {}", report.bytes_written, report.path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod disposition;
mod error;
mod filename;
mod pipeline;
mod pump;
mod request;
mod sink;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use disposition::{parse_disposition_filename, resolve_filename};
pub use error::TransferError;
pub use pipeline::{ParserClient, Pipeline, PipelineState, TransferOutcome, TransferReport};
pub use pump::{
    BodyStream, DirectConnect, ManualPump, StreamTransfer, TransferStats, TransferStrategy,
};
pub use request::{RequestIssuer, ResponseDescriptor};
pub use sink::{DestinationSink, DirectorySinkFactory, FileSink, SinkFactory};
