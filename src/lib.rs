//! uncut-edges Core Library
//!
//! Client side of the uncut-edges manuscript parser: it asks the parsing
//! service to render a manifest or catalog entry and streams the generated
//! file straight to disk.
//!
//! # Architecture
//!
//! - [`parser`] - Parser kinds, page ranges, and request URL construction
//! - [`transfer`] - Request issuing, filename resolution, and the streaming pump
//! - [`config`] - File-backed defaults for the CLI

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod parser;
pub mod transfer;
mod user_agent;

// Re-export commonly used types
pub use parser::{DEFAULT_API_URL, PageRanges, ParserKind, TransferRequest};
pub use transfer::{
    DirectorySinkFactory, HttpClient, ParserClient, Pipeline, TransferError, TransferOutcome,
    TransferReport, TransferStrategy,
};
