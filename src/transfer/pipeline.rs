//! Transfer orchestration: request → filename → sink → pump.
//!
//! A [`Pipeline`] runs exactly one transfer and is consumed by it. The state
//! machine is linear:
//!
//! ```text
//! Idle → Requesting → ResolvingName → Streaming → Completed
//!   └──────────┴─────────────┴────────────┴──────→ Failed
//! ```
//!
//! [`ParserClient`] holds the long-lived collaborators and builds a fresh
//! pipeline per request.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::disposition::resolve_filename;
use super::error::TransferError;
use super::pump::{StreamTransfer, TransferStrategy};
use super::request::RequestIssuer;
use super::sink::SinkFactory;
use crate::parser::{ParserKind, TransferRequest};

/// Terminal result of one transfer.
pub type TransferOutcome = Result<TransferReport, TransferError>;

/// Pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started.
    Idle,
    /// Waiting for the response.
    Requesting,
    /// Reading the filename and opening the sink.
    ResolvingName,
    /// Moving the body into the sink.
    Streaming,
    /// Every byte written and the sink closed.
    Completed,
    /// A fatal error ended the transfer.
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::ResolvingName => "resolving-name",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// What a completed transfer produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    /// The URL that was requested.
    pub url: String,
    /// The URL that answered, after any redirects.
    pub response_url: String,
    /// Filename announced by the service.
    pub filename: String,
    /// Where the sink put the bytes.
    pub path: PathBuf,
    /// Bytes written to the sink.
    pub bytes_written: u64,
    /// Non-empty chunks read from the body.
    pub chunks: u64,
    /// Strategy that moved the bytes.
    pub strategy: &'static str,
}

/// One-shot transfer state machine.
pub struct Pipeline {
    issuer: Arc<dyn RequestIssuer>,
    sinks: Arc<dyn SinkFactory>,
    transfer: Arc<dyn StreamTransfer>,
    state: PipelineState,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("transfer", &self.transfer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates an idle pipeline. The transfer strategy is fixed here.
    #[must_use]
    pub fn new(
        issuer: Arc<dyn RequestIssuer>,
        sinks: Arc<dyn SinkFactory>,
        transfer: Arc<dyn StreamTransfer>,
    ) -> Self {
        Self {
            issuer,
            sinks,
            transfer,
            state: PipelineState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs the transfer to its terminal outcome.
    ///
    /// # Errors
    ///
    /// Any [`TransferError`]; [`TransferError::stage`] tells where it failed.
    #[instrument(skip(self, request), fields(url = %request.target_url(), strategy = self.transfer.name()))]
    pub async fn run(mut self, request: &TransferRequest) -> TransferOutcome {
        let outcome = self.drive(request).await;
        match &outcome {
            Ok(report) => {
                self.enter(PipelineState::Completed);
                info!(
                    path = %report.path.display(),
                    bytes = report.bytes_written,
                    "transfer complete"
                );
            }
            Err(e) => {
                let failed_in = self.state;
                self.enter(PipelineState::Failed);
                warn!(stage = %failed_in, error = %e, "transfer failed");
            }
        }
        outcome
    }

    /// Runs the transfer unless `cancel` resolves first.
    ///
    /// On cancellation the in-flight transfer is dropped: no further reads
    /// are issued, the response body is released and the sink is dropped
    /// without being closed.
    ///
    /// # Errors
    ///
    /// [`TransferError::Cancelled`] when `cancel` wins, otherwise as
    /// [`run`](Self::run).
    pub async fn run_until<C>(self, request: &TransferRequest, cancel: C) -> TransferOutcome
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            outcome = self.run(request) => outcome,
            () = cancel => {
                warn!(url = %request.target_url(), "transfer cancelled by caller");
                Err(TransferError::Cancelled)
            }
        }
    }

    async fn drive(&mut self, request: &TransferRequest) -> TransferOutcome {
        self.enter(PipelineState::Requesting);
        let response = self.issuer.issue(request.target_url()).await?;
        if response.url != request.target_url() {
            debug!(response_url = %response.url, "request was redirected");
        }

        self.enter(PipelineState::ResolvingName);
        let filename = resolve_filename(&response.headers)?;
        debug!(filename = %filename, "resolved filename");
        let sink = self
            .sinks
            .open(&filename)
            .await
            .map_err(|e| TransferError::sink_open(filename.clone(), e))?;
        let path = sink.target().to_path_buf();

        self.enter(PipelineState::Streaming);
        let stats = self.transfer.transfer(response.body, sink).await?;

        Ok(TransferReport {
            url: request.target_url().to_string(),
            response_url: response.url,
            filename,
            path,
            bytes_written: stats.bytes_written,
            chunks: stats.chunks,
            strategy: self.transfer.name(),
        })
    }

    fn enter(&mut self, next: PipelineState) {
        debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
    }
}

/// Long-lived entry point: one instance, many independent transfers.
#[derive(Clone)]
pub struct ParserClient {
    api_base: String,
    issuer: Arc<dyn RequestIssuer>,
    sinks: Arc<dyn SinkFactory>,
    transfer: Arc<dyn StreamTransfer>,
}

impl fmt::Debug for ParserClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserClient")
            .field("api_base", &self.api_base)
            .field("transfer", &self.transfer)
            .finish_non_exhaustive()
    }
}

impl ParserClient {
    /// Creates a client. `strategy` is resolved against the sink factory's
    /// direct-connect capability once, here.
    pub fn new(
        api_base: impl Into<String>,
        issuer: Arc<dyn RequestIssuer>,
        sinks: Arc<dyn SinkFactory>,
        strategy: TransferStrategy,
    ) -> Self {
        let transfer = strategy.select(sinks.supports_direct_connect());
        debug!(strategy = %strategy, selected = transfer.name(), "transfer strategy selected");
        Self {
            api_base: api_base.into(),
            issuer,
            sinks,
            transfer,
        }
    }

    /// Name of the selected transfer strategy.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.transfer.name()
    }

    /// Builds the request for `kind`/`input`/`pages`.
    ///
    /// # Errors
    ///
    /// [`TransferError::InvalidRequest`] for empty input or a bad API base.
    pub fn request(
        &self,
        kind: ParserKind,
        input: &str,
        pages: Option<&str>,
    ) -> Result<TransferRequest, TransferError> {
        TransferRequest::build(&self.api_base, kind, input, pages)
    }

    /// A fresh pipeline sharing this client's collaborators.
    #[must_use]
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            Arc::clone(&self.issuer),
            Arc::clone(&self.sinks),
            Arc::clone(&self.transfer),
        )
    }

    /// Parses `input` with `kind` and saves the service's output.
    ///
    /// # Errors
    ///
    /// Any [`TransferError`].
    pub async fn parse(&self, kind: ParserKind, input: &str, pages: Option<&str>) -> TransferOutcome {
        let request = self.request(kind, input, pages)?;
        self.pipeline().run(&request).await
    }
}
