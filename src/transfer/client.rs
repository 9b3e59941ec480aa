//! HTTP request issuer backed by `reqwest`.
//!
//! The client is built once and reused for every transfer so requests share
//! the connection pool. Each call to [`RequestIssuer::issue`] sends one GET
//! and hands back the unread body as a [`BodyStream`].

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::Client;
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::TransferError;
use super::pump::BodyStream;
use super::request::{RequestIssuer, ResponseDescriptor};
use crate::user_agent;

/// HTTP client for parse requests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Idle read timeout: 15 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values in seconds.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RequestIssuer for HttpClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn issue(&self, url: &str) -> Result<ResponseDescriptor, TransferError> {
        debug!("sending parse request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransferError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::unsuccessful_status(url, status.as_u16()));
        }
        debug!(status = status.as_u16(), "response received");

        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body: BodyStream = Box::pin(response.bytes_stream().map_err(io::Error::other));

        Ok(ResponseDescriptor {
            url: final_url,
            headers,
            body,
        })
    }
}
