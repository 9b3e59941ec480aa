//! The request side of a transfer: one outbound GET, one response.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use super::error::TransferError;
use super::pump::BodyStream;

/// Headers and an open body for one response.
///
/// Dropping the descriptor drops the body, which releases the connection.
pub struct ResponseDescriptor {
    /// Final URL of the response.
    pub url: String,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body, not yet read.
    pub body: BodyStream,
}

impl fmt::Debug for ResponseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseDescriptor")
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Issues exactly one request per call.
#[async_trait]
pub trait RequestIssuer: Send + Sync {
    /// Sends a GET for a fully formed URL.
    ///
    /// # Errors
    ///
    /// `RequestFailed` for transport failures and `UnsuccessfulStatus` for
    /// non-2xx responses.
    async fn issue(&self, url: &str) -> Result<ResponseDescriptor, TransferError>;
}
