//! Transfer request construction.

use url::Url;

use super::kind::ParserKind;
use crate::transfer::TransferError;

/// Query parameter carrying the page range.
pub const PAGES_QUERY_PARAM: &str = "pages";

/// A fully built, immutable parse request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    target_url: String,
    page_range: Option<String>,
}

impl TransferRequest {
    /// Builds `<api_base><route><encoded input>[?pages=<encoded range>]`.
    ///
    /// The input and page range are percent-encoded here; only
    /// `A-Z a-z 0-9 - _ . ~` pass through unescaped. An empty page range is
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// [`TransferError::InvalidRequest`] when `input` is blank or `api_base`
    /// is not an absolute http(s) URL.
    pub fn build(
        api_base: &str,
        kind: ParserKind,
        input: &str,
        page_range: Option<&str>,
    ) -> Result<Self, TransferError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TransferError::invalid_request(format!(
                "{} input is empty (e.g. {})",
                kind.title(),
                kind.example_input()
            )));
        }

        let base = api_base.trim().trim_end_matches('/');
        let parsed = Url::parse(base).map_err(|e| {
            TransferError::invalid_request(format!("API base '{api_base}' is not a URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransferError::invalid_request(format!(
                "API base '{api_base}' must use http or https"
            )));
        }

        let mut target_url = format!("{base}{}{}", kind.route(), urlencoding::encode(input));
        let page_range = page_range
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if let Some(pages) = &page_range {
            target_url.push('?');
            target_url.push_str(PAGES_QUERY_PARAM);
            target_url.push('=');
            target_url.push_str(&urlencoding::encode(pages));
        }

        Ok(Self {
            target_url,
            page_range,
        })
    }

    /// The URL to request.
    #[must_use]
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// The page range, if any, before encoding.
    #[must_use]
    pub fn page_range(&self) -> Option<&str> {
        self.page_range.as_deref()
    }
}
