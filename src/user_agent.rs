//! User-Agent string sent with every parse request.

/// Default User-Agent for parse requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("uncut-edges/{version} (manuscript-parser-client)")
}
