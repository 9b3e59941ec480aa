//! Request inputs: parser kinds, page ranges, and URL construction.
//!
//! # Example
//!
//! ```
//! use uncut_edges_core::parser::{ParserKind, TransferRequest};
//!
//! let request = TransferRequest::build(
//!     "https://uncut-edges.onrender.com",
//!     ParserKind::Penn,
//!     "81431-p3hk28",
//!     Some("1-3,5"),
//! )
//! .unwrap();
//! assert_eq!(
//!     request.target_url(),
//!     "https://uncut-edges.onrender.com/parse/penn/81431-p3hk28?pages=1-3%2C5"
//! );
//! ```

mod error;
mod kind;
mod pages;
mod request;

pub use error::PageRangeError;
pub use kind::ParserKind;
pub use pages::PageRanges;
pub use request::{PAGES_QUERY_PARAM, TransferRequest};

/// Public parsing service used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://uncut-edges.onrender.com";
