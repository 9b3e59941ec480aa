//! Error types for request input parsing.

use thiserror::Error;

/// Errors in a page-range expression such as `1-3,5`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRangeError {
    /// The expression (or one comma-separated item) is empty.
    #[error("empty page range item in '{input}'\n  Suggestion: Use pages like 1-3,5")]
    EmptyItem {
        /// The full expression.
        input: String,
    },

    /// An item is not a page number or a `start-end` pair.
    #[error("invalid range format: {item}\n  Suggestion: Use a single page (5) or a range (1-3)")]
    InvalidFormat {
        /// The offending item.
        item: String,
    },

    /// A page number is not a non-negative integer.
    #[error("invalid number: {value}")]
    InvalidNumber {
        /// The offending text.
        value: String,
    },

    /// A range starts after it ends.
    #[error("start of range is greater than end: {item}")]
    Reversed {
        /// The offending item.
        item: String,
    },
}
