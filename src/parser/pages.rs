//! Page-range expressions accepted by the parsing service.
//!
//! Grammar: comma-separated items, each a page number `N` or an inclusive
//! range `A-B` with `A <= B`. The service filters canvases by index with the
//! same rules, so validating here turns a late HTTP 400 into an early,
//! readable error.
//!
//! The service reads each number strictly and rejects whitespace, so a
//! parsed expression is rendered back in canonical form (`1 - 3, 5` becomes
//! `1-3,5`) before it is sent.

use std::fmt;
use std::str::FromStr;

use super::error::PageRangeError;

/// A validated page-range expression in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRanges {
    canonical: String,
}

impl PageRanges {
    /// Parses an expression such as `1-3,5`.
    ///
    /// # Errors
    ///
    /// Returns [`PageRangeError`] for empty items, malformed items,
    /// non-numeric pages, or reversed ranges.
    pub fn parse(input: &str) -> Result<Self, PageRangeError> {
        let mut items = Vec::new();
        for item in input.split(',') {
            let item = item.trim();
            if item.is_empty() {
                return Err(PageRangeError::EmptyItem {
                    input: input.to_string(),
                });
            }

            let canonical = match item.split_once('-') {
                Some((start, end)) => {
                    if end.contains('-') {
                        return Err(PageRangeError::InvalidFormat {
                            item: item.to_string(),
                        });
                    }
                    let start = parse_page(start)?;
                    let end = parse_page(end)?;
                    if start > end {
                        return Err(PageRangeError::Reversed {
                            item: item.to_string(),
                        });
                    }
                    format!("{start}-{end}")
                }
                None => parse_page(item)?.to_string(),
            };
            items.push(canonical);
        }

        Ok(Self {
            canonical: items.join(","),
        })
    }

    /// The canonical expression, suitable for the `pages` query.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

fn parse_page(value: &str) -> Result<u32, PageRangeError> {
    let value = value.trim();
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PageRangeError::InvalidNumber {
            value: value.to_string(),
        });
    }
    value.parse::<u32>().map_err(|_| PageRangeError::InvalidNumber {
        value: value.to_string(),
    })
}

impl FromStr for PageRanges {
    type Err = PageRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PageRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
