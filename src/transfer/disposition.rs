//! Content-Disposition filename resolution.
//!
//! The parsing service names its output with a header such as
//! `attachment; filename=81431-p3hk28.pdf`. The rule applied here:
//!
//! 1. Scan the header value for the **last** `=` that is not inside a quoted
//!    string. The name is the text after it, so an unquoted value keeps any
//!    `;` it contains (`filename=a;b.pdf` gives `a;b.pdf`).
//! 2. A value starting with `"` is read up to its closing quote, with `\`
//!    escapes removed. `;` and `=` inside the quotes are part of the name.
//! 3. Surrounding whitespace is trimmed. When the parameter in front of that
//!    `=` is `filename*` in RFC 5987 form (`UTF-8''name%20here.pdf`), the
//!    value is percent-decoded.
//!
//! A missing header, a value without any `=`, or an empty result is an
//! error. There is no default filename.

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};

use super::error::TransferError;

/// Resolves the destination filename from response headers.
///
/// # Errors
///
/// Returns [`TransferError::MissingFilenameHeader`] when the header is
/// absent, is not valid text, or carries no filename.
pub fn resolve_filename(headers: &HeaderMap) -> Result<String, TransferError> {
    let value = headers
        .get(CONTENT_DISPOSITION)
        .ok_or_else(|| TransferError::missing_filename("Content-Disposition header absent"))?;
    let value = value.to_str().map_err(|_| {
        TransferError::missing_filename("Content-Disposition header is not valid text")
    })?;
    parse_disposition_filename(value)
        .ok_or_else(|| TransferError::missing_filename("Content-Disposition carries no filename"))
}

/// Extracts the filename from a raw Content-Disposition value.
#[must_use]
pub fn parse_disposition_filename(value: &str) -> Option<String> {
    let (param, raw) = split_last_assignment(value)?;
    let raw = raw.trim();
    let raw = match raw.strip_prefix('"') {
        Some(quoted) => unquote(quoted),
        None => raw.to_string(),
    };

    let name = if param.eq_ignore_ascii_case("filename*") {
        decode_ext_value(&raw)
    } else {
        raw
    };

    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Finds the last `=` outside a quoted string.
///
/// Returns the parameter name in front of it and everything after it.
fn split_last_assignment(value: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut param_start = 0;
    let mut last = None;

    for (i, c) in value.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ';' => param_start = i + 1,
            '=' => last = Some((param_start, i)),
            _ => {}
        }
    }

    let (start, eq) = last?;
    Some((value[start..eq].trim(), &value[eq + 1..]))
}

/// Reads a quoted-string body up to its closing quote.
fn unquote(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Decodes `charset'lang'pct-encoded`; values without the `''` marker are kept.
fn decode_ext_value(raw: &str) -> String {
    let Some((_, encoded)) = raw.split_once("''") else {
        return raw.to_string();
    };
    urlencoding::decode(encoded).map_or_else(|_| encoded.to_string(), |d| d.into_owned())
}
