//! Filename sanitization and suffixed candidate paths for saved files.
//!
//! The disposition header is service-controlled text, so the on-disk name is
//! sanitized before it is joined onto the output directory.

use std::path::{Component, Path, PathBuf};

/// Name used when sanitization leaves nothing usable.
const FALLBACK_FILENAME: &str = "download.bin";

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Number of suffixed names tried before giving up.
pub(crate) const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Sanitized on-disk name for an announced filename.
pub(crate) fn safe_filename(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    if sanitized.trim_matches('_').is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Path for the `attempt`-th try at saving `filename` in `dir`.
///
/// `out.pdf`, then `out_1.pdf`, `out_2.pdf`, ... The caller claims the path
/// with `create_new` and moves to the next attempt when it already exists.
pub(crate) fn candidate_path(dir: &Path, filename: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return dir.join(filename);
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    };
    dir.join(format!("{stem}_{attempt}{ext}"))
}
