//! Collision-free output filenames.
//!
//! Names take the form `{prefix}.{ext}` or `{prefix}_{N}.{ext}`, with `N`
//! zero-padded to the configured width. The target directory listing is the
//! only record of what has been written, so every call re-derives the next
//! counter from it. Nothing is reserved: two processes sequencing the same
//! directory and prefix at the same time can pick the same name, and callers
//! must serialize such exports themselves.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::ErrorKind;
use std::path::Path;

/// Largest accepted zero-padding width.
pub const MAX_PADDING: usize = 10;

/// Compute the next unused filename in `dir` for the given prefix.
///
/// With `padding == 0` the bare `{prefix}.{ext}` is returned when it does not
/// exist yet; otherwise (and always when `padding > 0`) the counter is one past
/// the highest `{prefix}_{digits}.{ext}` already present, starting at 1.
///
/// A missing directory counts as empty. Calling this twice without writing the
/// returned file in between yields the same name twice.
///
/// ```rust,no_run
/// use meta_export::naming::next_filename;
/// use std::path::Path;
///
/// let name = next_filename(Path::new("./out"), "image", 5, "png").unwrap();
/// assert_eq!(name, "image_00001.png"); // for an empty ./out
/// ```
pub fn next_filename(dir: &Path, prefix: &str, padding: usize, ext: &str) -> Result<String> {
    if padding == 0 {
        let bare = format!("{prefix}.{ext}");
        if !dir.join(&bare).exists() {
            return Ok(bare);
        }
        log::debug!("{bare} already exists, switching to numbered names");
    }

    let counter = highest_sequence_number(dir, prefix, ext)?.map_or(1, |n| n + 1);
    Ok(numbered_filename(prefix, counter, padding, ext))
}

/// Filename for the image at `index` (0-based) of a multi-image batch.
///
/// Derived from the position alone so siblings in one batch never collide.
pub fn batch_filename(prefix: &str, index: usize, padding: usize, ext: &str) -> String {
    numbered_filename(prefix, index as u64 + 1, padding, ext)
}

/// Render `{prefix}_{counter}.{ext}`; wider counters are never truncated.
fn numbered_filename(prefix: &str, counter: u64, padding: usize, ext: &str) -> String {
    format!("{prefix}_{counter:0padding$}.{ext}")
}

/// Highest numeric suffix among `{prefix}_{digits}.{ext}` entries in `dir`.
fn highest_sequence_number(dir: &Path, prefix: &str, ext: &str) -> Result<Option<u64>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
        }
    };

    let pattern = sequence_pattern(prefix, ext)?;
    let mut highest = None;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(caps) = pattern.captures(name) else {
            continue;
        };
        // Suffixes too long for u64 cannot be the next counter anyway.
        if let Ok(n) = caps[1].parse::<u64>() {
            highest = highest.max(Some(n));
        }
    }

    Ok(highest)
}

/// Regex for `{prefix}_{digits}.{ext}`, with prefix and extension matched literally.
fn sequence_pattern(prefix: &str, ext: &str) -> Result<Regex> {
    let pattern = format!(
        "^{}_([0-9]+)\\.{}$",
        regex::escape(prefix),
        regex::escape(ext)
    );
    Regex::new(&pattern).context("Failed to build filename pattern")
}
