//! Classifying the text that follows an `#include` marker.

use memchr::{memchr, memchr2};

/// Length of `#include`.
const MARKER_LEN: usize = 8;

/// What an `#include` directive names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `#include "text"`: a project file, resolved relative to the includer.
    Quoted(&'a str),
    /// `#include <...>`: a system header, never tracked.
    System,
    /// Malformed; the scan moves on past it.
    Skipped(SkipReason),
}

/// Why a directive was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither `"` nor `<` on the rest of the line.
    NoDelimiter,
    /// An opening `"` with no closing `"` on the same line.
    Unterminated,
    /// `#include ""`.
    Empty,
    /// The quoted text is not valid UTF-8.
    NotUtf8,
}

/// Classifies the directive whose `#` is at `marker`.
///
/// Looks only at the rest of the marker's line. The first `"` or `<` decides
/// the kind: `<` means a system include even if a `"` follows later on the
/// line.
pub fn classify(bytes: &[u8], marker: usize) -> Directive<'_> {
    let start = (marker + MARKER_LEN).min(bytes.len());
    let rest = &bytes[start..];
    let line = match memchr(b'\n', rest) {
        Some(end) => &rest[..end],
        None => rest,
    };

    let Some(open) = memchr2(b'"', b'<', line) else {
        return Directive::Skipped(SkipReason::NoDelimiter);
    };
    if line[open] == b'<' {
        return Directive::System;
    }

    let body = &line[open + 1..];
    let Some(close) = memchr(b'"', body) else {
        return Directive::Skipped(SkipReason::Unterminated);
    };
    match std::str::from_utf8(&body[..close]) {
        Ok("") => Directive::Skipped(SkipReason::Empty),
        Ok(text) => Directive::Quoted(text),
        Err(_) => Directive::Skipped(SkipReason::NotUtf8),
    }
}
