//! Locating `#include` markers in a byte buffer.
//!
//! Two interchangeable finders return the offsets of every `#` that is
//! immediately followed by `include`. The lane finder builds a 32-bit match
//! mask per 32-byte lane and walks its set bits; the scalar finder checks one
//! byte at a time and also handles the lane finder's final partial lane.

use catalyze_common::ScanMode;

/// Bytes examined per lane by [`find_directives_lanes`].
pub const LANE_WIDTH: usize = 32;

const MARKER: u8 = b'#';
const KEYWORD: &[u8] = b"include";

/// Returns `true` if `bytes[pos]` is `#` and the next 7 bytes are `include`.
#[inline]
fn is_directive_at(bytes: &[u8], pos: usize) -> bool {
    bytes.get(pos + 1..pos + 1 + KEYWORD.len()) == Some(KEYWORD)
}

/// One bit per byte of `lane`, set where the byte is `#`.
#[inline]
fn lane_mask(lane: &[u8]) -> u32 {
    lane.iter()
        .enumerate()
        .fold(0, |mask, (i, &b)| mask | (u32::from(b == MARKER) << i))
}

fn scalar_from(bytes: &[u8], start: usize, out: &mut Vec<usize>) {
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if b == MARKER && is_directive_at(bytes, i) {
            out.push(i);
        }
    }
}

/// Offsets of every `#include` marker, one byte at a time.
pub fn find_directives_scalar(bytes: &[u8]) -> Vec<usize> {
    let mut out = Vec::new();
    scalar_from(bytes, 0, &mut out);
    out
}

/// Offsets of every `#include` marker, a lane at a time.
///
/// Returns exactly what [`find_directives_scalar`] returns for any input.
/// A keyword that straddles a lane boundary is still found because the
/// keyword check reads past the lane.
pub fn find_directives_lanes(bytes: &[u8]) -> Vec<usize> {
    let mut out = Vec::new();
    let lanes = bytes.chunks_exact(LANE_WIDTH);
    let tail_start = bytes.len() - lanes.remainder().len();

    for (lane_index, lane) in lanes.enumerate() {
        let base = lane_index * LANE_WIDTH;
        let mut mask = lane_mask(lane);
        while mask != 0 {
            let pos = base + mask.trailing_zeros() as usize;
            if is_directive_at(bytes, pos) {
                out.push(pos);
            }
            mask &= mask - 1;
        }
    }

    scalar_from(bytes, tail_start, &mut out);
    out
}

/// Offsets of every `#include` marker using the finder `mode` selects.
pub fn find_directives(bytes: &[u8], mode: ScanMode) -> Vec<usize> {
    match mode {
        ScanMode::Lanes => find_directives_lanes(bytes),
        ScanMode::Scalar => find_directives_scalar(bytes),
    }
}
