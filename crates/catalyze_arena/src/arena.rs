//! The bump arena and its offset handles.

use tracing::{debug, trace};

/// Handle to a region of an [`Arena`].
///
/// A small copyable offset/length pair. It does not borrow the arena, so the
/// caller must only use it with the arena that issued it, and only until that
/// arena is [`reset`](Arena::reset).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArenaRef {
    off: u32,
    len: u32,
}

impl ArenaRef {
    /// Byte offset of the region within the arena.
    pub fn offset(self) -> usize {
        self.off as usize
    }

    /// Length of the region in bytes.
    pub fn len(self) -> usize {
        self.len as usize
    }

    /// Returns `true` for a zero-length region.
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    fn range(self) -> std::ops::Range<usize> {
        self.offset()..self.offset() + self.len()
    }
}

/// Usage counters for an [`Arena`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes handed out so far, including abandoned regions.
    pub used: usize,
    /// Bytes in regions abandoned by [`Arena::realloc`].
    pub wasted: usize,
    /// Hard capacity in bytes.
    pub capacity: usize,
}

impl ArenaStats {
    /// Bytes still reachable through live handles.
    pub fn live(&self) -> usize {
        self.used - self.wasted
    }

    /// Bytes left before allocation starts failing.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.used)
    }
}

/// Append-only byte arena with a hard capacity.
///
/// # Invariants
/// - `bytes.len() <= capacity`
/// - every issued `ArenaRef` satisfies `off + len <= bytes.len()` until reset
/// - `wasted <= bytes.len()`
#[derive(Debug)]
pub struct Arena {
    bytes: Vec<u8>,
    capacity: u32,
    wasted: u32,
}

impl Arena {
    /// Maximum eager pre-allocation (1 MiB).
    const PREALLOC_MAX_BYTES: usize = 1024 * 1024;

    /// Creates an arena that refuses to grow past `capacity` bytes.
    ///
    /// Capacities above `u32::MAX` are clamped, since handles are 32-bit.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = u32::try_from(capacity).unwrap_or(u32::MAX);
        Self {
            bytes: Vec::with_capacity((capacity as usize).min(Self::PREALLOC_MAX_BYTES)),
            capacity,
            wasted: 0,
        }
    }

    /// Reserves `size` zeroed bytes.
    ///
    /// Returns `None` if the request would exceed the arena's capacity.
    pub fn alloc(&mut self, size: usize) -> Option<ArenaRef> {
        let r = self.reserve(size)?;
        self.bytes.resize(r.offset() + r.len(), 0);
        Some(r)
    }

    /// Reserves a zeroed array of `count` elements of `elem_size` bytes each.
    pub fn alloc_zeroed_array(&mut self, elem_size: usize, count: usize) -> Option<ArenaRef> {
        let size = elem_size.checked_mul(count)?;
        self.alloc(size)
    }

    /// Copies `s` into the arena.
    pub fn strdup(&mut self, s: &str) -> Option<ArenaRef> {
        let r = self.reserve(s.len())?;
        self.bytes.extend_from_slice(s.as_bytes());
        Some(r)
    }

    /// Moves `old` into a fresh region of `new_size` bytes.
    ///
    /// The first `min(old.len(), new_size)` bytes are copied and any extra
    /// space is zeroed. The old region stays allocated but unreachable; it is
    /// counted in [`ArenaStats::wasted`] and only reclaimed by
    /// [`reset`](Self::reset). On failure `old` is untouched.
    pub fn realloc(&mut self, old: ArenaRef, new_size: usize) -> Option<ArenaRef> {
        let new = self.alloc(new_size)?;
        let keep = old.len().min(new_size);
        self.bytes
            .copy_within(old.offset()..old.offset() + keep, new.offset());
        self.wasted += old.len;
        trace!(
            from = old.len(),
            to = new_size,
            wasted = self.wasted,
            "arena realloc"
        );
        Some(new)
    }

    /// Returns the bytes of a region.
    ///
    /// # Panics
    ///
    /// Panics if `r` was not issued by this arena since its last reset.
    pub fn get(&self, r: ArenaRef) -> &[u8] {
        &self.bytes[r.range()]
    }

    /// Returns the bytes of a region for writing.
    ///
    /// # Panics
    ///
    /// Panics if `r` was not issued by this arena since its last reset.
    pub fn get_mut(&mut self, r: ArenaRef) -> &mut [u8] {
        &mut self.bytes[r.range()]
    }

    /// Returns a region written by [`strdup`](Self::strdup) as a string.
    ///
    /// A region holding anything other than UTF-8 reads as `""`; `strdup` only
    /// ever copies valid UTF-8.
    pub fn get_str(&self, r: ArenaRef) -> &str {
        std::str::from_utf8(self.get(r)).unwrap_or_default()
    }

    /// Reads element `index` of a `u32` array region.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the region.
    pub fn read_u32(&self, r: ArenaRef, index: usize) -> u32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.get(r)[index * 4..index * 4 + 4]);
        u32::from_le_bytes(word)
    }

    /// Writes element `index` of a `u32` array region.
    ///
    /// # Panics
    ///
    /// Panics if `index` is past the end of the region.
    pub fn write_u32(&mut self, r: ArenaRef, index: usize, value: u32) {
        self.get_mut(r)[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Releases every allocation at once. All previously issued handles
    /// become invalid.
    pub fn reset(&mut self) {
        self.bytes.clear();
        self.wasted = 0;
    }

    /// Current usage counters.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            used: self.bytes.len(),
            wasted: self.wasted as usize,
            capacity: self.capacity as usize,
        }
    }

    /// Bytes left before allocation starts failing.
    pub fn remaining(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.bytes.len())
    }

    fn reserve(&self, size: usize) -> Option<ArenaRef> {
        let off = self.bytes.len() as u32;
        let len = u32::try_from(size).ok();
        let end = len.and_then(|len| off.checked_add(len));
        match (len, end) {
            (Some(len), Some(end)) if end <= self.capacity => Some(ArenaRef { off, len }),
            _ => {
                debug!(
                    requested = size,
                    remaining = self.remaining(),
                    "arena exhausted"
                );
                None
            }
        }
    }
}

impl Default for Arena {
    /// A 16 MiB arena.
    fn default() -> Self {
        Self::with_capacity(16 * 1024 * 1024)
    }
}
