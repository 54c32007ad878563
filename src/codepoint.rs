/// A Unicode scalar value candidate. Signed so that offsets and sentinels can
/// live in the same type.
pub type CodePoint = i32;

/// Highest valid code point.
pub const MAX_CODEPOINT: CodePoint = 0x10FFFF;

pub const SURROGATE_MIN: CodePoint = 0xD800;
pub const SURROGATE_MAX: CodePoint = 0xDFFF;

/// Number of values `CodepointIter` yields without a limit.
pub const CODEPOINT_COUNT: usize = (MAX_CODEPOINT as usize + 1) - 2048;

/// Iterates over every valid code point in ascending order, skipping the
/// surrogate block.
///
/// The sequence is restartable with [`reset`](Self::reset) and can be capped
/// with a limit for sampling.
#[derive(Debug, Clone)]
pub struct CodepointIter {
    next: CodePoint,
    count: usize,
    limit: usize,
}

impl CodepointIter {
    pub fn new() -> Self {
        Self {
            next: 0,
            count: 0,
            limit: usize::MAX,
        }
    }

    /// Caps the number of emitted code points.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Returns to the first code point. The limit is kept.
    pub fn reset(&mut self) {
        self.next = 0;
        self.count = 0;
    }
}

impl Default for CodepointIter {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for CodepointIter {
    type Item = CodePoint;

    fn next(&mut self) -> Option<CodePoint> {
        if self.count >= self.limit || self.next > MAX_CODEPOINT {
            return None;
        }

        if (SURROGATE_MIN..=SURROGATE_MAX).contains(&self.next) {
            self.next = SURROGATE_MAX + 1;
        }

        let current = self.next;
        self.next += 1;
        self.count += 1;

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next > MAX_CODEPOINT {
            0
        } else {
            let surrogates = if self.next <= SURROGATE_MAX {
                (SURROGATE_MAX + 1 - self.next.max(SURROGATE_MIN)) as usize
            } else {
                0
            };
            (MAX_CODEPOINT + 1 - self.next) as usize - surrogates
        };
        let remaining = remaining.min(self.limit.saturating_sub(self.count));

        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CodepointIter {}

/// UTF-8 encoding of a code point, `None` for surrogates and out-of-range values.
pub fn utf8_bytes(codepoint: CodePoint) -> Option<Vec<u8>> {
    let c = char::from_u32(u32::try_from(codepoint).ok()?)?;
    let mut buf = [0u8; 4];
    Some(c.encode_utf8(&mut buf).as_bytes().to_vec())
}

/// Decodes a byte sequence holding exactly one UTF-8 character.
pub fn from_utf8_bytes(bytes: &[u8]) -> Option<CodePoint> {
    let s = std::str::from_utf8(bytes).ok()?;
    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(c as CodePoint)
}
