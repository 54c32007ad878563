//! Error types shared by the whole crate.

use crate::codepoint::CodePoint;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised while extracting or building tables.
///
/// A codec miss (`RangeMap::decode` / `RangeMap::encode` returning `None`) is
/// not an error and has no variant here.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The same encoded sequence was seen twice, or seen both as a prefix and
    /// as a complete sequence. The upstream data is malformed.
    #[error("structural conflict in encoding tree at {path:02X?}: {kind}")]
    StructuralConflict { path: Vec<u8>, kind: ConflictKind },

    /// `OrderCatalog::insert` called before `set_comparator`.
    #[error("order catalog used before a comparator was configured")]
    MissingComparator,

    /// Failure reported by the ground-truth oracle, passed through untouched.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The oracle answered with the unknown marker for a code point before the
    /// marker itself had been mapped, so a real mapping cannot be told apart
    /// from a missing one.
    #[error("code point U+{codepoint:04X} returned unknown marker {marker:02X?} before the marker was mapped")]
    UnmappedUnknownMarker { codepoint: CodePoint, marker: Vec<u8> },

    /// A built range map does not reproduce one of the pairs it was built from.
    #[error("range map round trip failed for {input:02X?}: expected {expected:02X?}, got {actual:02X?}")]
    RoundTripMismatch {
        input: Vec<u8>,
        expected: Vec<u8>,
        actual: Option<Vec<u8>>,
    },

    /// The oracle's UTF-8 charset encodes a code point differently from
    /// standard UTF-8.
    #[error("oracle encodes U+{codepoint:04X} as {actual:02X?}, expected {expected:02X?}")]
    Utf8Mismatch {
        codepoint: CodePoint,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// Consecutive code points are not ordered ascending, either by their
    /// UTF-8 bytes or by the oracle's binary collation.
    #[error("U+{previous:04X} does not sort before U+{codepoint:04X}: {ordering:?}")]
    OrderMismatch {
        previous: CodePoint,
        codepoint: CodePoint,
        ordering: std::cmp::Ordering,
    },

    /// A case conversion query did not produce exactly one valid code point.
    #[error("case mapping of U+{codepoint:04X} is not a single code point: {mapped:?}")]
    InvalidCaseMapping {
        codepoint: CodePoint,
        mapped: Vec<CodePoint>,
    },
}

/// Why a payload could not be stored on a trie node.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    #[error("node already has children")]
    HasChildren,
    #[error("node already carries a payload")]
    PayloadAlreadySet,
    #[error("sequence length is not between 1 and 4")]
    InvalidLength,
}

/// Error produced by an `Oracle` implementation.
#[derive(Error, Debug)]
#[error("oracle query failed: {message}")]
pub struct OracleError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl OracleError {
    /// Creates an error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error (connection, driver, parse failure).
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
