//! Settings for an extraction run, loadable with serde.

use crate::codepoint::CodePoint;
use crate::compress::DEFAULT_MIN_DYNAMIC_LEN;
use serde::{Deserialize, Serialize};

/// Static ranges at least this wide (upper - lower) are emitted as inline
/// range checks instead of table entries.
pub const DEFAULT_INLINE_THRESHOLD: i32 = 25;

/// How to recognise the oracle's "no such character" answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMarkerPolicy {
    /// Every answer is taken as a real encoding.
    Disabled,
    /// `bytes` is the substitution the oracle returns for unmappable code
    /// points. It is a real encoding only for `codepoint` itself.
    Marker { bytes: Vec<u8>, codepoint: CodePoint },
}

impl UnknownMarkerPolicy {
    /// The `?` substitution used by MySQL-compatible servers.
    pub fn question_mark() -> Self {
        UnknownMarkerPolicy::Marker {
            bytes: vec![b'?'],
            codepoint: b'?' as CodePoint,
        }
    }

    /// Whether `encoded` is the marker standing in for another code point.
    pub fn is_substitution(&self, codepoint: CodePoint, encoded: &[u8]) -> bool {
        match self {
            UnknownMarkerPolicy::Disabled => false,
            UnknownMarkerPolicy::Marker {
                bytes,
                codepoint: marker,
            } => encoded == bytes.as_slice() && codepoint != *marker,
        }
    }
}

impl Default for UnknownMarkerPolicy {
    fn default() -> Self {
        Self::question_mark()
    }
}

/// Settings for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Character set queried through the oracle.
    pub charset: String,
    /// Collation for weight discovery. Its name usually starts with the
    /// character set followed by an underscore.
    pub collation: Option<String>,
    /// Stop after this many code points. Useful for quick runs.
    pub sample_limit: Option<usize>,
    pub unknown_marker: UnknownMarkerPolicy,
    /// Check every pair against the built range map.
    pub verify_round_trip: bool,
    /// Query upper/lower case mappings for every valid code point.
    pub case_mappings: bool,
    pub min_dynamic_len: usize,
    pub inline_threshold: i32,
}

impl ExtractConfig {
    pub fn new(charset: impl Into<String>) -> Self {
        Self {
            charset: charset.into(),
            ..Self::default()
        }
    }

    /// Configures a collation and derives the character set from its prefix.
    pub fn for_collation(collation: impl Into<String>) -> Self {
        let collation = collation.into();
        let charset = collation
            .split('_')
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            charset,
            collation: Some(collation),
            ..Self::default()
        }
    }

    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    pub fn with_unknown_marker(mut self, policy: UnknownMarkerPolicy) -> Self {
        self.unknown_marker = policy;
        self
    }

    pub fn with_round_trip_check(mut self, verify: bool) -> Self {
        self.verify_round_trip = verify;
        self
    }

    pub fn with_case_mappings(mut self, enabled: bool) -> Self {
        self.case_mappings = enabled;
        self
    }

    pub fn with_min_dynamic_len(mut self, len: usize) -> Self {
        self.min_dynamic_len = len;
        self
    }

    pub fn with_inline_threshold(mut self, threshold: i32) -> Self {
        self.inline_threshold = threshold;
        self
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            charset: String::new(),
            collation: None,
            sample_limit: None,
            unknown_marker: UnknownMarkerPolicy::default(),
            verify_round_trip: true,
            case_mappings: true,
            min_dynamic_len: DEFAULT_MIN_DYNAMIC_LEN,
            inline_threshold: DEFAULT_INLINE_THRESHOLD,
        }
    }
}
