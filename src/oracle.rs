//! The source of ground truth that extraction queries.

use crate::codepoint::CodePoint;
use crate::error::OracleError;
use std::cmp::Ordering;

/// Source of ground truth for a character set and its collations.
///
/// Implementations usually wrap a database connection and issue one query per
/// call. Retries and connection handling belong to the implementation; the
/// extraction code calls every method as a plain blocking function and passes
/// failures through unchanged.
pub trait Oracle {
    /// Encoded form of `codepoint` in `charset`. An empty result means the
    /// code point has no representation.
    fn encode(&mut self, codepoint: CodePoint, charset: &str) -> Result<Vec<u8>, OracleError>;

    /// Three-way comparison of two code points under `collation`.
    fn compare(
        &mut self,
        left: CodePoint,
        right: CodePoint,
        collation: &str,
    ) -> Result<Ordering, OracleError>;

    /// Weight string of `codepoint` under `collation`, if the collation exposes
    /// one. Weight strings compare byte-wise.
    fn weight_string(
        &mut self,
        codepoint: CodePoint,
        collation: &str,
    ) -> Result<Option<Vec<u8>>, OracleError>;

    /// Upper-case form of `codepoint` in `charset`.
    fn to_upper(
        &mut self,
        codepoint: CodePoint,
        charset: &str,
    ) -> Result<Vec<CodePoint>, OracleError>;

    /// Lower-case form of `codepoint` in `charset`.
    fn to_lower(
        &mut self,
        codepoint: CodePoint,
        charset: &str,
    ) -> Result<Vec<CodePoint>, OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for &mut O {
    fn encode(&mut self, codepoint: CodePoint, charset: &str) -> Result<Vec<u8>, OracleError> {
        (**self).encode(codepoint, charset)
    }

    fn compare(
        &mut self,
        left: CodePoint,
        right: CodePoint,
        collation: &str,
    ) -> Result<Ordering, OracleError> {
        (**self).compare(left, right, collation)
    }

    fn weight_string(
        &mut self,
        codepoint: CodePoint,
        collation: &str,
    ) -> Result<Option<Vec<u8>>, OracleError> {
        (**self).weight_string(codepoint, collation)
    }

    fn to_upper(
        &mut self,
        codepoint: CodePoint,
        charset: &str,
    ) -> Result<Vec<CodePoint>, OracleError> {
        (**self).to_upper(codepoint, charset)
    }

    fn to_lower(
        &mut self,
        codepoint: CodePoint,
        charset: &str,
    ) -> Result<Vec<CodePoint>, OracleError> {
        (**self).to_lower(codepoint, charset)
    }
}
