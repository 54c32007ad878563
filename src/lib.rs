//! # Codepoint Tables - Charset and Collation Extraction
//!
//! Builds compact conversion and ordering tables for a character set from a
//! source of ground truth, usually a database server.
//!
//! Extraction runs in two stages:
//! 1. **Transcoding**: every code point is encoded through the [`Oracle`],
//!    the answers go into an [`EncodingTree`], and the sorted pairs are
//!    consolidated into a [`RangeMap`] of byte-range correspondences.
//! 2. **Ordering**: every code point valid in the charset is placed in an
//!    [`OrderCatalog`] by binary search over oracle comparisons, and the
//!    resulting weights are compressed into ranges by a [`RangeCompressor`].
//!
//! Both results can be written out as Rust source with [`charset_source`] and
//! [`weights_source`] (or [`collation_source`], which reads its settings from
//! an [`ExtractConfig`]).
//!
//! ## Example
//!
//! ```
//! use codepoint_tables::RangeMapBuilder;
//!
//! let mut builder = RangeMapBuilder::new();
//! builder.add_pair(&[0x41], "A".as_bytes());
//! builder.add_pair(&[0x42], "B".as_bytes());
//! let map = builder.build();
//!
//! assert_eq!(map.entries().len(), 1);
//! assert_eq!(map.decode(&[0x42]), Some(b"B".to_vec()));
//! assert_eq!(map.encode(b"A"), Some(vec![0x41]));
//! assert_eq!(map.decode(&[0x43]), None);
//! ```
//!
//! ## Cost
//!
//! - One oracle query per code point for encodings and case mappings
//! - `O(log weights)` comparisons per code point for ordering, fewer when the
//!   collation exposes weight strings

mod codepoint;
mod compress;
mod config;
mod emit;
mod encoding_tree;
mod error;
mod extract;
mod oracle;
mod order;
mod range_map;

#[cfg(test)]
mod tests;

pub use codepoint::{
    from_utf8_bytes, utf8_bytes, CodePoint, CodepointIter, CODEPOINT_COUNT, MAX_CODEPOINT,
};
pub use compress::{
    CompressedWeights, DynamicWeightRange, RangeCompressor, StaticWeightRange, Weight,
    DEFAULT_MIN_DYNAMIC_LEN, UNKNOWN_WEIGHT,
};
pub use config::{ExtractConfig, UnknownMarkerPolicy, DEFAULT_INLINE_THRESHOLD};
pub use emit::{
    charset_source, collation_source, format_list, weights_source, FORMAT_LINE_LENGTH,
};
pub use encoding_tree::{EncodingIter, EncodingTree, NodeKey, MAX_ENCODING_LEN};
pub use error::{ConflictKind, ExtractError, OracleError, Result};
pub use extract::{
    decode_codepoint, discover_order, extract_charset, extract_collation, is_valid_in,
    validate_oracle, CaseMapping, CharsetTables, UTF8_BINARY_COLLATION, UTF8_CHARSET,
};
pub use oracle::Oracle;
pub use order::{Comparator, MemoComparator, OrderCatalog};
pub use range_map::{RangeBound, RangeBounds, RangeEntry, RangeMap, RangeMapBuilder};
