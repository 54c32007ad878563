//! Extraction drivers: walk every code point, ask the oracle, and build the
//! tables.

use crate::codepoint::{from_utf8_bytes, utf8_bytes, CodePoint, CodepointIter};
use crate::compress::{CompressedWeights, RangeCompressor};
use crate::config::ExtractConfig;
use crate::encoding_tree::EncodingTree;
use crate::error::{ExtractError, Result};
use crate::oracle::Oracle;
use crate::order::{MemoComparator, OrderCatalog};
use crate::range_map::{RangeMap, RangeMapBuilder};
use std::cmp::Ordering;

/// UTF-8 charset of MySQL-compatible servers, the output side of every range
/// map.
pub const UTF8_CHARSET: &str = "utf8mb4";

/// Collation of [`UTF8_CHARSET`] ordering strings by their bytes.
pub const UTF8_BINARY_COLLATION: &str = "utf8mb4_0900_bin";

/// A `(from, to)` case conversion.
pub type CaseMapping = (CodePoint, CodePoint);

/// Everything extracted for one character set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharsetTables {
    /// Input side: the character set. Output side: UTF-8.
    pub range_map: RangeMap,
    pub to_upper: Vec<CaseMapping>,
    pub to_lower: Vec<CaseMapping>,
}

fn codepoints(config: &ExtractConfig) -> CodepointIter {
    let mut iter = CodepointIter::new();
    if let Some(limit) = config.sample_limit {
        iter.set_limit(limit);
    }
    iter
}

/// Whether `codepoint` is representable in the character set `map` was built
/// for.
pub fn is_valid_in(map: &RangeMap, codepoint: CodePoint) -> bool {
    utf8_bytes(codepoint).is_some_and(|utf8| map.encode(&utf8).is_some())
}

/// Builds the trie from the character set's encoding to UTF-8.
pub fn encoding_tree<O: Oracle>(oracle: &mut O, config: &ExtractConfig) -> Result<EncodingTree> {
    let mut tree = EncodingTree::new();
    let mut substitutions = 0usize;

    for codepoint in codepoints(config) {
        let Some(utf8) = utf8_bytes(codepoint) else {
            continue;
        };
        let encoded = oracle.encode(codepoint, &config.charset)?;
        if encoded.is_empty() {
            continue;
        }

        // the marker's own mapping sorts first, so it must be known already
        if config.unknown_marker.is_substitution(codepoint, &encoded) {
            if tree.get(&encoded).is_none() {
                return Err(ExtractError::UnmappedUnknownMarker {
                    codepoint,
                    marker: encoded,
                });
            }
            substitutions += 1;
            continue;
        }

        tree.insert(&encoded, utf8)?;
    }

    log::info!(
        "{}: {} encodings, {} code points without representation",
        config.charset,
        tree.len(),
        substitutions
    );
    Ok(tree)
}

/// Consolidates a trie into a range map.
pub fn range_map(tree: &EncodingTree) -> RangeMap {
    let mut builder = RangeMapBuilder::new();
    builder.extend(tree.iter());
    builder.build()
}

/// Checks that `map` reproduces every pair stored in `tree`, in both
/// directions.
pub fn verify_round_trip(tree: &EncodingTree, map: &RangeMap) -> Result<()> {
    for (input, output) in tree.iter() {
        let decoded = map.decode(&input);
        if decoded.as_deref() != Some(output.as_slice()) {
            return Err(ExtractError::RoundTripMismatch {
                input,
                expected: output,
                actual: decoded,
            });
        }

        let encoded = map.encode(&output);
        if encoded.as_deref() != Some(input.as_slice()) {
            return Err(ExtractError::RoundTripMismatch {
                input: output,
                expected: input,
                actual: encoded,
            });
        }
    }
    Ok(())
}

fn single_codepoint(codepoint: CodePoint, mapped: Vec<CodePoint>) -> Result<CodePoint> {
    match mapped.as_slice() {
        [single] if utf8_bytes(*single).is_some() => Ok(*single),
        _ => Err(ExtractError::InvalidCaseMapping { codepoint, mapped }),
    }
}

fn push_mapping(mappings: &mut Vec<CaseMapping>, map: &RangeMap, from: CodePoint, to: CodePoint) {
    if from == to {
        return;
    }
    if !is_valid_in(map, to) {
        log::warn!("skipping case mapping {:#x} -> {:#x}: target not in charset", from, to);
        return;
    }
    mappings.push((from, to));
}

/// Collects the case conversions that change a code point valid in `map`.
///
/// Conversions are queried separately because they need not be symmetric.
pub fn case_mappings<O: Oracle>(
    oracle: &mut O,
    config: &ExtractConfig,
    map: &RangeMap,
) -> Result<(Vec<CaseMapping>, Vec<CaseMapping>)> {
    let mut to_upper = Vec::new();
    let mut to_lower = Vec::new();

    for codepoint in codepoints(config).filter(|&cp| is_valid_in(map, cp)) {
        let upper = single_codepoint(codepoint, oracle.to_upper(codepoint, &config.charset)?)?;
        push_mapping(&mut to_upper, map, codepoint, upper);

        let lower = single_codepoint(codepoint, oracle.to_lower(codepoint, &config.charset)?)?;
        push_mapping(&mut to_lower, map, codepoint, lower);
    }

    Ok((to_upper, to_lower))
}

/// Extracts the range map and case tables of `config.charset`.
pub fn extract_charset<O: Oracle>(
    oracle: &mut O,
    config: &ExtractConfig,
) -> Result<CharsetTables> {
    let tree = encoding_tree(oracle, config)?;
    let range_map = range_map(&tree);

    if config.verify_round_trip {
        verify_round_trip(&tree, &range_map)?;
    }

    let (to_upper, to_lower) = if config.case_mappings {
        case_mappings(oracle, config, &range_map)?
    } else {
        (Vec::new(), Vec::new())
    };

    log::info!(
        "{}: {} range entries, {} upper and {} lower case mappings",
        config.charset,
        range_map.entries().len(),
        to_upper.len(),
        to_lower.len()
    );

    Ok(CharsetTables {
        range_map,
        to_upper,
        to_lower,
    })
}

/// Discovers the order of every code point valid in `map` under `collation`.
///
/// Weight strings are recorded first so that most comparisons are answered
/// without the oracle.
pub fn discover_order<'o, O: Oracle>(
    oracle: &'o mut O,
    config: &ExtractConfig,
    collation: &str,
    map: &RangeMap,
) -> Result<OrderCatalog<MemoComparator<&'o mut O>>> {
    let mut catalog = OrderCatalog::with_comparator(MemoComparator::new(oracle, collation));

    for codepoint in codepoints(config).filter(|&cp| is_valid_in(map, cp)) {
        let comparator = catalog
            .comparator_mut()
            .ok_or(ExtractError::MissingComparator)?;
        if let Some(weight) = comparator.oracle_mut().weight_string(codepoint, collation)? {
            if !weight.is_empty() {
                comparator.record_weight(codepoint, weight);
            }
        }
        catalog.insert(codepoint)?;
    }

    if let Some(comparator) = catalog.comparator() {
        log::info!(
            "{}: {} code points in {} weights, {} oracle comparisons",
            collation,
            catalog.members(),
            catalog.len(),
            comparator.oracle_calls()
        );
    }
    Ok(catalog)
}

/// Discovers and compresses the weights of `config.collation`.
///
/// A configuration without a collation is rejected as
/// [`ExtractError::MissingComparator`].
pub fn extract_collation<O: Oracle>(
    oracle: &mut O,
    config: &ExtractConfig,
    map: &RangeMap,
) -> Result<CompressedWeights> {
    let collation = config
        .collation
        .as_deref()
        .ok_or(ExtractError::MissingComparator)?;
    let catalog = discover_order(oracle, config, collation, map)?;

    Ok(RangeCompressor::new()
        .with_min_dynamic_len(config.min_dynamic_len)
        .compress(catalog.rows()))
}

/// Checks the assumptions extraction makes about the oracle.
///
/// For every code point: its encoding in [`UTF8_CHARSET`] must be its UTF-8
/// bytes, those bytes must sort after the previous code point's, and
/// [`UTF8_BINARY_COLLATION`] must order the previous code point first.
pub fn validate_oracle<O: Oracle>(oracle: &mut O, config: &ExtractConfig) -> Result<()> {
    let mut previous: Option<(CodePoint, Vec<u8>)> = None;
    let mut checked = 0usize;

    for codepoint in codepoints(config) {
        let Some(utf8) = utf8_bytes(codepoint) else {
            continue;
        };

        let encoded = oracle.encode(codepoint, UTF8_CHARSET)?;
        if encoded != utf8 {
            return Err(ExtractError::Utf8Mismatch {
                codepoint,
                expected: utf8,
                actual: encoded,
            });
        }

        if let Some((prev, prev_utf8)) = &previous {
            let by_bytes = prev_utf8.cmp(&utf8);
            if by_bytes != Ordering::Less {
                return Err(ExtractError::OrderMismatch {
                    previous: *prev,
                    codepoint,
                    ordering: by_bytes,
                });
            }

            let by_oracle = oracle.compare(*prev, codepoint, UTF8_BINARY_COLLATION)?;
            if by_oracle != Ordering::Less {
                return Err(ExtractError::OrderMismatch {
                    previous: *prev,
                    codepoint,
                    ordering: by_oracle,
                });
            }
        }

        previous = Some((codepoint, utf8));
        checked += 1;
    }

    log::info!("oracle validated against {} code points", checked);
    Ok(())
}

/// Decodes a UTF-8 output of a charset range map back to its code point.
pub fn decode_codepoint(map: &RangeMap, encoded: &[u8]) -> Option<CodePoint> {
    from_utf8_bytes(&map.decode(encoded)?)
}
