use crate::codepoint::{utf8_bytes, CodePoint, CodepointIter, SURROGATE_MAX, SURROGATE_MIN};
use crate::compress::{RangeCompressor, UNKNOWN_WEIGHT};
use crate::error::OracleError;
use crate::order::{MemoComparator, OrderCatalog};
use crate::range_map::{RangeMap, RangeMapBuilder};
use crate::tests::support::TableOracle;
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeSet;

type CompareResult = Result<Ordering, OracleError>;

/// Range map of a strictly ascending single-byte mapping.
fn ascending_map(inputs: &BTreeSet<u8>, outputs: &BTreeSet<u8>) -> (RangeMap, Vec<(u8, u8)>) {
    let pairs: Vec<(u8, u8)> = inputs.iter().copied().zip(outputs.iter().copied()).collect();
    let mut builder = RangeMapBuilder::new();
    for &(input, output) in &pairs {
        builder.add_pair(&[input], &[output]);
    }
    (builder.build(), pairs)
}

/// Latin-1 bytes into UTF-8.
fn latin1_map() -> RangeMap {
    let mut builder = RangeMapBuilder::new();
    for byte in 0..=0xFFu8 {
        if let Some(utf8) = utf8_bytes(byte as CodePoint) {
            builder.add_pair(&[byte], &utf8);
        }
    }
    builder.build()
}

proptest! {
    /// Code points come out strictly ascending and never inside the surrogate block.
    #[test]
    fn prop_codepoints_ascending(limit in 0usize..0x12000) {
        let iter = CodepointIter::new().with_limit(limit);
        prop_assert_eq!(iter.len(), limit);

        let mut previous = None;
        let mut count = 0;
        for cp in iter {
            prop_assert!(!(SURROGATE_MIN..=SURROGATE_MAX).contains(&cp));
            if let Some(prev) = previous {
                prop_assert!(cp > prev);
            }
            previous = Some(cp);
            count += 1;
        }
        prop_assert_eq!(count, limit);
    }

    /// Every pair of an ascending mapping survives consolidation, and nothing
    /// else is covered.
    #[test]
    fn prop_ascending_map_round_trip(
        inputs in prop::collection::btree_set(any::<u8>(), 1..64),
        outputs in prop::collection::btree_set(any::<u8>(), 1..64),
    ) {
        let (map, pairs) = ascending_map(&inputs, &outputs);

        for &(input, output) in &pairs {
            prop_assert_eq!(map.decode(&[input]), Some(vec![output]));
            prop_assert_eq!(map.encode(&[output]), Some(vec![input]));
        }

        let seen_inputs: BTreeSet<u8> = pairs.iter().map(|p| p.0).collect();
        let seen_outputs: BTreeSet<u8> = pairs.iter().map(|p| p.1).collect();
        for byte in 0..=0xFFu8 {
            if !seen_inputs.contains(&byte) {
                prop_assert_eq!(map.decode(&[byte]), None);
            }
            if !seen_outputs.contains(&byte) {
                prop_assert_eq!(map.encode(&[byte]), None);
            }
        }
        prop_assert!(map.entries().len() <= pairs.len());
    }

    /// A block of code points mapped onto itself decodes to itself.
    #[test]
    fn prop_identity_block_round_trip(start in 0x60i32..0x3000, len in 1i32..400) {
        let pairs: Vec<Vec<u8>> = (start..start + len).filter_map(utf8_bytes).collect();
        let mut builder = RangeMapBuilder::new();
        for utf8 in &pairs {
            builder.add_pair(utf8, utf8);
        }
        let map = builder.build();

        for utf8 in &pairs {
            let decoded = map.decode(utf8);
            prop_assert_eq!(decoded.as_ref(), Some(utf8));
            let encoded = map.encode(utf8);
            prop_assert_eq!(encoded.as_ref(), Some(utf8));
        }
    }

    /// Rows come out strictly ordered and every row holds one key.
    #[test]
    fn prop_catalog_rows_ordered(keys in prop::collection::vec(any::<u8>(), 1..200)) {
        let mut catalog = OrderCatalog::with_comparator({
            let keys = keys.clone();
            move |l: CodePoint, r: CodePoint| -> CompareResult {
                Ok(keys[l as usize].cmp(&keys[r as usize]))
            }
        });
        for cp in 0..keys.len() as CodePoint {
            catalog.insert(cp).unwrap();
        }

        prop_assert_eq!(catalog.members(), keys.len());
        let distinct: BTreeSet<u8> = keys.iter().copied().collect();
        prop_assert_eq!(catalog.len(), distinct.len());

        let row_keys: Vec<u8> = catalog.rows().iter().map(|row| keys[row[0] as usize]).collect();
        prop_assert!(row_keys.windows(2).all(|w| w[0] < w[1]));
        for row in catalog.rows() {
            prop_assert!(row.iter().all(|&cp| keys[cp as usize] == keys[row[0] as usize]));
            prop_assert!(row.windows(2).all(|w| w[0] < w[1]));
        }
    }

    /// Compressed lookups agree with the catalog for every inserted code point.
    #[test]
    fn prop_compressed_lookup_matches_rows(
        keys in prop::collection::vec(0u8..24, 1..300),
        min_dynamic_len in 1usize..6,
    ) {
        let mut catalog = OrderCatalog::with_comparator({
            let keys = keys.clone();
            move |l: CodePoint, r: CodePoint| -> CompareResult {
                Ok(keys[l as usize].cmp(&keys[r as usize]))
            }
        });
        for cp in 0..keys.len() as CodePoint {
            catalog.insert(cp).unwrap();
        }

        let weights = RangeCompressor::new()
            .with_min_dynamic_len(min_dynamic_len)
            .compress(catalog.rows());

        prop_assert_eq!(weights.len(), keys.len());
        for cp in 0..keys.len() as CodePoint {
            let expected = catalog.weight_of(cp).map(|w| w as i32);
            prop_assert_eq!(Some(weights.weight(cp)), expected);
        }
        prop_assert_eq!(weights.weight(-1), UNKNOWN_WEIGHT);
        prop_assert_eq!(weights.weight(keys.len() as CodePoint), UNKNOWN_WEIGHT);
    }

    /// Memoized discovery places code points exactly like plain comparisons.
    #[test]
    fn prop_memo_matches_plain(keys in prop::collection::vec(0i64..16, 1..120)) {
        let mut oracle = TableOracle::new();
        for (cp, &key) in keys.iter().enumerate() {
            oracle.set_order(cp as CodePoint, key);
        }

        let mut plain = OrderCatalog::with_comparator({
            let keys = keys.clone();
            move |l: CodePoint, r: CodePoint| -> CompareResult {
                Ok(keys[l as usize].cmp(&keys[r as usize]))
            }
        });
        let mut memo = OrderCatalog::with_comparator(MemoComparator::new(&mut oracle, "test_ci"));
        if let Some(comparator) = memo.comparator_mut() {
            comparator.record_weight(0, keys[0].to_be_bytes().to_vec());
        }
        for cp in 0..keys.len() as CodePoint {
            plain.insert(cp).unwrap();
            memo.insert(cp).unwrap();
        }

        prop_assert_eq!(plain.rows(), memo.rows());
        drop(memo);
        prop_assert!(oracle.compares <= keys.len() * 8);
    }
}

#[test]
fn test_letter_pairs_resolve_to_their_weights() {
    // 'A' < 'a' < 'B' < 'b' < ...
    fn key(cp: CodePoint) -> (CodePoint, bool) {
        let lower = if (0x41..=0x5A).contains(&cp) { cp + 0x20 } else { cp };
        (lower, cp == lower)
    }

    let mut catalog = OrderCatalog::with_comparator(|l: CodePoint, r: CodePoint| -> CompareResult {
        Ok(key(l).cmp(&key(r)))
    });
    for cp in (0x41..=0x5A).chain(0x61..=0x7A) {
        catalog.insert(cp).unwrap();
    }
    assert_eq!(catalog.len(), 52);
    assert_eq!(catalog.weight_of(0x41), Some(0));
    assert_eq!(catalog.weight_of(0x61), Some(1));
    assert_eq!(catalog.weight_of(0x7A), Some(51));

    let weights = RangeCompressor::new().compress(catalog.rows());
    for cp in (0x41..=0x5A).chain(0x61..=0x7A) {
        let expected = catalog.weight_of(cp).map(|w| w as i32);
        assert_eq!(Some(weights.weight(cp)), expected);
    }
    assert_eq!(weights.len(), 52);
    assert_eq!(weights.weight(0x60), UNKNOWN_WEIGHT);
}

#[test]
fn test_two_letter_encoding_consolidates() {
    let mut builder = RangeMapBuilder::new();
    builder.add_pair(&[0x41], &[65]);
    builder.add_pair(&[0x42], &[66]);
    let map = builder.build();

    assert_eq!(map.entries().len(), 1);
    assert_eq!(map.decode(&[0x41]), Some(vec![65]));
    assert_eq!(map.decode(&[0x43]), None);
}

/// Bolero fuzz test: Latin-1 lookups never panic and invert each other
#[cfg(test)]
#[test]
fn fuzz_latin1_lookups() {
    let map = latin1_map();

    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        match map.decode(input) {
            Some(utf8) => {
                assert_eq!(input.len(), 1);
                assert_eq!(map.encode(&utf8).as_ref(), Some(input));
            }
            None => assert_ne!(input.len(), 1),
        }

        if let Some(byte) = map.encode(input) {
            assert_eq!(map.decode(&byte).as_ref(), Some(input));
        }
    });
}

/// Bolero fuzz test: arbitrary byte pairs never make consolidation panic
#[cfg(test)]
#[test]
fn fuzz_builder_no_panic() {
    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        let mut builder = RangeMapBuilder::new();
        for chunk in input.chunks(3) {
            let (key, value) = chunk.split_at(chunk.len() / 2);
            builder.add_pair(key, value);
        }
        let map = builder.build();
        for chunk in input.chunks(2) {
            let _ = map.decode(chunk);
            let _ = map.encode(chunk);
        }
    });
}
