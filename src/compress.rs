//! Compression of discovered weights into ranges.
//!
//! Two kinds of ranges are produced from the rows of an `OrderCatalog`:
//!
//! - **static**: consecutive code points that all share one weight;
//! - **dynamic**: consecutive code points whose weight is the code point plus a
//!   constant offset, built from runs of single-member static ranges.
//!
//! Lookups check dynamic ranges first, then static ranges, and report
//! [`UNKNOWN_WEIGHT`] for anything not covered.

use crate::codepoint::CodePoint;

/// Weight of a code point: the index of its row.
pub type Weight = i32;

/// Weight reported for code points that were never inserted.
pub const UNKNOWN_WEIGHT: Weight = i32::MAX;

/// Shortest run of single code points turned into a dynamic range.
pub const DEFAULT_MIN_DYNAMIC_LEN: usize = 4;

/// Consecutive code points sharing one weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticWeightRange {
    pub lower: CodePoint,
    pub upper: CodePoint,
    pub weight: Weight,
}

impl StaticWeightRange {
    pub fn len(&self) -> usize {
        (self.upper - self.lower) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, codepoint: CodePoint) -> bool {
        self.lower <= codepoint && codepoint <= self.upper
    }
}

/// Consecutive code points whose weight is `codepoint + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicWeightRange {
    pub lower: CodePoint,
    pub upper: CodePoint,
    pub offset: i32,
}

impl DynamicWeightRange {
    pub fn len(&self) -> usize {
        (self.upper - self.lower) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, codepoint: CodePoint) -> bool {
        self.lower <= codepoint && codepoint <= self.upper
    }

    pub fn weight(&self, codepoint: CodePoint) -> Weight {
        codepoint + self.offset
    }
}

/// Compressed form of a finished weight discovery. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedWeights {
    dynamic: Vec<DynamicWeightRange>,
    statics: Vec<StaticWeightRange>,
}

impl CompressedWeights {
    /// Dynamic ranges, ascending and disjoint.
    pub fn dynamic_ranges(&self) -> &[DynamicWeightRange] {
        &self.dynamic
    }

    /// Static ranges, ascending and disjoint.
    pub fn static_ranges(&self) -> &[StaticWeightRange] {
        &self.statics
    }

    /// Number of code points covered.
    pub fn len(&self) -> usize {
        self.dynamic.iter().map(DynamicWeightRange::len).sum::<usize>()
            + self.statics.iter().map(StaticWeightRange::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.dynamic.is_empty() && self.statics.is_empty()
    }

    /// Weight of `codepoint`, or [`UNKNOWN_WEIGHT`] if it is not covered.
    pub fn weight(&self, codepoint: CodePoint) -> Weight {
        if let Some(range) = find_range(&self.dynamic, codepoint, |r| (r.lower, r.upper)) {
            return range.weight(codepoint);
        }
        if let Some(range) = find_range(&self.statics, codepoint, |r| (r.lower, r.upper)) {
            return range.weight;
        }
        UNKNOWN_WEIGHT
    }
}

fn find_range<T>(
    ranges: &[T],
    codepoint: CodePoint,
    bounds: impl Fn(&T) -> (CodePoint, CodePoint),
) -> Option<&T> {
    let end = ranges.partition_point(|r| bounds(r).0 <= codepoint);
    let candidate = ranges.get(end.checked_sub(1)?)?;
    (bounds(candidate).1 >= codepoint).then_some(candidate)
}

/// Builds [`CompressedWeights`] from catalog rows.
#[derive(Debug, Clone, Copy)]
pub struct RangeCompressor {
    min_dynamic_len: usize,
}

impl RangeCompressor {
    pub fn new() -> Self {
        Self {
            min_dynamic_len: DEFAULT_MIN_DYNAMIC_LEN,
        }
    }

    /// Shortest run kept as a dynamic range. Shorter runs stay static.
    pub fn with_min_dynamic_len(mut self, min_dynamic_len: usize) -> Self {
        self.min_dynamic_len = min_dynamic_len.max(1);
        self
    }

    /// Compresses `rows`, where the index of a row is its weight.
    pub fn compress(&self, rows: &[Vec<CodePoint>]) -> CompressedWeights {
        let statics = static_ranges(rows);
        let (dynamic, statics) = self.promote_dynamic(statics);

        log::debug!(
            "compressed {} rows into {} dynamic and {} static ranges",
            rows.len(),
            dynamic.len(),
            statics.len()
        );

        CompressedWeights { dynamic, statics }
    }

    /// Absorbs runs of single-member static ranges with a shared offset into
    /// dynamic ranges, keeping the ones long enough.
    fn promote_dynamic(
        &self,
        statics: Vec<StaticWeightRange>,
    ) -> (Vec<DynamicWeightRange>, Vec<StaticWeightRange>) {
        let mut dynamic = Vec::new();
        let mut kept = Vec::with_capacity(statics.len());
        let mut run: Vec<StaticWeightRange> = Vec::new();

        let flush = |run: &mut Vec<StaticWeightRange>,
                         dynamic: &mut Vec<DynamicWeightRange>,
                         kept: &mut Vec<StaticWeightRange>| {
            match (run.first(), run.last()) {
                (Some(first), Some(last)) if run.len() >= self.min_dynamic_len => {
                    dynamic.push(DynamicWeightRange {
                        lower: first.lower,
                        upper: last.upper,
                        offset: first.weight - first.lower,
                    });
                    run.clear();
                }
                _ => kept.append(run),
            }
        };

        for range in statics {
            if range.len() != 1 {
                flush(&mut run, &mut dynamic, &mut kept);
                kept.push(range);
                continue;
            }

            let extends = run.last().is_some_and(|last| {
                last.upper + 1 == range.lower
                    && last.weight - last.lower == range.weight - range.lower
            });
            if !extends {
                flush(&mut run, &mut dynamic, &mut kept);
            }
            run.push(range);
        }
        flush(&mut run, &mut dynamic, &mut kept);

        (dynamic, kept)
    }
}

impl Default for RangeCompressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximal runs of consecutive code points with one weight, ascending.
fn static_ranges(rows: &[Vec<CodePoint>]) -> Vec<StaticWeightRange> {
    let mut points: Vec<(CodePoint, Weight)> = rows
        .iter()
        .enumerate()
        .flat_map(|(weight, row)| row.iter().map(move |&cp| (cp, weight as Weight)))
        .collect();
    points.sort_unstable();

    let mut ranges: Vec<StaticWeightRange> = Vec::new();
    for (codepoint, weight) in points {
        match ranges.last_mut() {
            Some(last) if last.upper + 1 == codepoint && last.weight == weight => {
                last.upper = codepoint;
            }
            _ => ranges.push(StaticWeightRange {
                lower: codepoint,
                upper: codepoint,
                weight,
            }),
        }
    }
    ranges
}
