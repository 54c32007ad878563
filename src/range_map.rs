//! Range-based transcoding between two encodings.
//!
//! A [`RangeMap`] is a set of [`RangeEntry`] values, each pairing an input
//! hyperrectangle of byte sequences with an output hyperrectangle holding the
//! same number of points. Inside one entry a sequence is converted by reading
//! it as a mixed-radix number on one side and writing that number back on the
//! other side, where every byte position has its own base (the size of its
//! range).
//!
//! # Example
//!
//! ```
//! use codepoint_tables::RangeMapBuilder;
//!
//! let mut builder = RangeMapBuilder::new();
//! builder.add_pair(&[0x41], &[0x41]);
//! builder.add_pair(&[0x42], &[0x42]);
//! let map = builder.build();
//!
//! assert_eq!(map.entries().len(), 1);
//! assert_eq!(map.decode(&[0x42]), Some(vec![0x42]));
//! assert_eq!(map.decode(&[0x43]), None);
//! ```

use crate::encoding_tree::MAX_ENCODING_LEN;

/// Inclusive bounds for one byte position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBound {
    pub min: u8,
    pub max: u8,
}

impl RangeBound {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    fn point(value: u8) -> Self {
        Self::new(value, value)
    }

    /// Number of values inside the bound.
    pub fn count(&self) -> u64 {
        (self.max - self.min) as u64 + 1
    }

    fn contains_bound(&self, other: &RangeBound) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    /// True if `other` starts right after `self` ends or ends right before
    /// `self` starts. Never wraps across byte 255.
    fn is_adjacent(&self, other: &RangeBound) -> bool {
        (self.max != u8::MAX && self.max + 1 == other.min)
            || (other.max != u8::MAX && other.max + 1 == self.min)
    }

    fn union(&self, other: &RangeBound) -> RangeBound {
        RangeBound::new(self.min.min(other.min), self.max.max(other.max))
    }
}

/// An axis-aligned hyperrectangle of byte sequences of one fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeBounds(Vec<RangeBound>);

impl RangeBounds {
    /// A rectangle holding exactly one sequence.
    pub fn point(bytes: &[u8]) -> Self {
        Self(bytes.iter().copied().map(RangeBound::point).collect())
    }

    pub fn bounds(&self) -> &[RangeBound] {
        &self.0
    }

    /// Length of the sequences inside the rectangle.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of sequences inside the rectangle.
    pub fn cardinality(&self) -> u64 {
        self.0.iter().map(RangeBound::count).product()
    }

    /// Whether `data` lies inside. Sequences of another length never do.
    pub fn contains(&self, data: &[u8]) -> bool {
        data.len() == self.0.len()
            && self
                .0
                .iter()
                .zip(data)
                .all(|(bound, &value)| bound.min <= value && value <= bound.max)
    }

    /// Counts how far `other` is from being absorbed by `self`.
    ///
    /// Positions already covered cost nothing and adjacent positions cost one.
    /// Anything else, including a length mismatch, yields 2, the first value
    /// that blocks a merge.
    pub fn differences(&self, other: &RangeBounds) -> u8 {
        if self.len() != other.len() {
            return 2;
        }

        let mut differences = 0;
        for (bound, other) in self.0.iter().zip(&other.0) {
            if bound.contains_bound(other) {
                continue;
            }
            if !bound.is_adjacent(other) {
                return 2;
            }
            differences += 1;
            if differences >= 2 {
                return 2;
            }
        }
        differences
    }

    fn min_corner(&self) -> Vec<u8> {
        self.0.iter().map(|bound| bound.min).collect()
    }

    fn max_corner(&self) -> Vec<u8> {
        self.0.iter().map(|bound| bound.max).collect()
    }

    /// Rectangle spanning both `self` and `other`. Lengths must match.
    fn union(&self, other: &RangeBounds) -> RangeBounds {
        RangeBounds(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(bound, other)| bound.union(other))
                .collect(),
        )
    }

    /// Per-position multipliers: the last position counts 1, every earlier
    /// position counts the product of the sizes of all positions after it.
    pub fn multipliers(&self) -> Vec<u64> {
        let mut multipliers = vec![0; self.0.len()];
        let mut multiplier = 1;
        for (i, bound) in self.0.iter().enumerate().rev() {
            multipliers[i] = multiplier;
            multiplier *= bound.count();
        }
        multipliers
    }
}

/// One consolidated correspondence between an input and an output rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEntry {
    pub input: RangeBounds,
    pub output: RangeBounds,
    pub input_multipliers: Vec<u64>,
    pub output_multipliers: Vec<u64>,
}

impl RangeEntry {
    fn new(input: RangeBounds, output: RangeBounds) -> Self {
        let input_multipliers = input.multipliers();
        let output_multipliers = output.multipliers();

        Self {
            input,
            output,
            input_multipliers,
            output_multipliers,
        }
    }

    /// Number of sequences the entry converts.
    pub fn len(&self) -> u64 {
        self.input.cardinality()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mixed-radix index of `data` inside `bounds`. `data` must be contained.
fn mixed_radix_index(bounds: &RangeBounds, multipliers: &[u64], data: &[u8]) -> u64 {
    bounds
        .bounds()
        .iter()
        .zip(multipliers)
        .zip(data)
        .map(|((bound, &multiplier), &value)| (value - bound.min) as u64 * multiplier)
        .sum()
}

/// Writes `index` back as a sequence inside `bounds`, most significant first.
fn mixed_radix_bytes(bounds: &RangeBounds, multipliers: &[u64], mut index: u64) -> Vec<u8> {
    bounds
        .bounds()
        .iter()
        .zip(multipliers)
        .map(|(bound, &multiplier)| {
            let digit = index / multiplier;
            index -= digit * multiplier;
            bound.min + digit as u8
        })
        .collect()
}

/// Whether the merged rectangles still send both corners of the part
/// `(input, output)` to each other.
fn keeps_corners(
    merged_input: &RangeBounds,
    merged_output: &RangeBounds,
    input: &RangeBounds,
    output: &RangeBounds,
) -> bool {
    let input_multipliers = merged_input.multipliers();
    let output_multipliers = merged_output.multipliers();

    [
        (input.min_corner(), output.min_corner()),
        (input.max_corner(), output.max_corner()),
    ]
    .iter()
    .all(|(input_corner, output_corner)| {
        mixed_radix_index(merged_input, &input_multipliers, input_corner)
            == mixed_radix_index(merged_output, &output_multipliers, output_corner)
    })
}

/// Collects pairs and consolidates them into a [`RangeMap`].
///
/// Pairs must arrive grouped by length and ascending inside each group, the
/// order produced by `EncodingTree::iter`. The order is not re-checked.
#[derive(Debug, Default)]
pub struct RangeMapBuilder {
    inputs: Vec<RangeBounds>,
    outputs: Vec<RangeBounds>,
}

impl RangeMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `input` as equivalent to `output`.
    ///
    /// Pairs where either side is empty or longer than [`MAX_ENCODING_LEN`]
    /// are ignored; the map could never look them up.
    pub fn add_pair(&mut self, input: &[u8], output: &[u8]) {
        let valid_len = 1..=MAX_ENCODING_LEN;
        if !valid_len.contains(&input.len()) || !valid_len.contains(&output.len()) {
            log::warn!("ignoring pair {:02X?} -> {:02X?}: bad length", input, output);
            return;
        }
        self.inputs.push(RangeBounds::point(input));
        self.outputs.push(RangeBounds::point(output));
    }

    /// Number of ranges currently recorded.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// One consolidation pass. Returns true if any merge happened.
    fn consolidate_pass(&mut self) -> bool {
        let mut merged_any = false;
        let mut inputs: Vec<RangeBounds> = Vec::with_capacity(self.inputs.len());
        let mut outputs: Vec<RangeBounds> = Vec::with_capacity(self.outputs.len());

        for (input, output) in self.inputs.drain(..).zip(self.outputs.drain(..)) {
            if let (Some(last_input), Some(last_output)) = (inputs.last_mut(), outputs.last_mut())
            {
                if last_input.differences(&input) <= 1 && last_output.differences(&output) <= 1 {
                    let merged_input = last_input.union(&input);
                    let merged_output = last_output.union(&output);

                    if merged_input.cardinality() == merged_output.cardinality()
                        && keeps_corners(&merged_input, &merged_output, last_input, last_output)
                        && keeps_corners(&merged_input, &merged_output, &input, &output)
                    {
                        *last_input = merged_input;
                        *last_output = merged_output;
                        merged_any = true;
                        continue;
                    }
                }
            }

            inputs.push(input);
            outputs.push(output);
        }

        self.inputs = inputs;
        self.outputs = outputs;
        merged_any
    }

    /// Consolidates the recorded pairs and computes the multipliers.
    ///
    /// Passes repeat until one of them makes no merge. Only ranges that differ
    /// by at most one adjacent position on each side are merged, and only when
    /// the merged rectangles have the same size and still map the corners of
    /// both parts onto each other.
    pub fn build(mut self) -> RangeMap {
        let pairs = self.inputs.len();
        let mut passes = 1;
        while self.consolidate_pass() {
            passes += 1;
        }

        log::debug!(
            "consolidated {} pairs into {} ranges in {} passes",
            pairs,
            self.inputs.len(),
            passes
        );

        let entries = self
            .inputs
            .into_iter()
            .zip(self.outputs)
            .map(|(input, output)| RangeEntry::new(input, output))
            .collect();

        RangeMap::from_entries(entries)
    }
}

impl<'a> Extend<(&'a [u8], &'a [u8])> for RangeMapBuilder {
    fn extend<I: IntoIterator<Item = (&'a [u8], &'a [u8])>>(&mut self, iter: I) {
        for (input, output) in iter {
            self.add_pair(input, output);
        }
    }
}

impl Extend<(Vec<u8>, Vec<u8>)> for RangeMapBuilder {
    fn extend<I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>>(&mut self, iter: I) {
        for (input, output) in iter {
            self.add_pair(&input, &output);
        }
    }
}

/// Bidirectional codec built by [`RangeMapBuilder`]. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMap {
    entries: Vec<RangeEntry>,
    /// Entry indices bucketed by input length - 1.
    by_input_len: [Vec<usize>; MAX_ENCODING_LEN],
    /// Entry indices bucketed by output length - 1.
    by_output_len: [Vec<usize>; MAX_ENCODING_LEN],
}

impl RangeMap {
    fn from_entries(entries: Vec<RangeEntry>) -> Self {
        let mut by_input_len: [Vec<usize>; MAX_ENCODING_LEN] = Default::default();
        let mut by_output_len: [Vec<usize>; MAX_ENCODING_LEN] = Default::default();

        for (i, entry) in entries.iter().enumerate() {
            if let Some(bucket) = by_input_len.get_mut(entry.input.len() - 1) {
                bucket.push(i);
            }
            if let Some(bucket) = by_output_len.get_mut(entry.output.len() - 1) {
                bucket.push(i);
            }
        }

        Self {
            entries,
            by_input_len,
            by_output_len,
        }
    }

    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    /// Entries whose input sequences have length `len`.
    pub fn input_entries(&self, len: usize) -> impl Iterator<Item = &RangeEntry> {
        Self::bucket(&self.by_input_len, len)
            .iter()
            .map(move |&i| &self.entries[i])
    }

    /// Entries whose output sequences have length `len`.
    pub fn output_entries(&self, len: usize) -> impl Iterator<Item = &RangeEntry> {
        Self::bucket(&self.by_output_len, len)
            .iter()
            .map(move |&i| &self.entries[i])
    }

    fn bucket(buckets: &[Vec<usize>; MAX_ENCODING_LEN], len: usize) -> &[usize] {
        match len {
            1..=MAX_ENCODING_LEN => &buckets[len - 1],
            _ => &[],
        }
    }

    /// Converts an input-encoding sequence to the output encoding.
    ///
    /// Returns `None` if no entry covers `data`.
    pub fn decode(&self, data: &[u8]) -> Option<Vec<u8>> {
        let entry = self.input_entries(data.len()).find(|e| e.input.contains(data))?;
        let index = mixed_radix_index(&entry.input, &entry.input_multipliers, data);
        Some(mixed_radix_bytes(&entry.output, &entry.output_multipliers, index))
    }

    /// Converts an output-encoding sequence back to the input encoding.
    ///
    /// Returns `None` if no entry covers `data`.
    pub fn encode(&self, data: &[u8]) -> Option<Vec<u8>> {
        let entry = self.output_entries(data.len()).find(|e| e.output.contains(data))?;
        let index = mixed_radix_index(&entry.output, &entry.output_multipliers, data);
        Some(mixed_radix_bytes(&entry.input, &entry.input_multipliers, index))
    }
}
