//! Weight discovery from pairwise comparisons.
//!
//! An [`OrderCatalog`] keeps code points in rows; the index of a row is the
//! weight of every code point in it. Code points are inserted one by one and
//! placed by binary search over the first member of each row, so only
//! `O(log rows)` comparisons are needed per insertion. This matters because a
//! comparison may be a database round trip.

use crate::codepoint::CodePoint;
use crate::error::{ExtractError, OracleError, Result};
use crate::oracle::Oracle;
use ahash::AHashMap as HashMap;
use std::cmp::Ordering;

/// Three-way comparison used to place code points.
pub trait Comparator {
    fn compare(
        &mut self,
        left: CodePoint,
        right: CodePoint,
    ) -> std::result::Result<Ordering, OracleError>;
}

impl<F> Comparator for F
where
    F: FnMut(CodePoint, CodePoint) -> std::result::Result<Ordering, OracleError>,
{
    fn compare(
        &mut self,
        left: CodePoint,
        right: CodePoint,
    ) -> std::result::Result<Ordering, OracleError> {
        self(left, right)
    }
}

/// Ordered partition of code points into weight classes.
///
/// Code points must be inserted in strictly ascending order. This is not
/// checked; violating it gives an unspecified grouping.
pub struct OrderCatalog<C> {
    rows: Vec<Vec<CodePoint>>,
    comparator: Option<C>,
    members: usize,
}

impl<C: Comparator> OrderCatalog<C> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            comparator: None,
            members: 0,
        }
    }

    /// Creates a catalog with its comparator already configured.
    pub fn with_comparator(comparator: C) -> Self {
        let mut catalog = Self::new();
        catalog.set_comparator(comparator);
        catalog
    }

    pub fn set_comparator(&mut self, comparator: C) {
        self.comparator = Some(comparator);
    }

    pub fn comparator(&self) -> Option<&C> {
        self.comparator.as_ref()
    }

    pub fn comparator_mut(&mut self) -> Option<&mut C> {
        self.comparator.as_mut()
    }

    /// Places `codepoint` in the catalog.
    ///
    /// Ties join the existing row; otherwise a new single-member row is
    /// inserted at the position found, pushing later rows back by one.
    pub fn insert(&mut self, codepoint: CodePoint) -> Result<()> {
        let comparator = self
            .comparator
            .as_mut()
            .ok_or(ExtractError::MissingComparator)?;

        if self.rows.is_empty() {
            self.rows.push(vec![codepoint]);
        } else {
            let mut low = 0;
            let mut high = self.rows.len() - 1;
            let mut tie = None;
            while high > low {
                let mid = (low + high) / 2;
                match comparator.compare(codepoint, self.rows[mid][0])? {
                    Ordering::Greater => low = mid + 1,
                    Ordering::Less => high = mid,
                    Ordering::Equal => {
                        tie = Some(mid);
                        break;
                    }
                }
            }

            match tie {
                Some(row) => self.rows[row].push(codepoint),
                None => match comparator.compare(codepoint, self.rows[low][0])? {
                    Ordering::Greater => self.rows.insert(low + 1, vec![codepoint]),
                    Ordering::Less => self.rows.insert(low, vec![codepoint]),
                    Ordering::Equal => self.rows[low].push(codepoint),
                },
            }
        }
        self.members += 1;

        if self.members % 0x10000 == 0 {
            log::debug!(
                "order catalog: {} code points in {} rows",
                self.members,
                self.rows.len()
            );
        }
        Ok(())
    }

    /// Rows in weight order. Members of a row are ascending.
    pub fn rows(&self) -> &[Vec<CodePoint>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<CodePoint>> {
        self.rows
    }

    /// Number of distinct weights.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of inserted code points.
    pub fn members(&self) -> usize {
        self.members
    }

    /// Weight of `codepoint`, found by scanning every row.
    pub fn weight_of(&self, codepoint: CodePoint) -> Option<usize> {
        self.rows.iter().position(|row| row.contains(&codepoint))
    }
}

impl<C: Comparator> Default for OrderCatalog<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparator that prefers known weight strings over oracle queries.
///
/// When both code points have a recorded weight string, the strings are
/// compared directly. Otherwise the oracle decides, and if it reports a tie
/// the known weight is copied to the code point that had none, so later
/// comparisons involving it stay local.
pub struct MemoComparator<O> {
    oracle: O,
    collation: String,
    weights: HashMap<CodePoint, Vec<u8>>,
    oracle_calls: usize,
}

impl<O: Oracle> MemoComparator<O> {
    pub fn new(oracle: O, collation: impl Into<String>) -> Self {
        Self {
            oracle,
            collation: collation.into(),
            weights: HashMap::default(),
            oracle_calls: 0,
        }
    }

    pub fn collation(&self) -> &str {
        &self.collation
    }

    /// Records the weight string of `codepoint`.
    pub fn record_weight(&mut self, codepoint: CodePoint, weight: Vec<u8>) {
        self.weights.insert(codepoint, weight);
    }

    pub fn weight(&self, codepoint: CodePoint) -> Option<&[u8]> {
        self.weights.get(&codepoint).map(Vec::as_slice)
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Number of comparisons that needed the oracle.
    pub fn oracle_calls(&self) -> usize {
        self.oracle_calls
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }
}

impl<O: Oracle> Comparator for MemoComparator<O> {
    fn compare(
        &mut self,
        left: CodePoint,
        right: CodePoint,
    ) -> std::result::Result<Ordering, OracleError> {
        let left_weight = self.weights.get(&left);
        let right_weight = self.weights.get(&right);

        if let (Some(l), Some(r)) = (left_weight, right_weight) {
            return Ok(l.cmp(r));
        }

        let known = match (left_weight, right_weight) {
            (Some(w), None) => Some((right, w.clone())),
            (None, Some(w)) => Some((left, w.clone())),
            _ => None,
        };

        self.oracle_calls += 1;
        let ordering = self.oracle.compare(left, right, &self.collation)?;

        if ordering == Ordering::Equal {
            if let Some((codepoint, weight)) = known {
                self.weights.insert(codepoint, weight);
            }
        }
        Ok(ordering)
    }
}
