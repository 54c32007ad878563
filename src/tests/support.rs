//! In-memory oracle for tests.

use crate::codepoint::{utf8_bytes, CodePoint};
use crate::error::OracleError;
use crate::oracle::Oracle;
use ahash::AHashMap as HashMap;
use std::cmp::Ordering;

/// Oracle answering from tables instead of a database.
///
/// Code points without an explicit encoding get `fallback`, which is empty
/// unless the oracle was built by [`TableOracle::latin1`]. An oracle built by
/// [`TableOracle::utf8`] answers with the UTF-8 bytes instead. Comparisons use a
/// sort key: an explicit one from [`TableOracle::set_order`], or the code
/// point folded through `fold`.
pub(crate) struct TableOracle {
    encodings: HashMap<CodePoint, Vec<u8>>,
    fallback: Vec<u8>,
    utf8: bool,
    order: HashMap<CodePoint, i64>,
    fold: fn(CodePoint) -> CodePoint,
    weight_strings: bool,
    upper: HashMap<CodePoint, Vec<CodePoint>>,
    lower: HashMap<CodePoint, Vec<CodePoint>>,
    fail_on: Option<CodePoint>,
    pub compares: usize,
}

fn identity(cp: CodePoint) -> CodePoint {
    cp
}

fn ascii_upper(cp: CodePoint) -> CodePoint {
    if (0x61..=0x7A).contains(&cp) {
        cp - 0x20
    } else {
        cp
    }
}

impl TableOracle {
    pub fn new() -> Self {
        Self {
            encodings: HashMap::default(),
            fallback: Vec::new(),
            utf8: false,
            order: HashMap::default(),
            fold: identity,
            weight_strings: false,
            upper: HashMap::default(),
            lower: HashMap::default(),
            fail_on: None,
            compares: 0,
        }
    }

    /// Latin-1: U+0000..=U+00FF encode as one byte, everything else as `?`.
    pub fn latin1() -> Self {
        let mut oracle = Self::new();
        oracle.fallback = vec![b'?'];
        for cp in 0..=0xFF {
            oracle.encodings.insert(cp, vec![cp as u8]);
        }

        let lowers = (0x61..=0x7A).chain((0xE0..=0xFE).filter(|&cp| cp != 0xF7));
        for lower in lowers {
            let upper = lower - 0x20;
            oracle.upper.insert(lower, vec![upper]);
            oracle.lower.insert(upper, vec![lower]);
        }
        oracle
    }

    /// Every code point encodes as its UTF-8 bytes.
    pub fn utf8() -> Self {
        Self {
            utf8: true,
            ..Self::new()
        }
    }

    pub fn set_encoding(&mut self, codepoint: CodePoint, encoded: Vec<u8>) {
        self.encodings.insert(codepoint, encoded);
    }

    pub fn set_upper(&mut self, codepoint: CodePoint, mapped: Vec<CodePoint>) {
        self.upper.insert(codepoint, mapped);
    }

    pub fn set_order(&mut self, codepoint: CodePoint, key: i64) {
        self.order.insert(codepoint, key);
    }

    /// Makes `encode` fail for `codepoint`.
    pub fn fail_on_encode(&mut self, codepoint: CodePoint) {
        self.fail_on = Some(codepoint);
    }

    /// ASCII letters compare equal to their upper-case form.
    pub fn order_ascii_case_insensitive(&mut self) {
        self.fold = ascii_upper;
    }

    /// Answers `weight_string` with the big-endian sort key.
    pub fn expose_weight_strings(&mut self) {
        self.weight_strings = true;
    }

    fn key(&self, codepoint: CodePoint) -> i64 {
        self.order
            .get(&codepoint)
            .copied()
            .unwrap_or_else(|| (self.fold)(codepoint) as i64)
    }
}

impl Oracle for TableOracle {
    fn encode(&mut self, codepoint: CodePoint, _charset: &str) -> Result<Vec<u8>, OracleError> {
        if self.fail_on == Some(codepoint) {
            return Err(OracleError::new(format!("cannot encode {codepoint:#x}")));
        }
        if let Some(encoded) = self.encodings.get(&codepoint) {
            return Ok(encoded.clone());
        }
        if self.utf8 {
            return Ok(utf8_bytes(codepoint).unwrap_or_default());
        }
        Ok(self.fallback.clone())
    }

    fn compare(
        &mut self,
        left: CodePoint,
        right: CodePoint,
        _collation: &str,
    ) -> Result<Ordering, OracleError> {
        self.compares += 1;
        Ok(self.key(left).cmp(&self.key(right)))
    }

    fn weight_string(
        &mut self,
        codepoint: CodePoint,
        _collation: &str,
    ) -> Result<Option<Vec<u8>>, OracleError> {
        Ok(self
            .weight_strings
            .then(|| self.key(codepoint).to_be_bytes().to_vec()))
    }

    fn to_upper(
        &mut self,
        codepoint: CodePoint,
        _charset: &str,
    ) -> Result<Vec<CodePoint>, OracleError> {
        Ok(self.upper.get(&codepoint).cloned().unwrap_or_else(|| vec![codepoint]))
    }

    fn to_lower(
        &mut self,
        codepoint: CodePoint,
        _charset: &str,
    ) -> Result<Vec<CodePoint>, OracleError> {
        Ok(self.lower.get(&codepoint).cloned().unwrap_or_else(|| vec![codepoint]))
    }
}
