//! Rust source for extracted tables.
//!
//! The generated text depends on nothing but `core`: range entries become
//! tuples of bounds and multipliers, weights become a lookup function with a
//! table behind it.

use crate::compress::{CompressedWeights, StaticWeightRange};
use crate::config::ExtractConfig;
use crate::extract::{CaseMapping, CharsetTables};
use crate::range_map::{RangeBounds, RangeEntry};
use std::fmt::Display;

/// Longest line of a wrapped number list.
pub const FORMAT_LINE_LENGTH: usize = 100;

const INDENT: &str = "    ";

/// Formats `values` as the body of an array literal, one indented line per
/// `line_length` characters, every value followed by a comma.
pub fn format_list<T: Display>(values: impl IntoIterator<Item = T>, line_length: usize) -> String {
    let mut out = String::new();
    let mut line = String::new();

    for value in values {
        let item = format!("{},", value);
        if !line.is_empty() && INDENT.len() + line.len() + 1 + item.len() > line_length {
            out.push_str(INDENT);
            out.push_str(&line);
            out.push('\n');
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&item);
    }

    if !line.is_empty() {
        out.push_str(INDENT);
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// `latin1_general_ci` -> `latin1_general_ci`, `utf8mb4-0900` -> `utf8mb4_0900`.
fn identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

fn bounds_literal(bounds: &RangeBounds) -> String {
    let pairs: Vec<String> = bounds
        .bounds()
        .iter()
        .map(|b| format!("(0x{:02X}, 0x{:02X})", b.min, b.max))
        .collect();
    format!("&[{}]", pairs.join(", "))
}

fn multipliers_literal(multipliers: &[u64]) -> String {
    let values: Vec<String> = multipliers.iter().map(u64::to_string).collect();
    format!("&[{}]", values.join(", "))
}

fn entry_literal(entry: &RangeEntry) -> String {
    format!(
        "({}, {}, {}, {})",
        bounds_literal(&entry.input),
        bounds_literal(&entry.output),
        multipliers_literal(&entry.input_multipliers),
        multipliers_literal(&entry.output_multipliers)
    )
}

fn case_table(name: &str, mappings: &[CaseMapping]) -> String {
    format!(
        "pub static {}: &[(i32, i32)] = &[\n{}];\n",
        name,
        format_list(
            mappings.iter().map(|&(from, to)| format!("({}, {})", from, to)),
            FORMAT_LINE_LENGTH
        )
    )
}

/// Source of the statics describing one character set.
///
/// Each entry is `(input bounds, output bounds, input multipliers, output
/// multipliers)`; the output side is UTF-8.
pub fn charset_source(name: &str, tables: &CharsetTables) -> String {
    let ident = identifier(name).to_uppercase();

    let mut out = String::new();
    out.push_str(&format!(
        "/// Range entries converting `{}` to UTF-8.\n\
         #[rustfmt::skip]\n\
         pub static {}_ENTRIES: &[(&[(u8, u8)], &[(u8, u8)], &[u64], &[u64])] = &[\n",
        name, ident
    ));
    for entry in tables.range_map.entries() {
        out.push_str(INDENT);
        out.push_str(&entry_literal(entry));
        out.push_str(",\n");
    }
    out.push_str("];\n\n");

    out.push_str(&format!("/// Upper-case conversions in `{}`.\n", name));
    out.push_str(&case_table(&format!("{}_TO_UPPER", ident), &tables.to_upper));
    out.push('\n');
    out.push_str(&format!("/// Lower-case conversions in `{}`.\n", name));
    out.push_str(&case_table(&format!("{}_TO_LOWER", ident), &tables.to_lower));
    out
}

fn offset_expr(offset: i32) -> String {
    match offset {
        0 => "cp".to_string(),
        o if o < 0 => format!("cp - {}", o.unsigned_abs()),
        o => format!("cp + {}", o),
    }
}

/// Source of a weight function for one collation.
///
/// Dynamic ranges and static ranges with `upper - lower >= inline_threshold`
/// become match arms. Every other code point goes into a sorted table searched
/// by binary search. Anything else weighs `i32::MAX`.
pub fn weights_source(name: &str, weights: &CompressedWeights, inline_threshold: i32) -> String {
    let ident = identifier(name);
    let table = format!("{}_WEIGHTS", ident.to_uppercase());

    let (inline, tabled): (Vec<&StaticWeightRange>, Vec<&StaticWeightRange>) = weights
        .static_ranges()
        .iter()
        .partition(|r| r.upper - r.lower >= inline_threshold);

    let mut out = String::new();
    out.push_str(&format!(
        "/// Weight of `cp` under the `{}` collation, `i32::MAX` if it has none.\n\
         pub fn {}_weight(cp: i32) -> i32 {{\n\
         {}match cp {{\n",
        name, ident, INDENT
    ));

    for range in weights.dynamic_ranges() {
        out.push_str(&format!(
            "{0}{0}{1}..={2} => {3},\n",
            INDENT,
            range.lower,
            range.upper,
            offset_expr(range.offset)
        ));
    }
    for range in &inline {
        out.push_str(&format!(
            "{0}{0}{1}..={2} => {3},\n",
            INDENT, range.lower, range.upper, range.weight
        ));
    }
    out.push_str(&format!(
        "{0}{0}_ => match {1}.binary_search_by_key(&cp, |&(c, _)| c) {{\n\
         {0}{0}{0}Ok(i) => {1}[i].1,\n\
         {0}{0}{0}Err(_) => i32::MAX,\n\
         {0}{0}}},\n\
         {0}}}\n\
         }}\n\n",
        INDENT, table
    ));

    let pairs = tabled
        .iter()
        .flat_map(|r| (r.lower..=r.upper).map(move |cp| format!("({}, {})", cp, r.weight)));
    out.push_str(&format!(
        "/// Code points of `{}` outside the inline ranges, sorted.\n\
         #[rustfmt::skip]\n\
         static {}: &[(i32, i32)] = &[\n{}];\n",
        name,
        table,
        format_list(pairs, FORMAT_LINE_LENGTH)
    ));

    log::debug!(
        "{}: {} inline ranges, {} table ranges",
        name,
        weights.dynamic_ranges().len() + inline.len(),
        tabled.len()
    );
    out
}

/// [`weights_source`] for the collation of `config`, split at
/// `config.inline_threshold`.
///
/// Falls back to the charset name when no collation is configured.
pub fn collation_source(config: &ExtractConfig, weights: &CompressedWeights) -> String {
    let name = config.collation.as_deref().unwrap_or(&config.charset);
    weights_source(name, weights, config.inline_threshold)
}
