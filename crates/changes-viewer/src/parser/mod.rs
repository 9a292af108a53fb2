//! Diff text parsing.

mod sections;
mod unified;

pub use unified::{parse_unified_diff, parse_unified_diff_with_report, ParseAnomaly, ParseReport};
