//! Style compilation for shadow roots: tokenizer, rule splitting, reset
//! merging and deduplication.

pub mod compile;
pub mod tokenizer;

pub use compile::{compile_styles, split_rules, StyleOptions};
