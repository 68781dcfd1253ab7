//! Token estimation for chunk sizing.
//!
//! docseek does not run a real tokenizer. Chunk sizes are measured with a
//! character heuristic, so chunk boundaries drift from what a BPE tokenizer
//! would produce. Treat every token count in this crate as an estimate.

use crate::defaults::CHARS_PER_TOKEN;

/// Estimate the token count of `text` as `ceil(chars / 4)`.
///
/// Counts Unicode scalar values, not bytes, so multi-byte text is not
/// over-counted. Defined for every input; the empty string is 0 tokens.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}
