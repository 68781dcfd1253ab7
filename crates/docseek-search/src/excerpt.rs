//! Excerpts and match highlighting.
//!
//! Queries are matched as case-insensitive literals. User input is always
//! escaped before it becomes a pattern, so `"."` matches a dot and nothing
//! else. An empty query matches at every position; rejecting it is the
//! caller's decision.

use regex::{Regex, RegexBuilder};
use tracing::trace;

use docseek_core::defaults::{
    ELLIPSIS, EXCERPT_CONTEXT_CHARS, EXCERPT_FALLBACK_CHARS, MARK_CLOSE, MARK_OPEN,
};
use docseek_core::{Error, Result};

/// Escape every regex metacharacter in `query`.
pub fn escape_regex(query: &str) -> String {
    regex::escape(query)
}

/// A compiled case-insensitive literal matcher for one query.
///
/// Build once per search and reuse it for every document.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    pattern: Regex,
}

impl QueryMatcher {
    /// Compile `query`. Fails only when the escaped pattern exceeds the
    /// regex size limit.
    pub fn new(query: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(&escape_regex(query))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("Query cannot be matched: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Byte range of the first match.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.pattern.find(text).map(|m| (m.start(), m.end()))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Wrap every match in `<mark>` tags, keeping the matched casing.
    pub fn highlight(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                format!("{}{}{}", MARK_OPEN, &caps[0], MARK_CLOSE)
            })
            .into_owned()
    }

    /// Non-overlapping match count.
    pub fn count_matches(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    /// Context window around the first match, highlighted.
    ///
    /// Without a match, the first 200 characters followed by `...`.
    pub fn create_excerpt(&self, text: &str) -> String {
        let Some((match_start, match_end)) = self.find(text) else {
            trace!(text_len = text.len(), "No match, using leading excerpt");
            return fallback_excerpt(text);
        };

        let start = chars_before(text, match_start, EXCERPT_CONTEXT_CHARS);
        let end = chars_after(text, match_end, EXCERPT_CONTEXT_CHARS);

        let mut excerpt = String::with_capacity(end - start + 2 * ELLIPSIS.len() + 16);
        if start > 0 {
            excerpt.push_str(ELLIPSIS);
        }
        excerpt.push_str(&self.highlight(&text[start..end]));
        if end < text.len() {
            excerpt.push_str(ELLIPSIS);
        }
        excerpt
    }
}

/// Byte offset `n` characters before `pos`, clamped to 0.
fn chars_before(text: &str, pos: usize, n: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(pos, |(i, _)| i)
}

/// Byte offset `n` characters after `pos`, clamped to the end of `text`.
fn chars_after(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| pos + i)
}

fn fallback_excerpt(text: &str) -> String {
    let end = chars_after(text, 0, EXCERPT_FALLBACK_CHARS);
    format!("{}{}", &text[..end], ELLIPSIS)
}

/// Highlight every case-insensitive occurrence of `query` in `text`.
pub fn highlight(text: &str, query: &str) -> String {
    match QueryMatcher::new(query) {
        Ok(matcher) => matcher.highlight(text),
        Err(_) => text.to_string(),
    }
}

/// Count non-overlapping case-insensitive occurrences of `query` in `text`.
pub fn count_matches(text: &str, query: &str) -> usize {
    QueryMatcher::new(query)
        .map(|matcher| matcher.count_matches(text))
        .unwrap_or(0)
}

/// Build a highlighted excerpt of `text` around the first match of `query`.
pub fn create_excerpt(text: &str, query: &str) -> String {
    match QueryMatcher::new(query) {
        Ok(matcher) => matcher.create_excerpt(text),
        Err(_) => fallback_excerpt(text),
    }
}
