//! Prefix aliases
//!
//! Aliases index a word under its prefixes through Keyword-tagged values, so
//! a search for "Thi" walks `Thi -> Thib -> ... -> Thibaud` and reaches every
//! location indexed under the full word. Prefixes are cut on `char`
//! boundaries.

use crate::codec::IndexedEntry;

/// Shortest prefix indexed by default
pub const DEFAULT_MIN_ALIAS_CHARS: usize = 3;

/// Prefix chain `word[..k] -> word[..k + 1]` for `k` in `min_chars..len`
///
/// Empty when the word has at most `min_chars` characters.
pub fn generate_aliases(word: &str, min_chars: usize) -> Vec<IndexedEntry> {
    generate_aliases_up_to(word, min_chars, usize::MAX)
}

/// Like [`generate_aliases`], but the chain stops at `max_chars` and the
/// longest prefix links straight to the full word
///
/// A `min_chars` of 0 is treated as 1: the empty prefix is never indexed.
pub fn generate_aliases_up_to(
    word: &str,
    min_chars: usize,
    max_chars: usize,
) -> Vec<IndexedEntry> {
    let chars: Vec<char> = word.chars().collect();
    let prefix = |n: usize| chars[..n].iter().collect::<String>();

    let mut entries = Vec::new();
    let mut k = min_chars.max(1);
    while k < chars.len() {
        if k >= max_chars {
            entries.push(IndexedEntry::keyword_link(prefix(k), word));
            break;
        }
        entries.push(IndexedEntry::keyword_link(prefix(k), prefix(k + 1)));
        k += 1;
    }
    entries
}
