//! Banned-word censorship.
//!
//! Matching is whole-word and case-insensitive, with word boundaries taken
//! to be start/end of text, whitespace, or basic punctuation. Anything else
//! (letters in any script, digits) is part of a word, so Hebrew words match
//! the same way Latin ones do.

use regex::Regex;
use tracing::warn;

/// A compiled banned-word list.
///
/// Built once per request from the current list; compiling a handful of
/// small patterns is cheap compared to the database round trip that
/// precedes it.
pub struct Censor {
    patterns: Vec<Regex>,
}

impl Censor {
    /// Compiles the word list. Blank entries are dropped; a word that fails
    /// to compile even after escaping is logged and skipped rather than
    /// taking the whole filter down.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        for word in words {
            let word = word.as_ref().trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            let pattern = format!(
                r"(?i)(^|[\s.,!?;:])({})([\s.,!?;:]|$)",
                regex::escape(&word)
            );
            match Regex::new(&pattern) {
                Ok(re) => patterns.push(re),
                Err(e) => warn!("Skipping unusable banned word {word:?}: {e}"),
            }
        }
        Censor { patterns }
    }

    /// Replaces every whole-word occurrence of a banned word with
    /// asterisks, one per character, leaving the surrounding text intact.
    pub fn censor(&self, text: &str) -> String {
        let mut result = text.to_string();
        for re in &self.patterns {
            // Adjacent occurrences share a boundary character, which a
            // single replace_all pass consumes. Repeat until stable.
            loop {
                let next = re
                    .replace_all(&result, |caps: &regex::Captures| {
                        format!(
                            "{}{}{}",
                            &caps[1],
                            "*".repeat(caps[2].chars().count()),
                            &caps[3]
                        )
                    })
                    .into_owned();
                if next == result {
                    break;
                }
                result = next;
            }
        }
        result
    }
}
