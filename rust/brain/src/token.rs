//! Tokenization: splitting an utterance into text parts.
//!
//! The segmenter works on a flat list of text parts. Blank parts may be
//! present (the whitespace tokenizer turns a run of whitespace into a single
//! `" "` part) or absent; the segmenter skips them and joins the words of a
//! span with single spaces for phrase lookups.

/// Supplies text parts for one incoming utterance.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Returns true for a part that carries no word content.
pub fn is_blank(part: &str) -> bool {
    part.trim().is_empty()
}

/// Splits on whitespace and drops sentence punctuation.
///
/// Apostrophes and hyphens inside a word are kept ("don't", "e-mail").
/// Case is preserved; normalization belongs to the dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut parts = Vec::new();

        for word in text.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if word.is_empty() {
                continue;
            }
            if !parts.is_empty() {
                parts.push(" ".to_string());
            }
            parts.push(word.to_string());
        }

        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keeps_single_blank_between_words() {
        let parts = WhitespaceTokenizer.tokenize("hot   dog");
        assert_eq!(parts, vec!["hot", " ", "dog"]);
    }

    #[test]
    fn tokenize_drops_sentence_punctuation() {
        let parts = WhitespaceTokenizer.tokenize("Hi, there!");
        assert_eq!(parts, vec!["Hi", " ", "there"]);
    }

    #[test]
    fn tokenize_keeps_inner_apostrophe() {
        let parts = WhitespaceTokenizer.tokenize("don't stop");
        assert_eq!(parts, vec!["don't", " ", "stop"]);
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(WhitespaceTokenizer.tokenize("  ").is_empty());
        assert!(WhitespaceTokenizer.tokenize("?!").is_empty());
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(" "));
        assert!(is_blank(""));
        assert!(!is_blank("a"));
    }
}
