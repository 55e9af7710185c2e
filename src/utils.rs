//! Text normalization helpers shared by loaders and oracles.

use crate::constants::oracle::MIN_TOKEN_CHARS;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Lowercased alphanumeric tokens, skipping markdown punctuation and very short tokens.
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(|token| token.to_lowercase())
        .collect()
}

/// True when a description has no visible text.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_inline_whitespace_collapses_runs() {
        let input = "Overall\n\n  1st\tPlace ";
        assert_eq!(normalize_inline_whitespace(input), "Overall 1st Place");
    }

    #[test]
    fn tokens_strip_markdown_and_short_words() {
        let text = "## Inspiration\nWe built **Pantry-Pal** a AI app!";
        assert_eq!(
            tokens(text),
            vec!["inspiration", "we", "built", "pantry", "pal", "ai", "app"]
        );
    }

    #[test]
    fn blank_detects_whitespace_only() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t"));
        assert!(!is_blank(" x "));
    }
}
