//! External-facing shaping of search matches.

use serde::{Deserialize, Serialize};

use crate::index::SearchMatch;

/// Characters that end a sentence for snippet trimming.
const SENTENCE_ENDS: [char; 4] = ['.', '!', '?', ';'];

/// Suffix appended when a snippet is cut mid-sentence.
const ELLIPSIS: &str = "...";

/// Trim `text` to at most `max_chars` characters for display.
///
/// Prefers ending on the last sentence terminator (kept, no ellipsis) when it
/// lies past the first half of the window; otherwise cuts at the last space
/// and appends `...`; with no space at all, hard-cuts at `max_chars` and
/// appends `...`. Lengths are counted in `char`s, not bytes.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let window = &text[..cut];

    let mut sentence_end = None;
    let mut last_space = None;
    for (position, (offset, c)) in window.char_indices().enumerate() {
        if SENTENCE_ENDS.contains(&c) {
            sentence_end = Some((position, offset + c.len_utf8()));
        } else if c == ' ' {
            last_space = Some((position, offset));
        }
    }

    if let Some((_, end)) = sentence_end.filter(|(position, _)| 2 * position > max_chars) {
        return window[..end].to_string();
    }

    match last_space {
        Some((position, offset)) if position > 0 => format!("{}{ELLIPSIS}", &window[..offset]),
        _ => format!("{window}{ELLIPSIS}"),
    }
}

/// Round a similarity score to four decimal places for display.
pub fn round_score(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

/// A search match shaped for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    pub snippet: String,
}

impl SearchHit {
    /// Shape a ranked match: rounded score and trimmed text.
    pub fn from_match(search_match: &SearchMatch, max_chars: usize) -> Self {
        Self {
            id: search_match.id.clone(),
            score: round_score(search_match.score),
            snippet: snippet(&search_match.text, max_chars),
        }
    }
}

/// Shape a ranked result list, preserving its order.
pub fn format_matches(matches: &[SearchMatch], max_chars: usize) -> Vec<SearchHit> {
    matches
        .iter()
        .map(|m| SearchHit::from_match(m, max_chars))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(snippet("short", 10), "short");
        assert_eq!(snippet("exactly10!", 10), "exactly10!");
        assert_eq!(snippet("", 0), "");
    }

    #[test]
    fn test_sentence_boundary() {
        assert_eq!(snippet("Hello world. This is a test.", 15), "Hello world.");
    }

    #[test]
    fn test_nearest_terminator_wins() {
        // '!' is closer to the cut than '.', both past the midpoint.
        assert_eq!(
            snippet("Alpha beta. Gamma! Delta epsilon zeta", 20),
            "Alpha beta. Gamma!"
        );
    }

    #[test]
    fn test_terminator_too_early_falls_back_to_word() {
        // The only period sits in the first half of the window.
        assert_eq!(
            snippet("Hi. This sentence keeps going on and on", 20),
            "Hi. This sentence..."
        );
    }

    #[test]
    fn test_word_boundary() {
        assert_eq!(snippet("The quick brown fox jumps", 12), "The quick...");
    }

    #[test]
    fn test_no_boundary() {
        assert_eq!(snippet("abcdefghijklmnopqrstuvwxyz", 10), "abcdefghij...");
    }

    #[test]
    fn test_leading_space_is_not_a_boundary() {
        assert_eq!(snippet(" abcdefghijklmnop", 8), " abcdefg...");
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(snippet("ééééé ééééé", 8), "ééééé...");
        assert_eq!(snippet("日本語", 3), "日本語");
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123_456), 0.1235);
        assert_eq!(round_score(1.0), 1.0);
        assert_eq!(round_score(-0.333_33), -0.3333);
    }

    #[test]
    fn test_format_matches_keeps_order() {
        let matches = vec![
            SearchMatch {
                id: "b".to_string(),
                score: 0.987_654,
                text: "Second document text that is long".to_string(),
                metadata: None,
            },
            SearchMatch {
                id: "a".to_string(),
                score: 0.5,
                text: "First".to_string(),
                metadata: None,
            },
        ];

        let hits = format_matches(&matches, 15);
        assert_eq!(
            hits,
            vec![
                SearchHit {
                    id: "b".to_string(),
                    score: 0.9877,
                    snippet: "Second...".to_string(),
                },
                SearchHit {
                    id: "a".to_string(),
                    score: 0.5,
                    snippet: "First".to_string(),
                },
            ]
        );
    }
}
