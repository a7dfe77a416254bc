//! Punctuation-based sentence detector.

use std::collections::HashSet;

use crate::error::Result;
use crate::model::{Span, Token};

use super::SentenceDetector;

const ABBREVIATIONS: &[&str] = &[
    "al", "cf", "dr", "e.g", "eq", "eqs", "et", "etc", "fig", "figs", "i.e", "mr", "mrs", "ms",
    "no", "nos", "pp", "prof", "ref", "refs", "resp", "sec", "tab", "vol", "vs",
];

/// Splits text after `.`, `!` or `?` followed by whitespace and a capital.
///
/// Boundaries are never placed inside a forbidden span, and candidate
/// sentences without any letter or digit are dropped.
#[derive(Debug, Clone)]
pub struct PunctuationSentenceDetector {
    abbreviations: HashSet<&'static str>,
}

impl PunctuationSentenceDetector {
    /// Create a detector with the built-in abbreviation list.
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
        }
    }

    fn is_abbreviation(&self, text: &str, dot: usize) -> bool {
        let word = text[..dot]
            .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '[')
            .next()
            .unwrap_or("");
        if word.chars().count() == 1 && word.chars().all(char::is_uppercase) {
            // Initials: "J. Smith"
            return true;
        }
        self.abbreviations.contains(word.to_lowercase().as_str())
    }
}

impl Default for PunctuationSentenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceDetector for PunctuationSentenceDetector {
    fn detect(
        &self,
        text: &str,
        forbidden: &[Span],
        _tokens: &[Token],
        _language: Option<&str>,
    ) -> Result<Vec<Span>> {
        let mut boundaries = Vec::new();
        let chars: Vec<(usize, char)> = text.char_indices().collect();

        let mut i = 0;
        while i < chars.len() {
            let (pos, c) = chars[i];
            if !matches!(c, '.' | '!' | '?') {
                i += 1;
                continue;
            }

            // Absorb repeated terminators and closing quotes or brackets
            let mut j = i + 1;
            while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?' | ')' | ']' | '"' | '\'' | '”' | '’') {
                j += 1;
            }
            let end = chars.get(j).map_or(text.len(), |&(p, _)| p);

            let at_end = j >= chars.len();
            let followed_by_capital = !at_end && chars[j].1.is_whitespace() && {
                let next = chars[j..].iter().find(|(_, c)| !c.is_whitespace());
                next.map_or(true, |&(_, c)| {
                    c.is_uppercase() || c.is_ascii_digit() || matches!(c, '"' | '“' | '(' | '[')
                })
            };

            let inside_forbidden = forbidden.iter().any(|f| f.strictly_contains(end));
            if (at_end || followed_by_capital)
                && !inside_forbidden
                && !(c == '.' && self.is_abbreviation(text, pos))
            {
                boundaries.push(end);
            }
            i = j;
        }

        let mut spans = Vec::new();
        let mut start = 0;
        for end in boundaries.into_iter().chain(std::iter::once(text.len())) {
            if let Some(span) = trimmed_span(text, start, end) {
                spans.push(span);
            }
            start = end;
        }

        Ok(spans
            .into_iter()
            .filter(|s| text[s.start..s.end].chars().any(char::is_alphanumeric))
            .collect())
    }
}

fn trimmed_span(text: &str, start: usize, end: usize) -> Option<Span> {
    if start >= end {
        return None;
    }
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Span::new(start + lead, start + lead + trimmed.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(text: &str, forbidden: &[Span]) -> Vec<String> {
        PunctuationSentenceDetector::new()
            .detect(text, forbidden, &[], None)
            .unwrap()
            .into_iter()
            .map(|s| text[s.start..s.end].to_string())
            .collect()
    }

    #[test]
    fn test_simple_split() {
        assert_eq!(
            sentences("The cat sat. It purred! Did it?", &[]),
            vec!["The cat sat.", "It purred!", "Did it?"]
        );
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        assert_eq!(
            sentences("As shown in Fig. 3 the rate drops. See J. Smith for more.", &[]),
            vec!["As shown in Fig. 3 the rate drops.", "See J. Smith for more."]
        );
    }

    #[test]
    fn test_lowercase_continuation() {
        assert_eq!(sentences("It rose by approx. two points.", &[]).len(), 1);
    }

    #[test]
    fn test_forbidden_span() {
        let text = "See Sect. A. Results hold.";
        let dot = text.find("A.").unwrap() + 2;
        let forbidden = [Span::new(4, dot + 1)];
        assert_eq!(sentences(text, &forbidden).len(), 1);
        assert_eq!(sentences(text, &[]).len(), 2);
    }

    #[test]
    fn test_punctuation_only() {
        assert!(sentences("...", &[]).is_empty());
        assert!(sentences("", &[]).is_empty());
    }
}
