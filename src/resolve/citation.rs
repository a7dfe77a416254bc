//! Bibliographical callout matching.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Result;
use crate::model::{coords_of, BibEntry, CitationStyle, Inline, MarkerKind, ReferenceMarker, Token};
use crate::text::{first_number, fold_label, normalize_text, tokens_text};

lazy_static! {
    /// "[12]", "(3a)", "[1, 3-5]", "1,2" (superscript)
    static ref NUMERIC_CALLOUT: Regex =
        Regex::new(r"^[\[(]?\s*\d+[a-z]?(?:\s*[-–—,;]\s*\d+[a-z]?)*\s*[\])]?$").unwrap();
    static ref YEAR: Regex = Regex::new(r"\b(1[89]\d{2}|20\d{2})[a-z]?\b").unwrap();
    static ref SURNAME: Regex = Regex::new(r"\p{Lu}[\p{L}'’-]+").unwrap();
}

/// One callout found inside a citation marker.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationMatch {
    /// Callout text, e.g. "[3" or "Smith et al., 2010"
    pub text: String,
    /// Tokens of the callout
    pub tokens: Vec<Token>,
    /// Identifier of the matched bibliography entry
    pub bib_id: Option<String>,
}

/// Matches citation callouts against the bibliography.
///
/// A single marker can hold several callouts ("[1, 3]"); implementations
/// return one match per callout, in reading order.
pub trait CitationMatcher: Send + Sync {
    /// Split a marker into callouts and resolve each of them.
    fn match_citations(&self, tokens: &[Token]) -> Result<Vec<CitationMatch>>;
}

/// Default matcher for numeric and author-year callouts.
#[derive(Debug, Clone, Default)]
pub struct NumericCitationMatcher {
    entries: Vec<BibEntry>,
    folded: Vec<String>,
    has_numeric_labels: bool,
}

impl NumericCitationMatcher {
    /// Create a matcher over a bibliography.
    pub fn new(bibliography: &[BibEntry]) -> Self {
        let folded: Vec<String> = bibliography.iter().map(|b| fold_label(&b.label)).collect();
        let has_numeric_labels = bibliography
            .iter()
            .any(|b| first_number(&b.label).is_some() && !YEAR.is_match(&b.label));
        Self {
            entries: bibliography.to_vec(),
            folded,
            has_numeric_labels,
        }
    }

    fn lookup_number(&self, number: &str) -> Option<String> {
        if self.has_numeric_labels {
            return self
                .entries
                .iter()
                .find(|b| first_number(&b.label) == Some(number))
                .map(|b| b.id.clone());
        }
        // Unlabeled bibliographies are numbered in order
        let index: usize = number.parse().ok()?;
        self.entries
            .get(index.checked_sub(1)?)
            .map(|b| b.id.clone())
    }

    fn lookup_author_year(&self, callout: &str) -> Option<String> {
        let year = YEAR.find(callout)?.as_str();
        let surname = fold_label(SURNAME.find(callout)?.as_str());
        self.folded
            .iter()
            .position(|label| label.contains(&surname) && label.contains(year))
            .map(|i| self.entries[i].id.clone())
    }
}

impl CitationMatcher for NumericCitationMatcher {
    fn match_citations(&self, tokens: &[Token]) -> Result<Vec<CitationMatch>> {
        let text = tokens_text(tokens);
        let numeric = NUMERIC_CALLOUT.is_match(text.trim());
        let separators: &[char] = if numeric { &[',', ';'] } else { &[';'] };

        let mut matches = Vec::new();
        for (start, end) in split_pieces(&text, separators) {
            let piece = &text[start..end];
            let bib_id = if numeric {
                first_number(piece).and_then(|n| self.lookup_number(n))
            } else {
                self.lookup_author_year(piece)
            };
            matches.push(CitationMatch {
                text: piece.to_string(),
                tokens: tokens_in(tokens, start, end),
                bib_id,
            });
        }

        if matches.is_empty() && !text.trim().is_empty() {
            matches.push(CitationMatch {
                text: text.trim().to_string(),
                tokens: tokens.to_vec(),
                bib_id: None,
            });
        }
        Ok(matches)
    }
}

/// Byte ranges of the trimmed pieces between separators.
/// A separator stays with the piece it closes.
fn split_pieces(text: &str, separators: &[char]) -> Vec<(usize, usize)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if separators.contains(&c) {
            let end = i + c.len_utf8();
            pieces.push((start, end));
            start = end;
        }
    }
    pieces.push((start, text.len()));

    pieces
        .into_iter()
        .filter_map(|(s, e)| {
            let piece = &text[s..e];
            let lead = piece.len() - piece.trim_start().len();
            let trimmed = piece.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some((s + lead, s + lead + trimmed.len()))
            }
        })
        .collect()
}

/// Non-whitespace tokens overlapping a byte range of their joined text.
fn tokens_in(tokens: &[Token], start: usize, end: usize) -> Vec<Token> {
    let mut pos = 0;
    let mut result = Vec::new();
    for token in tokens {
        let token_end = pos + token.text.len();
        if token_end > start && pos < end && !token.is_whitespace() {
            result.push(token.clone());
        }
        pos = token_end;
    }
    result
}

/// Turn a citation marker into inline nodes.
///
/// Markers inconsistent with the document citation style stay plain text.
/// Resolved callouts become markers with a target; unresolved ones become
/// markers only when `keep_unsolved` is set. A trailing space of the
/// marker text is kept as a separate text node.
pub fn resolve_citation(
    tokens: &[Token],
    matcher: &dyn CitationMatcher,
    style: Option<CitationStyle>,
    keep_unsolved: bool,
    with_coords: bool,
) -> Vec<Inline> {
    let text = tokens_text(tokens).replace('\n', " ");
    if text.trim().is_empty() {
        return vec![Inline::text(text)];
    }

    if let Some(style) = style {
        let superscript = tokens.iter().any(|t| t.superscript);
        let consistent = match style {
            CitationStyle::SuperscriptNumber => superscript,
            CitationStyle::Parenthetical => !superscript,
        };
        if !consistent {
            log::debug!("Citation marker '{}' does not follow the document style", text.trim());
            return vec![Inline::text(text)];
        }
    }

    let matches = match matcher.match_citations(tokens) {
        Ok(matches) if !matches.is_empty() => matches,
        Ok(_) => return vec![Inline::text(text)],
        Err(e) => {
            log::warn!("Citation matching failed for '{}': {}", text.trim(), e);
            return vec![Inline::text(text)];
        }
    };

    let mut nodes = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;
    for m in matches {
        // Text between two callouts ("[1, 3]" keeps its space)
        if let Some(found) = text[cursor..].find(m.text.as_str()).map(|p| p + cursor) {
            if found > cursor && !nodes.is_empty() {
                nodes.push(Inline::text(normalize_text(&text[cursor..found])));
            }
            cursor = found + m.text.len();
        }
        let marker_text = normalize_text(&m.text).trim().to_string();
        let coords = if with_coords {
            coords_of(&m.tokens)
        } else {
            Vec::new()
        };
        match m.bib_id {
            Some(id) => nodes.push(Inline::Ref(
                ReferenceMarker::new(MarkerKind::Citation, marker_text)
                    .with_target(Some(id))
                    .with_coords(coords),
            )),
            None if keep_unsolved => nodes.push(Inline::Ref(
                ReferenceMarker::new(MarkerKind::Citation, marker_text).with_coords(coords),
            )),
            None => nodes.push(Inline::text(m.text)),
        }
    }

    if text.ends_with(' ') {
        nodes.push(Inline::text(" "));
    }
    nodes
}
