//! Footnote and margin note extraction.
//!
//! Each note is cleaned, deduplicated, numbered, and relabeled on its own
//! so that citation callouts inside the note come out as markers.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::assemble::{build_clusters, AssemblyOptions, CoordElement};
use crate::error::Result;
use crate::model::{
    coords_of, Entities, Inline, Label, LabeledCluster, MarkerKind, Note, NotePlace, Paragraph,
    TaggedLabel, Token,
};
use crate::resolve::{CitationMatcher, MarkerResolver};
use crate::text::{leading_number, normalize_dehyphenize, tokens_text};

/// Notes shorter than this are layout noise.
const MIN_NOTE_CHARS: usize = 6;

lazy_static! {
    static ref BRACKET_CALLOUT: Regex =
        Regex::new(r"[\[(]\s*\d+[a-z]?(?:\s*[-–—,;]\s*\d+[a-z]?)*\s*[\])]").unwrap();
}

/// Tokens of one note block, as found on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotePiece {
    /// Where the block sits
    pub place: NotePlace,
    /// Tokens of the block
    pub tokens: Vec<Token>,
}

impl NotePiece {
    /// Create a new note piece.
    pub fn new(place: NotePlace, tokens: Vec<Token>) -> Self {
        Self { place, tokens }
    }
}

/// Labels the tokens of a note in short form: text or citation callout.
pub trait NoteLabeler: Send + Sync {
    /// Split note tokens into labeled clusters.
    fn label(&self, tokens: &[Token]) -> Result<Vec<LabeledCluster>>;
}

/// Default note labeler: bracketed numbers and superscript digits are
/// citation callouts, everything else is text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerPatternLabeler;

impl MarkerPatternLabeler {
    /// Create a new labeler.
    pub fn new() -> Self {
        Self
    }
}

impl NoteLabeler for MarkerPatternLabeler {
    fn label(&self, tokens: &[Token]) -> Result<Vec<LabeledCluster>> {
        let text = tokens_text(tokens);
        let callouts: Vec<(usize, usize)> = BRACKET_CALLOUT
            .find_iter(&text)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut labels = Vec::with_capacity(tokens.len());
        let mut pos = 0;
        let mut previous: Option<(Label, Option<usize>)> = None;
        for token in tokens {
            let end = pos + token.text.len();
            let callout = callouts.iter().position(|&(s, e)| pos < e && end > s);
            let superscript_number =
                token.superscript && token.text.chars().all(|c| c.is_ascii_digit() || c == ',');

            let inside = |i: usize| callouts[i].0 < pos && end < callouts[i].1;
            let (label, group) = match callout {
                Some(i) if !token.is_whitespace() || inside(i) => (Label::CitationMarker, Some(i)),
                _ if superscript_number && !token.text.is_empty() => (Label::CitationMarker, None),
                _ => (Label::Paragraph, None),
            };
            let begin = previous.map_or(true, |p| p != (label, group));
            labels.push(TaggedLabel { label, begin });
            previous = Some((label, group));
            pos = end;
        }

        build_clusters(tokens.to_vec(), &labels)
    }
}

/// Extracts notes from note pieces of one document.
pub struct NoteExtractor<'a> {
    labeler: &'a dyn NoteLabeler,
    resolver: MarkerResolver<'a>,
    options: &'a AssemblyOptions,
}

impl<'a> NoteExtractor<'a> {
    /// Create a new extractor.
    ///
    /// `options` should have `keep_unsolved_callout` off and no citation
    /// style, see [`note_options`].
    pub fn new(
        labeler: &'a dyn NoteLabeler,
        resolver: MarkerResolver<'a>,
        options: &'a AssemblyOptions,
    ) -> Self {
        Self {
            labeler,
            resolver,
            options,
        }
    }

    /// Extract notes in input order, skipping noise and duplicates.
    pub fn extract(&self, pieces: &[NotePiece]) -> Vec<Note> {
        let mut seen: HashMap<NotePlace, HashSet<String>> = HashMap::new();
        let mut notes = Vec::new();

        for piece in pieces {
            let text = normalize_dehyphenize(&piece.tokens).trim().to_string();
            if text.chars().count() < MIN_NOTE_CHARS {
                log::debug!("Skipping short {} note '{}'", piece.place.as_str(), text);
                continue;
            }
            if !seen.entry(piece.place).or_default().insert(text.clone()) {
                log::debug!("Skipping duplicate {} note", piece.place.as_str());
                continue;
            }

            let mut number = None;
            let mut body = text.as_str();
            let mut tokens = piece.tokens.as_slice();
            if let Some((digits, rest)) = leading_number(&text) {
                match digits.parse::<u32>() {
                    Ok(n) => {
                        number = Some(n);
                        body = rest.trim();
                        tokens = strip_leading(tokens, digits);
                    }
                    Err(_) => log::debug!("Note number '{}' out of range", digits),
                }
            }

            let content = self
                .relabel(tokens)
                .unwrap_or_else(|| vec![Inline::text(body)]);
            let coords = if self.options.coordinates_for(CoordElement::Note) {
                coords_of(tokens)
            } else {
                Vec::new()
            };
            notes.push(Note {
                id: None,
                place: piece.place,
                number,
                content,
                coords,
            });
        }
        notes
    }

    /// Relabel note tokens and resolve their citation callouts.
    fn relabel(&self, tokens: &[Token]) -> Option<Vec<Inline>> {
        let clusters = match self.labeler.label(tokens) {
            Ok(clusters) => clusters,
            Err(e) => {
                log::warn!("Note relabeling failed, keeping plain text: {}", e);
                return None;
            }
        };

        let mut note = Paragraph::new();
        for cluster in clusters {
            if cluster.label == Label::CitationMarker {
                for node in self.resolver.resolve(MarkerKind::Citation, &cluster.tokens) {
                    note.push_inline(node);
                }
            } else {
                note.push_text(&normalize_dehyphenize(&cluster.tokens));
            }
        }
        note.trim_end();

        if note.is_empty() {
            return None;
        }
        let mut content = note.into_inlines();
        if let Some(Inline::Text(run)) = content.first_mut() {
            run.text = run.text.trim_start().to_string();
        }
        Some(content)
    }
}

/// Options for resolving callouts inside notes: unresolved callouts stay
/// text and the document citation style is not enforced.
pub fn note_options(options: &AssemblyOptions) -> AssemblyOptions {
    let mut options = options.clone();
    options.keep_unsolved_callout = false;
    options.citation_style = None;
    options
}

/// Extract notes with the given collaborators.
pub fn extract_notes(
    pieces: &[NotePiece],
    labeler: &dyn NoteLabeler,
    matcher: &dyn CitationMatcher,
    entities: &Entities,
    options: &AssemblyOptions,
) -> Vec<Note> {
    let options = note_options(options);
    let resolver = MarkerResolver::new(entities, matcher, &options);
    NoteExtractor::new(labeler, resolver, &options).extract(pieces)
}

/// Drop the tokens spelling a leading number, plus whitespace before it.
fn strip_leading<'t>(tokens: &'t [Token], digits: &str) -> &'t [Token] {
    let mut remaining = digits;
    let mut start = 0;
    for token in tokens {
        if remaining.is_empty() {
            break;
        }
        if token.text.is_empty() || (start == 0 && token.is_whitespace()) {
            start += 1;
            continue;
        }
        match remaining.strip_prefix(token.text.as_str()) {
            Some(rest) => {
                remaining = rest;
                start += 1;
            }
            None => break,
        }
    }
    &tokens[start..]
}
