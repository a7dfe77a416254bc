//! # teibody
//!
//! Rebuilds the body of a scholarly document from per-token structural
//! labels.
//!
//! An upstream sequence model labels every layout token (paragraph,
//! section heading, citation callout, ...). This library groups the labels
//! into clusters, folds them into divisions, paragraphs, lists and notes,
//! resolves callouts against the document's figures, tables, equations and
//! bibliography, and splits paragraphs into sentences without ever tearing
//! a callout apart. The result renders to TEI or JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use teibody::{render, DocumentInput, TeiBody};
//!
//! fn main() -> teibody::Result<()> {
//!     let input = DocumentInput::from_file("labeled.json")?;
//!
//!     let tree = TeiBody::new().with_ids(true).process(&input)?;
//!     let tei = render::to_tei(&tree, &render::TeiOptions::default())?;
//!     println!("{}", tei);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Structure**: divisions with numbered headings, paragraphs, lists, equations
//! - **Callouts**: citation, figure, table and equation references with targets
//! - **Sentences**: pluggable boundary detection, callouts kept whole
//! - **Notes**: deduplicated, numbered footnotes with their own callouts
//! - **Coordinates**: per-line page boxes for headings, callouts, sentences
//! - **Parallel processing**: Uses Rayon for document batches

pub mod assemble;
pub mod error;
pub mod model;
pub mod notes;
pub mod render;
pub mod resolve;
pub mod segment;
pub mod text;

// Re-export commonly used types
pub use assemble::{
    assemble_body, build_clusters, AssemblyOptions, BodyAssembler, CoordElement,
};
pub use error::{Error, Result};
pub use model::{
    AssemblyStats, BibEntry, Block, BoundingBox, CitationStyle, Division, DocumentTree,
    Entities, Equation, Heading, Inline, Label, LabeledCluster, LabeledEntity, MarkerKind, Note,
    NotePlace, Paragraph, ReferenceMarker, Sentence, Span, TaggedLabel, Token,
};
pub use notes::{extract_notes, MarkerPatternLabeler, NoteLabeler, NotePiece};
pub use render::{JsonFormat, TeiOptions};
pub use resolve::{resolve_marker, CitationMatcher, NumericCitationMatcher};
pub use segment::{segment_sentences, PunctuationSentenceDetector, SentenceDetector};

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Tokens of one document part together with their labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledSection {
    /// Layout tokens in stream order
    pub tokens: Vec<Token>,
    /// One label per token
    pub labels: Vec<TaggedLabel>,
}

impl LabeledSection {
    /// Create a labeled section.
    pub fn new(tokens: Vec<Token>, labels: Vec<TaggedLabel>) -> Self {
        Self { tokens, labels }
    }

    /// Group the tokens into clusters.
    pub fn clusters(&self) -> Result<Vec<LabeledCluster>> {
        build_clusters(self.tokens.clone(), &self.labels)
    }
}

/// Everything needed to rebuild one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Labeled body tokens
    pub body: LabeledSection,

    /// Figures, tables, equations and bibliography
    #[serde(default)]
    pub entities: Entities,

    /// Footnote and margin note blocks
    #[serde(default)]
    pub notes: Vec<NotePiece>,

    /// Labeled acknowledgement tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgement: Option<LabeledSection>,

    /// Labeled annex tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annex: Option<LabeledSection>,

    /// Citation callout style detected for the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_style: Option<CitationStyle>,
}

impl DocumentInput {
    /// Create an input from a labeled body.
    pub fn new(body: LabeledSection) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    /// Set the entity tables.
    pub fn with_entities(mut self, entities: Entities) -> Self {
        self.entities = entities;
        self
    }

    /// Set the note blocks.
    pub fn with_notes(mut self, notes: Vec<NotePiece>) -> Self {
        self.notes = notes;
        self
    }

    /// Parse an input from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read an input from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Rebuild one document with the default collaborators.
///
/// # Example
///
/// ```no_run
/// use teibody::{process_document, AssemblyOptions, DocumentInput};
///
/// let input = DocumentInput::from_file("labeled.json").unwrap();
/// let tree = process_document(&input, &AssemblyOptions::default()).unwrap();
/// println!("{} divisions", tree.divisions.len());
/// ```
pub fn process_document(input: &DocumentInput, options: &AssemblyOptions) -> Result<DocumentTree> {
    TeiBody::new().with_options(options.clone()).process(input)
}

/// Rebuild a batch of documents with the default collaborators.
///
/// Documents are independent; one failing does not stop the others.
pub fn process_documents(
    inputs: &[DocumentInput],
    options: &AssemblyOptions,
) -> Vec<Result<DocumentTree>> {
    TeiBody::new()
        .with_options(options.clone())
        .process_batch(inputs)
}

/// Builder for rebuilding document bodies.
///
/// # Example
///
/// ```no_run
/// use teibody::{CoordElement, DocumentInput, TeiBody};
///
/// let input = DocumentInput::from_file("labeled.json")?;
/// let tree = TeiBody::new()
///     .with_coordinates(&[CoordElement::Ref, CoordElement::Sentence])
///     .with_keep_unsolved_callout(false)
///     .process(&input)?;
/// # Ok::<(), teibody::Error>(())
/// ```
pub struct TeiBody {
    options: AssemblyOptions,
    detector: Box<dyn SentenceDetector>,
    labeler: Box<dyn NoteLabeler>,
    matcher: Option<Box<dyn CitationMatcher>>,
}

impl TeiBody {
    /// Create a new builder with default collaborators.
    pub fn new() -> Self {
        Self {
            options: AssemblyOptions::default(),
            detector: Box::new(PunctuationSentenceDetector::new()),
            labeler: Box::new(MarkerPatternLabeler::new()),
            matcher: None,
        }
    }

    /// Replace all assembly options.
    pub fn with_options(mut self, options: AssemblyOptions) -> Self {
        self.options = options;
        self
    }

    /// Keep or drop unresolved citation callouts as markers.
    pub fn with_keep_unsolved_callout(mut self, keep: bool) -> Self {
        self.options = self.options.with_keep_unsolved_callout(keep);
        self
    }

    /// Disable sentence segmentation.
    pub fn without_sentences(mut self) -> Self {
        self.options = self.options.without_sentences();
        self
    }

    /// Set the elements that get coordinates.
    pub fn with_coordinates(mut self, elements: &[CoordElement]) -> Self {
        self.options = self.options.with_coordinates(elements);
        self
    }

    /// Enable `xml:id` generation.
    pub fn with_ids(mut self, generate: bool) -> Self {
        self.options = self.options.with_ids(generate);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Use a custom sentence detector.
    pub fn with_detector(mut self, detector: impl SentenceDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Use a custom note labeler.
    pub fn with_note_labeler(mut self, labeler: impl NoteLabeler + 'static) -> Self {
        self.labeler = Box::new(labeler);
        self
    }

    /// Use a custom citation matcher for every document.
    ///
    /// By default a [`NumericCitationMatcher`] is built per document from
    /// its bibliography.
    pub fn with_matcher(mut self, matcher: impl CitationMatcher + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    /// Current assembly options.
    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Rebuild one document.
    pub fn process(&self, input: &DocumentInput) -> Result<DocumentTree> {
        let mut options = self.options.clone();
        if input.citation_style.is_some() {
            options.citation_style = input.citation_style;
        }

        let default_matcher;
        let matcher: &dyn CitationMatcher = match self.matcher {
            Some(ref matcher) => matcher.as_ref(),
            None => {
                default_matcher = NumericCitationMatcher::new(&input.entities.bibliography);
                &default_matcher
            }
        };
        let detector = self.detector.as_ref();

        let mut tree = DocumentTree::new();
        let (divisions, stats) = BodyAssembler::new(&input.entities, &options, matcher, detector)
            .assemble(input.body.clusters()?);
        tree.divisions = divisions;
        tree.stats = stats;

        if let Some(ref section) = input.acknowledgement {
            let ack_options = options.clone().with_keep_unsolved_callout(false);
            let (divisions, stats) =
                BodyAssembler::new(&input.entities, &ack_options, matcher, detector)
                    .assemble(section.clusters()?);
            tree.acknowledgement = divisions;
            tree.stats.merge(&stats);
        }

        if let Some(ref section) = input.annex {
            let (divisions, stats) = BodyAssembler::new(&input.entities, &options, matcher, detector)
                .assemble(section.clusters()?);
            tree.annex = divisions;
            tree.stats.merge(&stats);
        }

        tree.notes = extract_notes(
            &input.notes,
            self.labeler.as_ref(),
            matcher,
            &input.entities,
            &options,
        );

        if options.generate_ids {
            assemble::assign_ids(&mut tree);
        }

        log::debug!(
            "Assembled {} divisions, {} notes ({} resolved / {} unresolved callouts)",
            tree.divisions.len(),
            tree.notes.len(),
            tree.stats.resolved_markers,
            tree.stats.unresolved_markers
        );
        Ok(tree)
    }

    /// Rebuild a batch of documents, in parallel unless disabled.
    pub fn process_batch(&self, inputs: &[DocumentInput]) -> Vec<Result<DocumentTree>> {
        if self.options.parallel {
            inputs.par_iter().map(|input| self.process(input)).collect()
        } else {
            inputs.iter().map(|input| self.process(input)).collect()
        }
    }
}

impl Default for TeiBody {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(words: &[(&str, &str)]) -> LabeledSection {
        let mut offset = 0;
        let mut tokens = Vec::new();
        let mut labels = Vec::new();
        for (word, tag) in words {
            tokens.push(Token::new(*word, offset));
            labels.push(tag.parse().unwrap());
            offset += word.len();
        }
        LabeledSection::new(tokens, labels)
    }

    #[test]
    fn test_process_document() {
        let input = DocumentInput::new(section(&[
            ("Intro", "I-<section>"),
            ("Hello", "I-<paragraph>"),
            (" ", "<paragraph>"),
            ("world.", "<paragraph>"),
        ]));
        let tree = process_document(&input, &AssemblyOptions::default()).unwrap();
        assert_eq!(tree.divisions.len(), 1);
        assert_eq!(tree.divisions[0].heading.as_ref().unwrap().text, "Intro");
        assert_eq!(tree.paragraphs().count(), 1);
    }

    #[test]
    fn test_label_mismatch_is_error() {
        let mut input = DocumentInput::new(section(&[("Hello", "<paragraph>")]));
        input.body.labels.clear();
        assert!(matches!(
            process_document(&input, &AssemblyOptions::default()),
            Err(Error::LabelCountMismatch { .. })
        ));
    }

    #[test]
    fn test_acknowledgement_drops_unsolved_callouts() {
        let mut input = DocumentInput::new(section(&[("Body text.", "<paragraph>")]));
        input.acknowledgement = Some(section(&[
            ("We thank", "I-<paragraph>"),
            (" ", "<paragraph>"),
            ("[9]", "I-<citation_marker>"),
        ]));
        let tree = process_document(&input, &AssemblyOptions::default().without_sentences()).unwrap();
        let ack = &tree.acknowledgement[0];
        let para = ack.paragraphs().next().unwrap();
        assert_eq!(para.plain_text(), "We thank [9]");
        assert!(para.markers().is_empty());
    }

    #[test]
    fn test_batch_keeps_order() {
        let inputs: Vec<_> = (0..4)
            .map(|i| {
                let text = format!("Paragraph number {}.", i);
                DocumentInput::new(LabeledSection::new(
                    vec![Token::new(text, 0)],
                    vec![TaggedLabel::begin(Label::Paragraph)],
                ))
            })
            .collect();
        let results = process_documents(&inputs, &AssemblyOptions::default());
        assert_eq!(results.len(), 4);
        let text = results[2].as_ref().unwrap().plain_text();
        assert_eq!(text, "Paragraph number 2.");
    }
}
