//! Paragraph, sentence and inline-level types.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, MarkerKind, Span, Token};

/// A paragraph of body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Node identifier (`xml:id`), assigned after assembly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Inline content, or sentences once segmented
    pub body: ParagraphBody,

    /// Tokens the paragraph was built from, kept for sentence coordinates
    #[serde(skip)]
    pub tokens: Vec<Token>,
}

/// Children of a paragraph.
///
/// Segmentation replaces the inline list wholesale, so a segmented
/// paragraph never carries loose text or markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "children", rename_all = "snake_case")]
pub enum ParagraphBody {
    /// Flat inline content
    Inline(Vec<Inline>),
    /// Sentence segmentation of the content
    Sentences(Vec<Sentence>),
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self {
            id: None,
            body: ParagraphBody::Inline(Vec::new()),
            tokens: Vec::new(),
        }
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.push_text(&text.into());
        p
    }

    /// Inline content, `None` once segmented.
    pub fn inlines(&self) -> Option<&[Inline]> {
        match &self.body {
            ParagraphBody::Inline(content) => Some(content),
            ParagraphBody::Sentences(_) => None,
        }
    }

    /// Sentences, `None` until segmented.
    pub fn sentences(&self) -> Option<&[Sentence]> {
        match &self.body {
            ParagraphBody::Inline(_) => None,
            ParagraphBody::Sentences(sentences) => Some(sentences),
        }
    }

    /// Check if the paragraph has been split into sentences.
    pub fn is_segmented(&self) -> bool {
        matches!(self.body, ParagraphBody::Sentences(_))
    }

    /// Append text, merging with a trailing text run.
    ///
    /// Whitespace at the join is collapsed to what is already there.
    /// Has no effect once the paragraph is segmented.
    pub fn push_text(&mut self, text: &str) {
        let ends_with_space = self.ends_with_whitespace();
        let ParagraphBody::Inline(content) = &mut self.body else {
            return;
        };
        let text = if ends_with_space {
            text.trim_start()
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        match content.last_mut() {
            Some(Inline::Text(run)) => run.text.push_str(text),
            _ => content.push(Inline::text(text)),
        }
    }

    /// Append an inline node. Text nodes go through [`Paragraph::push_text`].
    pub fn push_inline(&mut self, inline: Inline) {
        match inline {
            Inline::Text(run) => self.push_text(&run.text),
            marker @ Inline::Ref(_) => {
                if let ParagraphBody::Inline(content) = &mut self.body {
                    content.push(marker);
                }
            }
        }
    }

    /// Drop trailing whitespace from the last text run.
    pub fn trim_end(&mut self) {
        let ParagraphBody::Inline(content) = &mut self.body else {
            return;
        };
        if let Some(Inline::Text(run)) = content.last_mut() {
            let len = run.text.trim_end().len();
            run.text.truncate(len);
            if run.text.is_empty() {
                content.pop();
            }
        }
    }

    /// Take the inline content, leaving the paragraph empty.
    pub fn into_inlines(self) -> Vec<Inline> {
        match self.body {
            ParagraphBody::Inline(content) => content,
            ParagraphBody::Sentences(sentences) => {
                sentences.into_iter().flat_map(|s| s.content).collect()
            }
        }
    }

    /// Record tokens the paragraph content came from.
    pub fn extend_tokens(&mut self, tokens: &[Token]) {
        self.tokens.extend_from_slice(tokens);
    }

    /// Check if the flat text ends with whitespace (or is empty).
    pub fn ends_with_whitespace(&self) -> bool {
        let last = match &self.body {
            ParagraphBody::Inline(content) => last_char(content.iter()),
            ParagraphBody::Sentences(sentences) => {
                last_char(sentences.iter().flat_map(|s| s.content.iter()))
            }
        };
        last.map_or(true, char::is_whitespace)
    }

    /// Get plain text content of the paragraph, markers included.
    pub fn plain_text(&self) -> String {
        match &self.body {
            ParagraphBody::Inline(content) => content.iter().map(Inline::as_text).collect(),
            ParagraphBody::Sentences(sentences) => sentences
                .iter()
                .map(Sentence::plain_text)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Byte spans of the reference markers within [`Paragraph::plain_text`].
    pub fn marker_spans(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut pos = 0;
        if let ParagraphBody::Inline(content) = &self.body {
            for inline in content {
                let len = inline.as_text().len();
                if inline.is_marker() {
                    spans.push(Span::new(pos, pos + len));
                }
                pos += len;
            }
        }
        spans
    }

    /// All reference markers, wherever they sit.
    pub fn markers(&self) -> Vec<&ReferenceMarker> {
        match &self.body {
            ParagraphBody::Inline(content) => content.iter().filter_map(Inline::marker).collect(),
            ParagraphBody::Sentences(sentences) => sentences
                .iter()
                .flat_map(|s| s.content.iter().filter_map(Inline::marker))
                .collect(),
        }
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        match &self.body {
            ParagraphBody::Inline(content) => {
                content.is_empty() || self.plain_text().trim().is_empty()
            }
            ParagraphBody::Sentences(_) => false,
        }
    }
}

/// Last character of the joined inline texts.
fn last_char<'a>(inlines: impl DoubleEndedIterator<Item = &'a Inline>) -> Option<char> {
    inlines.rev().find_map(|i| i.as_text().chars().last())
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Inline content within a paragraph, sentence or note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Inline {
    /// A run of plain text
    Text(TextRun),

    /// A reference callout
    Ref(ReferenceMarker),
}

impl Inline {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextRun::new(text))
    }

    /// Text as it reads in the document.
    pub fn as_text(&self) -> &str {
        match self {
            Inline::Text(run) => &run.text,
            Inline::Ref(marker) => &marker.text,
        }
    }

    /// Check if this node is a reference marker.
    pub fn is_marker(&self) -> bool {
        matches!(self, Inline::Ref(_))
    }

    /// The marker, if this node is one.
    pub fn marker(&self) -> Option<&ReferenceMarker> {
        match self {
            Inline::Ref(marker) => Some(marker),
            Inline::Text(_) => None,
        }
    }
}

/// A run of plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,
}

impl TextRun {
    /// Create a new text run.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An in-text callout to a figure, table, equation or bibliography entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMarker {
    /// What the callout points at
    pub kind: MarkerKind,

    /// Callout text as printed, e.g. "[12]" or "Fig. 3"
    pub text: String,

    /// Position of the callout, one box per line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coords: Vec<BoundingBox>,

    /// Identifier of the resolved entity; `None` when unresolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ReferenceMarker {
    /// Create an unresolved marker.
    pub fn new(kind: MarkerKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            coords: Vec::new(),
            target: None,
        }
    }

    /// Set the resolved target.
    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    /// Set the coordinates.
    pub fn with_coords(mut self, coords: Vec<BoundingBox>) -> Self {
        self.coords = coords;
        self
    }

    /// Check if the marker points at a known entity.
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// A sentence of a segmented paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Node identifier (`xml:id`), assigned after assembly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Byte span over the paragraph's flat text
    pub span: Span,

    /// Position of the sentence, one box per line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coords: Vec<BoundingBox>,

    /// Sentence content
    pub content: Vec<Inline>,
}

impl Sentence {
    /// Create an empty sentence over a span.
    pub fn new(span: Span) -> Self {
        Self {
            id: None,
            span,
            coords: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Get plain text content of the sentence.
    pub fn plain_text(&self) -> String {
        self.content.iter().map(Inline::as_text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.push_text("See ");
        p.push_inline(Inline::Ref(ReferenceMarker::new(MarkerKind::Citation, "[1]")));
        p.push_text(" for details.");

        assert_eq!(p.plain_text(), "See [1] for details.");
        assert_eq!(p.marker_spans(), vec![Span::new(4, 7)]);
    }

    #[test]
    fn test_push_text_collapses_join_whitespace() {
        let mut p = Paragraph::with_text("The cat ");
        p.push_text(" ");
        p.push_text("  sat.");
        assert_eq!(p.plain_text(), "The cat sat.");
        assert_eq!(p.inlines().unwrap().len(), 1);
    }

    #[test]
    fn test_marker_resolution_flag() {
        let marker = ReferenceMarker::new(MarkerKind::Figure, "Fig. 2");
        assert!(!marker.is_resolved());
        let marker = marker.with_target(Some("1".to_string()));
        assert!(marker.is_resolved());
    }

    #[test]
    fn test_ends_with_whitespace() {
        let mut p = Paragraph::new();
        assert!(p.ends_with_whitespace());
        p.push_text("Seen in ");
        assert!(p.ends_with_whitespace());
        p.push_inline(Inline::Ref(ReferenceMarker::new(MarkerKind::Figure, "Fig. 1")));
        assert!(!p.ends_with_whitespace());
        p.push_inline(Inline::text(""));
        assert!(!p.ends_with_whitespace());
        p.push_text(" ");
        assert!(p.ends_with_whitespace());
    }

    #[test]
    fn test_trim_end() {
        let mut p = Paragraph::with_text("Shown below ");
        p.trim_end();
        assert_eq!(p.plain_text(), "Shown below");

        let mut p = Paragraph::new();
        p.push_inline(Inline::Ref(ReferenceMarker::new(MarkerKind::Table, "Table 1")));
        p.push_text(" ");
        p.trim_end();
        assert_eq!(p.inlines().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_paragraph() {
        assert!(Paragraph::new().is_empty());
        assert!(Paragraph::with_text("   ").is_empty());
        assert!(!Paragraph::with_text("x").is_empty());
    }
}
