//! Token and label types consumed from the upstream labeler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A layout token from the source stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Token text (may be pure whitespace, e.g. " " or "\n")
    pub text: String,

    /// Start offset of the token in the source stream
    pub offset: usize,

    /// Position of the token on its page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Whether the token is typeset as superscript
    #[serde(default)]
    pub superscript: bool,
}

impl Token {
    /// Create a token without layout information.
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
            bbox: None,
            superscript: false,
        }
    }

    /// Attach a bounding box.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Mark the token as superscript.
    pub fn superscript(mut self) -> Self {
        self.superscript = true;
        self
    }

    /// End offset (exclusive) in the source stream.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Whether the token only carries whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// A rectangle on a page, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Page number (1-indexed)
    pub page: u32,
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(page: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            page,
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box enclosing both boxes. The page of `self` is kept.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        BoundingBox::new(self.page, x, y, right - x, bottom - y)
    }

    /// Whether both boxes sit on the same page and overlap vertically.
    pub fn same_line(&self, other: &BoundingBox) -> bool {
        self.page == other.page
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{:.2},{:.2},{:.2},{:.2}",
            self.page, self.x, self.y, self.width, self.height
        )
    }
}

/// Merge the boxes of a token run into one box per page line.
pub fn coords_of(tokens: &[Token]) -> Vec<BoundingBox> {
    let mut boxes: Vec<BoundingBox> = Vec::new();
    for bbox in tokens.iter().filter_map(|t| t.bbox.as_ref()) {
        match boxes.last_mut() {
            Some(last) if last.same_line(bbox) => *last = last.union(bbox),
            _ => boxes.push(*bbox),
        }
    }
    boxes
}

/// Format coordinates the way TEI `coords` attributes expect them.
pub fn coords_string(boxes: &[BoundingBox]) -> Option<String> {
    if boxes.is_empty() {
        return None;
    }
    Some(
        boxes
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(";"),
    )
}

/// A half-open byte range `[start, end)` over a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies fully inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the offset falls strictly inside the span.
    pub fn strictly_contains(&self, offset: usize) -> bool {
        self.start < offset && offset < self.end
    }
}

/// Structural label assigned to a token by the sequence model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Section heading
    Section,
    /// Body paragraph text
    Paragraph,
    /// List item
    Item,
    /// Unclassified content kept as an annotated note
    Other,
    /// Display equation
    Equation,
    /// Equation number, e.g. "(3)"
    EquationLabel,
    /// Figure block
    Figure,
    /// Table block
    Table,
    /// Bibliographical callout
    CitationMarker,
    /// Figure callout
    FigureMarker,
    /// Table callout
    TableMarker,
    /// Equation callout
    EquationMarker,
}

impl Label {
    /// All labels, in declaration order.
    pub const ALL: [Label; 12] = [
        Label::Section,
        Label::Paragraph,
        Label::Item,
        Label::Other,
        Label::Equation,
        Label::EquationLabel,
        Label::Figure,
        Label::Table,
        Label::CitationMarker,
        Label::FigureMarker,
        Label::TableMarker,
        Label::EquationMarker,
    ];

    /// Tag form used by the labeler, e.g. `<paragraph>`.
    pub fn tag(&self) -> &'static str {
        match self {
            Label::Section => "<section>",
            Label::Paragraph => "<paragraph>",
            Label::Item => "<item>",
            Label::Other => "<other>",
            Label::Equation => "<equation>",
            Label::EquationLabel => "<equation_label>",
            Label::Figure => "<figure>",
            Label::Table => "<table>",
            Label::CitationMarker => "<citation_marker>",
            Label::FigureMarker => "<figure_marker>",
            Label::TableMarker => "<table_marker>",
            Label::EquationMarker => "<equation_marker>",
        }
    }

    /// Marker kind for callout labels.
    pub fn marker_kind(&self) -> Option<MarkerKind> {
        match self {
            Label::CitationMarker => Some(MarkerKind::Citation),
            Label::FigureMarker => Some(MarkerKind::Figure),
            Label::TableMarker => Some(MarkerKind::Table),
            Label::EquationMarker => Some(MarkerKind::Equation),
            _ => None,
        }
    }

    /// Check if this is one of the four callout labels.
    pub fn is_marker(&self) -> bool {
        self.marker_kind().is_some()
    }

    /// Check if this is a block-level figure or table.
    pub fn is_figure_or_table(&self) -> bool {
        matches!(self, Label::Figure | Label::Table)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Label::ALL
            .iter()
            .copied()
            .find(|label| {
                let tag = label.tag();
                trimmed == tag || trimmed == &tag[1..tag.len() - 1]
            })
            .ok_or_else(|| Error::UnknownLabel(trimmed.to_string()))
    }
}

/// A label as emitted per token, with its cluster-begin flag.
///
/// The labeler writes `I-<paragraph>` on the first token of a new
/// run and `<paragraph>` on the following ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaggedLabel {
    /// The structural label
    pub label: Label,
    /// Whether this token starts a new cluster
    pub begin: bool,
}

impl TaggedLabel {
    /// A continuation label.
    pub fn inside(label: Label) -> Self {
        Self {
            label,
            begin: false,
        }
    }

    /// A cluster-begin label.
    pub fn begin(label: Label) -> Self {
        Self { label, begin: true }
    }
}

impl From<Label> for TaggedLabel {
    fn from(label: Label) -> Self {
        Self::inside(label)
    }
}

impl FromStr for TaggedLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.strip_prefix("I-") {
            Some(rest) => Ok(TaggedLabel::begin(rest.parse()?)),
            None => Ok(TaggedLabel::inside(trimmed.parse()?)),
        }
    }
}

impl TryFrom<String> for TaggedLabel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TaggedLabel> for String {
    fn from(value: TaggedLabel) -> Self {
        if value.begin {
            format!("I-{}", value.label.tag())
        } else {
            value.label.tag().to_string()
        }
    }
}

/// Kind of an inline reference callout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// Reference to a bibliography entry
    Citation,
    /// Reference to a figure
    Figure,
    /// Reference to a table
    Table,
    /// Reference to an equation
    Equation,
}

impl MarkerKind {
    /// TEI `ref/@type` value.
    pub fn tei_type(&self) -> &'static str {
        match self {
            MarkerKind::Citation => "bibr",
            MarkerKind::Figure => "figure",
            MarkerKind::Table => "table",
            MarkerKind::Equation => "formula",
        }
    }

    /// Prefix of TEI `ref/@target` identifiers.
    pub fn target_prefix(&self) -> &'static str {
        match self {
            MarkerKind::Citation => "#b",
            MarkerKind::Figure => "#fig_",
            MarkerKind::Table => "#tab_",
            MarkerKind::Equation => "#formula_",
        }
    }
}

/// Document-wide citation callout style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationStyle {
    /// Superscript numbers, e.g. "text¹²"
    SuperscriptNumber,
    /// Inline callouts, e.g. "[12]" or "(Smith, 2010)"
    Parenthetical,
}

/// A maximal run of tokens sharing one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledCluster {
    /// Label shared by all tokens
    pub label: Label,
    /// Tokens of the run, in source order
    pub tokens: Vec<Token>,
}

impl LabeledCluster {
    /// Create a cluster.
    pub fn new(label: Label, tokens: Vec<Token>) -> Self {
        Self { label, tokens }
    }

    /// Offset of the first token.
    pub fn start(&self) -> Option<usize> {
        self.tokens.first().map(|t| t.offset)
    }

    /// Raw concatenated text of the tokens.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}
