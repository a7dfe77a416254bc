//! Document-level types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Inline, Label, Note, Paragraph};

/// A rebuilt document body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Body divisions, none of them empty
    pub divisions: Vec<Division>,

    /// Footnotes and margin notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<Note>,

    /// Acknowledgement divisions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acknowledgement: Vec<Division>,

    /// Annex divisions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annex: Vec<Division>,

    /// Assembly diagnostics
    #[serde(default)]
    pub stats: AssemblyStats,
}

impl DocumentTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the body has no division.
    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    /// Iterate over all body paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.divisions.iter().flat_map(Division::paragraphs)
    }

    /// Get plain text content of the body.
    pub fn plain_text(&self) -> String {
        self.divisions
            .iter()
            .map(Division::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A structural section: optional heading plus content blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Division {
    /// Node identifier (`xml:id`), assigned after assembly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Section heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<Heading>,

    /// Content blocks
    pub blocks: Vec<Block>,
}

impl Division {
    /// Create a division without heading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a division opened by a heading.
    pub fn with_heading(heading: Heading) -> Self {
        Self {
            heading: Some(heading),
            ..Self::default()
        }
    }

    /// Add a block to the division.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Check if the division has no block. A heading alone does not count.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over the paragraphs of this division.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Get plain text content of the division.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref heading) = self.heading {
            parts.push(heading.full_text());
        }
        parts.extend(self.blocks.iter().map(Block::plain_text));
        parts.join("\n\n")
    }
}

/// A section heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Node identifier (`xml:id`), assigned after assembly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Heading text without its numbering
    pub text: String,

    /// Numbering prefix, e.g. "2.1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    /// Position of the heading, one box per line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coords: Vec<BoundingBox>,
}

impl Heading {
    /// Create a heading.
    pub fn new(text: impl Into<String>, number: Option<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            number,
            coords: Vec::new(),
        }
    }

    /// Heading text with its numbering.
    pub fn full_text(&self) -> String {
        match self.number {
            Some(ref n) => format!("{} {}", n, self.text),
            None => self.text.clone(),
        }
    }
}

/// A content block of a division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A list of items
    List(ListBlock),

    /// An annotated note
    Note(Note),

    /// A display equation
    Equation(EquationBlock),

    /// A callout met outside any paragraph
    Inline(Inline),
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Block::List(_))
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.plain_text(),
            Block::List(list) => list.items.join("\n"),
            Block::Note(note) => note.plain_text(),
            Block::Equation(eq) => eq.text.clone(),
            Block::Inline(inline) => inline.as_text().to_string(),
        }
    }
}

/// A list of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlock {
    /// Item texts in order
    pub items: Vec<String>,
}

impl ListBlock {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item.
    pub fn add_item(&mut self, text: impl Into<String>) {
        self.items.push(text.into());
    }
}

/// A display equation located in the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationBlock {
    /// Equation identifier, as referenced by equation callouts
    pub id: String,

    /// Equation content
    pub text: String,

    /// Printed equation number
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    /// Position of the equation, one box per line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coords: Vec<BoundingBox>,
}

/// Diagnostics collected while assembling a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Number of clusters seen per label
    pub label_counts: BTreeMap<Label, usize>,

    /// Callouts resolved to an entity
    pub resolved_markers: usize,

    /// Callouts left unresolved
    pub unresolved_markers: usize,

    /// Paragraphs whose sentence segmentation failed
    pub segmentation_failures: usize,
}

impl AssemblyStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one cluster.
    pub fn count_label(&mut self, label: Label) {
        *self.label_counts.entry(label).or_insert(0) += 1;
    }

    /// Count resolved and unresolved markers among inline nodes.
    pub fn count_markers(&mut self, nodes: &[Inline]) {
        for marker in nodes.iter().filter_map(Inline::marker) {
            if marker.is_resolved() {
                self.resolved_markers += 1;
            } else {
                self.unresolved_markers += 1;
            }
        }
    }

    /// Fold another set of statistics into this one.
    pub fn merge(&mut self, other: &AssemblyStats) {
        for (label, count) in &other.label_counts {
            *self.label_counts.entry(*label).or_insert(0) += count;
        }
        self.resolved_markers += other.resolved_markers;
        self.unresolved_markers += other.unresolved_markers;
        self.segmentation_failures += other.segmentation_failures;
    }
}
