//! Lookup tables of entities that callouts can point at.

use serde::{Deserialize, Serialize};

/// A figure or table declared elsewhere in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledEntity {
    /// Entity identifier (without the TEI prefix)
    pub id: String,
    /// Label as printed in the caption, e.g. "3" or "Figure 3"
    pub label: String,
}

impl LabeledEntity {
    /// Create a new labeled entity.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A display equation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    /// Equation identifier
    pub id: String,
    /// Printed equation number, e.g. "(3)"
    pub label: String,
    /// Offset of the first token of the equation in the source stream
    pub start: usize,
    /// Equation content
    #[serde(default)]
    pub text: String,
}

impl Equation {
    /// Create a new equation entry.
    pub fn new(id: impl Into<String>, label: impl Into<String>, start: usize) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            start,
            text: String::new(),
        }
    }

    /// Set the equation content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// A bibliography entry, already parsed upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    /// Ordinal used in `#b<ordinal>` targets
    pub id: String,
    /// Callout label, e.g. "12" or "Smith et al. 2010"
    pub label: String,
}

impl BibEntry {
    /// Create a new bibliography entry.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// All entity tables of one document. Entries keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    /// Figures in declaration order
    #[serde(default)]
    pub figures: Vec<LabeledEntity>,
    /// Tables in declaration order
    #[serde(default)]
    pub tables: Vec<LabeledEntity>,
    /// Equations in non-decreasing start offset order
    #[serde(default)]
    pub equations: Vec<Equation>,
    /// Bibliography entries
    #[serde(default)]
    pub bibliography: Vec<BibEntry>,
}

impl Entities {
    /// Create empty entity tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no entity of any kind is known.
    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
            && self.tables.is_empty()
            && self.equations.is_empty()
            && self.bibliography.is_empty()
    }
}
