//! Note types.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Inline};

/// Where a note was found on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotePlace {
    /// Footnote
    Foot,
    /// Margin note
    Margin,
    /// Unclassified body content kept aside
    Other,
}

impl NotePlace {
    /// TEI attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotePlace::Foot => "foot",
            NotePlace::Margin => "margin",
            NotePlace::Other => "other",
        }
    }
}

/// A note: footnote, margin note, or annotated body content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Node identifier (`xml:id`), assigned after assembly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Placement of the note
    pub place: NotePlace,

    /// Leading note number, e.g. 3 for "3 See also ..."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,

    /// Note content
    pub content: Vec<Inline>,

    /// Position of the note, one box per line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coords: Vec<BoundingBox>,
}

impl Note {
    /// Create a note holding plain text.
    pub fn with_text(place: NotePlace, text: impl Into<String>) -> Self {
        Self {
            id: None,
            place,
            number: None,
            content: vec![Inline::text(text)],
            coords: Vec::new(),
        }
    }

    /// Get plain text content of the note.
    pub fn plain_text(&self) -> String {
        self.content.iter().map(Inline::as_text).collect()
    }
}
