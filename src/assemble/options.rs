//! Assembly options and configuration.

use crate::model::CitationStyle;

/// Elements that can carry `coords` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordElement {
    /// Section headings
    Head,
    /// Reference callouts
    Ref,
    /// Sentences
    Sentence,
    /// Notes
    Note,
    /// Display equations
    Formula,
}

impl CoordElement {
    /// All coordinate-bearing elements.
    pub const ALL: [CoordElement; 5] = [
        CoordElement::Head,
        CoordElement::Ref,
        CoordElement::Sentence,
        CoordElement::Note,
        CoordElement::Formula,
    ];

    /// Parse a TEI element name ("head", "ref", "s", "note", "formula").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "head" => Some(CoordElement::Head),
            "ref" => Some(CoordElement::Ref),
            "s" => Some(CoordElement::Sentence),
            "note" => Some(CoordElement::Note),
            "formula" => Some(CoordElement::Formula),
            _ => None,
        }
    }
}

/// Options for assembling document bodies.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Emit unresolved citation callouts as markers instead of plain text
    pub keep_unsolved_callout: bool,

    /// Split paragraphs into sentences
    pub sentence_segmentation: bool,

    /// Elements that get coordinates
    pub coordinates: Vec<CoordElement>,

    /// Assign `xml:id` identifiers to structural nodes
    pub generate_ids: bool,

    /// Document-wide citation callout style, if known
    pub citation_style: Option<CitationStyle>,

    /// Language hint for the sentence detector
    pub language: Option<String>,

    /// Process document batches in parallel
    pub parallel: bool,
}

impl AssemblyOptions {
    /// Create new assembly options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep or drop unresolved citation callouts as markers.
    pub fn with_keep_unsolved_callout(mut self, keep: bool) -> Self {
        self.keep_unsolved_callout = keep;
        self
    }

    /// Enable or disable sentence segmentation.
    pub fn with_sentence_segmentation(mut self, enabled: bool) -> Self {
        self.sentence_segmentation = enabled;
        self
    }

    /// Disable sentence segmentation.
    pub fn without_sentences(mut self) -> Self {
        self.sentence_segmentation = false;
        self
    }

    /// Set the elements that get coordinates.
    pub fn with_coordinates(mut self, elements: &[CoordElement]) -> Self {
        self.coordinates = elements.to_vec();
        self
    }

    /// Generate coordinates for every element that supports them.
    pub fn with_all_coordinates(mut self) -> Self {
        self.coordinates = CoordElement::ALL.to_vec();
        self
    }

    /// Enable `xml:id` generation.
    pub fn with_ids(mut self, generate: bool) -> Self {
        self.generate_ids = generate;
        self
    }

    /// Set the document-wide citation style.
    pub fn with_citation_style(mut self, style: CitationStyle) -> Self {
        self.citation_style = Some(style);
        self
    }

    /// Set the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check if coordinates are requested for an element.
    pub fn coordinates_for(&self, element: CoordElement) -> bool {
        self.coordinates.contains(&element)
    }
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            keep_unsolved_callout: true,
            sentence_segmentation: true,
            coordinates: Vec::new(),
            generate_ids: false,
            citation_style: None,
            language: None,
            parallel: true,
        }
    }
}
