//! Document model types.

mod document;
mod entities;
mod note;
mod paragraph;
mod token;

pub use document::{AssemblyStats, Block, Division, DocumentTree, EquationBlock, Heading, ListBlock};
pub use entities::{BibEntry, Entities, Equation, LabeledEntity};
pub use note::{Note, NotePlace};
pub use paragraph::{Inline, Paragraph, ParagraphBody, ReferenceMarker, Sentence, TextRun};
pub use token::{
    coords_of, coords_string, BoundingBox, CitationStyle, Label, LabeledCluster, MarkerKind, Span,
    TaggedLabel, Token,
};
