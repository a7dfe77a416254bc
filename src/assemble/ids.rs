//! Per-document node identifiers.

use crate::model::{Block, Division, DocumentTree, Note, ParagraphBody};

/// Sequential `xml:id` generator, one per document.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Create a generator starting at `_1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier.
    pub fn next_id(&mut self) -> String {
        self.next += 1;
        format!("_{}", self.next)
    }
}

/// Assign identifiers to divisions, headings, paragraphs, sentences and
/// notes, in document order.
pub fn assign_ids(tree: &mut DocumentTree) {
    let mut ids = IdGenerator::new();
    for division in tree
        .divisions
        .iter_mut()
        .chain(tree.acknowledgement.iter_mut())
        .chain(tree.annex.iter_mut())
    {
        assign_division(division, &mut ids);
    }
    for note in &mut tree.notes {
        assign_note(note, &mut ids);
    }
}

fn assign_division(division: &mut Division, ids: &mut IdGenerator) {
    division.id = Some(ids.next_id());
    if let Some(heading) = division.heading.as_mut() {
        heading.id = Some(ids.next_id());
    }
    for block in &mut division.blocks {
        match block {
            Block::Paragraph(p) => {
                p.id = Some(ids.next_id());
                if let ParagraphBody::Sentences(sentences) = &mut p.body {
                    for sentence in sentences {
                        sentence.id = Some(ids.next_id());
                    }
                }
            }
            Block::Note(note) => assign_note(note, ids),
            Block::List(_) | Block::Equation(_) | Block::Inline(_) => {}
        }
    }
}

fn assign_note(note: &mut Note, ids: &mut IdGenerator) {
    note.id = Some(ids.next_id());
}
