//! Single-pass assembly of labeled clusters into divisions.

use crate::model::{
    coords_of, AssemblyStats, Block, Division, EquationBlock, Entities, Heading, Inline, Label,
    LabeledCluster, ListBlock, MarkerKind, Note, NotePlace, Paragraph,
};
use crate::resolve::{CitationMatcher, MarkerResolver};
use crate::segment::{segment_sentences, SentenceDetector};
use crate::text::{normalize_dehyphenize, normalize_text, tokens_text};

use super::numbering::split_section_number;
use super::options::{AssemblyOptions, CoordElement};

/// Whether a paragraph cluster opens a new paragraph.
///
/// The current paragraph continues only when one is open and the previous
/// cluster was a callout or an embedded figure or table.
pub fn is_new_paragraph(last_label: Option<Label>, paragraph_open: bool) -> bool {
    let interrupted = last_label.is_some_and(|l| l.is_marker() || l.is_figure_or_table());
    !(interrupted && paragraph_open)
}

/// Whether text following a figure or table break continues the paragraph
/// it interrupted: an uppercase letter followed by a lowercase one.
pub fn continues_after_break(text: &str) -> bool {
    let mut chars = text.trim_start().chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_uppercase() && b.is_lowercase()
    )
}

/// Builds divisions from a cluster sequence.
pub struct BodyAssembler<'a> {
    entities: &'a Entities,
    options: &'a AssemblyOptions,
    resolver: MarkerResolver<'a>,
    detector: &'a dyn SentenceDetector,
}

/// Mutable state of one assembly pass.
#[derive(Default)]
struct PassState {
    divisions: Vec<Division>,
    /// Index of the open paragraph in the last division's blocks
    paragraph: Option<usize>,
    /// Index of the open list in the last division's blocks
    list: Option<usize>,
    last_label: Option<Label>,
    equation_cursor: usize,
    stats: AssemblyStats,
}

impl PassState {
    fn division(&mut self) -> &mut Division {
        if self.divisions.is_empty() {
            self.divisions.push(Division::new());
        }
        let last = self.divisions.len() - 1;
        &mut self.divisions[last]
    }

    fn push_block(&mut self, block: Block) -> usize {
        let division = self.division();
        division.add_block(block);
        division.blocks.len() - 1
    }

    fn paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        let index = self.paragraph?;
        match self.divisions.last_mut()?.blocks.get_mut(index) {
            Some(Block::Paragraph(p)) => Some(p),
            _ => None,
        }
    }

    fn list_mut(&mut self) -> Option<&mut ListBlock> {
        let index = self.list?;
        match self.divisions.last_mut()?.blocks.get_mut(index) {
            Some(Block::List(list)) => Some(list),
            _ => None,
        }
    }
}

impl<'a> BodyAssembler<'a> {
    /// Create a new assembler.
    pub fn new(
        entities: &'a Entities,
        options: &'a AssemblyOptions,
        matcher: &'a dyn CitationMatcher,
        detector: &'a dyn SentenceDetector,
    ) -> Self {
        Self {
            entities,
            options,
            resolver: MarkerResolver::new(entities, matcher, options),
            detector,
        }
    }

    /// Assemble clusters into non-empty divisions.
    pub fn assemble(&self, clusters: Vec<LabeledCluster>) -> (Vec<Division>, AssemblyStats) {
        let mut state = PassState::default();

        for cluster in clusters {
            if cluster.tokens.is_empty() {
                continue;
            }
            state.stats.count_label(cluster.label);

            match cluster.label {
                Label::Section => self.open_section(&mut state, &cluster),
                Label::Paragraph => self.add_paragraph_text(&mut state, &cluster),
                Label::Item => self.add_item(&mut state, &cluster),
                Label::Equation | Label::EquationLabel => self.add_equation(&mut state, &cluster),
                Label::Other => self.add_other(&mut state, &cluster),
                Label::Figure | Label::Table => {
                    if let Some(p) = state.paragraph_mut() {
                        p.push_text(" ");
                    }
                }
                Label::CitationMarker => self.add_marker(&mut state, MarkerKind::Citation, &cluster),
                Label::FigureMarker => self.add_marker(&mut state, MarkerKind::Figure, &cluster),
                Label::TableMarker => self.add_marker(&mut state, MarkerKind::Table, &cluster),
                Label::EquationMarker => self.add_marker(&mut state, MarkerKind::Equation, &cluster),
            }
            state.last_label = Some(cluster.label);
        }

        let mut divisions = state.divisions;
        let mut stats = state.stats;
        for division in &mut divisions {
            self.finish_division(division, &mut stats);
        }

        let before = divisions.len();
        divisions.retain(|d| !d.is_empty());
        if divisions.len() < before {
            log::debug!("Pruned {} empty divisions", before - divisions.len());
        }
        (divisions, stats)
    }

    fn open_section(&self, state: &mut PassState, cluster: &LabeledCluster) {
        let raw = normalize_dehyphenize(&cluster.tokens);
        let (text, number) = split_section_number(raw.trim());
        let mut heading = Heading::new(text, number);
        if self.options.coordinates_for(CoordElement::Head) {
            heading.coords = coords_of(&cluster.tokens);
        }
        state.divisions.push(Division::with_heading(heading));
        state.paragraph = None;
        state.list = None;
    }

    fn add_paragraph_text(&self, state: &mut PassState, cluster: &LabeledCluster) {
        let text = normalize_dehyphenize(&cluster.tokens);
        let after_break = state.last_label.is_some_and(|l| l.is_figure_or_table());

        let mut new_paragraph = is_new_paragraph(state.last_label, state.paragraph.is_some());
        if !new_paragraph && after_break && !continues_after_break(&text) {
            new_paragraph = true;
        }

        if new_paragraph {
            if let Some(p) = state.paragraph_mut() {
                p.trim_end();
            }
            let index = state.push_block(Block::Paragraph(Paragraph::new()));
            state.paragraph = Some(index);
        }

        if let Some(p) = state.paragraph_mut() {
            p.push_text(&text);
            p.extend_tokens(&cluster.tokens);
        }
    }

    fn add_item(&self, state: &mut PassState, cluster: &LabeledCluster) {
        let text = normalize_text(&tokens_text(&cluster.tokens)).trim().to_string();
        let continues = state
            .last_label
            .is_some_and(|l| l.is_marker() || l == Label::Item);

        if !continues || state.list.is_none() {
            let index = state.push_block(Block::List(ListBlock::new()));
            state.list = Some(index);
        }
        if let Some(list) = state.list_mut() {
            list.add_item(text);
        }
    }

    fn add_equation(&self, state: &mut PassState, cluster: &LabeledCluster) {
        let Some(start) = cluster.start() else {
            return;
        };
        let equations = &self.entities.equations;
        while state.equation_cursor < equations.len()
            && equations[state.equation_cursor].start < start
        {
            state.equation_cursor += 1;
        }

        match equations.get(state.equation_cursor) {
            Some(eq) if eq.start == start => {
                let text = if eq.text.is_empty() {
                    normalize_dehyphenize(&cluster.tokens).trim().to_string()
                } else {
                    eq.text.clone()
                };
                let coords = if self.options.coordinates_for(CoordElement::Formula) {
                    coords_of(&cluster.tokens)
                } else {
                    Vec::new()
                };
                state.push_block(Block::Equation(EquationBlock {
                    id: eq.id.clone(),
                    text,
                    label: eq.label.clone(),
                    coords,
                }));
            }
            _ => log::debug!("No equation starts at offset {}, skipping", start),
        }
    }

    fn add_other(&self, state: &mut PassState, cluster: &LabeledCluster) {
        let text = normalize_dehyphenize(&cluster.tokens).trim().to_string();
        if text.is_empty() {
            return;
        }
        let mut note = Note::with_text(NotePlace::Other, text);
        if self.options.coordinates_for(CoordElement::Note) {
            note.coords = coords_of(&cluster.tokens);
        }
        state.push_block(Block::Note(note));
    }

    fn add_marker(&self, state: &mut PassState, kind: MarkerKind, cluster: &LabeledCluster) {
        let nodes = self.resolver.resolve(kind, &cluster.tokens);
        state.stats.count_markers(&nodes);

        match state.paragraph_mut() {
            Some(p) => {
                p.push_text(" ");
                for node in nodes {
                    p.push_inline(node);
                }
                p.extend_tokens(&cluster.tokens);
            }
            None => {
                for node in nodes {
                    if node.as_text().trim().is_empty() {
                        continue;
                    }
                    let node = match node {
                        Inline::Text(run) => Inline::text(run.text.trim()),
                        marker => marker,
                    };
                    state.push_block(Block::Inline(node));
                }
            }
        }
    }

    fn finish_division(&self, division: &mut Division, stats: &mut AssemblyStats) {
        for block in &mut division.blocks {
            if let Block::Paragraph(p) = block {
                p.trim_end();
            }
        }
        division
            .blocks
            .retain(|b| !matches!(b, Block::Paragraph(p) if p.is_empty()));

        if !self.options.sentence_segmentation {
            return;
        }
        for block in &mut division.blocks {
            if let Block::Paragraph(p) = block {
                if let Err(e) = segment_sentences(p, self.detector, self.options) {
                    log::warn!("Sentence segmentation failed, keeping paragraph whole: {}", e);
                    stats.segmentation_failures += 1;
                }
            }
        }
    }
}
