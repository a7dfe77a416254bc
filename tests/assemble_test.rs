//! Integration tests for body assembly.

mod common;

use common::clusters;
use teibody::{
    assemble_body, AssemblyOptions, BibEntry, Block, Entities, Equation, Label, MarkerKind,
    NotePlace,
};

fn flat() -> AssemblyOptions {
    AssemblyOptions::default().without_sentences()
}

#[test]
fn test_empty_divisions_are_pruned() {
    let tree = assemble_body(
        clusters(&[
            (Label::Section, "1 Introduction"),
            (Label::Section, "2. Methods"),
            (Label::Paragraph, "We measured the samples."),
            (Label::Section, "3 Empty"),
        ]),
        &Entities::new(),
        &flat(),
    );

    assert_eq!(tree.divisions.len(), 1);
    let heading = tree.divisions[0].heading.as_ref().unwrap();
    assert_eq!(heading.text, "Methods");
    assert_eq!(heading.number.as_deref(), Some("2."));
    assert!(tree.divisions.iter().all(|d| !d.blocks.is_empty()));
}

#[test]
fn test_heading_only_document_is_empty() {
    let tree = assemble_body(
        clusters(&[(Label::Section, "Abstract")]),
        &Entities::new(),
        &flat(),
    );
    assert!(tree.is_empty());
}

#[test]
fn test_text_before_first_heading() {
    let tree = assemble_body(
        clusters(&[
            (Label::Paragraph, "Preamble text."),
            (Label::Section, "1 Start"),
            (Label::Paragraph, "Body."),
        ]),
        &Entities::new(),
        &flat(),
    );
    assert_eq!(tree.divisions.len(), 2);
    assert!(tree.divisions[0].heading.is_none());
}

#[test]
fn test_list_survives_marker_between_items() {
    let tree = assemble_body(
        clusters(&[
            (Label::Item, "• first item "),
            (Label::CitationMarker, "[1]"),
            (Label::Item, " • second item"),
        ]),
        &Entities::new(),
        &flat(),
    );

    let lists: Vec<_> = tree.divisions[0]
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::List(list) => Some(list),
            _ => None,
        })
        .collect();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].items, vec!["• first item", "• second item"]);
}

#[test]
fn test_list_reopens_after_unrelated_content() {
    let tree = assemble_body(
        clusters(&[
            (Label::Item, "one "),
            (Label::Paragraph, "Some text. "),
            (Label::Item, "two"),
        ]),
        &Entities::new(),
        &flat(),
    );
    let lists = tree.divisions[0].blocks.iter().filter(|b| b.is_list()).count();
    assert_eq!(lists, 2);
}

#[test]
fn test_paragraph_reconnects_across_figure() {
    let tree = assemble_body(
        clusters(&[
            (Label::Paragraph, "The cat"),
            (Label::Figure, "Figure 1: A cat on a mat."),
            (Label::Paragraph, "Sat."),
        ]),
        &Entities::new(),
        &flat(),
    );

    let paragraphs: Vec<_> = tree.paragraphs().collect();
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].plain_text(), "The cat Sat.");
}

#[test]
fn test_paragraph_split_when_heuristic_fails() {
    let tree = assemble_body(
        clusters(&[
            (Label::Paragraph, "The cat"),
            (Label::Table, "Table 1: Cats."),
            (Label::Paragraph, "THE dog barked."),
        ]),
        &Entities::new(),
        &flat(),
    );

    let texts: Vec<_> = tree.paragraphs().map(|p| p.plain_text()).collect();
    assert_eq!(texts, vec!["The cat", "THE dog barked."]);
}

#[test]
fn test_markers_continue_paragraph() {
    let entities = Entities {
        bibliography: vec![BibEntry::new("0", "1")],
        ..Entities::new()
    };
    let tree = assemble_body(
        clusters(&[
            (Label::Paragraph, "As reported "),
            (Label::CitationMarker, "[1]"),
            (Label::Paragraph, ", the effect holds."),
        ]),
        &entities,
        &flat(),
    );

    let paragraphs: Vec<_> = tree.paragraphs().collect();
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].plain_text(), "As reported [1], the effect holds.");
    let markers = paragraphs[0].markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].kind, MarkerKind::Citation);
    assert_eq!(markers[0].target.as_deref(), Some("0"));
    assert_eq!(tree.stats.resolved_markers, 1);
}

#[test]
fn test_marker_outside_paragraph_goes_to_division() {
    let tree = assemble_body(
        clusters(&[
            (Label::Section, "1 Results"),
            (Label::FigureMarker, "Fig. 4 "),
            (Label::Paragraph, "Then text."),
        ]),
        &Entities::new(),
        &flat(),
    );

    let blocks = &tree.divisions[0].blocks;
    assert_eq!(blocks.len(), 2);
    match &blocks[0] {
        Block::Inline(inline) => {
            let marker = inline.marker().unwrap();
            assert_eq!(marker.text, "Fig. 4");
            assert!(!marker.is_resolved());
        }
        other => panic!("expected inline marker, got {:?}", other),
    }
    assert!(blocks[1].is_paragraph());
}

#[test]
fn test_equations_matched_by_offset() {
    let entities = Entities {
        equations: vec![
            Equation::new("0", "(1)", 13).with_text("E = mc^2"),
            Equation::new("1", "(2)", 40),
        ],
        ..Entities::new()
    };
    let tree = assemble_body(
        clusters(&[
            (Label::Paragraph, "Text before. "),
            (Label::Equation, "E = mc^2"),
            (Label::Paragraph, "More text. "),
            (Label::Equation, "x = y"),
        ]),
        &entities,
        &flat(),
    );

    let blocks = &tree.divisions[0].blocks;
    let equations: Vec<_> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Equation(eq) => Some(eq),
            _ => None,
        })
        .collect();
    assert_eq!(equations.len(), 1);
    assert_eq!(equations[0].id, "0");
    assert_eq!(equations[0].text, "E = mc^2");
    assert_eq!(tree.paragraphs().count(), 2);
}

#[test]
fn test_other_becomes_note_block() {
    let tree = assemble_body(
        clusters(&[
            (Label::Paragraph, "Body text "),
            (Label::Other, "Received 3 May"),
            (Label::CitationMarker, "[2]"),
        ]),
        &Entities::new(),
        &flat(),
    );

    let blocks = &tree.divisions[0].blocks;
    match &blocks[1] {
        Block::Note(note) => {
            assert_eq!(note.place, NotePlace::Other);
            assert_eq!(note.plain_text(), "Received 3 May");
        }
        other => panic!("expected note, got {:?}", other),
    }
    // OTHER leaves the paragraph open
    match &blocks[0] {
        Block::Paragraph(p) => assert_eq!(p.plain_text(), "Body text [2]"),
        other => panic!("expected paragraph, got {:?}", other),
    }
}

#[test]
fn test_sentences_and_ids() {
    let tree = assemble_body(
        clusters(&[
            (Label::Section, "1 Intro"),
            (Label::Paragraph, "First claim "),
            (Label::CitationMarker, "[1]"),
            (Label::Paragraph, ". Second claim."),
        ]),
        &Entities::new(),
        &AssemblyOptions::default().with_ids(true),
    );

    let paragraph = tree.paragraphs().next().unwrap();
    let sentences = paragraph.sentences().unwrap();
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0].plain_text(), "First claim [1].");
    assert_eq!(sentences[1].plain_text(), "Second claim.");
    assert!(sentences[0].content.iter().any(|i| i.is_marker()));

    assert_eq!(tree.divisions[0].id.as_deref(), Some("_1"));
    assert_eq!(paragraph.id.as_deref(), Some("_3"));
    assert_eq!(sentences[1].id.as_deref(), Some("_5"));
}

#[test]
fn test_label_statistics() {
    let tree = assemble_body(
        clusters(&[
            (Label::Paragraph, "One "),
            (Label::CitationMarker, "[1]"),
            (Label::Paragraph, " two "),
            (Label::CitationMarker, "[2]"),
        ]),
        &Entities::new(),
        &flat(),
    );
    assert_eq!(tree.stats.label_counts[&Label::Paragraph], 2);
    assert_eq!(tree.stats.label_counts[&Label::CitationMarker], 2);
    assert_eq!(tree.stats.unresolved_markers, 2);
}
