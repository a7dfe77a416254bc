//! Integration tests for sentence segmentation.

mod common;

use common::{clusters, section};
use teibody::{
    assemble_body, AssemblyOptions, DocumentInput, Entities, Error, Label, PunctuationSentenceDetector,
    Result, SentenceDetector, Span, TeiBody, Token,
};

/// Returns the same spans for every paragraph.
struct FixedDetector(Vec<Span>);

impl SentenceDetector for FixedDetector {
    fn detect(&self, _: &str, _: &[Span], _: &[Token], _: Option<&str>) -> Result<Vec<Span>> {
        Ok(self.0.clone())
    }
}

struct FailingDetector;

impl SentenceDetector for FailingDetector {
    fn detect(&self, _: &str, _: &[Span], _: &[Token], _: Option<&str>) -> Result<Vec<Span>> {
        Err(Error::SentenceDetection("model not loaded".to_string()))
    }
}

fn marker_paragraph() -> DocumentInput {
    DocumentInput::new(section(&[
        (Label::Paragraph, "See "),
        (Label::CitationMarker, "[12]"),
        (Label::Paragraph, " here."),
    ]))
}

#[test]
fn test_punctuation_only_paragraph_has_no_sentence() {
    let tree = assemble_body(
        clusters(&[(Label::Paragraph, "...")]),
        &Entities::new(),
        &AssemblyOptions::default(),
    );
    let paragraph = tree.paragraphs().next().unwrap();
    assert!(paragraph.sentences().unwrap().is_empty());
}

#[test]
fn test_split_inside_marker_keeps_marker_whole() {
    // Second span starts inside "[12]" (bytes 4..8)
    let detector = FixedDetector(vec![Span::new(0, 6), Span::new(6, 14)]);
    let tree = TeiBody::new()
        .with_detector(detector)
        .process(&marker_paragraph())
        .unwrap();

    let paragraph = tree.paragraphs().next().unwrap();
    let sentences = paragraph.sentences().unwrap();
    let holders: Vec<_> = sentences
        .iter()
        .filter(|s| s.content.iter().any(|i| i.is_marker()))
        .collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].plain_text(), "See [12]");
    assert_eq!(holders[0].span, Span::new(0, 8));
    assert_eq!(sentences[1].span, Span::new(8, 14));
}

#[test]
fn test_failing_detector_keeps_paragraph() {
    let tree = TeiBody::new()
        .with_detector(FailingDetector)
        .process(&marker_paragraph())
        .unwrap();

    let paragraph = tree.paragraphs().next().unwrap();
    assert!(!paragraph.is_segmented());
    assert_eq!(paragraph.plain_text(), "See [12] here.");
    assert_eq!(paragraph.markers().len(), 1);
    assert_eq!(tree.stats.segmentation_failures, 1);
}

#[test]
fn test_segmentation_disabled() {
    let tree = TeiBody::new()
        .without_sentences()
        .with_detector(FailingDetector)
        .process(&marker_paragraph())
        .unwrap();
    assert_eq!(tree.stats.segmentation_failures, 0);
    assert!(tree.paragraphs().all(|p| !p.is_segmented()));
}

#[test]
fn test_abbreviations_do_not_split() {
    let text = "As shown in Fig. 2 the rate grows. It then falls.";
    let spans = PunctuationSentenceDetector::new()
        .detect(text, &[], &[], None)
        .unwrap();
    let sentences: Vec<_> = spans.iter().map(|s| &text[s.start..s.end]).collect();
    assert_eq!(sentences, vec!["As shown in Fig. 2 the rate grows.", "It then falls."]);
}

#[test]
fn test_no_boundary_inside_forbidden_span() {
    let text = "Results agree [Smith 2010. In press] with theory.";
    let start = text.find('[').unwrap();
    let end = text.find(']').unwrap() + 1;
    let spans = PunctuationSentenceDetector::new()
        .detect(text, &[Span::new(start, end)], &[], None)
        .unwrap();
    assert_eq!(spans, vec![Span::new(0, text.len())]);
}
