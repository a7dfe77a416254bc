//! Sentence segmentation of assembled paragraphs.
//!
//! Segmentation replaces a paragraph's inline content with sentences.
//! Reference markers are never split: the detector receives their spans
//! as forbidden zones, and each marker is moved whole into the sentence
//! covering it.

mod detector;

pub use detector::PunctuationSentenceDetector;

use crate::assemble::{AssemblyOptions, CoordElement};
use crate::error::Result;
use crate::model::{coords_of, Inline, Paragraph, ParagraphBody, ReferenceMarker, Sentence, Span, Token};
use crate::text::{dehyphenize_tokens, is_skippable_token, strip_invalid_xml_chars};

/// Finds sentence boundaries in paragraph text.
pub trait SentenceDetector: Send + Sync {
    /// Return sentence spans (byte offsets into `text`) in order.
    ///
    /// No returned boundary may fall strictly inside a forbidden span.
    fn detect(
        &self,
        text: &str,
        forbidden: &[Span],
        tokens: &[Token],
        language: Option<&str>,
    ) -> Result<Vec<Span>>;
}

/// Split a paragraph into sentences.
///
/// Does nothing for empty or already segmented paragraphs. When the
/// detector fails, the error is returned and the paragraph is left as is.
pub fn segment_sentences(
    paragraph: &mut Paragraph,
    detector: &dyn SentenceDetector,
    options: &AssemblyOptions,
) -> Result<()> {
    if paragraph.is_segmented() {
        return Ok(());
    }
    let text = paragraph.plain_text();
    if text.is_empty() {
        return Ok(());
    }

    let forbidden = paragraph.marker_spans();
    let detected = detector.detect(
        &text,
        &forbidden,
        &paragraph.tokens,
        options.language.as_deref(),
    )?;
    let spans = sanitize_spans(detected, &text);
    if spans.is_empty() {
        log::debug!("No sentence found in paragraph of {} bytes", text.len());
    }

    let content = std::mem::replace(&mut paragraph.body, ParagraphBody::Sentences(Vec::new()));
    let ParagraphBody::Inline(content) = content else {
        return Ok(());
    };

    let mut groups: Vec<(Span, Vec<(Span, ReferenceMarker)>)> =
        spans.into_iter().map(|s| (s, Vec::new())).collect();
    for (span, marker) in take_markers(content) {
        match groups.iter().position(|(s, _)| span.start <= s.end) {
            Some(i) => groups[i].1.push((span, marker)),
            None => match groups.last_mut() {
                Some(last) => last.1.push((span, marker)),
                None => log::debug!("Dropping marker '{}' from empty paragraph", marker.text),
            },
        }
    }
    widen_to_markers(&mut groups);

    let token_groups = if options.coordinates_for(CoordElement::Sentence) {
        let spans: Vec<Span> = groups.iter().map(|(s, _)| *s).collect();
        partition_tokens(&text, &spans, &dehyphenize_tokens(&paragraph.tokens))
    } else {
        Vec::new()
    };

    let sentences = groups
        .into_iter()
        .enumerate()
        .map(|(i, (span, markers))| {
            let mut sentence = build_sentence(&text, span, markers);
            if let Some(tokens) = token_groups.get(i) {
                sentence.coords = coords_of(tokens);
            }
            sentence
        })
        .collect();

    paragraph.body = ParagraphBody::Sentences(sentences);
    Ok(())
}

/// Clamp spans to char boundaries of the text and drop overlaps.
fn sanitize_spans(spans: Vec<Span>, text: &str) -> Vec<Span> {
    let mut result: Vec<Span> = Vec::with_capacity(spans.len());
    let mut last_end = 0;
    for span in spans {
        let start = floor_boundary(text, span.start.max(last_end));
        let start = start.max(last_end);
        let end = floor_boundary(text, span.end);
        if start >= end {
            log::warn!("Ignoring invalid sentence span {}..{}", span.start, span.end);
            continue;
        }
        result.push(Span::new(start, end));
        last_end = end;
    }
    result
}

fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Move markers out of the inline content, with their byte spans.
fn take_markers(content: Vec<Inline>) -> Vec<(Span, ReferenceMarker)> {
    let mut markers = Vec::new();
    let mut pos = 0;
    for inline in content {
        let len = inline.as_text().len();
        if let Inline::Ref(marker) = inline {
            markers.push((Span::new(pos, pos + len), marker));
        }
        pos += len;
    }
    markers
}

/// Grow each sentence over the markers it owns, keeping sentences disjoint.
fn widen_to_markers(groups: &mut [(Span, Vec<(Span, ReferenceMarker)>)]) {
    for (span, markers) in groups.iter_mut() {
        if let (Some((first, _)), Some((last, _))) = (markers.first(), markers.last()) {
            span.start = span.start.min(first.start);
            span.end = span.end.max(last.end);
        }
    }
    for i in 1..groups.len() {
        let prev_end = groups[i - 1].0.end;
        let span = &mut groups[i].0;
        if span.start < prev_end {
            span.start = prev_end;
            span.end = span.end.max(prev_end);
        }
    }
}

fn build_sentence(text: &str, span: Span, markers: Vec<(Span, ReferenceMarker)>) -> Sentence {
    let mut sentence = Sentence::new(span);
    let mut cursor = span.start;
    for (marker_span, marker) in markers {
        if marker_span.start > cursor {
            push_text(&mut sentence, &text[cursor..marker_span.start]);
        }
        sentence.content.push(Inline::Ref(marker));
        cursor = marker_span.end;
    }
    if cursor < span.end {
        push_text(&mut sentence, &text[cursor..span.end]);
    }
    sentence
}

fn push_text(sentence: &mut Sentence, text: &str) {
    let text = strip_invalid_xml_chars(text);
    if !text.is_empty() {
        sentence.content.push(Inline::text(text));
    }
}

/// Distribute paragraph tokens over sentences by locating each token in
/// the sentence text. Tokens that cannot be located open the next sentence.
fn partition_tokens(text: &str, spans: &[Span], tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut groups = Vec::new();
    let Some(first) = spans.first() else {
        return groups;
    };

    let mut index = 0;
    let mut chunk = &text[first.start..first.end];
    let mut pos = 0;
    let mut current: Vec<Token> = Vec::new();

    for token in tokens {
        if token.text.is_empty() {
            continue;
        }
        let skippable = is_skippable_token(&token.text);
        // "infor-" as one token appears as "infor" in the joined text
        let needle = token
            .text
            .strip_suffix('-')
            .filter(|t| !t.is_empty())
            .unwrap_or(token.text.as_str());
        let found = chunk
            .get(pos..)
            .and_then(|rest| rest.find(needle))
            .map(|p| p + pos);

        if skippable || found.is_some() {
            current.push(token.clone());
            if let (false, Some(p)) = (skippable, found) {
                pos = p;
            }
            continue;
        }

        if !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            index += 1;
            let Some(next) = spans.get(index) else {
                break;
            };
            chunk = &text[next.start..next.end];
        }
        current.push(token.clone());
        pos = 0;
    }

    if !current.is_empty() && index < spans.len() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{BoundingBox, MarkerKind};

    struct FailingDetector;

    impl SentenceDetector for FailingDetector {
        fn detect(&self, _: &str, _: &[Span], _: &[Token], _: Option<&str>) -> Result<Vec<Span>> {
            Err(Error::SentenceDetection("model unavailable".to_string()))
        }
    }

    struct FixedDetector(Vec<Span>);

    impl SentenceDetector for FixedDetector {
        fn detect(&self, _: &str, _: &[Span], _: &[Token], _: Option<&str>) -> Result<Vec<Span>> {
            Ok(self.0.clone())
        }
    }

    fn paragraph_with_marker() -> Paragraph {
        let mut p = Paragraph::with_text("Results agree ");
        p.push_inline(Inline::Ref(
            ReferenceMarker::new(MarkerKind::Citation, "[1]").with_target(Some("0".into())),
        ));
        p.push_text(". Later work differs.");
        p
    }

    #[test]
    fn test_markers_stay_whole() {
        let mut p = paragraph_with_marker();
        let detector = PunctuationSentenceDetector::new();
        segment_sentences(&mut p, &detector, &AssemblyOptions::default()).unwrap();

        let sentences = p.sentences().unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].plain_text(), "Results agree [1].");
        assert_eq!(sentences[0].content.len(), 3);
        assert_eq!(sentences[0].content[1].marker().unwrap().text, "[1]");
        assert_eq!(sentences[1].plain_text(), "Later work differs.");
    }

    #[test]
    fn test_marker_outside_every_span_goes_last() {
        let mut p = paragraph_with_marker();
        let detector = FixedDetector(vec![Span::new(0, 7)]);
        segment_sentences(&mut p, &detector, &AssemblyOptions::default()).unwrap();

        let sentences = p.sentences().unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(p.markers().len(), 1);
        assert!(sentences[0].span.contains(&Span::new(14, 17)));
    }

    #[test]
    fn test_detector_failure_leaves_paragraph() {
        let mut p = paragraph_with_marker();
        let before = p.clone();
        let result = segment_sentences(&mut p, &FailingDetector, &AssemblyOptions::default());
        assert!(result.is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_zero_sentences() {
        let mut p = Paragraph::with_text("...");
        segment_sentences(&mut p, &PunctuationSentenceDetector::new(), &AssemblyOptions::default())
            .unwrap();
        assert_eq!(p.sentences().map(|s| s.len()), Some(0));
    }

    #[test]
    fn test_invalid_spans_are_clamped() {
        let mut p = Paragraph::with_text("Short text.");
        let detector = FixedDetector(vec![Span::new(0, 5), Span::new(3, 400), Span::new(500, 600)]);
        segment_sentences(&mut p, &detector, &AssemblyOptions::default()).unwrap();
        let spans: Vec<Span> = p.sentences().unwrap().iter().map(|s| s.span).collect();
        assert_eq!(spans, vec![Span::new(0, 5), Span::new(5, 11)]);
    }

    #[test]
    fn test_sentence_coordinates() {
        let bbox = |y: f64| BoundingBox::new(1, 10.0, y, 20.0, 8.0);
        let words = [("One", 10.0), (" ", 10.0), ("two.", 10.0), (" ", 10.0), ("Three", 30.0), (" ", 30.0), ("four.", 30.0)];
        let mut offset = 0;
        let tokens: Vec<Token> = words
            .iter()
            .map(|(w, y)| {
                let t = Token::new(*w, offset).with_bbox(bbox(*y));
                offset += w.len();
                t
            })
            .collect();

        let mut p = Paragraph::with_text("One two. Three four.");
        p.extend_tokens(&tokens);
        let options = AssemblyOptions::default().with_coordinates(&[CoordElement::Sentence]);
        segment_sentences(&mut p, &PunctuationSentenceDetector::new(), &options).unwrap();

        let sentences = p.sentences().unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].coords.len(), 1);
        assert_eq!(sentences[0].coords[0].y, 10.0);
        assert_eq!(sentences[1].coords[0].y, 30.0);
    }

    fn line_tokens(words: &[(&str, f64)]) -> Vec<Token> {
        let mut offset = 0;
        words
            .iter()
            .map(|(w, y)| {
                let t = Token::new(*w, offset).with_bbox(BoundingBox::new(1, 10.0, *y, 20.0, 8.0));
                offset += w.len();
                t
            })
            .collect()
    }

    fn hyphenated_coords(tokens: &[Token]) -> Vec<Vec<f64>> {
        let mut p = Paragraph::with_text("We use information here. Next one.");
        p.extend_tokens(tokens);
        let options = AssemblyOptions::default().with_coordinates(&[CoordElement::Sentence]);
        segment_sentences(&mut p, &PunctuationSentenceDetector::new(), &options).unwrap();
        p.sentences()
            .unwrap()
            .iter()
            .map(|s| s.coords.iter().map(|b| b.y).collect())
            .collect()
    }

    #[test]
    fn test_sentence_coordinates_across_line_hyphen() {
        let split = line_tokens(&[
            ("We", 10.0), (" ", 10.0), ("use", 10.0), (" ", 10.0), ("infor", 10.0), ("-", 10.0),
            ("\n", 10.0), ("mation", 30.0), (" ", 30.0), ("here.", 30.0), (" ", 30.0),
            ("Next", 50.0), (" ", 50.0), ("one.", 50.0),
        ]);
        assert_eq!(hyphenated_coords(&split), vec![vec![10.0, 30.0], vec![50.0]]);

        let joined = line_tokens(&[
            ("We", 10.0), (" ", 10.0), ("use", 10.0), (" ", 10.0), ("infor-", 10.0),
            ("\n", 10.0), ("mation", 30.0), (" ", 30.0), ("here.", 30.0), (" ", 30.0),
            ("Next", 50.0), (" ", 50.0), ("one.", 50.0),
        ]);
        assert_eq!(hyphenated_coords(&joined), vec![vec![10.0, 30.0], vec![50.0]]);
    }
}
