//! Grouping of labeled tokens into clusters.

use crate::error::{Error, Result};
use crate::model::{LabeledCluster, TaggedLabel, Token};

/// Group tokens into maximal runs sharing one label.
///
/// A run also ends where the labeler flagged a token as the beginning of a
/// new cluster (`I-` prefix), so two adjacent paragraphs stay apart.
pub fn build_clusters(tokens: Vec<Token>, labels: &[TaggedLabel]) -> Result<Vec<LabeledCluster>> {
    if tokens.len() != labels.len() {
        return Err(Error::LabelCountMismatch {
            tokens: tokens.len(),
            labels: labels.len(),
        });
    }

    let mut clusters: Vec<LabeledCluster> = Vec::new();
    let mut last_offset = 0;
    for (token, tagged) in tokens.into_iter().zip(labels) {
        if token.offset < last_offset {
            log::warn!(
                "Token offset {} goes backwards (previous {}), keeping stream order",
                token.offset,
                last_offset
            );
        }
        last_offset = token.offset;

        match clusters.last_mut() {
            Some(current) if current.label == tagged.label && !tagged.begin => {
                current.tokens.push(token);
            }
            _ => clusters.push(LabeledCluster::new(tagged.label, vec![token])),
        }
    }

    log::debug!("Built {} clusters", clusters.len());
    Ok(clusters)
}

/// Parse labeler output tags such as `I-<paragraph>` or `<paragraph>`.
pub fn parse_labels<S: AsRef<str>>(tags: &[S]) -> Result<Vec<TaggedLabel>> {
    tags.iter().map(|t| t.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;

    fn tokens(words: &[&str]) -> Vec<Token> {
        let mut offset = 0;
        words
            .iter()
            .map(|w| {
                let t = Token::new(*w, offset);
                offset += w.len();
                t
            })
            .collect()
    }

    #[test]
    fn test_maximal_runs() {
        let labels = parse_labels(&[
            "I-<paragraph>",
            "<paragraph>",
            "I-<citation_marker>",
            "<paragraph>",
        ])
        .unwrap();
        let clusters = build_clusters(tokens(&["See", " ", "[1]", "."]), &labels).unwrap();

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].label, Label::Paragraph);
        assert_eq!(clusters[0].text(), "See ");
        assert_eq!(clusters[1].label, Label::CitationMarker);
        assert_eq!(clusters[2].start(), Some(7));
    }

    #[test]
    fn test_begin_flag_splits_same_label() {
        let labels = parse_labels(&["I-<paragraph>", "I-<paragraph>"]).unwrap();
        let clusters = build_clusters(tokens(&["One.", "Two."]), &labels).unwrap();
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let clusters = build_clusters(Vec::new(), &[]).unwrap();
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_mismatched_lengths() {
        let labels = parse_labels(&["<paragraph>"]).unwrap();
        let result = build_clusters(tokens(&["a", "b"]), &labels);
        assert!(matches!(
            result,
            Err(Error::LabelCountMismatch {
                tokens: 2,
                labels: 1
            })
        ));
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let result = parse_labels(&["<paragraph>", "<title>"]);
        assert!(matches!(result, Err(Error::UnknownLabel(_))));
    }
}
