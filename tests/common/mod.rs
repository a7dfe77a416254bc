//! Shared helpers for integration tests.

#![allow(dead_code)]

use teibody::{Label, LabeledCluster, LabeledSection, TaggedLabel, Token};

/// Split text into word and whitespace tokens starting at `offset`.
pub fn tokenize(text: &str, offset: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|s| s != space) {
            tokens.push(Token::new(&text[start..i], offset + start));
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(Token::new(&text[start..], offset + start));
    }
    tokens
}

/// Build clusters from (label, text) parts laid out one after another.
pub fn clusters(parts: &[(Label, &str)]) -> Vec<LabeledCluster> {
    let mut offset = 0;
    parts
        .iter()
        .map(|(label, text)| {
            let tokens = tokenize(text, offset);
            offset += text.len();
            LabeledCluster::new(*label, tokens)
        })
        .collect()
}

/// Build a labeled section from (label, text) parts, each part one cluster.
pub fn section(parts: &[(Label, &str)]) -> LabeledSection {
    let mut tokens = Vec::new();
    let mut labels = Vec::new();
    for cluster in clusters(parts) {
        for (i, token) in cluster.tokens.into_iter().enumerate() {
            labels.push(if i == 0 {
                TaggedLabel::begin(cluster.label)
            } else {
                TaggedLabel::inside(cluster.label)
            });
            tokens.push(token);
        }
    }
    LabeledSection::new(tokens, labels)
}
