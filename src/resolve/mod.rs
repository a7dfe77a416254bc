//! Reference callout resolution.
//!
//! Turns a marker cluster into inline nodes: a reference marker pointing
//! at a figure, table, equation or bibliography entry, or plain text when
//! the callout should not be kept as a marker.

mod citation;
mod equation;
mod figure;

pub use citation::{resolve_citation, CitationMatch, CitationMatcher, NumericCitationMatcher};
pub use equation::find_equation;
pub use figure::find_labeled;

use crate::assemble::{AssemblyOptions, CoordElement};
use crate::model::{coords_of, Entities, Inline, MarkerKind, ReferenceMarker, Token};
use crate::text::{dehyphenize_tokens, normalize_text, tokens_text};

/// Resolves marker clusters against the entity tables of one document.
pub struct MarkerResolver<'a> {
    entities: &'a Entities,
    matcher: &'a dyn CitationMatcher,
    options: &'a AssemblyOptions,
}

impl<'a> MarkerResolver<'a> {
    /// Create a new resolver.
    pub fn new(
        entities: &'a Entities,
        matcher: &'a dyn CitationMatcher,
        options: &'a AssemblyOptions,
    ) -> Self {
        Self {
            entities,
            matcher,
            options,
        }
    }

    /// Resolve one marker cluster.
    pub fn resolve(&self, kind: MarkerKind, tokens: &[Token]) -> Vec<Inline> {
        let tokens = dehyphenize_tokens(tokens);
        let with_coords = self.options.coordinates_for(CoordElement::Ref);

        match kind {
            MarkerKind::Citation => resolve_citation(
                &tokens,
                self.matcher,
                self.options.citation_style,
                self.options.keep_unsolved_callout,
                with_coords,
            ),
            MarkerKind::Figure | MarkerKind::Table => {
                let entities = if kind == MarkerKind::Figure {
                    &self.entities.figures
                } else {
                    &self.entities.tables
                };
                let text = normalize_text(&tokens_text(&tokens));
                let target = find_labeled(text.trim(), entities).map(|e| e.id.clone());
                labeled_marker(kind, &text, &tokens, target, with_coords)
            }
            MarkerKind::Equation => {
                let text = normalize_text(&tokens_text(&tokens));
                let target = find_equation(&text, &self.entities.equations).map(|e| e.id.clone());
                labeled_marker(kind, &text, &tokens, target, with_coords)
            }
        }
    }
}

/// Resolve a marker cluster with the default citation matcher.
pub fn resolve_marker(
    kind: MarkerKind,
    tokens: &[Token],
    entities: &Entities,
    options: &AssemblyOptions,
) -> Vec<Inline> {
    let matcher = NumericCitationMatcher::new(&entities.bibliography);
    MarkerResolver::new(entities, &matcher, options).resolve(kind, tokens)
}

fn labeled_marker(
    kind: MarkerKind,
    text: &str,
    tokens: &[Token],
    target: Option<String>,
    with_coords: bool,
) -> Vec<Inline> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return vec![Inline::text(text)];
    }
    if target.is_none() {
        log::debug!("Unresolved {:?} callout '{}'", kind, trimmed);
    }

    let coords = if with_coords {
        coords_of(tokens)
    } else {
        Vec::new()
    };
    let mut nodes = vec![Inline::Ref(
        ReferenceMarker::new(kind, trimmed)
            .with_target(target)
            .with_coords(coords),
    )];
    if text.ends_with(' ') {
        nodes.push(Inline::text(" "));
    }
    nodes
}
