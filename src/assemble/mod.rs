//! Document body assembly.
//!
//! Clusters of labeled tokens are folded into divisions in one forward
//! pass. Callouts are resolved as they are met, and paragraphs are split
//! into sentences once the pass is over.

mod cluster;
mod ids;
mod numbering;
mod options;
mod tree;

pub use cluster::{build_clusters, parse_labels};
pub use ids::{assign_ids, IdGenerator};
pub use numbering::split_section_number;
pub use options::{AssemblyOptions, CoordElement};
pub use tree::{continues_after_break, is_new_paragraph, BodyAssembler};

use crate::model::{DocumentTree, Entities, LabeledCluster};
use crate::resolve::NumericCitationMatcher;
use crate::segment::PunctuationSentenceDetector;

/// Assemble a body with the default citation matcher and sentence detector.
pub fn assemble_body(
    clusters: Vec<LabeledCluster>,
    entities: &Entities,
    options: &AssemblyOptions,
) -> DocumentTree {
    let matcher = NumericCitationMatcher::new(&entities.bibliography);
    let detector = PunctuationSentenceDetector::new();
    let (divisions, stats) =
        BodyAssembler::new(entities, options, &matcher, &detector).assemble(clusters);

    let mut tree = DocumentTree {
        divisions,
        stats,
        ..DocumentTree::default()
    };
    if options.generate_ids {
        assign_ids(&mut tree);
    }
    tree
}
