//! Equation callout matching.

use crate::model::Equation;
use crate::text::{clean_field, first_number, fold_label};

/// Find the equation an equation callout points at.
///
/// The first equation whose label has the same first number as the
/// callout wins; failing that, a label equal to the whole callout.
pub fn find_equation<'a>(callout: &str, equations: &'a [Equation]) -> Option<&'a Equation> {
    let callout = clean_field(callout);
    let callout_number = first_number(&callout);
    let callout_folded = fold_label(&callout);

    equations.iter().find(|eq| {
        let label = clean_field(&eq.label);
        if label.is_empty() {
            return false;
        }
        let same_number = match (callout_number, first_number(&label)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        same_number || fold_label(&label) == callout_folded
    })
}
