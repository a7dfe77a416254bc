//! Figure and table callout matching.

use crate::model::LabeledEntity;
use crate::text::{clean_field, fold_label};

/// Find the entity a figure or table callout points at.
///
/// Exact label equality wins. Otherwise entities are scanned from last to
/// first and the first one whose label occurs in the callout is taken, so
/// "Fig. 12" prefers label "12" over label "1".
pub fn find_labeled<'a>(callout: &str, entities: &'a [LabeledEntity]) -> Option<&'a LabeledEntity> {
    let callout = fold_label(callout);
    if callout.is_empty() {
        return None;
    }

    let labels: Vec<(String, &LabeledEntity)> = entities
        .iter()
        .map(|e| (fold_label(&clean_field(&e.label)), e))
        .filter(|(label, _)| !label.is_empty())
        .collect();

    labels
        .iter()
        .find(|(label, _)| *label == callout)
        .or_else(|| labels.iter().rev().find(|(label, _)| callout.contains(label.as_str())))
        .map(|(_, e)| *e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figures() -> Vec<LabeledEntity> {
        vec![
            LabeledEntity::new("0", "1"),
            LabeledEntity::new("1", "2"),
            LabeledEntity::new("2", "12"),
        ]
    }

    #[test]
    fn test_exact_match() {
        let figs = vec![LabeledEntity::new("0", "Figure 1"), LabeledEntity::new("1", "1")];
        assert_eq!(find_labeled("Figure 1", &figs).unwrap().id, "0");
    }

    #[test]
    fn test_prefers_later_contained_label() {
        let figs = figures();
        assert_eq!(find_labeled("Fig. 12", &figs).unwrap().id, "2");
        assert_eq!(find_labeled("Fig. 2", &figs).unwrap().id, "1");
    }

    #[test]
    fn test_no_match() {
        let figs = vec![LabeledEntity::new("0", "4"), LabeledEntity::new("1", "")];
        assert!(find_labeled("Fig. 3", &figs).is_none());
        assert!(find_labeled("", &figs).is_none());
    }

    #[test]
    fn test_ligature_and_case() {
        let figs = vec![LabeledEntity::new("7", "FIGURE 3.")];
        assert_eq!(find_labeled("\u{FB01}gure 3", &figs).unwrap().id, "7");
        assert_eq!(find_labeled("Figure 3", &figs).unwrap().id, "7");
        assert!(find_labeled("Figure 4", &figs).is_none());
    }
}
