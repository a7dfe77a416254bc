//! Section heading numbering.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "1 Introduction", "1. Introduction"
    static ref SINGLE: Regex = Regex::new(r"^(\d+)\.?\s").unwrap();
    /// "2.1 Methods", "2.1.3 Setup"
    static ref DOTTED: Regex = Regex::new(r"^((\d+)\.)+(\d+)\s").unwrap();
    /// "2.1. Methods"
    static ref DOTTED_TRAILING: Regex = Regex::new(r"^((\d+)\.)+\s").unwrap();
}

/// Split a leading section number off a heading.
///
/// The three grammars are tried in fixed order; the first match wins.
/// Returns the heading text and the number with spaces removed.
pub fn split_section_number(heading: &str) -> (String, Option<String>) {
    let found = [&*SINGLE, &*DOTTED, &*DOTTED_TRAILING]
        .iter()
        .find_map(|re| re.find(heading));

    match found {
        Some(m) => {
            let number = m.as_str().replace(' ', "").trim().to_string();
            let text = heading[m.end()..].trim().to_string();
            (text, Some(number))
        }
        None => (heading.trim().to_string(), None),
    }
}
