//! Text normalization helpers shared by the assembler, resolver and notes.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::Token;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref LINE_HYPHEN: Regex = Regex::new(r"(\p{L})-[ \t]*\n\s*(\p{Ll})").unwrap();
    static ref NUMBER: Regex = Regex::new(r"\d+").unwrap();
    static ref LEADING_NUMBER: Regex = Regex::new(r"^(\d+)").unwrap();
}

/// Concatenate the raw text of a token run.
pub fn tokens_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Collapse every whitespace run (line breaks included) into one space.
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").into_owned()
}

/// Join words hyphenated across a line break: "infor-\nmation" → "information".
pub fn dehyphenize(text: &str) -> String {
    LINE_HYPHEN.replace_all(text, "$1$2").into_owned()
}

/// Dehyphenated, whitespace-normalized text of a token run.
pub fn normalize_dehyphenize(tokens: &[Token]) -> String {
    normalize_text(&dehyphenize(&tokens_text(tokens)))
}

/// Drop hyphen tokens (and the line break after them) that split a word.
pub fn dehyphenize_tokens(tokens: &[Token]) -> Vec<Token> {
    let mut result: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token.text == "-" && ends_with_letter(result.last()) {
            let mut j = i + 1;
            let mut saw_newline = false;
            while j < tokens.len() && tokens[j].is_whitespace() {
                saw_newline |= tokens[j].text.contains('\n');
                j += 1;
            }
            let next_lower = tokens
                .get(j)
                .and_then(|t| t.text.chars().next())
                .is_some_and(char::is_lowercase);
            if saw_newline && next_lower {
                i = j;
                continue;
            }
        }
        result.push(token.clone());
        i += 1;
    }
    result
}

fn ends_with_letter(token: Option<&Token>) -> bool {
    token
        .and_then(|t| t.text.chars().last())
        .is_some_and(char::is_alphabetic)
}

/// Trim field punctuation from both ends of a label or callout.
///
/// Parentheses and brackets are only trimmed when unbalanced, so "(3)"
/// stays intact while "Fig. 3)" loses its dangling bracket.
pub fn clean_field(text: &str) -> String {
    let text = text.replace(",,", ",").replace(", ,", ",");
    let mut s = text.trim();

    loop {
        let before = s.len();
        s = s.trim_end_matches(|c: char| {
            c.is_whitespace() || matches!(c, ',' | '.' | '-' | '_' | '/' | ':' | ';' | '#')
        });
        if s.ends_with(')') && !s.contains('(') {
            s = &s[..s.len() - 1];
        }
        if s.ends_with(']') && !s.contains('[') {
            s = &s[..s.len() - 1];
        }
        if s.len() == before {
            break;
        }
    }

    loop {
        let before = s.len();
        s = s.trim_start_matches(|c: char| {
            c.is_whitespace() || matches!(c, ',' | '.' | ':' | ';')
        });
        if s.starts_with('(') && !s.contains(')') {
            s = &s[1..];
        }
        if s.starts_with('[') && !s.contains(']') {
            s = &s[1..];
        }
        if s.len() == before {
            break;
        }
    }

    s.to_string()
}

/// Compatibility-normalized, lowercased form used to compare labels.
///
/// NFKC also folds typographic ligatures ("ﬁg" → "fig").
pub fn fold_label(text: &str) -> String {
    normalize_text(&text.nfkc().collect::<String>())
        .trim()
        .to_lowercase()
}

/// First run of ASCII digits in the text.
pub fn first_number(text: &str) -> Option<&str> {
    NUMBER.find(text).map(|m| m.as_str())
}

/// Split a leading integer off the text: "12 See also" → ("12", " See also").
pub fn leading_number(text: &str) -> Option<(&str, &str)> {
    LEADING_NUMBER
        .find(text)
        .map(|m| (m.as_str(), &text[m.end()..]))
}

/// Remove characters that cannot appear in XML 1.0 text.
pub fn strip_invalid_xml_chars(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{20}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || c >= '\u{10000}'
        })
        .collect()
}

/// Whether a token carries nothing that sentence matching can anchor on.
pub fn is_skippable_token(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}
