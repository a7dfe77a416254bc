//! Rendering module for converting document trees to output formats.

mod json;
mod tei;

pub use json::{to_json, JsonFormat};
pub use tei::{escape_xml, to_tei, TeiOptions, TeiRenderer};
