//! TEI rendering for assembled documents.

use crate::error::Result;
use crate::model::{
    coords_string, Block, BoundingBox, Division, DocumentTree, EquationBlock, Heading, Inline,
    ListBlock, Note, NotePlace, Paragraph, ParagraphBody, ReferenceMarker, Sentence,
};
use crate::text::strip_invalid_xml_chars;

/// Options for TEI output.
#[derive(Debug, Clone)]
pub struct TeiOptions {
    /// Put each block element on its own line
    pub indent: bool,

    /// Render footnotes and margin notes after the body divisions
    pub include_notes: bool,

    /// Render acknowledgement and annex in a `<back>` element
    pub include_back: bool,
}

impl TeiOptions {
    /// Create new TEI options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit everything on one line.
    pub fn compact(mut self) -> Self {
        self.indent = false;
        self
    }

    /// Include or skip notes.
    pub fn with_notes(mut self, include: bool) -> Self {
        self.include_notes = include;
        self
    }

    /// Include or skip the back matter.
    pub fn with_back(mut self, include: bool) -> Self {
        self.include_back = include;
        self
    }
}

impl Default for TeiOptions {
    fn default() -> Self {
        Self {
            indent: true,
            include_notes: true,
            include_back: true,
        }
    }
}

/// Convert a document tree to TEI `<body>` (and `<back>`) markup.
pub fn to_tei(tree: &DocumentTree, options: &TeiOptions) -> Result<String> {
    TeiRenderer::new(options.clone()).render(tree)
}

/// TEI renderer.
pub struct TeiRenderer {
    options: TeiOptions,
}

impl TeiRenderer {
    /// Create a new TEI renderer.
    pub fn new(options: TeiOptions) -> Self {
        Self { options }
    }

    /// Render a document tree.
    pub fn render(&self, tree: &DocumentTree) -> Result<String> {
        let mut output = String::new();

        output.push_str("<body>");
        self.newline(&mut output);
        for division in &tree.divisions {
            self.render_division(&mut output, division);
        }
        if self.options.include_notes {
            for note in &tree.notes {
                self.render_note(&mut output, note);
            }
        }
        output.push_str("</body>");
        self.newline(&mut output);

        if self.options.include_back && (!tree.acknowledgement.is_empty() || !tree.annex.is_empty())
        {
            output.push_str("<back>");
            self.newline(&mut output);
            self.render_back_part(&mut output, "acknowledgement", &tree.acknowledgement);
            self.render_back_part(&mut output, "annex", &tree.annex);
            output.push_str("</back>");
            self.newline(&mut output);
        }

        Ok(output.trim_end().to_string())
    }

    fn newline(&self, output: &mut String) {
        if self.options.indent {
            output.push('\n');
        }
    }

    fn render_back_part(&self, output: &mut String, kind: &str, divisions: &[Division]) {
        if divisions.is_empty() {
            return;
        }
        output.push_str(&format!("<div type=\"{}\">", kind));
        self.newline(output);
        for division in divisions {
            self.render_division(output, division);
        }
        output.push_str("</div>");
        self.newline(output);
    }

    fn render_division(&self, output: &mut String, division: &Division) {
        output.push_str("<div");
        push_id(output, division.id.as_deref());
        output.push('>');
        self.newline(output);

        if let Some(ref heading) = division.heading {
            self.render_heading(output, heading);
        }
        for block in &division.blocks {
            self.render_block(output, block);
        }

        output.push_str("</div>");
        self.newline(output);
    }

    fn render_heading(&self, output: &mut String, heading: &Heading) {
        output.push_str("<head");
        if let Some(ref number) = heading.number {
            push_attr(output, "n", number);
        }
        push_id(output, heading.id.as_deref());
        push_coords(output, &heading.coords);
        output.push('>');
        output.push_str(&escape_xml(&heading.text));
        output.push_str("</head>");
        self.newline(output);
    }

    fn render_block(&self, output: &mut String, block: &Block) {
        match block {
            Block::Paragraph(p) => self.render_paragraph(output, p),
            Block::List(list) => self.render_list(output, list),
            Block::Note(note) => self.render_note(output, note),
            Block::Equation(eq) => self.render_equation(output, eq),
            Block::Inline(inline) => {
                render_inline(output, inline);
                self.newline(output);
            }
        }
    }

    fn render_paragraph(&self, output: &mut String, para: &Paragraph) {
        output.push_str("<p");
        push_id(output, para.id.as_deref());
        output.push('>');
        match &para.body {
            ParagraphBody::Inline(content) => render_inlines(output, content),
            ParagraphBody::Sentences(sentences) => {
                for sentence in sentences {
                    render_sentence(output, sentence);
                }
            }
        }
        output.push_str("</p>");
        self.newline(output);
    }

    fn render_list(&self, output: &mut String, list: &ListBlock) {
        output.push_str("<list>");
        for item in &list.items {
            output.push_str("<item>");
            output.push_str(&escape_xml(item));
            output.push_str("</item>");
        }
        output.push_str("</list>");
        self.newline(output);
    }

    fn render_note(&self, output: &mut String, note: &Note) {
        output.push_str("<note");
        match note.place {
            NotePlace::Other => push_attr(output, "type", "other"),
            place => push_attr(output, "place", place.as_str()),
        }
        if let Some(n) = note.number {
            push_attr(output, "n", &n.to_string());
        }
        push_id(output, note.id.as_deref());
        push_coords(output, &note.coords);
        output.push('>');
        render_inlines(output, &note.content);
        output.push_str("</note>");
        self.newline(output);
    }

    fn render_equation(&self, output: &mut String, eq: &EquationBlock) {
        output.push_str("<formula");
        push_attr(output, "xml:id", &format!("formula_{}", eq.id));
        push_coords(output, &eq.coords);
        output.push('>');
        output.push_str(&escape_xml(&eq.text));
        if !eq.label.is_empty() {
            output.push_str("<label>");
            output.push_str(&escape_xml(&eq.label));
            output.push_str("</label>");
        }
        output.push_str("</formula>");
        self.newline(output);
    }
}

fn render_sentence(output: &mut String, sentence: &Sentence) {
    output.push_str("<s");
    push_id(output, sentence.id.as_deref());
    push_coords(output, &sentence.coords);
    output.push('>');
    render_inlines(output, &sentence.content);
    output.push_str("</s>");
}

fn render_inlines(output: &mut String, content: &[Inline]) {
    for inline in content {
        render_inline(output, inline);
    }
}

fn render_inline(output: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(run) => output.push_str(&escape_xml(&run.text)),
        Inline::Ref(marker) => render_ref(output, marker),
    }
}

fn render_ref(output: &mut String, marker: &ReferenceMarker) {
    output.push_str("<ref");
    push_attr(output, "type", marker.kind.tei_type());
    if let Some(ref target) = marker.target {
        push_attr(
            output,
            "target",
            &format!("{}{}", marker.kind.target_prefix(), target),
        );
    }
    push_coords(output, &marker.coords);
    output.push('>');
    output.push_str(&escape_xml(&marker.text));
    output.push_str("</ref>");
}

fn push_attr(output: &mut String, name: &str, value: &str) {
    output.push(' ');
    output.push_str(name);
    output.push_str("=\"");
    output.push_str(&escape_xml(value));
    output.push('"');
}

fn push_id(output: &mut String, id: Option<&str>) {
    if let Some(id) = id {
        push_attr(output, "xml:id", id);
    }
}

fn push_coords(output: &mut String, coords: &[BoundingBox]) {
    if let Some(coords) = coords_string(coords) {
        push_attr(output, "coords", &coords);
    }
}

/// Escape text for XML content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let text = strip_invalid_xml_chars(text);
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkerKind;

    fn tree() -> DocumentTree {
        let mut p = Paragraph::with_text("Shown in ");
        p.push_inline(Inline::Ref(
            ReferenceMarker::new(MarkerKind::Figure, "Fig. 1").with_target(Some("0".into())),
        ));
        p.push_text(" & more");

        let mut div = Division::with_heading(Heading::new("Results", Some("3".into())));
        div.add_block(Block::Paragraph(p));
        div.add_block(Block::Equation(EquationBlock {
            id: "2".into(),
            text: "E = mc2".into(),
            label: "(1)".into(),
            coords: Vec::new(),
        }));

        let mut tree = DocumentTree::new();
        tree.divisions.push(div);
        let mut note = Note::with_text(NotePlace::Foot, "A note.");
        note.number = Some(1);
        tree.notes.push(note);
        tree
    }

    #[test]
    fn test_render_tei() {
        let tei = to_tei(&tree(), &TeiOptions::new().compact()).unwrap();
        assert!(tei.starts_with("<body><div><head n=\"3\">Results</head>"));
        assert!(tei.contains("<p>Shown in <ref type=\"figure\" target=\"#fig_0\">Fig. 1</ref> &amp; more</p>"));
        assert!(tei.contains("<formula xml:id=\"formula_2\">E = mc2<label>(1)</label></formula>"));
        assert!(tei.contains("<note place=\"foot\" n=\"1\">A note.</note>"));
        assert!(tei.ends_with("</body>"));
    }

    #[test]
    fn test_unresolved_ref_has_no_target() {
        let mut out = String::new();
        render_ref(&mut out, &ReferenceMarker::new(MarkerKind::Citation, "[9]"));
        assert_eq!(out, "<ref type=\"bibr\">[9]</ref>");
    }

    #[test]
    fn test_coords_attribute() {
        let mut out = String::new();
        let marker = ReferenceMarker::new(MarkerKind::Table, "Table 2")
            .with_coords(vec![BoundingBox::new(3, 1.0, 2.0, 3.0, 4.0)]);
        render_ref(&mut out, &marker);
        assert!(out.contains("coords=\"3,1.00,2.00,3.00,4.00\""));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
