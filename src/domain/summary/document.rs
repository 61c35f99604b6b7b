//! Sectioned summary document and its HTML rendering.

use std::fmt::Write;

/// Title every rendered summary carries exactly once.
pub const SUMMARY_TITLE: &str = "MEDICAL CASE SUMMARY";

/// Kind of list a group of lines forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Lines with a leading `-` or `*`.
    Bullet,
    /// Numbered (`1.`) or `key: value` lines.
    Implicit,
}

/// A piece of section content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    /// Highlighted text, used for the diagnosis.
    Emphasis(String),
    List { kind: ListKind, items: Vec<String> },
}

/// A titled section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
        }
    }
}

/// Parsed summary: content before the first section, then the sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryDocument {
    pub preamble: Vec<Block>,
    pub sections: Vec<Section>,
}

impl SummaryDocument {
    /// Returns the section with the given name, ignoring case.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Renders the document as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<div class=\"diagnosis-card\">");
        let _ = write!(
            html,
            "<h3 class=\"diagnosis-header text-center\">{}</h3>",
            SUMMARY_TITLE
        );
        for block in &self.preamble {
            render_block(&mut html, block);
        }
        for section in &self.sections {
            html.push_str("<div class=\"diagnosis-content\">");
            let _ = write!(
                html,
                "<h4 class=\"diagnosis-header\">{}</h4>",
                escape_html(&section.name.to_uppercase())
            );
            for block in &section.blocks {
                render_block(&mut html, block);
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
        html
    }
}

fn render_block(html: &mut String, block: &Block) {
    match block {
        Block::Paragraph(text) => {
            let _ = write!(html, "<p>{}</p>", escape_html(text));
        }
        Block::Emphasis(text) => {
            let _ = write!(html, "<p><strong>{}</strong></p>", escape_html(text));
        }
        Block::List { items, .. } => {
            html.push_str("<ul class=\"diagnosis-list\">");
            for item in items {
                let _ = write!(html, "<li>{}</li>", escape_html(item));
            }
            html.push_str("</ul>");
        }
    }
}

/// Escapes text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
