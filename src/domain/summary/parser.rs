//! Line-oriented parser turning loosely marked-up clinical text into a
//! [`SummaryDocument`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::document::{Block, ListKind, Section, SummaryDocument};

/// Section names recognised as headers when the line carries emphasis.
pub const DEFAULT_SECTIONS: &[&str] = &[
    "Medical Case Summary",
    "Chief Complaint",
    "History",
    "Medications",
    "Assessment",
    "Diagnosis",
    "Likely Condition",
    "Recommendations",
];

/// Sections whose body is highlighted as a single unit.
pub const DEFAULT_EMPHASIZED: &[&str] = &["Assessment", "Diagnosis", "Likely Condition"];

const TITLE_PHRASE: &str = "medical case summary";

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Summary pattern failed to compile: {}", e);
            None
        }
    }
}

// Whole lines holding nothing but the (possibly decorated) title.
static TITLE_LINE: Lazy<Option<Regex>> = Lazy::new(|| {
    compile(r"(?im)^[ \t]*(?:#+|\*\*)?[ \t]*medical case summary[ \t]*:?[ \t]*(?:#+|\*\*)?[ \t]*$")
});

// Bold title embedded in a longer line.
static INLINE_TITLE: Lazy<Option<Regex>> =
    Lazy::new(|| compile(r"(?i)\*\*\s*medical case summary\s*\*\*"));

static NUMBERED_ITEM: Lazy<Option<Regex>> = Lazy::new(|| compile(r"^\d+\.\s"));

/// How a single non-header line is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineClass {
    Bullet(String),
    Implicit(String),
    Text(String),
    Rule,
}

/// Converts summary text into a sectioned document.
///
/// # Example
///
/// ```ignore
/// let parser = SummaryParser::default();
/// let html = parser.format("## Likely Condition\nFlu");
/// assert!(html.contains("<strong>Flu</strong>"));
/// ```
#[derive(Debug, Clone)]
pub struct SummaryParser {
    sections: Vec<String>,
    emphasized: Vec<String>,
}

impl Default for SummaryParser {
    fn default() -> Self {
        Self::new(DEFAULT_SECTIONS, DEFAULT_EMPHASIZED)
    }
}

impl SummaryParser {
    /// Creates a parser with a custom section vocabulary.
    pub fn new<S: AsRef<str>>(sections: &[S], emphasized: &[S]) -> Self {
        Self {
            sections: sections.iter().map(|s| s.as_ref().to_lowercase()).collect(),
            emphasized: emphasized.iter().map(|s| s.as_ref().to_lowercase()).collect(),
        }
    }

    /// Returns true if the text is already a document fragment.
    pub fn is_preformatted(text: &str) -> bool {
        text.contains("<div") || text.contains("<h")
    }

    /// Formats summary text as an HTML fragment.
    ///
    /// Already formatted input is returned unchanged, so formatting twice is
    /// safe.
    pub fn format(&self, text: &str) -> String {
        if Self::is_preformatted(text) {
            return text.to_string();
        }
        self.parse(text).to_html()
    }

    /// Parses summary text into a document.
    pub fn parse(&self, text: &str) -> SummaryDocument {
        let cleaned = strip_titles(text);
        let mut builder = DocumentBuilder::default();

        for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.eq_ignore_ascii_case(TITLE_PHRASE) {
                continue;
            }

            if let Some(remainder) = title_remainder(line) {
                builder.close_pending();
                if !remainder.is_empty() {
                    builder.body_line(&remainder);
                }
                continue;
            }

            if let Some((name, rest)) = self.header(line) {
                builder.close_pending();
                let emphasized = self.is_emphasized(&name);
                builder.open_section(name, emphasized);
                if let Some(rest) = rest {
                    builder.body_line(rest);
                }
                continue;
            }

            builder.body_line(line);
        }

        builder.finish()
    }

    /// Splits a header line into its section name and any text after the colon.
    fn header<'a>(&self, line: &'a str) -> Option<(String, Option<&'a str>)> {
        if !(line.starts_with("**") || line.starts_with('#')) {
            return None;
        }
        let lower = line.to_lowercase();
        if !self.sections.iter().any(|s| lower.contains(s.as_str())) {
            return None;
        }

        let (head, rest) = match line.split_once(':') {
            Some((head, rest)) => (head, Some(rest)),
            None => (line, None),
        };
        let name = clean_marks(head);
        if name.is_empty() {
            return None;
        }
        let rest = rest
            .map(|r| r.trim().trim_start_matches("**").trim())
            .filter(|r| !r.is_empty());
        Some((name, rest))
    }

    fn is_emphasized(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.emphasized.iter().any(|e| lower.contains(e.as_str()))
    }
}

fn strip_titles(text: &str) -> String {
    let mut out = text.to_string();
    for regex in [&*TITLE_LINE, &*INLINE_TITLE].into_iter().flatten() {
        out = regex.replace_all(&out, "").into_owned();
    }
    out
}

/// Text left over from a decorated title line such as `# Medical Case Summary for John`.
///
/// Returns `None` when the line is not a title header.
fn title_remainder(line: &str) -> Option<String> {
    if !(line.starts_with("**") || line.starts_with('#')) {
        return None;
    }
    let cleaned = clean_marks(line);
    let is_title = cleaned
        .get(..TITLE_PHRASE.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(TITLE_PHRASE));
    if !is_title {
        return None;
    }
    let rest = cleaned[TITLE_PHRASE.len()..]
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ':' | ','));
    Some(rest.to_string())
}

fn clean_marks(text: &str) -> String {
    text.replace("**", "").replace('#', "").trim().to_string()
}

fn classify(line: &str) -> LineClass {
    if line.chars().all(|c| matches!(c, '-' | '*' | '_')) {
        return LineClass::Rule;
    }
    if let Some(rest) = line.strip_prefix('-') {
        return LineClass::Bullet(rest.trim().to_string());
    }
    if line.starts_with('*') && !line.starts_with("**") {
        return LineClass::Bullet(line[1..].trim().to_string());
    }
    let numbered = NUMBERED_ITEM
        .as_ref()
        .map_or(false, |regex| regex.is_match(line));
    if numbered || line.contains(": ") {
        return LineClass::Implicit(line.to_string());
    }
    LineClass::Text(line.to_string())
}

/// Accumulates blocks while walking the lines.
#[derive(Default)]
struct DocumentBuilder {
    doc: SummaryDocument,
    current: Option<Section>,
    list: Option<(ListKind, Vec<String>)>,
    emphasis: Option<Vec<String>>,
}

impl DocumentBuilder {
    fn blocks(&mut self) -> &mut Vec<Block> {
        match self.current.as_mut() {
            Some(section) => &mut section.blocks,
            None => &mut self.doc.preamble,
        }
    }

    fn open_section(&mut self, name: String, emphasized: bool) {
        if let Some(section) = self.current.take() {
            self.doc.sections.push(section);
        }
        self.current = Some(Section::new(name));
        self.emphasis = emphasized.then(Vec::new);
    }

    fn body_line(&mut self, line: &str) {
        if let Some(buffer) = self.emphasis.as_mut() {
            buffer.push(line.to_string());
            return;
        }
        match classify(line) {
            LineClass::Bullet(item) => self.list_item(ListKind::Bullet, item),
            LineClass::Implicit(item) => self.list_item(ListKind::Implicit, item),
            LineClass::Text(text) => {
                self.close_list();
                self.blocks().push(Block::Paragraph(text));
            }
            LineClass::Rule => self.close_list(),
        }
    }

    fn list_item(&mut self, kind: ListKind, item: String) {
        if let Some((open, items)) = self.list.as_mut() {
            if *open == kind {
                items.push(item);
                return;
            }
        }
        self.close_list();
        self.list = Some((kind, vec![item]));
    }

    fn close_list(&mut self) {
        if let Some((kind, items)) = self.list.take() {
            self.blocks().push(Block::List { kind, items });
        }
    }

    fn close_emphasis(&mut self) {
        if let Some(lines) = self.emphasis.take() {
            if !lines.is_empty() {
                let text = lines.join(" ");
                self.blocks().push(Block::Emphasis(text));
            }
        }
    }

    fn close_pending(&mut self) {
        self.close_list();
        self.close_emphasis();
    }

    fn finish(mut self) -> SummaryDocument {
        self.close_pending();
        if let Some(section) = self.current.take() {
            self.doc.sections.push(section);
        }
        self.doc
    }
}
