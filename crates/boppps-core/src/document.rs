//! Word document assembly and read-back.
//!
//! Layout, top to bottom:
//! 1. a `Title` paragraph with [`DOCUMENT_TITLE`]
//! 2. a two-column table, one row per metadata field
//! 3. an empty spacer paragraph
//! 4. the generated plan text as one paragraph; newlines become line breaks
//!    and tabs become tab stops

use std::io::Cursor;
use std::path::PathBuf;

use docx_rs::{
    BreakType, DocumentChild, Docx, Paragraph, ParagraphChild, Run, RunChild, Style, StyleType,
    Table, TableCell, TableCellContent, TableChild, TableRow, TableRowChild, read_docx,
};

use crate::lesson::LessonRequest;

/// Heading placed at the top of every generated document.
pub const DOCUMENT_TITLE: &str = "BOPPPS Lesson Plan";

/// File extension of generated documents.
pub const DOCUMENT_EXTENSION: &str = "docx";

/// MIME type of generated documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const TITLE_STYLE: &str = "Title";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to pack document: {0}")]
    Pack(String),

    #[error("failed to read document: {0}")]
    Read(String),

    #[error("failed to write document to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Build the document for `request` with `plan_text` as its body and return
/// the packed `.docx` bytes.
pub fn assemble(request: &LessonRequest, plan_text: &str) -> Result<Vec<u8>, DocumentError> {
    let title = Paragraph::new()
        .style(TITLE_STYLE)
        .add_run(Run::new().add_text(DOCUMENT_TITLE));

    let rows = request
        .metadata_rows()
        .iter()
        .map(|(label, value)| TableRow::new(vec![text_cell(label), text_cell(value)]))
        .collect();

    let docx = Docx::new()
        .add_style(
            Style::new(TITLE_STYLE, StyleType::Paragraph)
                .name(TITLE_STYLE)
                .size(56)
                .bold(),
        )
        .add_paragraph(title)
        .add_table(Table::new(rows))
        .add_paragraph(Paragraph::new())
        .add_paragraph(body_paragraph(plan_text));

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| DocumentError::Pack(e.to_string()))?;
    Ok(buf.into_inner())
}

fn text_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(text_run(text)))
}

/// One paragraph, one run; each `\n` in `text` becomes a line break.
fn body_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(text_run(text))
}

/// A run holding `text` with `\n` as line breaks and `\t` as tabs.
///
/// Characters XML 1.0 cannot carry are dropped; `\r\n` and lone `\r`
/// count as newlines.
fn text_run(text: &str) -> Run {
    let cleaned = sanitize_xml_text(text);
    let mut run = Run::new();
    for (i, line) in cleaned.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (j, segment) in line.split('\t').enumerate() {
            if j > 0 {
                run = run.add_tab();
            }
            if !segment.is_empty() {
                run = run.add_text(segment);
            }
        }
    }
    run
}

fn sanitize_xml_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .filter_map(|c| match c {
            '\r' => Some('\n'),
            c if is_xml_char(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// The XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

// ---------------------------------------------------------------------------
// Read-back
// ---------------------------------------------------------------------------

/// The structure of a generated document, recovered from its bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutline {
    /// Text of the first `Title`-styled paragraph, if any.
    pub title: Option<String>,
    /// Rows of the first table, one `(label, value)` pair per row.
    pub rows: Vec<(String, String)>,
    /// Paragraphs following the table, spacer included.
    pub paragraphs: Vec<String>,
}

impl DocumentOutline {
    /// The last body paragraph, normally the generated plan text.
    pub fn body(&self) -> Option<&str> {
        self.paragraphs.last().map(String::as_str)
    }
}

/// Parse `.docx` bytes back into a [`DocumentOutline`].
pub fn read_outline(bytes: &[u8]) -> Result<DocumentOutline, DocumentError> {
    let docx = read_docx(bytes).map_err(|e| DocumentError::Read(e.to_string()))?;

    let mut outline = DocumentOutline::default();
    let mut seen_table = false;

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let is_title = p
                    .property
                    .style
                    .as_ref()
                    .is_some_and(|s| s.val == TITLE_STYLE);
                if is_title && outline.title.is_none() {
                    outline.title = Some(paragraph_text(p));
                } else if seen_table {
                    outline.paragraphs.push(paragraph_text(p));
                }
            }
            DocumentChild::Table(t) if !seen_table => {
                seen_table = true;
                outline.rows = table_rows(t);
            }
            _ => {}
        }
    }

    Ok(outline)
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Break(_) => text.push('\n'),
                    RunChild::Tab(_) => text.push('\t'),
                    _ => {}
                }
            }
        }
    }
    text
}

fn table_rows(table: &Table) -> Vec<(String, String)> {
    table
        .rows
        .iter()
        .map(|TableChild::TableRow(row)| {
            let mut cells = row
                .cells
                .iter()
                .map(|TableRowChild::TableCell(cell)| cell_text(cell));
            let label = cells.next().unwrap_or_default();
            let value = cells.next().unwrap_or_default();
            (label, value)
        })
        .collect()
}

fn cell_text(cell: &TableCell) -> String {
    cell.children
        .iter()
        .filter_map(|content| match content {
            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
