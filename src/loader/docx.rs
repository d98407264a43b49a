//! Word-processor (`.docx`) tables
//!
//! Only the top-level tables of `word/document.xml` are read. Cell text joins
//! the cell's paragraphs with `\n`. A cell spanning several grid columns is
//! repeated once per column, and a vertically merged continuation cell takes
//! the text of the cell above it, so every row of a table has one entry per
//! grid column it covers.

use crate::content::{DocumentContent, Table};
use crate::error::{BulletinError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn read_docx(path: &Path) -> Result<DocumentContent> {
    let read_error = |reason: String| BulletinError::DocumentRead {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| read_error(format!("not a word-processor archive: {}", e)))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| read_error(format!("missing {}: {}", DOCUMENT_PART, e)))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)?;

    let tables = parse_tables(&xml).map_err(read_error)?;
    Ok(DocumentContent::Tables(tables))
}

#[derive(Default)]
struct CellState {
    paragraphs: Vec<String>,
    span: usize,
    continues_above: bool,
}

/// Walks the document body collecting top-level tables
#[derive(Default)]
struct TableCollector {
    tables: Vec<Table>,
    depth: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<CellState>,
    paragraph: Option<String>,
    in_run: bool,
    in_text: bool,
}

impl TableCollector {
    fn start(&mut self, element: &BytesStart<'_>) -> std::result::Result<(), String> {
        let name = element.local_name();
        match name.as_ref() {
            b"tbl" => {
                self.depth += 1;
                if self.depth == 1 {
                    self.rows.clear();
                }
            }
            _ if self.depth != 1 => {}
            b"tr" => self.row = Some(Vec::new()),
            b"tc" if self.row.is_some() => {
                self.cell = Some(CellState {
                    span: 1,
                    ..CellState::default()
                })
            }
            b"p" if self.cell.is_some() => self.paragraph = Some(String::new()),
            b"r" => self.in_run = true,
            b"t" => self.in_text = self.paragraph.is_some(),
            _ => self.property(element)?,
        }
        Ok(())
    }

    /// Elements that never have content of interest, whether empty or not
    fn property(&mut self, element: &BytesStart<'_>) -> std::result::Result<(), String> {
        let name = element.local_name();
        match name.as_ref() {
            b"gridSpan" => {
                let span = attribute(element, b"val")?;
                if let (Some(cell), Some(span)) = (self.cell.as_mut(), span) {
                    cell.span = span.parse::<usize>().unwrap_or(1).max(1);
                }
            }
            b"vMerge" => {
                if let Some(cell) = self.cell.as_mut() {
                    let value = attribute(element, b"val")?;
                    cell.continues_above = value.as_deref() != Some("restart");
                }
            }
            // Self-closing paragraph: an empty line of the cell
            b"p" => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.paragraphs.push(String::new());
                }
            }
            b"tab" if self.in_run => self.push_text("\t"),
            b"br" | b"cr" if self.in_run => self.push_text("\n"),
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local_name: &[u8]) {
        match local_name {
            b"tbl" => {
                if self.depth == 1 {
                    self.tables.push(Table::new(std::mem::take(&mut self.rows)));
                }
                self.depth = self.depth.saturating_sub(1);
            }
            _ if self.depth != 1 => {}
            b"tr" => {
                if let Some(row) = self.row.take() {
                    self.rows.push(row);
                }
            }
            b"tc" => self.finish_cell(),
            b"p" => {
                let paragraph = self.paragraph.take();
                if let (Some(cell), Some(paragraph)) = (self.cell.as_mut(), paragraph) {
                    cell.paragraphs.push(paragraph);
                }
            }
            b"r" => self.in_run = false,
            b"t" => self.in_text = false,
            _ => {}
        }
    }

    fn finish_cell(&mut self) {
        let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) else {
            return;
        };
        let text = cell.paragraphs.join("\n");
        for _ in 0..cell.span {
            let column = row.len();
            let value = if cell.continues_above {
                self.rows
                    .last()
                    .and_then(|above| above.get(column))
                    .cloned()
                    .unwrap_or_else(|| text.clone())
            } else {
                text.clone()
            };
            row.push(value);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push_str(text);
        }
    }
}

fn attribute(
    element: &BytesStart<'_>,
    key: &[u8],
) -> std::result::Result<Option<String>, String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.local_name().as_ref() == key {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Top-level tables of a WordprocessingML document body
pub fn parse_tables(xml: &str) -> std::result::Result<Vec<Table>, String> {
    let mut reader = Reader::from_str(xml);
    let mut collector = TableCollector::default();

    loop {
        let event = reader.read_event().map_err(|e| {
            format!(
                "malformed document XML at byte {}: {}",
                reader.buffer_position(),
                e
            )
        })?;
        match event {
            Event::Start(element) => collector.start(&element)?,
            Event::Empty(element) if collector.depth == 1 => collector.property(&element)?,
            Event::End(element) => collector.end(element.local_name().as_ref()),
            Event::Text(text) if collector.in_text && collector.depth == 1 => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                collector.push_text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(collector.tables)
}
