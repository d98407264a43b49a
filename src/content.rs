//! Document content shapes handed to the extractors.
//!
//! A loader turns a file into exactly one of these shapes; the same file always
//! yields the same shape.

/// Raw content of one bulletin document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// Plain-text lines without line terminators
    Text(Vec<String>),
    /// Word-processor tables in document order
    Tables(Vec<Table>),
    /// First worksheet of a spreadsheet
    Sheet(Sheet),
}

impl DocumentContent {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentContent::Text(_) => "text",
            DocumentContent::Tables(_) => "tables",
            DocumentContent::Sheet(_) => "sheet",
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            DocumentContent::Text(lines) => Some(lines),
            _ => None,
        }
    }

    pub fn as_tables(&self) -> Option<&[Table]> {
        match self {
            DocumentContent::Tables(tables) => Some(tables),
            _ => None,
        }
    }

    pub fn as_sheet(&self) -> Option<&Sheet> {
        match self {
            DocumentContent::Sheet(sheet) => Some(sheet),
            _ => None,
        }
    }
}

/// A word-processor table: rows of cell texts.
///
/// Cell text joins the cell's paragraphs with `\n`. A cell spanning several
/// grid columns appears once per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Every cell of the table, row by row
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// Row-oriented spreadsheet accessor; column 0 is the sheet's first column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_values(&self, index: usize) -> &[String] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Build a table from string literals (test fixtures)
#[cfg(test)]
pub fn table_of(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
}
