//! Table structures handed to the schedule parser.

use serde::{Deserialize, Serialize};

/// A table cell holding one or more stacked text segments.
///
/// Schedule pages stack several values in one cell (one line per meeting
/// location), so a cell is a list of segments rather than a single string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cell {
    segments: Vec<String>,
}

impl Cell {
    /// Build a cell from raw segments; each is stripped of surrounding
    /// whitespace and non-breaking spaces.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments.into_iter().map(|s| clean_text(s.as_ref())).collect(),
        }
    }

    /// Single-segment cell.
    pub fn text(value: &str) -> Self {
        Self::new([value])
    }

    /// Non-empty segments in order.
    pub fn fragments(&self) -> Vec<&str> {
        self.segments
            .iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// First non-empty segment.
    pub fn first(&self) -> Option<&str> {
        self.segments
            .iter()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }

    /// All segments, empty ones included.
    pub fn lines(&self) -> &[String] {
        &self.segments
    }

    /// Non-empty segments joined by a single space.
    pub fn joined(&self) -> String {
        self.fragments().join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }
}

/// A table row; `header` marks header/separator rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub header: bool,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn data(cells: Vec<Cell>) -> Self {
        Self {
            header: false,
            cells,
        }
    }

    pub fn heading(cells: Vec<Cell>) -> Self {
        Self {
            header: true,
            cells,
        }
    }

    /// Cell at `idx`, if present.
    pub fn cell(&self, idx: usize) -> Option<&Cell> {
        self.cells.get(idx)
    }

    /// First fragment of the cell at `idx`.
    pub fn first_text(&self, idx: usize) -> Option<&str> {
        self.cell(idx).and_then(Cell::first)
    }

    /// Fragments of the cell at `idx`; empty when the cell is absent.
    pub fn fragments(&self, idx: usize) -> Vec<&str> {
        self.cell(idx).map(Cell::fragments).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// One table of a course page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Rows that are not header/separator rows.
    pub fn data_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !row.header)
    }

    /// The first data row.
    pub fn first_data_row(&self) -> Option<&Row> {
        self.data_rows().next()
    }
}

/// Strip whitespace and non-breaking-space artifacts from cell text.
pub fn clean_text(text: &str) -> String {
    text.replace('\u{a0}', " ").replace("&nbsp;", " ").trim().to_string()
}
