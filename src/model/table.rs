//! Table types of the assembled document.

use super::{hex_color, Element};
use serde::{Deserialize, Serialize};

/// A table structure with explicit geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Column widths in points
    pub column_widths: Vec<f32>,

    /// Row heights in points
    pub row_heights: Vec<f32>,

    /// Left indentation of the table relative to the content box
    pub indent: f32,

    /// Whether the renderer may resize columns to fit content
    pub autofit: bool,
}

impl Table {
    /// Create an empty `rows` x `cols` table with automatic sizing disabled.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| TableRow::empty(cols)).collect(),
            column_widths: Vec::new(),
            row_heights: Vec::new(),
            indent: 0.0,
            autofit: false,
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a mutable cell.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a row of `cols` empty cells.
    pub fn empty(cols: usize) -> Self {
        Self {
            cells: (0..cols).map(|_| TableCell::empty()).collect(),
        }
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content: paragraphs and nested tables
    pub content: Vec<Element>,

    /// Background shading (hex format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading: Option<String>,
}

impl TableCell {
    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set shading from an RGB integer and return self.
    pub fn with_shading(mut self, rgb: u32) -> Self {
        self.shading = Some(hex_color(rgb));
        self
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|e| e.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }
}
