//! The document sink that receives page assembly commands.
//!
//! A page layout never builds an output document directly; it issues an
//! ordered sequence of structural commands to a [`DocumentSink`]. The
//! in-crate implementation, [`DocumentBuilder`], materializes them into a
//! serializable [`Document`].

use crate::error::{Error, Result};
use crate::model::{hex_color, Document, Element, Margin, Paragraph, Section, Table};

/// Handle to a paragraph in the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphHandle(usize);

/// Handle to a table in the current section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHandle(usize);

impl ParagraphHandle {
    /// Create a handle from an element index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Element index in the current section.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl TableHandle {
    /// Create a handle from an element index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Element index in the current section.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Receiver of structural document commands.
///
/// Handles are only valid within the section they were created in.
pub trait DocumentSink {
    /// Start a new section with the given page size and margins.
    fn new_section(&mut self, width: f32, height: f32, margin: Margin);

    /// Append a paragraph to the current section.
    fn add_paragraph(&mut self, paragraph: Paragraph) -> Result<ParagraphHandle>;

    /// Set the spacing of a paragraph.
    fn set_paragraph_spacing(
        &mut self,
        handle: ParagraphHandle,
        before: f32,
        after: f32,
        line_spacing: Option<f32>,
    ) -> Result<()>;

    /// Append an empty `rows x cols` table with automatic sizing disabled.
    fn add_table(&mut self, rows: usize, cols: usize) -> Result<TableHandle>;

    /// Set explicit column widths, row heights and left indent of a table.
    fn set_table_geometry(
        &mut self,
        handle: TableHandle,
        column_widths: Vec<f32>,
        row_heights: Vec<f32>,
        indent: f32,
    ) -> Result<()>;

    /// Replace the content of one cell.
    fn set_cell_content(
        &mut self,
        handle: TableHandle,
        row: usize,
        col: usize,
        content: Vec<Element>,
    ) -> Result<()>;

    /// Set the background color of one cell.
    fn set_cell_shading(&mut self, _handle: TableHandle, _row: usize, _col: usize, _rgb: u32) -> Result<()> {
        Ok(())
    }
}

/// Builds a [`Document`] from sink commands.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a builder with an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the document built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Finish building and return the document.
    pub fn finish(self) -> Document {
        self.document
    }

    fn section_mut(&mut self) -> Result<&mut Section> {
        self.document
            .sections
            .last_mut()
            .ok_or_else(|| Error::Assembly("no open section".to_string()))
    }

    fn paragraph_mut(&mut self, handle: ParagraphHandle) -> Result<&mut Paragraph> {
        match self.section_mut()?.elements.get_mut(handle.0) {
            Some(Element::Paragraph(p)) => Ok(p),
            _ => Err(Error::Assembly(format!(
                "element {} is not a paragraph",
                handle.0
            ))),
        }
    }

    fn table_mut(&mut self, handle: TableHandle) -> Result<&mut Table> {
        match self.section_mut()?.elements.get_mut(handle.0) {
            Some(Element::Table(t)) => Ok(t),
            _ => Err(Error::Assembly(format!("element {} is not a table", handle.0))),
        }
    }
}

impl DocumentSink for DocumentBuilder {
    fn new_section(&mut self, width: f32, height: f32, margin: Margin) {
        self.document.add_section(Section::new(width, height, margin));
    }

    fn add_paragraph(&mut self, paragraph: Paragraph) -> Result<ParagraphHandle> {
        let section = self.section_mut()?;
        section.elements.push(Element::Paragraph(paragraph));
        Ok(ParagraphHandle(section.elements.len() - 1))
    }

    fn set_paragraph_spacing(
        &mut self,
        handle: ParagraphHandle,
        before: f32,
        after: f32,
        line_spacing: Option<f32>,
    ) -> Result<()> {
        let p = self.paragraph_mut(handle)?;
        p.format.space_before = before;
        p.format.space_after = after;
        p.format.line_spacing = line_spacing;
        Ok(())
    }

    fn add_table(&mut self, rows: usize, cols: usize) -> Result<TableHandle> {
        if rows == 0 || cols == 0 {
            return Err(Error::Assembly(format!("invalid table size {}x{}", rows, cols)));
        }
        let section = self.section_mut()?;
        section.elements.push(Element::Table(Table::new(rows, cols)));
        Ok(TableHandle(section.elements.len() - 1))
    }

    fn set_table_geometry(
        &mut self,
        handle: TableHandle,
        column_widths: Vec<f32>,
        row_heights: Vec<f32>,
        indent: f32,
    ) -> Result<()> {
        let table = self.table_mut(handle)?;
        table.column_widths = column_widths;
        table.row_heights = row_heights;
        table.indent = indent;
        Ok(())
    }

    fn set_cell_content(
        &mut self,
        handle: TableHandle,
        row: usize,
        col: usize,
        content: Vec<Element>,
    ) -> Result<()> {
        let cell = self
            .table_mut(handle)?
            .cell_mut(row, col)
            .ok_or_else(|| Error::Assembly(format!("cell ({}, {}) out of range", row, col)))?;
        cell.content = content;
        Ok(())
    }

    fn set_cell_shading(&mut self, handle: TableHandle, row: usize, col: usize, rgb: u32) -> Result<()> {
        let cell = self
            .table_mut(handle)?
            .cell_mut(row, col)
            .ok_or_else(|| Error::Assembly(format!("cell ({}, {}) out of range", row, col)))?;
        cell.shading = Some(hex_color(rgb));
        Ok(())
    }
}
