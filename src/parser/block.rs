//! Content blocks of a page: text blocks and table blocks.

use serde::{Deserialize, Serialize};

use crate::model::{hex_color, BBox, Paragraph, ParagraphFormat, Run, TextRun, TextStyle};

use super::raw::{RawBlock, RawLine, RawSpan, BLOCK_IMAGE, BLOCK_TEXT};

/// Font flag bit for italic text.
const FLAG_ITALIC: u32 = 1 << 1;
/// Font flag bit for bold text.
const FLAG_BOLD: u32 = 1 << 4;

/// A style cue matched from a shape onto a text span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "color", rename_all = "snake_case")]
pub enum SpanStyle {
    /// Background highlight with the shape color
    Highlight(u32),
    /// Underline with the shape color
    Underline(u32),
    /// Strike-through with the shape color
    Strike(u32),
}

/// A text span with position and style information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// Span bounding box
    pub bbox: BBox,
    /// The text content
    pub text: String,
    /// Font name (e.g., "Helvetica-Bold")
    pub font: String,
    /// Font size in points
    pub size: f32,
    /// sRGB text color
    pub color: u32,
    /// Font flags bit field
    pub flags: u32,
    /// Styles matched from shapes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<SpanStyle>,
}

impl TextSpan {
    /// Create a new span with default font attributes.
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            bbox,
            text: text.into(),
            font: String::new(),
            size: bbox.height().max(0.0),
            color: 0,
            flags: 0,
            style: Vec::new(),
        }
    }

    fn from_raw(raw: &RawSpan) -> Self {
        Self {
            bbox: raw.bbox,
            text: raw.content(),
            font: raw.font.clone(),
            size: raw.size,
            color: raw.color,
            flags: raw.flags,
            style: Vec::new(),
        }
    }

    /// Whether the span is bold, from font flags or the font name.
    pub fn is_bold(&self) -> bool {
        let font = self.font.to_lowercase();
        self.flags & FLAG_BOLD != 0
            || font.contains("bold")
            || font.contains("black")
            || font.contains("heavy")
    }

    /// Whether the span is italic, from font flags or the font name.
    pub fn is_italic(&self) -> bool {
        let font = self.font.to_lowercase();
        self.flags & FLAG_ITALIC != 0 || font.contains("italic") || font.contains("oblique")
    }

    /// Add a style cue unless it is already present.
    pub fn add_style(&mut self, style: SpanStyle) -> bool {
        if self.style.contains(&style) {
            return false;
        }
        self.style.push(style);
        true
    }

    fn to_run(&self) -> TextRun {
        let mut style = TextStyle {
            bold: self.is_bold(),
            italic: self.is_italic(),
            font_name: (!self.font.is_empty()).then(|| self.font.clone()),
            font_size: (self.size > 0.0).then_some(self.size),
            color: (self.color != 0).then(|| hex_color(self.color)),
            ..Default::default()
        };
        for s in &self.style {
            match *s {
                SpanStyle::Highlight(c) => style.highlight = Some(hex_color(c)),
                SpanStyle::Underline(_) => style.underline = true,
                SpanStyle::Strike(_) => style.strikethrough = true,
            }
        }
        TextRun {
            text: self.text.clone(),
            style,
        }
    }
}

/// An image region placed inline in a text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpan {
    /// Image bounding box on the page
    pub bbox: BBox,
    /// Pixel width of the source image
    pub width: Option<u32>,
    /// Pixel height of the source image
    pub height: Option<u32>,
    /// Source image format
    pub ext: Option<String>,
}

/// Inline content of a text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// A text span
    Text(TextSpan),
    /// An image region
    Image(ImageSpan),
}

impl Inline {
    /// Bounding box of the inline content.
    pub fn bbox(&self) -> BBox {
        match self {
            Inline::Text(s) => s.bbox,
            Inline::Image(i) => i.bbox,
        }
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Line bounding box
    pub bbox: BBox,
    /// The inline content, left to right
    pub inlines: Vec<Inline>,
}

impl TextLine {
    /// Create a line from inline content; the box is the union of the content.
    pub fn new(inlines: Vec<Inline>) -> Self {
        let boxes: Vec<BBox> = inlines.iter().map(Inline::bbox).collect();
        Self {
            bbox: BBox::union_all(boxes.iter()).unwrap_or_default(),
            inlines,
        }
    }

    fn from_raw(raw: &RawLine) -> Self {
        Self {
            bbox: raw.bbox,
            inlines: raw
                .spans
                .iter()
                .map(|s| Inline::Text(TextSpan::from_raw(s)))
                .collect(),
        }
    }

    /// Get the combined text of all spans.
    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Text(s) => Some(s.text.as_str()),
                Inline::Image(_) => None,
            })
            .collect()
    }

    /// Iterate over text spans.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.inlines.iter().filter_map(|i| match i {
            Inline::Text(s) => Some(s),
            Inline::Image(_) => None,
        })
    }

    /// Iterate mutably over text spans.
    pub fn spans_mut(&mut self) -> impl Iterator<Item = &mut TextSpan> {
        self.inlines.iter_mut().filter_map(|i| match i {
            Inline::Text(s) => Some(s),
            Inline::Image(_) => None,
        })
    }
}

/// A paragraph-like text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block bounding box
    pub bbox: BBox,
    /// The lines in this block
    pub lines: Vec<TextLine>,
    /// Vertical space above the block
    #[serde(default)]
    pub before_space: f32,
    /// Vertical space below the block
    #[serde(default)]
    pub after_space: f32,
    /// Line pitch inside the block (0 = unknown)
    #[serde(default)]
    pub line_space: f32,
}

impl TextBlock {
    /// Create a text block; the box is the union of the lines.
    pub fn new(lines: Vec<TextLine>) -> Self {
        let boxes: Vec<BBox> = lines.iter().map(|l| l.bbox).collect();
        Self {
            bbox: BBox::union_all(boxes.iter()).unwrap_or_default(),
            lines,
            before_space: 0.0,
            after_space: 0.0,
            line_space: 0.0,
        }
    }

    /// Create a single-line, single-span block.
    pub fn from_text(text: impl Into<String>, bbox: BBox) -> Self {
        let line = TextLine::new(vec![Inline::Text(TextSpan::new(text, bbox))]);
        let mut block = Self::new(vec![line]);
        block.bbox = bbox;
        block
    }

    /// Convert a raw block; `None` for unknown block types.
    pub fn from_raw(raw: &RawBlock) -> Option<Self> {
        let lines = match raw.kind {
            BLOCK_TEXT => raw.lines.iter().map(TextLine::from_raw).collect(),
            BLOCK_IMAGE => vec![TextLine {
                bbox: raw.bbox,
                inlines: vec![Inline::Image(ImageSpan {
                    bbox: raw.bbox,
                    width: raw.width,
                    height: raw.height,
                    ext: raw.ext.clone(),
                })],
            }],
            other => {
                log::warn!("TextBlock: skipping raw block of unknown type {}", other);
                return None;
            }
        };
        Some(Self {
            bbox: raw.bbox,
            lines,
            before_space: 0.0,
            after_space: 0.0,
            line_space: 0.0,
        })
    }

    /// Get the text of all lines, one line per row.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the block carries an image.
    pub fn has_image(&self) -> bool {
        self.lines
            .iter()
            .flat_map(|l| &l.inlines)
            .any(|i| matches!(i, Inline::Image(_)))
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        !self.has_image() && self.text().trim().is_empty()
    }

    /// Recompute the box from the lines.
    pub fn update_bbox(&mut self) {
        let boxes: Vec<BBox> = self.lines.iter().map(|l| l.bbox).collect();
        if let Some(b) = BBox::union_all(boxes.iter()) {
            self.bbox = b;
        }
    }

    /// Build the output paragraph, indented relative to `reference`.
    pub fn to_paragraph(&self, reference: &BBox) -> Paragraph {
        let mut p = Paragraph::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                p.add_run(Run::LineBreak);
            }
            for inline in &line.inlines {
                match inline {
                    Inline::Text(span) => p.add_run(Run::Text(span.to_run())),
                    Inline::Image(img) => p.add_run(Run::Image {
                        width: img.bbox.width(),
                        height: img.bbox.height(),
                        ext: img.ext.clone(),
                    }),
                }
            }
        }
        p.format = ParagraphFormat {
            space_before: self.before_space.max(0.0),
            space_after: self.after_space.max(0.0),
            line_spacing: (self.line_space > 0.0).then_some(self.line_space),
            indent_left: (self.bbox.x0 - reference.x0).max(0.0),
        };
        p
    }
}

/// How a table was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Structure inferred from border and shading rectangles
    Explicit,
    /// Structure synthesized from aligned, border-less blocks
    Implicit,
}

/// A table cell holding nested blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell bounding box
    pub bbox: BBox,
    /// Background shading color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading: Option<u32>,
    /// Nested blocks in reading order
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Create an empty cell.
    pub fn new(bbox: BBox) -> Self {
        Self {
            bbox,
            shading: None,
            blocks: Vec::new(),
        }
    }

    /// Get the text of all nested blocks.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| match b {
                Block::Text(t) => t.text(),
                Block::Table(t) => t
                    .text()
                    .iter()
                    .map(|row| row.join("\t"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Table bounding box
    pub bbox: BBox,
    /// Recognition method
    pub kind: TableKind,
    /// Vertical space above the table
    #[serde(default)]
    pub before_space: f32,
    /// Column boundaries, left to right (`cols + 1` values)
    pub col_bounds: Vec<f32>,
    /// Row boundaries, top to bottom (`rows + 1` values)
    pub row_bounds: Vec<f32>,
    /// Cells indexed `[row][col]`
    pub cells: Vec<Vec<TableCell>>,
}

impl TableBlock {
    /// Create a table with empty cells from row and column boundaries.
    pub fn new(kind: TableKind, col_bounds: Vec<f32>, row_bounds: Vec<f32>) -> Self {
        let cells = row_bounds
            .windows(2)
            .map(|ys| {
                col_bounds
                    .windows(2)
                    .map(|xs| TableCell::new(BBox::new(xs[0], ys[0], xs[1], ys[1])))
                    .collect()
            })
            .collect();
        let bbox = match (col_bounds.first(), col_bounds.last(), row_bounds.first(), row_bounds.last()) {
            (Some(&x0), Some(&x1), Some(&y0), Some(&y1)) => BBox::new(x0, y0, x1, y1),
            _ => BBox::default(),
        };
        Self {
            bbox,
            kind,
            before_space: 0.0,
            col_bounds,
            row_bounds,
            cells,
        }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.cells.len()
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.cells.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Column widths derived from the boundaries.
    pub fn col_widths(&self) -> Vec<f32> {
        self.col_bounds.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Row heights derived from the boundaries.
    pub fn row_heights(&self) -> Vec<f32> {
        self.row_bounds.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Whether the table was recognized from borders.
    pub fn is_explicit(&self) -> bool {
        self.kind == TableKind::Explicit
    }

    /// Text grid of the table.
    pub fn text(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(TableCell::text).collect())
            .collect()
    }

    /// Get a mutable cell.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(col))
    }
}

/// A content block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph-like text region
    Text(TextBlock),
    /// A table region
    Table(TableBlock),
}

impl Block {
    /// Bounding box of the block.
    pub fn bbox(&self) -> BBox {
        match self {
            Block::Text(t) => t.bbox,
            Block::Table(t) => t.bbox,
        }
    }

    /// Check if this is a text block.
    pub fn is_text_block(&self) -> bool {
        matches!(self, Block::Text(_))
    }

    /// Check if this is a table block.
    pub fn is_table_block(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Space above the block.
    pub fn before_space(&self) -> f32 {
        match self {
            Block::Text(t) => t.before_space,
            Block::Table(t) => t.before_space,
        }
    }

    /// Set the space above the block.
    pub fn set_before_space(&mut self, space: f32) {
        match self {
            Block::Text(t) => t.before_space = space,
            Block::Table(t) => t.before_space = space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_font_attributes() {
        let mut span = TextSpan::new("x", BBox::new(0.0, 0.0, 5.0, 10.0));
        assert!(!span.is_bold());
        span.font = "Helvetica-BoldOblique".to_string();
        assert!(span.is_bold());
        assert!(span.is_italic());

        let mut flagged = TextSpan::new("y", BBox::new(0.0, 0.0, 5.0, 10.0));
        flagged.flags = FLAG_BOLD;
        assert!(flagged.is_bold());
        assert!(!flagged.is_italic());
    }

    #[test]
    fn test_image_block_from_raw() {
        let raw = RawBlock {
            kind: BLOCK_IMAGE,
            bbox: BBox::new(10.0, 10.0, 110.0, 60.0),
            width: Some(400),
            height: Some(200),
            ext: Some("png".to_string()),
            ..Default::default()
        };
        let block = TextBlock::from_raw(&raw).unwrap();
        assert!(block.has_image());
        assert!(!block.is_empty());

        let p = block.to_paragraph(&BBox::new(0.0, 0.0, 600.0, 800.0));
        assert!(matches!(p.runs[0], Run::Image { width, .. } if width == 100.0));
    }

    #[test]
    fn test_unknown_block_type() {
        let raw = RawBlock {
            kind: 7,
            ..Default::default()
        };
        assert!(TextBlock::from_raw(&raw).is_none());
    }

    #[test]
    fn test_to_paragraph_format() {
        let mut block = TextBlock::from_text("Hello", BBox::new(100.0, 50.0, 200.0, 62.0));
        block.before_space = 12.0;
        block.line_space = 14.0;
        block.lines[0].spans_mut().for_each(|s| {
            s.add_style(SpanStyle::Underline(0));
        });

        let p = block.to_paragraph(&BBox::new(72.0, 36.0, 540.0, 756.0));
        assert_eq!(p.plain_text(), "Hello");
        assert_eq!(p.format.space_before, 12.0);
        assert_eq!(p.format.line_spacing, Some(14.0));
        assert_eq!(p.format.indent_left, 28.0);
        match &p.runs[0] {
            Run::Text(run) => assert!(run.style.underline),
            other => panic!("unexpected run {:?}", other),
        }
    }

    #[test]
    fn test_table_block_grid() {
        let table = TableBlock::new(
            TableKind::Explicit,
            vec![0.0, 50.0, 120.0],
            vec![10.0, 30.0, 60.0],
        );
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_cols(), 2);
        assert_eq!(table.bbox, BBox::new(0.0, 10.0, 120.0, 60.0));
        assert_eq!(table.col_widths(), vec![50.0, 70.0]);
        assert_eq!(table.row_heights(), vec![20.0, 30.0]);
        assert_eq!(table.cells[1][1].bbox, BBox::new(50.0, 30.0, 120.0, 60.0));
    }

    #[test]
    fn test_empty_bounds_table() {
        let table = TableBlock::new(TableKind::Implicit, vec![], vec![]);
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_cols(), 0);
    }

    #[test]
    fn test_add_style_dedup() {
        let mut span = TextSpan::new("x", BBox::new(0.0, 0.0, 5.0, 10.0));
        assert!(span.add_style(SpanStyle::Highlight(0xFFFF00)));
        assert!(!span.add_style(SpanStyle::Highlight(0xFFFF00)));
        assert_eq!(span.style.len(), 1);
    }
}
