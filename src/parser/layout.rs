//! Page layout reconstruction.
//!
//! A [`PageLayout`] owns one page's blocks and shapes and rebuilds its
//! structure in five stages:
//!
//! 1. `clean`: sanitize geometry and infer the page margin
//! 2. `parse_explicit_tables`: tables from border shapes
//! 3. `parse_implicit_tables`: single-row tables from aligned blocks
//! 4. `parse_text_format`: highlight, underline and strike-through cues
//! 5. `parse_vertical_spacing`: space above blocks and line pitch
//!
//! The result is emitted to a [`DocumentSink`] by [`PageLayout::make_page`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BBox, Element, Margin, Paragraph, ParagraphFormat, Table};
use crate::render::plot::{LayoutObserver, NoopObserver, PlotCategory, PlotFrame, PlotItem};
use crate::render::sink::{DocumentSink, TableHandle};

use super::block::{Block, TableBlock, TableKind};
use super::blocks::BlockSet;
use super::options::LayoutOptions;
use super::raw::RawPage;
use super::shape::ShapeSet;
use super::table_detector::TableConstructor;

/// Line spacing of the paragraph placed after a page-final table.
const TRAILING_LINE_SPACING: f32 = 1.0;

/// Plain snapshot of a page layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Inferred margin, `null` before cleaning
    pub margin: Option<Margin>,
    /// Blocks in reading order
    pub blocks: BlockSet,
    /// Shapes with their recognized roles
    pub shapes: ShapeSet,
}

/// The layout of one page.
#[derive(Debug, Clone)]
pub struct PageLayout {
    width: f32,
    height: f32,
    margin: Option<Margin>,
    blocks: BlockSet,
    shapes: ShapeSet,
    options: LayoutOptions,
}

impl PageLayout {
    /// Create an empty page layout.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            margin: None,
            blocks: BlockSet::new(),
            shapes: ShapeSet::new(),
            options: LayoutOptions::default(),
        }
    }

    /// Create a page layout from a raw page dictionary.
    pub fn from_raw(raw: &RawPage) -> Self {
        Self {
            blocks: BlockSet::from_raw(&raw.blocks),
            shapes: ShapeSet::from_raw(&raw.shapes),
            ..Self::new(raw.width, raw.height)
        }
    }

    /// Parse a raw page dictionary from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_raw(&RawPage::from_json(json)?))
    }

    /// Replace the layout options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the blocks.
    pub fn with_blocks(mut self, blocks: BlockSet) -> Self {
        self.blocks = blocks;
        self
    }

    /// Replace the shapes.
    pub fn with_shapes(mut self, shapes: ShapeSet) -> Self {
        self.shapes = shapes;
        self
    }

    /// Page width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Page height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Inferred margin; `None` until [`clean`](Self::clean) has run.
    pub fn margin(&self) -> Option<Margin> {
        self.margin
    }

    /// Content box `(left, top, width - right, height - bottom)`.
    ///
    /// All zeros while the margin is unset.
    pub fn bbox_raw(&self) -> BBox {
        match self.margin {
            Some(m) => m.content_box(self.width, self.height),
            None => BBox::default(),
        }
    }

    /// The page blocks.
    pub fn blocks(&self) -> &BlockSet {
        &self.blocks
    }

    /// The page shapes.
    pub fn shapes(&self) -> &ShapeSet {
        &self.shapes
    }

    /// The layout options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    fn page_bbox(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    fn require_margin(&self) -> Result<Margin> {
        self.margin.ok_or(Error::MarginUnset)
    }

    /// Run the full pipeline.
    pub fn parse(&mut self) -> Result<()> {
        self.parse_with(&mut NoopObserver)
    }

    /// Run the full pipeline, reporting each stage to `observer`.
    pub fn parse_with(&mut self, observer: &mut dyn LayoutObserver) -> Result<()> {
        self.clean();
        self.plot(observer, "Clean Blocks and Shapes", PlotCategory::Shapes);

        self.parse_explicit_tables();
        self.plot(observer, "Explicit Table Structure", PlotCategory::ExplicitTable);

        self.parse_implicit_tables()?;
        self.plot(observer, "Implicit Table Structure", PlotCategory::ImplicitTable);

        self.parse_text_format();
        self.plot(observer, "Parsed Text Blocks", PlotCategory::Layout);

        self.parse_vertical_spacing()
    }

    /// Clean blocks and shapes, then infer the page margin.
    ///
    /// Returns whether the blocks or shapes changed.
    pub fn clean(&mut self) -> bool {
        for (name, value) in [("width", &mut self.width), ("height", &mut self.height)] {
            if !value.is_finite() || *value < 0.0 {
                log::warn!("PageLayout: invalid page {} {}, using 0", name, value);
                *value = 0.0;
            }
        }

        let page_bbox = self.page_bbox();
        let blocks_changed = self.blocks.clean(&page_bbox);
        let shapes_changed = self.shapes.clean(&page_bbox);

        let margin = self.page_margin();
        log::debug!("PageLayout: margin {:?}", margin);
        self.margin = Some(margin);

        blocks_changed || shapes_changed
    }

    /// Build tables from border shapes. Returns whether any was found.
    pub fn parse_explicit_tables(&mut self) -> bool {
        TableConstructor::new(&mut self.blocks, &mut self.shapes, &self.options.table)
            .explicit_tables()
            > 0
    }

    /// Build single-row tables from aligned blocks within the content width.
    ///
    /// Returns whether any was found.
    pub fn parse_implicit_tables(&mut self) -> Result<bool> {
        let margin = self.require_margin()?;
        let (x0, x1) = (margin.left, self.width - margin.right);
        let count = TableConstructor::new(&mut self.blocks, &mut self.shapes, &self.options.table)
            .implicit_tables(x0, x1);
        Ok(count > 0)
    }

    /// Match shapes to text styles on the page and in table cells.
    pub fn parse_text_format(&mut self) -> bool {
        self.blocks
            .parse_text_format(&mut self.shapes, &self.options.text)
    }

    /// Compute vertical spacing relative to the content box.
    pub fn parse_vertical_spacing(&mut self) -> Result<()> {
        self.require_margin()?;
        let reference = self.bbox_raw();
        self.blocks.parse_vertical_spacing(&reference);
        Ok(())
    }

    /// Infer the page margin from the current blocks and shapes.
    ///
    /// Raw extents are taken first; the right margin is then limited to the
    /// left one, top and bottom are halved, and every side is capped at
    /// `max_margin`. Pages without content get `max_margin` on all sides.
    pub fn page_margin(&self) -> Margin {
        let cap = self.options.max_margin;
        let boxes: Vec<BBox> = self
            .blocks
            .iter()
            .map(Block::bbox)
            .chain(self.shapes.iter().map(|s| s.bbox))
            .collect();

        let margin = match BBox::union_all(boxes.iter()) {
            None => Margin::uniform(cap),
            Some(extent) => {
                let left = extent.x0.max(0.0);
                let right = (self.width - extent.x1 - self.options.right_margin_tolerance)
                    .min(left)
                    .max(0.0);
                let top = extent.y0.max(0.0) * 0.5;
                let bottom = (self.height - extent.y1).max(0.0) * 0.5;
                Margin::new(left.min(cap), right.min(cap), top.min(cap), bottom.min(cap))
            }
        };
        fit_margin(margin, self.width, self.height)
    }

    /// Emit this page as a new section of `sink`.
    pub fn make_page(&self, sink: &mut dyn DocumentSink) -> Result<()> {
        let margin = self.require_margin()?;
        sink.new_section(self.width, self.height, margin);

        let reference = self.bbox_raw();
        for block in &self.blocks {
            match block {
                Block::Text(text) => {
                    sink.add_paragraph(text.to_paragraph(&reference))?;
                }
                Block::Table(table) => self.make_table(sink, table, &margin)?,
            }
        }

        // renderers add their own paragraph after a page-final table
        if matches!(self.blocks.last(), Some(Block::Table(_))) {
            let handle = sink.add_paragraph(Paragraph::filler())?;
            sink.set_paragraph_spacing(handle, 0.0, 0.0, Some(TRAILING_LINE_SPACING))?;
        }
        Ok(())
    }

    fn make_table(&self, sink: &mut dyn DocumentSink, table: &TableBlock, margin: &Margin) -> Result<()> {
        let Some(built) = build_table(table, (table.bbox.x0 - margin.left).max(0.0)) else {
            return Ok(());
        };

        if let Some(spacer) = spacer_paragraph(table.before_space) {
            let format = spacer.format;
            let handle = sink.add_paragraph(spacer)?;
            sink.set_paragraph_spacing(handle, format.space_before, format.space_after, format.line_spacing)?;
        }

        let handle: TableHandle = sink.add_table(built.row_count(), built.column_count())?;
        sink.set_table_geometry(handle, built.column_widths, built.row_heights, built.indent)?;
        for (r, (row, source)) in built.rows.into_iter().zip(&table.cells).enumerate() {
            for (c, (cell, source)) in row.cells.into_iter().zip(source).enumerate() {
                sink.set_cell_content(handle, r, c, cell.content)?;
                if let Some(rgb) = source.shading {
                    sink.set_cell_shading(handle, r, c, rgb)?;
                }
            }
        }
        Ok(())
    }

    /// Snapshot of the current state.
    pub fn store(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            width: self.width,
            height: self.height,
            margin: self.margin,
            blocks: self.blocks.clone(),
            shapes: self.shapes.clone(),
        }
    }

    /// Write the pretty-printed snapshot to `path`.
    pub fn serialize(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.store())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Clean the page, detect bordered tables and return their text grids.
    pub fn extract_tables(&mut self) -> Vec<Vec<Vec<String>>> {
        self.clean();
        self.parse_explicit_tables();
        self.blocks.table_blocks().map(TableBlock::text).collect()
    }

    /// Report the objects of `category` to `observer`.
    ///
    /// Nothing is reported when the observer is disabled or there is
    /// nothing to show.
    pub fn plot(&self, observer: &mut dyn LayoutObserver, title: &str, category: PlotCategory) {
        if !observer.enabled() {
            return;
        }

        let mut items = Vec::new();
        match category {
            PlotCategory::Layout => {
                for block in &self.blocks {
                    let label = match block {
                        Block::Text(_) => "text",
                        Block::Table(t) if t.is_explicit() => "explicit_table",
                        Block::Table(_) => "implicit_table",
                    };
                    items.push(PlotItem::new(block.bbox(), label));
                }
            }
            PlotCategory::ExplicitTable => {
                for table in self.blocks.explicit_table_blocks() {
                    table_items(table, true, &mut items);
                }
            }
            PlotCategory::ImplicitTable => {
                for table in self.blocks.implicit_table_blocks() {
                    table_items(table, false, &mut items);
                }
            }
            PlotCategory::Shapes => {
                for shape in &self.shapes {
                    items.push(PlotItem::new(shape.bbox, shape.kind.as_str()).with_color(shape.color));
                }
            }
        }
        if items.is_empty() {
            return;
        }

        observer.on_stage(&PlotFrame {
            title: title.to_string(),
            category,
            width: self.width,
            height: self.height,
            margin: self.margin,
            items,
        });
    }
}

/// Shrink margins that do not fit the page, keeping their proportions.
fn fit_margin(margin: Margin, width: f32, height: f32) -> Margin {
    let scale = |a: f32, b: f32, size: f32| {
        if a + b <= size {
            (a, b)
        } else if size <= 0.0 {
            (0.0, 0.0)
        } else {
            let k = size / (a + b);
            (a * k, b * k)
        }
    };
    let (left, right) = scale(margin.left, margin.right, width);
    let (top, bottom) = scale(margin.top, margin.bottom, height);
    Margin::new(left, right, top, bottom)
}

/// Height of the spacer paragraph above a table, rounded to 0.1pt.
fn spacer_height(before_space: f32) -> Option<f32> {
    (before_space > 0.0).then(|| (before_space / 2.0 * 10.0).round() / 10.0)
}

/// Filler paragraph holding the space above a table.
fn spacer_paragraph(before_space: f32) -> Option<Paragraph> {
    spacer_height(before_space).map(|h| {
        let mut spacer = Paragraph::filler();
        spacer.format = ParagraphFormat {
            space_before: h.max(0.0),
            space_after: 0.0,
            line_spacing: Some(h),
            indent_left: 0.0,
        };
        spacer
    })
}

/// Build the document table of `table` with its cells filled.
///
/// Tables without cells or with rows of unequal length are skipped.
fn build_table(table: &TableBlock, indent: f32) -> Option<Table> {
    let (rows, cols) = (table.num_rows(), table.num_cols());
    if rows == 0 || cols == 0 || table.cells.iter().any(|row| row.len() != cols) {
        log::warn!(
            "PageLayout: skipping malformed {}x{} table at {:?}",
            rows,
            cols,
            table.bbox
        );
        return None;
    }

    let mut out = Table::new(rows, cols);
    out.column_widths = table.col_widths();
    out.row_heights = table.row_heights();
    out.indent = indent;
    for (target_row, row) in out.rows.iter_mut().zip(&table.cells) {
        for (target, cell) in target_row.cells.iter_mut().zip(row) {
            target.content = blocks_to_elements(&cell.blocks, &cell.bbox);
            if let Some(rgb) = cell.shading {
                *target = std::mem::take(target).with_shading(rgb);
            }
        }
    }
    Some(out)
}

/// Convert nested cell blocks into document elements.
fn blocks_to_elements(blocks: &[Block], reference: &BBox) -> Vec<Element> {
    let mut elements = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Text(text) => elements.push(Element::Paragraph(text.to_paragraph(reference))),
            Block::Table(table) => {
                let Some(built) = build_table(table, (table.bbox.x0 - reference.x0).max(0.0)) else {
                    continue;
                };
                elements.extend(spacer_paragraph(table.before_space).map(Element::Paragraph));
                elements.push(Element::Table(built));
            }
        }
    }
    elements
}

fn table_items(table: &TableBlock, styled: bool, items: &mut Vec<PlotItem>) {
    let label = match table.kind {
        TableKind::Explicit => "explicit_table",
        TableKind::Implicit => "implicit_table",
    };
    items.push(PlotItem::new(table.bbox, label));
    for cell in table.cells.iter().flatten() {
        let item = PlotItem::new(cell.bbox, "cell");
        items.push(match cell.shading {
            Some(rgb) if styled => item.with_color(rgb),
            _ => item,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Run, ONE_INCH};
    use crate::parser::block::TextBlock;
    use crate::parser::shape::Shape;
    use crate::render::plot::PlotRecorder;
    use crate::render::sink::DocumentBuilder;

    fn text(s: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Block {
        Block::Text(TextBlock::from_text(s, BBox::new(x0, y0, x1, y1)))
    }

    fn layout(width: f32, height: f32, blocks: Vec<Block>, shapes: Vec<Shape>) -> PageLayout {
        let mut set = ShapeSet::new();
        for s in shapes {
            set.push(s);
        }
        PageLayout::new(width, height)
            .with_blocks(blocks.into_iter().collect())
            .with_shapes(set)
    }

    fn build(layout: &PageLayout) -> Document {
        let mut builder = DocumentBuilder::new();
        layout.make_page(&mut builder).unwrap();
        builder.finish()
    }

    fn grid_page() -> PageLayout {
        layout(
            600.0,
            800.0,
            vec![
                text("A", 110.0, 110.0, 150.0, 122.0),
                text("B", 210.0, 110.0, 250.0, 122.0),
                text("C", 110.0, 160.0, 150.0, 172.0),
                text("D", 210.0, 160.0, 250.0, 172.0),
            ],
            vec![
                Shape::new(BBox::new(100.0, 100.0, 300.0, 200.0), 0),
                Shape::new(BBox::new(100.0, 149.5, 300.0, 150.5), 0),
                Shape::new(BBox::new(199.5, 100.0, 200.5, 200.0), 0),
            ],
        )
    }

    #[test]
    fn test_margin_unset_before_clean() {
        let mut page = layout(600.0, 800.0, vec![], vec![]);
        assert_eq!(page.margin(), None);
        assert_eq!(page.bbox_raw(), BBox::default());
        assert!(matches!(page.parse_implicit_tables(), Err(Error::MarginUnset)));
        assert!(matches!(page.parse_vertical_spacing(), Err(Error::MarginUnset)));

        let mut builder = DocumentBuilder::new();
        assert!(matches!(page.make_page(&mut builder), Err(Error::MarginUnset)));
    }

    #[test]
    fn test_default_margin_for_empty_page() {
        let mut page = layout(600.0, 800.0, vec![], vec![]);
        page.clean();
        assert_eq!(page.margin(), Some(Margin::uniform(ONE_INCH)));
    }

    #[test]
    fn test_scenario_two_blocks() {
        let mut page = layout(
            800.0,
            600.0,
            vec![
                text("first", 100.0, 100.0, 700.0, 150.0),
                text("second", 100.0, 500.0, 700.0, 550.0),
            ],
            vec![],
        );
        page.parse().unwrap();

        let margin = page.margin().unwrap();
        assert_eq!(margin, Margin::new(72.0, 72.0, 50.0, 25.0));

        let doc = build(&page);
        let section = doc.section(0).unwrap();
        assert_eq!(section.paragraphs().count(), 2);
        assert_eq!(section.tables().count(), 0);
        assert_eq!(section.margin, margin);
    }

    #[test]
    fn test_right_margin_limited_by_left() {
        let mut page = layout(600.0, 800.0, vec![text("x", 20.0, 100.0, 100.0, 112.0)], vec![]);
        page.clean();
        let margin = page.margin().unwrap();
        assert_eq!(margin.left, 20.0);
        assert_eq!(margin.right, 20.0);
    }

    #[test]
    fn test_right_margin_tolerance() {
        let mut page = layout(600.0, 800.0, vec![text("x", 50.0, 100.0, 560.0, 112.0)], vec![]);
        page.clean();
        // 600 - 560 - 10
        assert_eq!(page.margin().unwrap().right, 30.0);

        let mut page = layout(600.0, 800.0, vec![text("x", 50.0, 100.0, 595.0, 112.0)], vec![]);
        page.clean();
        assert_eq!(page.margin().unwrap().right, 0.0);
    }

    #[test]
    fn test_margin_bounds() {
        let sizes = [(600.0, 800.0), (100.0, 50.0), (10.0, 10.0), (0.0, 0.0)];
        let boxes = [
            BBox::new(0.0, 0.0, 5.0, 5.0),
            BBox::new(3.0, 2.0, 8.0, 9.0),
            BBox::new(300.0, 400.0, 310.0, 410.0),
            BBox::new(-50.0, -50.0, 900.0, 900.0),
        ];
        for &(w, h) in &sizes {
            for b in &boxes {
                let mut page = layout(w, h, vec![], vec![Shape::new(*b, 0)]);
                page.clean();
                let m = page.margin().unwrap();
                for side in [m.left, m.right, m.top, m.bottom] {
                    assert!((0.0..=ONE_INCH).contains(&side), "{:?} on {}x{}", m, w, h);
                }
                assert!(m.right <= m.left);
                assert!(m.left + m.right <= w.max(0.0) + 1e-3);
                assert!(m.top + m.bottom <= h.max(0.0) + 1e-3);
            }
        }
    }

    #[test]
    fn test_tiny_page_margin_fits() {
        let mut page = layout(50.0, 40.0, vec![], vec![]);
        page.clean();
        let m = page.margin().unwrap();
        assert!((m.left - 25.0).abs() < 1e-3);
        assert!((m.right - 25.0).abs() < 1e-3);
        assert!((m.top - 20.0).abs() < 1e-3);
        assert!((m.bottom - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_page_size_sanitized() {
        let mut page = layout(f32::NAN, -10.0, vec![text("x", 0.0, 0.0, 10.0, 10.0)], vec![]);
        page.clean();
        assert_eq!(page.width(), 0.0);
        assert_eq!(page.height(), 0.0);
        assert_eq!(page.margin(), Some(Margin::uniform(0.0)));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let mut page = layout(
            600.0,
            800.0,
            vec![
                text("b", 100.0, 300.0, 200.0, 312.0),
                text("a", -10.0, 100.0, 200.0, 112.0),
            ],
            vec![Shape::new(BBox::new(10.0, 10.0, 20.0, 20.0), 0)],
        );
        assert!(page.clean());
        let margin = page.margin();
        let counts = (page.blocks().len(), page.shapes().len());

        assert!(!page.clean());
        assert_eq!(page.margin(), margin);
        assert_eq!((page.blocks().len(), page.shapes().len()), counts);
    }

    #[test]
    fn test_scenario_explicit_grid() {
        let mut page = grid_page();
        page.clean();
        assert!(page.parse_explicit_tables());

        assert_eq!(page.blocks().len(), 1);
        let table = page.blocks().table_blocks().next().unwrap();
        assert_eq!((table.num_rows(), table.num_cols()), (2, 2));
        assert_eq!(table.text(), vec![vec!["A", "B"], vec!["C", "D"]]);
    }

    #[test]
    fn test_scenario_implicit_band() {
        let mut page = layout(
            600.0,
            800.0,
            vec![
                text("one", 72.0, 100.0, 150.0, 112.0),
                text("two", 200.0, 100.0, 300.0, 112.0),
                text("three", 350.0, 100.0, 500.0, 112.0),
            ],
            vec![],
        );
        page.clean();
        assert!(page.parse_implicit_tables().unwrap());

        assert_eq!(page.blocks().len(), 1);
        let table = page.blocks().implicit_table_blocks().next().unwrap();
        assert_eq!((table.num_rows(), table.num_cols()), (1, 3));
    }

    #[test]
    fn test_scenario_lone_table_gets_trailing_filler() {
        let table = TableBlock::new(TableKind::Explicit, vec![72.0, 200.0, 300.0], vec![72.0, 100.0]);
        let mut page = layout(600.0, 800.0, vec![Block::Table(table)], vec![]);
        page.clean();

        let doc = build(&page);
        let elements = &doc.section(0).unwrap().elements;
        assert_eq!(elements.len(), 2);
        assert!(elements[0].is_table());
        assert!(elements[1].is_filler());
        match &elements[1] {
            Element::Paragraph(p) => assert_eq!(p.format.line_spacing, Some(1.0)),
            other => panic!("unexpected element {:?}", other),
        }
    }

    #[test]
    fn test_spacer_before_table() {
        let mut page = grid_page();
        page.parse().unwrap();

        let doc = build(&page);
        let elements = &doc.section(0).unwrap().elements;
        // spacer, table, trailing filler
        assert_eq!(elements.len(), 3);
        assert!(elements[0].is_filler());
        assert!(elements[1].is_table());
        assert!(elements[2].is_filler());

        // margin top is 50, the table starts at 100
        match &elements[0] {
            Element::Paragraph(p) => {
                assert_eq!(p.format.space_before, 25.0);
                assert_eq!(p.format.space_after, 0.0);
                assert_eq!(p.format.line_spacing, Some(25.0));
            }
            other => panic!("unexpected element {:?}", other),
        }
        match &elements[1] {
            Element::Table(t) => {
                assert!(!t.autofit);
                assert_eq!(t.column_widths, vec![100.0, 100.0]);
                assert_eq!(t.rows[1].cells[0].plain_text(), "C");
            }
            other => panic!("unexpected element {:?}", other),
        }
    }

    #[test]
    fn test_empty_table_skipped() {
        let empty = TableBlock::new(TableKind::Implicit, vec![], vec![]);
        let mut page = layout(
            600.0,
            800.0,
            vec![text("x", 72.0, 72.0, 200.0, 84.0), Block::Table(empty)],
            vec![],
        );
        page.margin = Some(Margin::normal());

        let doc = build(&page);
        let section = doc.section(0).unwrap();
        assert_eq!(section.tables().count(), 0);
        // the page still ends with a table block, so the filler is kept
        assert!(section.elements.last().unwrap().is_filler());
    }

    fn ragged_table() -> TableBlock {
        let mut table = TableBlock::new(
            TableKind::Explicit,
            vec![100.0, 200.0, 300.0],
            vec![120.0, 150.0, 180.0],
        );
        table.cells[0].truncate(1);
        table
    }

    #[test]
    fn test_ragged_table_skipped_and_page_continues() {
        let mut page = layout(
            600.0,
            800.0,
            vec![
                text("before", 100.0, 72.0, 300.0, 84.0),
                Block::Table(ragged_table()),
                text("after", 100.0, 200.0, 300.0, 212.0),
            ],
            vec![],
        );
        page.margin = Some(Margin::normal());

        let doc = build(&page);
        let section = doc.section(0).unwrap();
        assert_eq!(section.tables().count(), 0);
        let texts: Vec<String> = section.paragraphs().map(Paragraph::plain_text).collect();
        assert_eq!(texts, vec!["before".to_string(), "after".to_string()]);
    }

    #[test]
    fn test_ragged_nested_table_skipped() {
        let mut outer = TableBlock::new(TableKind::Explicit, vec![80.0, 320.0], vec![100.0, 200.0]);
        outer.cells[0][0].blocks = vec![
            text("inside", 100.0, 105.0, 300.0, 117.0),
            Block::Table(ragged_table()),
            text("after", 100.0, 185.0, 300.0, 197.0),
        ];
        let mut page = layout(600.0, 800.0, vec![Block::Table(outer)], vec![]);
        page.margin = Some(Margin::normal());

        let doc = build(&page);
        let table = doc.section(0).unwrap().tables().next().unwrap();
        let content = &table.rows[0].cells[0].content;
        assert_eq!(content.len(), 2);
        assert!(content.iter().all(|e| !e.is_table()));
        assert_eq!(table.rows[0].cells[0].plain_text(), "inside after");
    }

    #[test]
    fn test_order_preserved_through_pipeline() {
        let mut page = layout(
            600.0,
            800.0,
            vec![
                text("intro", 100.0, 50.0, 300.0, 62.0),
                text("A", 110.0, 110.0, 150.0, 122.0),
                text("B", 210.0, 110.0, 250.0, 122.0),
                text("C", 110.0, 160.0, 150.0, 172.0),
                text("D", 210.0, 160.0, 250.0, 172.0),
                text("outro", 100.0, 300.0, 300.0, 312.0),
            ],
            vec![
                Shape::new(BBox::new(100.0, 100.0, 300.0, 200.0), 0),
                Shape::new(BBox::new(100.0, 149.5, 300.0, 150.5), 0),
                Shape::new(BBox::new(199.5, 100.0, 200.5, 200.0), 0),
            ],
        );
        page.parse().unwrap();

        let kinds: Vec<bool> = page.blocks().iter().map(Block::is_table_block).collect();
        assert_eq!(kinds, vec![false, true, false]);

        let doc = build(&page);
        let text = doc.plain_text();
        let (intro, a, outro) = (
            text.find("intro").unwrap(),
            text.find('A').unwrap(),
            text.find("outro").unwrap(),
        );
        assert!(intro < a && a < outro);
    }

    #[test]
    fn test_paragraph_indent_from_content_box() {
        let mut page = layout(
            600.0,
            800.0,
            vec![
                text("left", 72.0, 100.0, 300.0, 112.0),
                text("indented", 108.0, 200.0, 300.0, 212.0),
            ],
            vec![],
        );
        page.parse().unwrap();

        let doc = build(&page);
        let paragraphs: Vec<&Paragraph> = doc.section(0).unwrap().paragraphs().collect();
        assert_eq!(paragraphs[0].format.indent_left, 0.0);
        assert_eq!(paragraphs[1].format.indent_left, 36.0);
        assert!(matches!(paragraphs[1].runs[0], Run::Text(_)));
    }

    #[test]
    fn test_store_snapshot() {
        let mut page = grid_page();
        let before = serde_json::to_value(page.store()).unwrap();
        assert!(before["margin"].is_null());

        page.parse().unwrap();
        let after = serde_json::to_value(page.store()).unwrap();
        assert_eq!(after["width"], 600.0);
        assert!(after["margin"].is_array());
        assert_eq!(after["blocks"][0]["type"], "table");
        assert_eq!(after["shapes"][0]["kind"], "border");
    }

    #[test]
    fn test_serialize_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");

        let mut page = grid_page();
        page.parse().unwrap();
        page.serialize(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        let snapshot: LayoutSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.blocks.len(), 1);
        assert_eq!(snapshot.margin, page.margin());
    }

    #[test]
    fn test_extract_tables() {
        let mut page = grid_page();
        let tables = page.extract_tables();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][1], vec!["C", "D"]);
    }

    #[test]
    fn test_plot_stages() {
        let mut page = grid_page();
        let mut recorder = PlotRecorder::new();
        page.parse_with(&mut recorder).unwrap();

        // no implicit tables on this page, so that frame is skipped
        assert_eq!(
            recorder.titles(),
            vec![
                "Clean Blocks and Shapes",
                "Explicit Table Structure",
                "Parsed Text Blocks"
            ]
        );
        let explicit = &recorder.frames()[1];
        assert_eq!(explicit.category, PlotCategory::ExplicitTable);
        assert_eq!(explicit.items.len(), 5);
    }

    #[test]
    fn test_plot_empty_page_is_silent() {
        let mut page = layout(600.0, 800.0, vec![], vec![]);
        let mut recorder = PlotRecorder::new();
        page.parse_with(&mut recorder).unwrap();
        assert!(recorder.frames().is_empty());
    }
}
