//! The ordered block collection of a page.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::BBox;

use super::block::{Block, Inline, SpanStyle, TableBlock, TableKind, TextBlock, TextSpan};
use super::options::TextFormatOptions;
use super::raw::RawBlock;
use super::shape::{ShapeKind, ShapeSet};
use super::text::normalize_span_text;

/// Highlights taller than this multiple of the span height are backgrounds.
const MAX_HIGHLIGHT_RATIO: f32 = 2.0;

/// Content blocks of a page in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockSet {
    blocks: Vec<Block>,
}

impl BlockSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw block dictionaries, skipping unknown block types.
    pub fn from_raw(raw: &[RawBlock]) -> Self {
        Self {
            blocks: raw
                .iter()
                .filter_map(TextBlock::from_raw)
                .map(Block::Text)
                .collect(),
        }
    }

    /// Add a block at the end.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over blocks in reading order.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Iterate mutably over blocks.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Block> {
        self.blocks.iter_mut()
    }

    /// Get a block by index.
    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// The last block.
    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Blocks as a slice.
    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    /// Text blocks at page level.
    pub fn text_blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Text(t) => Some(t),
            Block::Table(_) => None,
        })
    }

    /// Table blocks at page level.
    pub fn table_blocks(&self) -> impl Iterator<Item = &TableBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Text(_) => None,
        })
    }

    /// Tables recognized from borders.
    pub fn explicit_table_blocks(&self) -> impl Iterator<Item = &TableBlock> {
        self.table_blocks().filter(|t| t.kind == TableKind::Explicit)
    }

    /// Tables synthesized from aligned blocks.
    pub fn implicit_table_blocks(&self) -> impl Iterator<Item = &TableBlock> {
        self.table_blocks().filter(|t| t.kind == TableKind::Implicit)
    }

    /// Replace a contiguous run of blocks with one block.
    ///
    /// An empty range inserts the block at `range.start`.
    pub fn replace_range(&mut self, range: Range<usize>, block: Block) {
        let start = range.start.min(self.blocks.len());
        let end = range.end.clamp(start, self.blocks.len());
        self.blocks.splice(start..end, std::iter::once(block));
    }

    /// Remove the blocks at `indices` and put `block` where the first one was.
    ///
    /// Indices out of range are ignored; an empty list appends the block.
    pub fn replace_indices(&mut self, indices: &[usize], block: Block) {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.blocks.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        let Some(&first) = sorted.first() else {
            self.blocks.push(block);
            return;
        };
        for &i in sorted.iter().rev() {
            self.blocks.remove(i);
        }
        self.blocks.insert(first, block);
    }

    /// Insert a block before the first block starting below it.
    pub fn insert_by_position(&mut self, block: Block) {
        let y0 = block.bbox().y0;
        let index = self
            .blocks
            .iter()
            .position(|b| b.bbox().y0 > y0)
            .unwrap_or(self.blocks.len());
        self.blocks.insert(index, block);
    }

    /// Clean blocks against the page box.
    ///
    /// Normalizes span text, drops spans with malformed boxes, empty lines
    /// and empty blocks, clips block boxes to the page, drops blocks
    /// outside it and sorts the rest top-down, left-right.
    /// Returns whether anything changed.
    pub fn clean(&mut self, page_bbox: &BBox) -> bool {
        let before = self.blocks.clone();

        let mut kept: Vec<Block> = Vec::with_capacity(self.blocks.len());
        for block in self.blocks.drain(..) {
            match block {
                Block::Text(mut text) => {
                    if clean_text_block(&mut text, page_bbox) {
                        kept.push(Block::Text(text));
                    }
                }
                Block::Table(mut table) => match table.bbox.intersection(page_bbox) {
                    Some(b) if table.bbox.is_well_formed() => {
                        table.bbox = b;
                        kept.push(Block::Table(table));
                    }
                    _ => log::warn!("BlockSet: dropping table outside the page {:?}", table.bbox),
                },
            }
        }

        kept.sort_by(|a, b| {
            let (a, b) = (a.bbox(), b.bbox());
            a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0))
        });
        self.blocks = kept;

        let changed = self.blocks != before;
        if changed {
            log::debug!(
                "BlockSet: cleaned {} -> {} blocks",
                before.len(),
                self.blocks.len()
            );
        }
        changed
    }

    /// Match unclassified shapes to text spans as highlight, underline or
    /// strike-through, including spans nested in table cells.
    ///
    /// Matched shapes are tagged with the style kind. Returns whether any
    /// style was added.
    pub fn parse_text_format(&mut self, shapes: &mut ShapeSet, options: &TextFormatOptions) -> bool {
        let candidates: Vec<usize> = shapes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_undefined())
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return false;
        }

        let mut matched: Vec<(usize, ShapeKind)> = Vec::new();
        let mut changed = false;
        for_each_span(&mut self.blocks, &mut |span: &mut TextSpan| {
            for &index in &candidates {
                let Some(shape) = shapes.get(index) else {
                    continue;
                };
                if let Some(style) = classify_style(&span.bbox, &shape.bbox, shape.color, options) {
                    changed |= span.add_style(style);
                    matched.push((index, style_kind(style)));
                }
            }
        });

        for (index, kind) in matched {
            shapes.set_kind(index, kind);
        }
        if changed {
            log::debug!("BlockSet: text styles matched from shapes");
        }
        changed
    }

    /// Compute the space above each block and the line pitch of text blocks.
    ///
    /// The first block is measured from the top of `reference`; table cells
    /// are measured against their own boxes.
    pub fn parse_vertical_spacing(&mut self, reference: &BBox) {
        vertical_spacing(&mut self.blocks, reference);
    }
}

impl<'a> IntoIterator for &'a BlockSet {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl FromIterator<Block> for BlockSet {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Self {
            blocks: iter.into_iter().collect(),
        }
    }
}

/// Clean one text block in place; returns whether it should be kept.
fn clean_text_block(block: &mut TextBlock, page: &BBox) -> bool {
    for line in &mut block.lines {
        line.inlines.retain_mut(|inline| match inline {
            Inline::Text(span) => {
                if !span.bbox.is_well_formed() || span.bbox.intersection(page).is_none() {
                    log::warn!("BlockSet: dropping malformed span {:?}", span.bbox);
                    return false;
                }
                span.text = normalize_span_text(&span.text);
                !span.text.is_empty()
            }
            Inline::Image(image) => image.bbox.is_valid(),
        });
        if !line.bbox.is_well_formed() {
            let boxes: Vec<BBox> = line.inlines.iter().map(Inline::bbox).collect();
            line.bbox = BBox::union_all(boxes.iter()).unwrap_or_default();
        }
    }
    block.lines.retain(|l| !l.inlines.is_empty());

    if block.is_empty() {
        return false;
    }
    if !block.bbox.is_well_formed() {
        block.update_bbox();
    }
    match block.bbox.intersection(page) {
        Some(b) => {
            block.bbox = b;
            true
        }
        None => {
            log::debug!("BlockSet: dropping off-page block {:?}", block.bbox);
            false
        }
    }
}

fn for_each_span(blocks: &mut [Block], f: &mut impl FnMut(&mut TextSpan)) {
    for block in blocks {
        match block {
            Block::Text(text) => {
                for line in &mut text.lines {
                    line.spans_mut().for_each(&mut *f);
                }
            }
            Block::Table(table) => {
                for cell in table.cells.iter_mut().flatten() {
                    for_each_span(&mut cell.blocks, f);
                }
            }
        }
    }
}

/// Decide which style, if any, a shape applies to a span.
fn classify_style(
    span: &BBox,
    shape: &BBox,
    color: u32,
    options: &TextFormatOptions,
) -> Option<SpanStyle> {
    let h = span.height();
    if h <= 0.0 || span.width() <= 0.0 {
        return None;
    }
    let overlap = span.horizontal_overlap(shape);
    if overlap <= 0.5 * span.width().min(shape.width()) {
        return None;
    }

    let thickness = shape.height();
    if thickness <= options.max_line_thickness * h && shape.width() > thickness {
        let (_, cy) = shape.center();
        let position = (cy - span.y0) / h;
        return if (0.7..=1.1).contains(&position) {
            Some(SpanStyle::Underline(color))
        } else if (0.35..0.65).contains(&position) {
            Some(SpanStyle::Strike(color))
        } else {
            None
        };
    }

    if thickness > MAX_HIGHLIGHT_RATIO * h {
        return None;
    }
    let covered = span.intersection(shape).map(|b| b.area()).unwrap_or(0.0);
    (covered >= options.min_highlight_coverage * span.area()).then_some(SpanStyle::Highlight(color))
}

fn style_kind(style: SpanStyle) -> ShapeKind {
    match style {
        SpanStyle::Highlight(_) => ShapeKind::Highlight,
        SpanStyle::Underline(_) => ShapeKind::Underline,
        SpanStyle::Strike(_) => ShapeKind::Strike,
    }
}

fn vertical_spacing(blocks: &mut [Block], reference: &BBox) {
    let mut prev_bottom = reference.y0;
    for block in blocks {
        let bbox = block.bbox();
        block.set_before_space((bbox.y0 - prev_bottom).max(0.0));
        prev_bottom = prev_bottom.max(bbox.y1);

        match block {
            Block::Text(text) => text.line_space = line_pitch(text),
            Block::Table(table) => {
                for cell in table.cells.iter_mut().flatten() {
                    let cell_box = cell.bbox;
                    vertical_spacing(&mut cell.blocks, &cell_box);
                }
            }
        }
    }
}

/// Mean distance between consecutive line tops, or the line height.
fn line_pitch(block: &TextBlock) -> f32 {
    match (block.lines.first(), block.lines.last()) {
        (Some(first), Some(last)) if block.lines.len() > 1 => {
            let pitch = (last.bbox.y0 - first.bbox.y0) / (block.lines.len() - 1) as f32;
            if pitch > 0.0 {
                pitch
            } else {
                first.bbox.height().max(0.0)
            }
        }
        (Some(first), _) => first.bbox.height().max(0.0),
        _ => 0.0,
    }
}
