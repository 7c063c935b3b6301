//! Table construction from border shapes and from block alignment.
//!
//! Two strategies are available:
//!
//! - **Explicit** tables come from rectangle shapes. Every unclassified
//!   shape is turned into border segments, touching segments are grouped
//!   into clusters and each cluster's coordinates are snapped into row and
//!   column boundaries.
//! - **Implicit** tables come from text blocks that share a vertical band
//!   but do not overlap horizontally. Each such band becomes a single-row
//!   table with one column per block; multi-row inference is not attempted.
//!
//! Both strategies replace the consumed text blocks in place, so the
//! reading order of the block set is preserved.

use std::collections::BTreeMap;

use crate::model::BBox;

use super::block::{Block, Inline, TableBlock, TableKind, TextBlock, TextLine};
use super::blocks::BlockSet;
use super::options::TableOptions;
use super::shape::{ShapeKind, ShapeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Horizontal,
    Vertical,
}

/// A straight border line derived from a shape.
#[derive(Debug, Clone, Copy)]
struct Segment {
    /// Index of the source shape
    shape: usize,
    orientation: Orientation,
    /// y of a horizontal segment, x of a vertical one
    pos: f32,
    start: f32,
    end: f32,
}

impl Segment {
    fn horizontal(shape: usize, y: f32, x0: f32, x1: f32) -> Self {
        Self {
            shape,
            orientation: Orientation::Horizontal,
            pos: y,
            start: x0,
            end: x1,
        }
    }

    fn vertical(shape: usize, x: f32, y0: f32, y1: f32) -> Self {
        Self {
            shape,
            orientation: Orientation::Vertical,
            pos: x,
            start: y0,
            end: y1,
        }
    }

    fn touches(&self, other: &Segment, tolerance: f32) -> bool {
        if self.orientation == other.orientation {
            return (self.pos - other.pos).abs() <= tolerance
                && self.start <= other.end + tolerance
                && other.start <= self.end + tolerance;
        }
        let (h, v) = if self.orientation == Orientation::Horizontal {
            (self, other)
        } else {
            (other, self)
        };
        v.pos >= h.start - tolerance
            && v.pos <= h.end + tolerance
            && h.pos >= v.start - tolerance
            && h.pos <= v.end + tolerance
    }
}

/// Row and column boundaries of one border cluster.
#[derive(Debug, Clone)]
struct Grid {
    shapes: Vec<usize>,
    col_bounds: Vec<f32>,
    row_bounds: Vec<f32>,
}

/// Builds table blocks on a page.
///
/// Borrows the page's blocks and shapes for the duration of a call.
pub struct TableConstructor<'a> {
    blocks: &'a mut BlockSet,
    shapes: &'a mut ShapeSet,
    options: &'a TableOptions,
}

impl<'a> TableConstructor<'a> {
    /// Create a constructor over a page's blocks and shapes.
    pub fn new(blocks: &'a mut BlockSet, shapes: &'a mut ShapeSet, options: &'a TableOptions) -> Self {
        Self {
            blocks,
            shapes,
            options,
        }
    }

    /// Build tables from border shapes. Returns the number of tables built.
    pub fn explicit_tables(&mut self) -> usize {
        let grids = self.find_grids();
        log::debug!("TableConstructor: found {} border grids", grids.len());

        let mut count = 0;
        for grid in grids {
            let mut table = TableBlock::new(
                TableKind::Explicit,
                grid.col_bounds.clone(),
                grid.row_bounds.clone(),
            );
            self.tag_shapes(&grid, &mut table);

            let consumed = self.distribute_blocks(&mut table);
            log::debug!(
                "TableConstructor: explicit table {}x{} at {:?} from {} blocks",
                table.num_rows(),
                table.num_cols(),
                table.bbox,
                consumed.len()
            );
            if consumed.is_empty() {
                self.blocks.insert_by_position(Block::Table(table));
            } else {
                self.blocks.replace_indices(&consumed, Block::Table(table));
            }
            count += 1;
        }
        count
    }

    /// Build single-row tables from horizontally aligned text blocks.
    ///
    /// `x0` and `x1` are the horizontal extent of the content area; they
    /// become the outer column boundaries. Returns the number of tables built.
    pub fn implicit_tables(&mut self, x0: f32, x1: f32) -> usize {
        let mut count = 0;
        let mut start = 0;
        while start < self.blocks.len() {
            let end = self.band_end(start);
            if end - start < 2 {
                start = end.max(start + 1);
                continue;
            }

            let members: Vec<TextBlock> = self.blocks.as_slice()[start..end]
                .iter()
                .filter_map(|b| match b {
                    Block::Text(t) => Some(t.clone()),
                    Block::Table(_) => None,
                })
                .collect();
            let table = band_table(members, x0, x1);
            log::debug!(
                "TableConstructor: implicit table 1x{} at {:?}",
                table.num_cols(),
                table.bbox
            );
            self.blocks.replace_range(start..end, Block::Table(table));
            count += 1;
            start += 1;
        }
        count
    }

    /// Border segments from unclassified shapes.
    fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        for (i, shape) in self.shapes.iter().enumerate() {
            if !shape.is_undefined() {
                continue;
            }
            let b = shape.bbox;
            let (cx, cy) = b.center();
            if b.height() <= self.options.max_border_width && b.width() >= b.height() {
                segments.push(Segment::horizontal(i, cy, b.x0, b.x1));
            } else if b.width() <= self.options.max_border_width {
                segments.push(Segment::vertical(i, cx, b.y0, b.y1));
            } else {
                segments.push(Segment::horizontal(i, b.y0, b.x0, b.x1));
                segments.push(Segment::horizontal(i, b.y1, b.x0, b.x1));
                segments.push(Segment::vertical(i, b.x0, b.y0, b.y1));
                segments.push(Segment::vertical(i, b.x1, b.y0, b.y1));
            }
        }
        segments
    }

    /// Group touching segments into clusters and snap them into grids.
    fn find_grids(&self) -> Vec<Grid> {
        let segments = self.segments();
        let tolerance = self.options.grid_tolerance;

        let mut parent: Vec<usize> = (0..segments.len()).collect();
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                if segments[i].shape == segments[j].shape || segments[i].touches(&segments[j], tolerance) {
                    union(&mut parent, i, j);
                }
            }
        }

        let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..segments.len() {
            let root = find(&mut parent, i);
            clusters.entry(root).or_default().push(i);
        }

        let mut grids: Vec<Grid> = clusters
            .into_values()
            .filter_map(|members| {
                let mut xs = Vec::new();
                let mut ys = Vec::new();
                let mut shapes = Vec::new();
                for &m in &members {
                    let s = &segments[m];
                    match s.orientation {
                        Orientation::Horizontal => ys.push(s.pos),
                        Orientation::Vertical => xs.push(s.pos),
                    }
                    shapes.push(s.shape);
                }
                shapes.sort_unstable();
                shapes.dedup();

                // touching filled boxes alone are highlights, not a grid
                let has_rule = shapes.iter().any(|&i| {
                    self.shapes.get(i).is_some_and(|s| {
                        s.bbox.width().min(s.bbox.height()) <= self.options.max_border_width
                    })
                });
                if !has_rule {
                    log::debug!(
                        "TableConstructor: skipping cluster of {} filled boxes without rules",
                        shapes.len()
                    );
                    return None;
                }

                let col_bounds = snap(xs, tolerance);
                let row_bounds = snap(ys, tolerance);
                let cells = col_bounds.len().saturating_sub(1) * row_bounds.len().saturating_sub(1);
                if cells < 2 {
                    log::debug!(
                        "TableConstructor: skipping border cluster of {} segments ({} cells)",
                        members.len(),
                        cells
                    );
                    return None;
                }
                Some(Grid {
                    shapes,
                    col_bounds,
                    row_bounds,
                })
            })
            .collect();

        grids.sort_by(|a, b| a.row_bounds[0].total_cmp(&b.row_bounds[0]));
        grids
    }

    /// Tag the shapes of a grid; boxes matching a cell shade it.
    fn tag_shapes(&mut self, grid: &Grid, table: &mut TableBlock) {
        let tolerance = self.options.grid_tolerance * 2.0;
        for &index in &grid.shapes {
            let Some(shape) = self.shapes.get(index) else {
                continue;
            };
            let (bbox, color) = (shape.bbox, shape.color);
            let is_box = bbox.width().min(bbox.height()) > self.options.max_border_width;

            let cell = is_box
                .then(|| {
                    table
                        .cells
                        .iter_mut()
                        .flatten()
                        .find(|c| c.bbox.approx_eq(&bbox, tolerance))
                })
                .flatten();
            match cell {
                Some(cell) => {
                    cell.shading = Some(color);
                    self.shapes.set_kind(index, ShapeKind::Shading);
                }
                None => self.shapes.set_kind(index, ShapeKind::Border),
            }
        }
    }

    /// Move text blocks inside the table into its cells.
    ///
    /// Returns the indices of the consumed page-level blocks.
    fn distribute_blocks(&self, table: &mut TableBlock) -> Vec<usize> {
        let area = table.bbox.expand(self.options.grid_tolerance);
        let consumed: Vec<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| match b {
                Block::Text(t) => {
                    let (cx, cy) = t.bbox.center();
                    area.contains_point(cx, cy)
                }
                Block::Table(_) => false,
            })
            .map(|(i, _)| i)
            .collect();

        for &index in &consumed {
            let Some(Block::Text(block)) = self.blocks.get(index) else {
                continue;
            };

            let mut cell_lines: BTreeMap<(usize, usize), Vec<TextLine>> = BTreeMap::new();
            for line in &block.lines {
                let mut cell_inlines: BTreeMap<(usize, usize), Vec<Inline>> = BTreeMap::new();
                for inline in &line.inlines {
                    let (cx, cy) = inline.bbox().center();
                    let key = (locate(&table.row_bounds, cy), locate(&table.col_bounds, cx));
                    cell_inlines.entry(key).or_default().push(inline.clone());
                }
                for (key, inlines) in cell_inlines {
                    cell_lines.entry(key).or_default().push(TextLine::new(inlines));
                }
            }

            for ((row, col), lines) in cell_lines {
                if let Some(cell) = table.cell_mut(row, col) {
                    cell.blocks.push(Block::Text(TextBlock::new(lines)));
                }
            }
        }
        consumed
    }

    /// End (exclusive) of the band of text blocks starting at `start`.
    fn band_end(&self, start: usize) -> usize {
        let blocks = self.blocks.as_slice();
        let Some(Block::Text(first)) = blocks.get(start) else {
            return start + 1;
        };

        let mut members: Vec<BBox> = vec![first.bbox];
        let mut end = start + 1;
        while let Some(Block::Text(next)) = blocks.get(end) {
            if !members.iter().all(|m| self.same_band(m, &next.bbox)) {
                break;
            }
            members.push(next.bbox);
            end += 1;
        }
        end
    }

    fn same_band(&self, a: &BBox, b: &BBox) -> bool {
        let shorter = a.height().min(b.height());
        shorter > 0.0
            && a.vertical_overlap(b) >= self.options.min_vertical_overlap * shorter
            && (a.x1 <= b.x0 || b.x1 <= a.x0)
    }
}

/// Build a one-row table with one column per block.
fn band_table(mut members: Vec<TextBlock>, x0: f32, x1: f32) -> TableBlock {
    members.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

    let first_x0 = members.first().map(|b| b.bbox.x0).unwrap_or(x0);
    let last_x1 = members.last().map(|b| b.bbox.x1).unwrap_or(x1);
    let (mut left, mut right) = (x0.min(first_x0), x1.max(last_x1));
    if right <= left {
        left = first_x0;
        right = last_x1;
    }

    let mut col_bounds = vec![left];
    for pair in members.windows(2) {
        col_bounds.push((pair[0].bbox.x1 + pair[1].bbox.x0) / 2.0);
    }
    col_bounds.push(right);

    let top = members.iter().map(|b| b.bbox.y0).fold(f32::INFINITY, f32::min);
    let bottom = members.iter().map(|b| b.bbox.y1).fold(f32::NEG_INFINITY, f32::max);

    let mut table = TableBlock::new(TableKind::Implicit, col_bounds, vec![top, bottom]);
    for (col, block) in members.into_iter().enumerate() {
        if let Some(cell) = table.cell_mut(0, col) {
            cell.blocks.push(Block::Text(block));
        }
    }
    table
}

/// Merge sorted coordinates closer than `tolerance` into their mean.
fn snap(mut values: Vec<f32>, tolerance: f32) -> Vec<f32> {
    values.sort_by(f32::total_cmp);
    let mut result: Vec<f32> = Vec::new();
    let mut group: Vec<f32> = Vec::new();
    for v in values {
        if let Some(&last) = group.last() {
            if v - last > tolerance {
                result.push(group.iter().sum::<f32>() / group.len() as f32);
                group.clear();
            }
        }
        group.push(v);
    }
    if !group.is_empty() {
        result.push(group.iter().sum::<f32>() / group.len() as f32);
    }
    result
}

/// Index of the interval of `bounds` containing `v`, clamped to the ends.
fn locate(bounds: &[f32], v: f32) -> usize {
    let last = bounds.len().saturating_sub(2);
    bounds
        .windows(2)
        .position(|w| v < w[1])
        .unwrap_or(last)
        .min(last)
}

fn find(parent: &mut [usize], i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    let mut node = i;
    while parent[node] != root {
        let next = parent[node];
        parent[node] = root;
        node = next;
    }
    root
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[rb] = ra;
    }
}
