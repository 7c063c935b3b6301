//! Rectangle shapes: table borders, cell shading and text style cues.

use serde::{Deserialize, Serialize};

use crate::model::BBox;

use super::raw::RawShape;

/// Distance within which two shapes are considered duplicates.
const DUPLICATE_TOLERANCE: f32 = 0.5;

/// Shapes thinner than this are lines; only boxes swallow contained boxes.
const LINE_THICKNESS: f32 = 2.0;

/// What a shape has been recognized as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Not matched yet
    #[default]
    Undefined,
    /// Table border line
    Border,
    /// Table cell shading
    Shading,
    /// Text highlight
    Highlight,
    /// Text underline
    Underline,
    /// Text strike-through
    Strike,
}

impl ShapeKind {
    /// Lowercase name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Undefined => "undefined",
            ShapeKind::Border => "border",
            ShapeKind::Shading => "shading",
            ShapeKind::Highlight => "highlight",
            ShapeKind::Underline => "underline",
            ShapeKind::Strike => "strike",
        }
    }
}

/// A vector rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Shape bounding box
    pub bbox: BBox,
    /// sRGB color
    pub color: u32,
    /// Recognized role
    #[serde(default)]
    pub kind: ShapeKind,
}

impl Shape {
    /// Create an unclassified shape.
    pub fn new(bbox: BBox, color: u32) -> Self {
        Self {
            bbox,
            color,
            kind: ShapeKind::Undefined,
        }
    }

    /// Check if the shape is a filled box rather than a line.
    pub fn is_box(&self) -> bool {
        self.bbox.width().min(self.bbox.height()) > LINE_THICKNESS
    }

    /// Check if the shape has not been matched to a role yet.
    pub fn is_undefined(&self) -> bool {
        self.kind == ShapeKind::Undefined
    }
}

impl From<&RawShape> for Shape {
    fn from(raw: &RawShape) -> Self {
        Shape::new(raw.bbox, raw.color)
    }
}

/// The rectangle shapes of one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeSet {
    shapes: Vec<Shape>,
}

impl ShapeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw shape dictionaries.
    pub fn from_raw(raw: &[RawShape]) -> Self {
        Self {
            shapes: raw.iter().map(Shape::from).collect(),
        }
    }

    /// Add a shape.
    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterate over shapes.
    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.shapes.iter()
    }

    /// Iterate mutably over shapes.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Shape> {
        self.shapes.iter_mut()
    }

    /// Get a shape by index.
    pub fn get(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    /// Tag a shape with a role.
    pub fn set_kind(&mut self, index: usize, kind: ShapeKind) {
        if let Some(shape) = self.shapes.get_mut(index) {
            shape.kind = kind;
        }
    }

    /// Shapes of the given kind.
    pub fn of_kind(&self, kind: ShapeKind) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(move |s| s.kind == kind)
    }

    /// Clean shapes against the page box.
    ///
    /// Drops non-finite, inverted, off-page and dimensionless shapes, clips
    /// the rest to the page, removes duplicates and same-color shapes
    /// contained in another one, and sorts the set top-down, left-right.
    /// Returns whether anything changed.
    pub fn clean(&mut self, page_bbox: &BBox) -> bool {
        let before = self.shapes.clone();

        let mut kept: Vec<Shape> = Vec::with_capacity(self.shapes.len());
        for mut shape in self.shapes.drain(..) {
            if !shape.bbox.is_well_formed() {
                log::warn!("ShapeSet: dropping malformed shape {:?}", shape.bbox);
                continue;
            }
            let clipped = match shape.bbox.intersection(page_bbox) {
                Some(b) => b,
                None => {
                    log::debug!("ShapeSet: dropping off-page shape {:?}", shape.bbox);
                    continue;
                }
            };
            if clipped.width() <= 0.0 && clipped.height() <= 0.0 {
                continue;
            }
            shape.bbox = clipped;
            kept.push(shape);
        }

        // duplicates and contained same-color shapes; larger shapes win
        kept.sort_by(|a, b| b.bbox.area().total_cmp(&a.bbox.area()));
        let mut unique: Vec<Shape> = Vec::with_capacity(kept.len());
        for shape in kept {
            let redundant = unique.iter().any(|u| {
                u.color == shape.color
                    && (u.bbox.approx_eq(&shape.bbox, DUPLICATE_TOLERANCE)
                        || (u.is_box() && shape.is_box() && u.bbox.contains(&shape.bbox, 0.0)))
            });
            if !redundant {
                unique.push(shape);
            }
        }

        unique.sort_by(|a, b| {
            a.bbox
                .y0
                .total_cmp(&b.bbox.y0)
                .then(a.bbox.x0.total_cmp(&b.bbox.x0))
        });
        self.shapes = unique;

        let changed = self.shapes != before;
        if changed {
            log::debug!(
                "ShapeSet: cleaned {} -> {} shapes",
                before.len(),
                self.shapes.len()
            );
        }
        changed
    }
}

impl<'a> IntoIterator for &'a ShapeSet {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.shapes.iter()
    }
}
