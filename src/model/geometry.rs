//! Geometry primitives: bounding boxes and page margins.
//!
//! Coordinates follow the extraction library's convention: origin at the
//! top-left corner of the page, `y` growing downwards, units in points.

use serde::{Deserialize, Serialize};

/// One inch in points.
pub const ONE_INCH: f32 = 72.0;

/// An axis-aligned rectangle `(x0, y0, x1, y1)`.
///
/// Serialized as a four-element array, matching the raw dictionary format.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box (negative for inverted boxes).
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box (negative for inverted boxes).
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the box, zero for degenerate or inverted boxes.
    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Check that all four coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Check that the box is finite and not inverted.
    ///
    /// Zero width or zero height is allowed: border lines are often drawn
    /// as hairline rectangles.
    pub fn is_well_formed(&self) -> bool {
        self.is_finite() && self.x1 >= self.x0 && self.y1 >= self.y0
    }

    /// Check that the box is well formed and has a positive area.
    pub fn is_valid(&self) -> bool {
        self.is_well_formed() && self.area() > 0.0
    }

    /// Center point of the box.
    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Union of a sequence of boxes, `None` for an empty sequence.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(*b),
            })
    }

    /// Intersection of two boxes; `None` if they do not touch.
    ///
    /// Touching edges produce a degenerate (zero-area) intersection.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let b = BBox::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        if b.x1 >= b.x0 && b.y1 >= b.y0 {
            Some(b)
        } else {
            None
        }
    }

    /// Check if two boxes intersect, allowing a gap of `tolerance`.
    pub fn intersects(&self, other: &BBox, tolerance: f32) -> bool {
        self.expand(tolerance).intersection(other).is_some()
    }

    /// Check if `other` lies inside this box, allowing `tolerance` overflow.
    pub fn contains(&self, other: &BBox, tolerance: f32) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.y0 >= self.y0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y1 <= self.y1 + tolerance
    }

    /// Check if a point lies inside this box (edges included).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Grow the box by `d` on every side.
    pub fn expand(&self, d: f32) -> BBox {
        BBox::new(self.x0 - d, self.y0 - d, self.x1 + d, self.y1 + d)
    }

    /// Check if two boxes are equal within `tolerance` on every coordinate.
    pub fn approx_eq(&self, other: &BBox, tolerance: f32) -> bool {
        (self.x0 - other.x0).abs() <= tolerance
            && (self.y0 - other.y0).abs() <= tolerance
            && (self.x1 - other.x1).abs() <= tolerance
            && (self.y1 - other.y1).abs() <= tolerance
    }

    /// Length of the shared vertical range of two boxes (0 if disjoint).
    pub fn vertical_overlap(&self, other: &BBox) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// Length of the shared horizontal range of two boxes (0 if disjoint).
    pub fn horizontal_overlap(&self, other: &BBox) -> f32 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0)
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// Page margins in points.
///
/// Serialized as `[left, right, top, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Margin {
    /// Left margin
    pub left: f32,
    /// Right margin
    pub right: f32,
    /// Top margin
    pub top: f32,
    /// Bottom margin
    pub bottom: f32,
}

impl Margin {
    /// Create a margin from its four components.
    pub const fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// The same value on all four sides.
    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Normal page margin: one inch on every side.
    pub const fn normal() -> Self {
        Self::uniform(ONE_INCH)
    }

    /// Content box of a `width` x `height` page with this margin.
    pub fn content_box(&self, width: f32, height: f32) -> BBox {
        BBox::new(self.left, self.top, width - self.right, height - self.bottom)
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::normal()
    }
}

impl From<[f32; 4]> for Margin {
    fn from(v: [f32; 4]) -> Self {
        Margin::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Margin> for [f32; 4] {
    fn from(m: Margin) -> Self {
        [m.left, m.right, m.top, m.bottom]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_validity() {
        assert!(BBox::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(!BBox::new(10.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!BBox::new(0.0, 0.0, f32::NAN, 10.0).is_valid());
        // hairline: well formed but no area
        let line = BBox::new(0.0, 5.0, 100.0, 5.0);
        assert!(line.is_well_formed());
        assert!(!line.is_valid());
    }

    #[test]
    fn test_bbox_intersection() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 20.0, 20.0);
        assert_eq!(a.intersection(&b), Some(BBox::new(5.0, 5.0, 10.0, 10.0)));

        let c = BBox::new(11.0, 0.0, 20.0, 10.0);
        assert_eq!(a.intersection(&c), None);
        assert!(a.intersects(&c, 1.0));
    }

    #[test]
    fn test_bbox_union_all() {
        let boxes = [
            BBox::new(10.0, 10.0, 20.0, 20.0),
            BBox::new(0.0, 15.0, 12.0, 30.0),
        ];
        assert_eq!(
            BBox::union_all(boxes.iter()),
            Some(BBox::new(0.0, 10.0, 20.0, 30.0))
        );
        assert_eq!(BBox::union_all(std::iter::empty()), None);
    }

    #[test]
    fn test_overlaps() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(20.0, 4.0, 30.0, 14.0);
        assert_eq!(a.vertical_overlap(&b), 6.0);
        assert_eq!(a.horizontal_overlap(&b), 0.0);
    }

    #[test]
    fn test_serde_as_array() {
        let b: BBox = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(b, BBox::new(1.0, 2.0, 3.0, 4.0));

        let m = Margin::new(72.0, 60.0, 36.0, 20.0);
        assert_eq!(serde_json::to_string(&m).unwrap(), "[72.0,60.0,36.0,20.0]");
    }

    #[test]
    fn test_content_box() {
        let m = Margin::new(50.0, 40.0, 30.0, 20.0);
        assert_eq!(m.content_box(600.0, 800.0), BBox::new(50.0, 30.0, 560.0, 780.0));
    }
}
