//! Raw page dictionaries produced by the upstream extraction step.
//!
//! The layout follows the `rawdict` hierarchy of the extraction library:
//!
//! ```json
//! {
//!     "width": 612, "height": 792,
//!     "blocks": [
//!         {"type": 0, "bbox": [..], "lines": [
//!             {"bbox": [..], "spans": [
//!                 {"bbox": [..], "size": 11, "font": "Arial", "color": 0, "flags": 0,
//!                  "chars": [{"c": "H", "bbox": [..]}]}
//!             ]}
//!         ]},
//!         {"type": 1, "bbox": [..], "width": 320, "height": 200, "ext": "png"}
//!     ],
//!     "shapes": [{"bbox": [..], "color": 16711680}]
//! }
//! ```
//!
//! Unknown keys are ignored and every field has a default, so partially
//! filled dictionaries deserialize; sanitizing is left to `clean()`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::BBox;

/// Raw text block type.
pub const BLOCK_TEXT: u8 = 0;
/// Raw image block type.
pub const BLOCK_IMAGE: u8 = 1;

/// A raw page dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPage {
    /// Page width
    #[serde(default)]
    pub width: f32,
    /// Page height
    #[serde(default)]
    pub height: f32,
    /// Text and image blocks
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
    /// Rectangle shapes; older producers call them `rects`
    #[serde(default, alias = "rects")]
    pub shapes: Vec<RawShape>,
}

impl RawPage {
    /// Parse a page dictionary from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A raw text or image block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBlock {
    /// Block type: 0 text, 1 image
    #[serde(rename = "type", default)]
    pub kind: u8,
    /// Block bounding box
    #[serde(default)]
    pub bbox: BBox,
    /// Lines of a text block
    #[serde(default)]
    pub lines: Vec<RawLine>,
    /// Image width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Image height in pixels
    #[serde(default)]
    pub height: Option<u32>,
    /// Image format extension
    #[serde(default)]
    pub ext: Option<String>,
}

/// A raw text line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLine {
    /// Line bounding box
    #[serde(default)]
    pub bbox: BBox,
    /// Spans on the line
    #[serde(default)]
    pub spans: Vec<RawSpan>,
}

/// A raw text span.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSpan {
    /// Span bounding box
    #[serde(default)]
    pub bbox: BBox,
    /// Span text (`dict` output)
    #[serde(default)]
    pub text: Option<String>,
    /// Per-character entries (`rawdict` output)
    #[serde(default)]
    pub chars: Vec<RawChar>,
    /// Font size
    #[serde(default)]
    pub size: f32,
    /// Font name
    #[serde(default)]
    pub font: String,
    /// sRGB color as an integer
    #[serde(default)]
    pub color: u32,
    /// Font flags bit field
    #[serde(default)]
    pub flags: u32,
}

impl RawSpan {
    /// Text of the span, preferring the `text` field over characters.
    pub fn content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.chars.iter().map(|c| c.c.as_str()).collect(),
        }
    }
}

/// A raw character.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChar {
    /// The character
    #[serde(default)]
    pub c: String,
    /// Character bounding box
    #[serde(default)]
    pub bbox: BBox,
}

/// A raw rectangle shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawShape {
    /// Shape bounding box
    #[serde(default)]
    pub bbox: BBox,
    /// Fill or stroke color
    #[serde(default)]
    pub color: u32,
}

/// Split a multi-page input into per-page JSON values.
///
/// Accepts `{"pages": [...]}`, a bare array of pages or a single page
/// dictionary. Pages are not deserialized, so one malformed page does not
/// reject the others.
pub fn page_values_from_json(json: &str) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    match value {
        serde_json::Value::Array(pages) => Ok(pages),
        serde_json::Value::Object(mut map) => match map.remove("pages") {
            Some(serde_json::Value::Array(pages)) => Ok(pages),
            Some(_) => Err(Error::InvalidInput("`pages` is not an array".to_string())),
            // a single page dictionary
            None => Ok(vec![serde_json::Value::Object(map)]),
        },
        _ => Err(Error::InvalidInput(
            "expected a page dictionary or an array of pages".to_string(),
        )),
    }
}

/// Parse a multi-page input: `{"pages": [...]}` or a bare array of pages.
pub fn pages_from_json(json: &str) -> Result<Vec<RawPage>> {
    page_values_from_json(json)?
        .into_iter()
        .map(|page| Ok(serde_json::from_value(page)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_page() {
        let page = RawPage::from_json(r#"{"width": 600, "height": 800}"#).unwrap();
        assert_eq!(page.width, 600.0);
        assert!(page.blocks.is_empty());
        assert!(page.shapes.is_empty());
    }

    #[test]
    fn test_parse_rawdict_span() {
        let json = r#"{
            "width": 600, "height": 800,
            "blocks": [{"type": 0, "bbox": [10, 10, 100, 22], "lines": [
                {"bbox": [10, 10, 100, 22], "spans": [
                    {"bbox": [10, 10, 30, 22], "size": 12, "font": "Arial", "color": 0,
                     "chars": [{"c": "H", "bbox": [10, 10, 20, 22]}, {"c": "i", "bbox": [20, 10, 30, 22]}]}
                ]}
            ]}],
            "rects": [{"bbox": [0, 0, 10, 10], "color": 255}]
        }"#;
        let page = RawPage::from_json(json).unwrap();
        assert_eq!(page.blocks[0].lines[0].spans[0].content(), "Hi");
        assert_eq!(page.shapes.len(), 1);
        assert_eq!(page.shapes[0].color, 255);
    }

    #[test]
    fn test_pages_from_json_variants() {
        let wrapped = pages_from_json(r#"{"pages": [{"width": 1}, {"width": 2}]}"#).unwrap();
        assert_eq!(wrapped.len(), 2);

        let bare = pages_from_json(r#"[{"width": 1}]"#).unwrap();
        assert_eq!(bare.len(), 1);

        let single = pages_from_json(r#"{"width": 5, "height": 5}"#).unwrap();
        assert_eq!(single[0].width, 5.0);

        assert!(pages_from_json("42").is_err());
        assert!(pages_from_json(r#"{"pages": 3}"#).is_err());
    }

    #[test]
    fn test_page_values_keep_malformed_pages_apart() {
        let values = page_values_from_json(r#"[{"width": 1}, {"width": "wide"}]"#).unwrap();
        assert_eq!(values.len(), 2);
        assert!(serde_json::from_value::<RawPage>(values[0].clone()).is_ok());
        assert!(serde_json::from_value::<RawPage>(values[1].clone()).is_err());
        assert!(pages_from_json(r#"[{"width": 1}, {"width": "wide"}]"#).is_err());
    }
}
