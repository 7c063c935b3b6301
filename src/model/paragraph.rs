//! Paragraph and run types of the assembled document.

use serde::{Deserialize, Serialize};

/// A paragraph of the output document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Runs in the paragraph
    pub runs: Vec<Run>,

    /// Paragraph format
    pub format: ParagraphFormat,

    /// Whether this paragraph only exists to control spacing
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub filler: bool,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(Run::Text(TextRun::new(text)));
        p
    }

    /// Create an empty filler paragraph used purely for spacing.
    pub fn filler() -> Self {
        Self {
            filler: true,
            ..Self::default()
        }
    }

    /// Add a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .map(|r| match r {
                Run::Text(run) => run.text.as_str(),
                Run::LineBreak => "\n",
                Run::Image { .. } => "",
            })
            .collect()
    }

    /// Check if the paragraph has no visible content.
    pub fn is_empty(&self) -> bool {
        !self.runs.iter().any(|r| matches!(r, Run::Image { .. }))
            && self.plain_text().trim().is_empty()
    }
}

/// Inline content within a paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Run {
    /// A text run with styling
    Text(TextRun),

    /// A line break between two source lines
    LineBreak,

    /// An inline image placeholder
    Image {
        /// Display width in points
        width: f32,
        /// Display height in points
        height: f32,
        /// Source image format, e.g. "png"
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ext: Option<String>,
    },
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Text styling
    pub style: TextStyle,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Text styling properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Strikethrough text
    pub strikethrough: bool,

    /// Font name
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: Option<f32>,

    /// Text color (hex format, e.g., "#FF0000")
    pub color: Option<String>,

    /// Highlight color (hex format)
    pub highlight: Option<String>,
}

impl TextStyle {
    /// Check if any emphasis is applied.
    pub fn has_styling(&self) -> bool {
        self.bold || self.italic || self.underline || self.strikethrough || self.highlight.is_some()
    }
}

/// Paragraph format: vertical spacing and indentation, in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphFormat {
    /// Space before the paragraph
    pub space_before: f32,

    /// Space after the paragraph
    pub space_after: f32,

    /// Exact line spacing; `None` keeps the renderer's single spacing
    pub line_spacing: Option<f32>,

    /// Left indentation relative to the content box
    pub indent_left: f32,
}

/// Format an RGB integer color as `#RRGGBB`.
pub fn hex_color(rgb: u32) -> String {
    format!("#{:06X}", rgb & 0x00FF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.add_run(Run::Text(TextRun::new("Hello")));
        p.add_run(Run::LineBreak);
        p.add_run(Run::Text(TextRun::new("world")));

        assert_eq!(p.plain_text(), "Hello\nworld");
    }

    #[test]
    fn test_filler_is_empty() {
        let p = Paragraph::filler();
        assert!(p.filler);
        assert!(p.is_empty());
    }

    #[test]
    fn test_image_paragraph_not_empty() {
        let mut p = Paragraph::new();
        p.add_run(Run::Image {
            width: 100.0,
            height: 50.0,
            ext: Some("png".to_string()),
        });
        assert!(!p.is_empty());
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xFF0000), "#FF0000");
        assert_eq!(hex_color(0x00ff00), "#00FF00");
        assert_eq!(hex_color(0), "#000000");
    }

    #[test]
    fn test_text_style() {
        assert!(!TextStyle::default().has_styling());
        let style = TextStyle {
            highlight: Some("#FFFF00".to_string()),
            ..Default::default()
        };
        assert!(style.has_styling());
    }
}
