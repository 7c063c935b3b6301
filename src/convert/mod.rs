//! Multi-page conversion.
//!
//! A [`Converter`] runs the page pipeline over every selected page of a
//! document and assembles the resulting sections in page order. Pages are
//! independent: each gets its own [`PageLayout`] and its own
//! [`DocumentBuilder`], so a page that fails never touches the output of
//! another.
//!
//! # Example
//!
//! ```
//! use relayout::convert::{ConvertOptions, Converter};
//!
//! fn main() -> relayout::Result<()> {
//!     let json = r#"{"pages": [{"width": 600, "height": 800, "blocks": []}]}"#;
//!     let result = Converter::with_options(ConvertOptions::new().sequential()).convert_json(json)?;
//!     assert_eq!(result.document.section_count(), 1);
//!     Ok(())
//! }
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Document;
use crate::parser::{
    page_values_from_json, ErrorMode, LayoutOptions, PageLayout, PageSelection, RawPage,
};
use crate::render::{self, DocumentBuilder, JsonFormat, LayoutStats};

/// Options for multi-page conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Per-page layout options
    pub layout: LayoutOptions,

    /// What to do when a page fails
    pub error_mode: ErrorMode,

    /// Convert pages on the rayon thread pool
    pub parallel: bool,

    /// Pages to convert (1-indexed)
    pub pages: PageSelection,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-page layout options.
    pub fn with_layout_options(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Set the error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Abort on the first failed page.
    pub fn strict(self) -> Self {
        self.with_error_mode(ErrorMode::Strict)
    }

    /// Skip failed pages.
    pub fn lenient(self) -> Self {
        self.with_error_mode(ErrorMode::Lenient)
    }

    /// Enable or disable parallel page conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Convert pages one after another.
    pub fn sequential(self) -> Self {
        self.with_parallel(false)
    }

    /// Set the page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            error_mode: ErrorMode::default(),
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// A page skipped in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    /// 1-indexed page number
    pub page: u32,
    /// Why the page failed
    pub message: String,
}

/// Result of a multi-page conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertResult {
    /// Assembled document, one section per converted page
    pub document: Document,

    /// Counts over all converted pages
    pub stats: LayoutStats,

    /// Pages skipped because they failed
    pub failures: Vec<PageFailure>,
}

impl ConvertResult {
    /// Check that no selected page failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Render the document as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Render the document as plain text.
    pub fn to_text(&self) -> String {
        render::to_text(&self.document)
    }
}

/// One page of input, deserialized lazily so that a malformed page fails alone.
enum PageInput {
    Raw(RawPage),
    Json(serde_json::Value),
}

impl PageInput {
    fn into_raw(self) -> Result<RawPage> {
        match self {
            PageInput::Raw(raw) => Ok(raw),
            PageInput::Json(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

struct PageOutput {
    document: Document,
    stats: LayoutStats,
}

/// Converts raw pages into an assembled document.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with the given options.
    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// The conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert already deserialized pages.
    pub fn convert_pages(&self, pages: Vec<RawPage>) -> Result<ConvertResult> {
        self.run(pages.into_iter().map(PageInput::Raw).collect())
    }

    /// Convert a multi-page JSON input (`{"pages": [...]}`, an array of
    /// pages or a single page dictionary).
    pub fn convert_json(&self, json: &str) -> Result<ConvertResult> {
        let pages = page_values_from_json(json)?;
        self.run(pages.into_iter().map(PageInput::Json).collect())
    }

    fn run(&self, pages: Vec<PageInput>) -> Result<ConvertResult> {
        let total = pages.len();
        let selected: Vec<(u32, PageInput)> = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| (i as u32 + 1, page))
            .filter(|(number, _)| self.options.pages.includes(*number))
            .collect();

        log::debug!(
            "Converter: {} of {} pages selected ({})",
            selected.len(),
            total,
            if self.options.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );

        let outputs: Vec<(u32, Result<PageOutput>)> = if self.options.parallel {
            selected
                .into_par_iter()
                .map(|(number, page)| (number, self.convert_page(number, page)))
                .collect()
        } else {
            selected
                .into_iter()
                .map(|(number, page)| (number, self.convert_page(number, page)))
                .collect()
        };

        let mut result = ConvertResult::default();
        for (page, output) in outputs {
            match output {
                Ok(output) => {
                    result.document.append(output.document);
                    result.stats.merge(&output.stats);
                }
                Err(e) if self.options.error_mode == ErrorMode::Strict => {
                    return Err(Error::PageFailed {
                        page,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    log::warn!("Converter: skipping page {}: {}", page, e);
                    result.failures.push(PageFailure {
                        page,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(result)
    }

    fn convert_page(&self, number: u32, page: PageInput) -> Result<PageOutput> {
        let raw = page.into_raw()?;
        let mut layout = PageLayout::from_raw(&raw).with_options(self.options.layout.clone());
        layout.parse()?;

        let mut builder = DocumentBuilder::new();
        layout.make_page(&mut builder)?;
        let document = builder.finish();

        let mut stats = LayoutStats::new();
        stats.record_layout(&layout);
        for section in &document.sections {
            stats.record_section(section);
        }

        log::debug!(
            "Converter: page {} assembled with {} paragraphs and {} tables",
            number,
            stats.paragraph_count,
            stats.table_count
        );
        Ok(PageOutput { document, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_block(text: &str, bbox: [f32; 4]) -> serde_json::Value {
        json!({
            "type": 0,
            "bbox": bbox,
            "lines": [{"bbox": bbox, "spans": [{"bbox": bbox, "text": text, "size": 10}]}]
        })
    }

    fn page(width: f32, label: &str) -> serde_json::Value {
        json!({
            "width": width,
            "height": 800,
            "blocks": [text_block(label, [100.0, 100.0, 300.0, 112.0])]
        })
    }

    fn document(pages: Vec<serde_json::Value>) -> String {
        json!({ "pages": pages }).to_string()
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .strict()
            .sequential()
            .with_pages(PageSelection::Pages(vec![2]));

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(!options.parallel);
        assert!(!options.pages.includes(1));

        let defaults = ConvertOptions::default();
        assert!(defaults.parallel);
        assert_eq!(defaults.error_mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_sections_keep_page_order() {
        let input = document(vec![page(600.0, "one"), page(500.0, "two"), page(400.0, "three")]);

        for options in [ConvertOptions::new(), ConvertOptions::new().sequential()] {
            let result = Converter::with_options(options).convert_json(&input).unwrap();
            let widths: Vec<f32> = result.document.sections.iter().map(|s| s.width).collect();
            assert_eq!(widths, vec![600.0, 500.0, 400.0]);
            assert_eq!(result.stats.page_count, 3);
            assert!(result.is_complete());
        }
    }

    #[test]
    fn test_page_selection() {
        let input = document(vec![page(600.0, "one"), page(500.0, "two")]);
        let options = ConvertOptions::new().with_pages(PageSelection::Pages(vec![2]));

        let result = Converter::with_options(options).convert_json(&input).unwrap();
        assert_eq!(result.document.section_count(), 1);
        assert_eq!(result.document.sections[0].width, 500.0);
        assert_eq!(result.document.plain_text(), "two");
    }

    #[test]
    fn test_lenient_skips_failed_page() {
        let broken = json!({"width": "wide", "height": 800});
        let input = document(vec![page(600.0, "one"), broken, page(400.0, "three")]);

        let result = Converter::new().convert_json(&input).unwrap();
        assert_eq!(result.document.section_count(), 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].page, 2);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_strict_reports_failed_page() {
        let broken = json!({"width": "wide", "height": 800});
        let input = document(vec![page(600.0, "one"), broken]);

        let converter = Converter::with_options(ConvertOptions::new().strict());
        match converter.convert_json(&input) {
            Err(Error::PageFailed { page, .. }) => assert_eq!(page, 2),
            other => panic!("expected PageFailed, got {:?}", other.map(|r| r.failures)),
        }
    }

    #[test]
    fn test_convert_pages_counts_tables() {
        let raw: RawPage = serde_json::from_value(json!({
            "width": 600,
            "height": 800,
            "blocks": [
                text_block("A", [110.0, 110.0, 150.0, 122.0]),
                text_block("B", [210.0, 110.0, 250.0, 122.0]),
                text_block("C", [110.0, 160.0, 150.0, 172.0]),
                text_block("D", [210.0, 160.0, 250.0, 172.0])
            ],
            "shapes": [
                {"bbox": [100, 100, 300, 200]},
                {"bbox": [100, 149.5, 300, 150.5]},
                {"bbox": [199.5, 100, 200.5, 200]}
            ]
        }))
        .unwrap();

        let result = Converter::new().convert_pages(vec![raw]).unwrap();
        assert_eq!(result.stats.explicit_table_count, 1);
        assert_eq!(result.stats.table_count, 1);
        // spacer above the table and the trailing paragraph after it
        assert_eq!(result.stats.filler_count, 2);
        assert_eq!(result.stats.paragraph_count, 0);
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        assert!(matches!(
            Converter::new().convert_json(r#"{"pages": 1}"#),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Converter::new().convert_json("not json"),
            Err(Error::Json(_))
        ));
    }
}
