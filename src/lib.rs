//! # relayout
//!
//! Page layout reconstruction for Rust.
//!
//! This library takes pages that an extraction tool has already decomposed
//! into raw geometry (text spans, image regions and vector rectangles) and
//! rebuilds their structure: page margins, bordered and border-less tables,
//! text styles and vertical spacing. The result is emitted as a sequence of
//! section, paragraph and table commands to a [`DocumentSink`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use relayout::{convert_file, render};
//!
//! fn main() -> relayout::Result<()> {
//!     // Convert every page of a raw page dump
//!     let result = convert_file("pages.json")?;
//!
//!     // Render the assembled document
//!     let json = render::to_json(&result.document, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Single pages
//!
//! ```
//! use relayout::{DocumentBuilder, PageLayout};
//!
//! let json = r#"{"width": 600, "height": 800, "blocks": []}"#;
//! let mut page = PageLayout::from_json(json)?;
//! page.parse()?;
//!
//! let mut builder = DocumentBuilder::new();
//! page.make_page(&mut builder)?;
//! assert_eq!(builder.finish().section_count(), 1);
//! # Ok::<(), relayout::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Margin inference** from block and shape extents
//! - **Explicit tables** from border and shading rectangles
//! - **Implicit tables** from horizontally aligned blocks
//! - **Text styles**: highlight, underline and strike-through from shapes
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{ConvertOptions, ConvertResult, Converter, PageFailure};
pub use error::{Error, Result};
pub use model::{BBox, Document, Element, Margin, Paragraph, Section, Table};
pub use parser::{
    Block, BlockSet, ErrorMode, LayoutOptions, LayoutSnapshot, PageLayout, PageSelection,
    RawPage, Shape, ShapeKind, ShapeSet, TableBlock, TableOptions, TextBlock, TextFormatOptions,
};
pub use render::{
    DocumentBuilder, DocumentSink, JsonFormat, LayoutObserver, LayoutStats, PlotRecorder,
};

use std::path::Path;

/// Parse and run the pipeline on a single page dictionary.
///
/// # Example
///
/// ```
/// use relayout::parse_page_json;
///
/// let page = parse_page_json(r#"{"width": 600, "height": 800}"#).unwrap();
/// assert!(page.margin().is_some());
/// ```
pub fn parse_page_json(json: &str) -> Result<PageLayout> {
    let mut page = PageLayout::from_json(json)?;
    page.parse()?;
    Ok(page)
}

/// Convert a multi-page JSON input with default options.
pub fn convert_json(json: &str) -> Result<ConvertResult> {
    Converter::new().convert_json(json)
}

/// Convert a multi-page JSON file with default options.
///
/// # Example
///
/// ```no_run
/// use relayout::convert_file;
///
/// let result = convert_file("pages.json").unwrap();
/// println!("Pages: {}", result.document.section_count());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConvertResult> {
    Relayout::new().convert_file(path)
}

/// Extract plain text from a multi-page JSON file.
pub fn to_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(convert_file(path)?.to_text())
}

/// Convert a multi-page JSON file to document JSON.
///
/// # Example
///
/// ```no_run
/// use relayout::{to_json, JsonFormat};
///
/// let json = to_json("pages.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    convert_file(path)?.to_json(format)
}

/// Builder for converting page dumps.
///
/// # Example
///
/// ```no_run
/// use relayout::{PageSelection, Relayout};
///
/// let text = Relayout::new()
///     .strict()
///     .sequential()
///     .with_pages(PageSelection::Range(1..=3))
///     .convert_file("pages.json")?
///     .to_text();
/// # Ok::<(), relayout::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Relayout {
    options: ConvertOptions,
}

impl Relayout {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort on the first failed page.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Skip failed pages (default).
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Set layout options.
    pub fn with_layout_options(mut self, layout: LayoutOptions) -> Self {
        self.options = self.options.with_layout_options(layout);
        self
    }

    /// The conversion options built so far.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert a multi-page JSON string.
    pub fn convert_json(self, json: &str) -> Result<ConvertResult> {
        Converter::with_options(self.options).convert_json(json)
    }

    /// Convert a multi-page JSON file.
    pub fn convert_file<P: AsRef<Path>>(self, path: P) -> Result<ConvertResult> {
        let json = std::fs::read_to_string(path)?;
        self.convert_json(&json)
    }
}
