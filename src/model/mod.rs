//! Document model types.
//!
//! This module defines the geometry primitives shared by the layout
//! pipeline and the output document structure (sections, paragraphs,
//! tables) that the pipeline assembles.

mod document;
mod geometry;
mod paragraph;
mod section;
mod table;

pub use document::Document;
pub use geometry::{BBox, Margin, ONE_INCH};
pub use paragraph::{hex_color, Paragraph, ParagraphFormat, Run, TextRun, TextStyle};
pub use section::{Element, Section};
pub use table::{Table, TableCell, TableRow};
