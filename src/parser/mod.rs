//! Page layout parsing: raw input, blocks, shapes, tables and the page pipeline.

mod block;
mod blocks;
mod layout;
mod options;
mod raw;
mod shape;
mod table_detector;
mod text;

pub use block::{
    Block, ImageSpan, Inline, SpanStyle, TableBlock, TableCell, TableKind, TextBlock, TextLine,
    TextSpan,
};
pub use blocks::BlockSet;
pub use layout::{LayoutSnapshot, PageLayout};
pub use options::{ErrorMode, LayoutOptions, PageSelection, TableOptions, TextFormatOptions};
pub use raw::{
    page_values_from_json, pages_from_json, RawBlock, RawChar, RawLine, RawPage, RawShape,
    RawSpan, BLOCK_IMAGE, BLOCK_TEXT,
};
pub use shape::{Shape, ShapeKind, ShapeSet};
pub use table_detector::TableConstructor;
pub use text::normalize_span_text;
