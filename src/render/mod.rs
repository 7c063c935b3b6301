//! Output side of the pipeline: the document sink, renderers and stage observers.

mod json;
pub mod plot;
mod result;
pub mod sink;
mod text;

pub use json::{to_json, value_to_json, JsonFormat};
pub use plot::{CompositeObserver, LayoutObserver, NoopObserver, PlotCategory, PlotFrame, PlotItem, PlotRecorder};
pub use result::LayoutStats;
pub use sink::{DocumentBuilder, DocumentSink, ParagraphHandle, TableHandle};
pub use text::to_text;
