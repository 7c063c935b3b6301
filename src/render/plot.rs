//! Stage observers for inspecting intermediate layout states.
//!
//! A page layout reports a [`PlotFrame`] after each pipeline stage to an
//! optional [`LayoutObserver`]. Frames carry plain geometry only, so an
//! observer can draw them, log them or collect them for regression checks.
//!
//! # Example
//!
//! ```
//! use relayout::render::plot::{LayoutObserver, PlotFrame};
//!
//! struct Titles(Vec<String>);
//!
//! impl LayoutObserver for Titles {
//!     fn on_stage(&mut self, frame: &PlotFrame) {
//!         self.0.push(frame.title.clone());
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::model::{BBox, Margin};

/// Which objects a frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotCategory {
    /// All blocks and shapes
    Layout,
    /// Explicit table blocks only
    ExplicitTable,
    /// Implicit table blocks only
    ImplicitTable,
    /// Shapes only
    Shapes,
}

/// One drawable box of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotItem {
    /// Box on the page
    pub bbox: BBox,
    /// Object kind, e.g. "text", "table", "border"
    pub label: String,
    /// sRGB color, if the object has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

impl PlotItem {
    /// Create an uncolored item.
    pub fn new(bbox: BBox, label: impl Into<String>) -> Self {
        Self {
            bbox,
            label: label.into(),
            color: None,
        }
    }

    /// Set the item color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
}

/// The state of a page after one pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotFrame {
    /// Stage title
    pub title: String,
    /// Objects shown
    pub category: PlotCategory,
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Page margin, if inferred yet
    pub margin: Option<Margin>,
    /// Boxes to draw
    pub items: Vec<PlotItem>,
}

/// Receives a frame after each pipeline stage.
///
/// Frames are only produced when [`LayoutObserver::enabled`] returns true
/// and the stage has something to show.
pub trait LayoutObserver {
    /// Called with the page state after a stage.
    fn on_stage(&mut self, frame: &PlotFrame);

    /// Whether frames should be built at all.
    fn enabled(&self) -> bool {
        true
    }
}

/// Observer that ignores every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LayoutObserver for NoopObserver {
    fn on_stage(&mut self, _frame: &PlotFrame) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Observer that keeps every frame.
#[derive(Debug, Clone, Default)]
pub struct PlotRecorder {
    frames: Vec<PlotFrame>,
}

impl PlotRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded frames in stage order.
    pub fn frames(&self) -> &[PlotFrame] {
        &self.frames
    }

    /// Take the recorded frames.
    pub fn into_frames(self) -> Vec<PlotFrame> {
        self.frames
    }

    /// Titles of the recorded frames.
    pub fn titles(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.title.as_str()).collect()
    }
}

impl LayoutObserver for PlotRecorder {
    fn on_stage(&mut self, frame: &PlotFrame) {
        self.frames.push(frame.clone());
    }
}

/// Observer that forwards frames to several observers in order.
pub struct CompositeObserver {
    observers: Vec<Box<dyn LayoutObserver>>,
}

impl CompositeObserver {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer to the chain.
    pub fn with_observer<O: LayoutObserver + 'static>(mut self, observer: O) -> Self {
        self.observers.push(Box::new(observer));
        self
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutObserver for CompositeObserver {
    fn on_stage(&mut self, frame: &PlotFrame) {
        for observer in &mut self.observers {
            if observer.enabled() {
                observer.on_stage(frame);
            }
        }
    }

    fn enabled(&self) -> bool {
        self.observers.iter().any(|o| o.enabled())
    }
}
