//! Document-level types.

use super::Section;
use serde::{Deserialize, Serialize};

/// An assembled output document: one section per converted page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Sections in page order
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Get a section by page position (0-indexed).
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Append a section.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Append all sections of another document, keeping their order.
    pub fn append(&mut self, other: Document) {
        self.sections.extend(other.sections);
    }

    /// Check if the document has any sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
