//! Section-level types: one section per source page.

use super::{Margin, Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A page section of the output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Page margin
    pub margin: Margin,

    /// Content elements in reading order
    pub elements: Vec<Element>,
}

impl Section {
    /// Create a new empty section with the given dimensions.
    pub fn new(width: f32, height: f32, margin: Margin) -> Self {
        Self {
            width,
            height,
            margin,
            elements: Vec::new(),
        }
    }

    /// Get plain text content of the section.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the section has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over top-level paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.elements.iter().filter_map(|e| match e {
            Element::Paragraph(p) => Some(p),
            Element::Table(_) => None,
        })
    }

    /// Iterate over top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.elements.iter().filter_map(|e| match e {
            Element::Table(t) => Some(t),
            Element::Paragraph(_) => None,
        })
    }
}

/// A content element of a section or table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// A paragraph
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

impl Element {
    /// Get plain text content of the element.
    pub fn plain_text(&self) -> String {
        match self {
            Element::Paragraph(p) => p.plain_text(),
            Element::Table(t) => t.plain_text(),
        }
    }

    /// Check if this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Element::Table(_))
    }

    /// Check if this element is a filler paragraph.
    pub fn is_filler(&self) -> bool {
        matches!(self, Element::Paragraph(p) if p.filler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_views() {
        let mut section = Section::new(612.0, 792.0, Margin::normal());
        section
            .elements
            .push(Element::Paragraph(Paragraph::with_text("Intro")));
        section.elements.push(Element::Table(Table::new(1, 2)));
        section.elements.push(Element::Paragraph(Paragraph::filler()));

        assert_eq!(section.paragraphs().count(), 2);
        assert_eq!(section.tables().count(), 1);
        assert!(section.elements[2].is_filler());
        assert!(section.elements[1].is_table());
    }

    #[test]
    fn test_element_serde_tag() {
        let e = Element::Paragraph(Paragraph::with_text("x"));
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"type\":\"paragraph\""));
    }
}
