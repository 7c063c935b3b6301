//! Layout statistics collected during conversion.

use serde::{Deserialize, Serialize};

use crate::model::{Element, Section};
use crate::parser::PageLayout;

/// Counts of what the layout pipeline produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Number of pages assembled
    pub page_count: u32,

    /// Number of content paragraphs (fillers excluded)
    pub paragraph_count: u32,

    /// Number of spacing and trailing filler paragraphs
    pub filler_count: u32,

    /// Number of top-level tables emitted
    pub table_count: u32,

    /// Number of tables recognized from borders
    pub explicit_table_count: u32,

    /// Number of tables synthesized from aligned blocks
    pub implicit_table_count: u32,

    /// Number of text spans with a highlight, underline or strike style
    pub styled_span_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl LayoutStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the tables and styled spans of a parsed page.
    pub fn record_layout(&mut self, layout: &PageLayout) {
        self.explicit_table_count += layout.blocks().explicit_table_blocks().count() as u32;
        self.implicit_table_count += layout.blocks().implicit_table_blocks().count() as u32;
        self.styled_span_count += layout
            .blocks()
            .text_blocks()
            .flat_map(|b| &b.lines)
            .flat_map(|l| l.spans())
            .filter(|s| !s.style.is_empty())
            .count() as u32;
    }

    /// Count the elements of an assembled section.
    pub fn record_section(&mut self, section: &Section) {
        self.page_count += 1;
        for element in &section.elements {
            match element {
                Element::Paragraph(p) if p.filler => self.filler_count += 1,
                Element::Paragraph(_) => self.paragraph_count += 1,
                Element::Table(_) => self.table_count += 1,
            }
        }
        self.char_count += section
            .plain_text()
            .chars()
            .filter(|c| !c.is_whitespace())
            .count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &LayoutStats) {
        self.page_count += other.page_count;
        self.paragraph_count += other.paragraph_count;
        self.filler_count += other.filler_count;
        self.table_count += other.table_count;
        self.explicit_table_count += other.explicit_table_count;
        self.implicit_table_count += other.implicit_table_count;
        self.styled_span_count += other.styled_span_count;
        self.char_count += other.char_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Margin, Paragraph, Table};

    #[test]
    fn test_record_section() {
        let mut section = Section::new(600.0, 800.0, Margin::normal());
        section.elements.push(Element::Paragraph(Paragraph::with_text("Hello world")));
        section.elements.push(Element::Table(Table::new(1, 2)));
        section.elements.push(Element::Paragraph(Paragraph::filler()));

        let mut stats = LayoutStats::new();
        stats.record_section(&section);

        assert_eq!(stats.page_count, 1);
        assert_eq!(stats.paragraph_count, 1);
        assert_eq!(stats.filler_count, 1);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.char_count, 10);
    }

    #[test]
    fn test_stats_merge() {
        let mut stats1 = LayoutStats {
            paragraph_count: 5,
            table_count: 2,
            ..Default::default()
        };
        let stats2 = LayoutStats {
            paragraph_count: 3,
            table_count: 1,
            implicit_table_count: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.paragraph_count, 8);
        assert_eq!(stats1.table_count, 3);
        assert_eq!(stats1.implicit_table_count, 4);
    }
}
