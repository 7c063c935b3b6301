//! Layout options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::model::ONE_INCH;

/// Options for rebuilding a page layout.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Free space subtracted from the raw right margin
    pub right_margin_tolerance: f32,

    /// Upper bound for every margin component (one inch by default)
    pub max_margin: f32,

    /// Table recognition settings
    pub table: TableOptions,

    /// Text format (highlight/underline/strike) settings
    pub text: TextFormatOptions,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the right margin tolerance.
    pub fn with_right_margin_tolerance(mut self, tolerance: f32) -> Self {
        self.right_margin_tolerance = tolerance.max(0.0);
        self
    }

    /// Set the margin cap.
    pub fn with_max_margin(mut self, max_margin: f32) -> Self {
        self.max_margin = max_margin.max(0.0);
        self
    }

    /// Set table recognition settings.
    pub fn with_table_options(mut self, table: TableOptions) -> Self {
        self.table = table;
        self
    }

    /// Set text format settings.
    pub fn with_text_options(mut self, text: TextFormatOptions) -> Self {
        self.text = text;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            right_margin_tolerance: 10.0,
            max_margin: ONE_INCH,
            table: TableOptions::default(),
            text: TextFormatOptions::default(),
        }
    }
}

/// Table recognition configuration.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Shapes thinner than this are border lines rather than boxes
    pub max_border_width: f32,
    /// Distance within which border coordinates snap together
    pub grid_tolerance: f32,
    /// Fraction of the shorter block height two blocks must share to be in one band
    pub min_vertical_overlap: f32,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_border_width: 2.0,
            grid_tolerance: 1.0,
            min_vertical_overlap: 0.5,
        }
    }
}

/// Configuration for matching shapes to text styles.
#[derive(Debug, Clone)]
pub struct TextFormatOptions {
    /// Maximum thickness of an underline/strike shape, relative to span height
    pub max_line_thickness: f32,
    /// Minimum fraction of the span area a highlight shape must cover
    pub min_highlight_coverage: f32,
}

impl Default for TextFormatOptions {
    fn default() -> Self {
        Self {
            max_line_thickness: 0.25,
            min_highlight_coverage: 0.5,
        }
    }
}

/// Error handling mode for multi-page conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first page error
    Strict,
    /// Skip failed pages and continue
    #[default]
    Lenient,
}

/// Page selection for conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageSelection {
    /// Convert all pages
    #[default]
    All,
    /// Convert a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Convert specific pages (1-indexed)
    Pages(Vec<u32>),
    /// Convert several ranges (inclusive, 1-indexed, sorted and disjoint)
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let invalid = |part: &str| Error::InvalidPageRange(part.to_string());

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| invalid(s))?;
                let end: u32 = end.trim().parse().map_err(|_| invalid(s))?;
                if start > end {
                    return Err(invalid(s));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges: Vec<(u32, u32)> = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let (start, end): (u32, u32) = match part.split_once('-') {
                Some((start, end)) => (
                    start.trim().parse().map_err(|_| invalid(part))?,
                    end.trim().parse().map_err(|_| invalid(part))?,
                ),
                None => {
                    let page: u32 = part.parse().map_err(|_| invalid(part))?;
                    (page, page)
                }
            };
            if start > end {
                return Err(invalid(part));
            }
            ranges.push((start, end));
        }

        // merge overlapping and adjacent ranges
        ranges.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Ok(PageSelection::Ranges(
            merged.into_iter().map(|(start, end)| start..=end).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_options_builder() {
        let options = LayoutOptions::new()
            .with_right_margin_tolerance(4.0)
            .with_max_margin(-1.0);

        assert_eq!(options.right_margin_tolerance, 4.0);
        assert_eq!(options.max_margin, 0.0);
    }

    #[test]
    fn test_default_options() {
        let options = LayoutOptions::default();
        assert_eq!(options.max_margin, 72.0);
        assert_eq!(options.right_margin_tolerance, 10.0);
        assert_eq!(options.table.min_vertical_overlap, 0.5);
        assert_eq!(ErrorMode::default(), ErrorMode::Lenient);
    }

    #[test]
    fn test_page_selection_includes() {
        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));

        let ranges = PageSelection::Ranges(vec![1..=2, 8..=9]);
        assert!(ranges.includes(9));
        assert!(!ranges.includes(5));
        assert!(PageSelection::All.includes(100));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("1,3,5-7,3").unwrap(),
            PageSelection::Ranges(vec![1..=1, 3..=3, 5..=7])
        );
        assert_eq!(
            PageSelection::parse("4-6,1,2,5-9").unwrap(),
            PageSelection::Ranges(vec![1..=2, 4..=9])
        );
        assert!(matches!(
            PageSelection::parse("7-2"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(matches!(
            PageSelection::parse("1,7-2"),
            Err(Error::InvalidPageRange(part)) if part == "7-2"
        ));

        let wide = PageSelection::parse("1,1-4294967295").unwrap();
        assert_eq!(wide, PageSelection::Ranges(vec![1..=u32::MAX]));
        assert!(wide.includes(4_000_000_000));
        assert!(PageSelection::parse("one").is_err());
    }
}
