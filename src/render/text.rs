//! Plain text rendering of assembled documents.

use crate::model::Document;

/// Convert a document to plain text, one block of text per section.
///
/// Filler paragraphs carry no text and are skipped; table rows are
/// rendered tab-separated.
pub fn to_text(doc: &Document) -> String {
    doc.plain_text().trim().to_string()
}
