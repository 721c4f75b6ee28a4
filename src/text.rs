//! Text extractor: best-effort per-page text from decoded PDF buffers.
//!
//! Extraction fidelity is bounded by what lopdf can recover from a page's
//! content stream; scanned or image-only pages yield little or no text.
//! Each page's text is split on newline boundaries into lines.

use crate::error::{Error, Result};
use lopdf::Document;
use tracing::{debug, instrument};

/// Extracted text of one PDF document: pages in physical order, each page a
/// list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    /// Per-page line lists, in the PDF's physical page order.
    pub pages: Vec<Vec<String>>,
}

impl DocumentText {
    /// Returns the number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Iterates all lines in page order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flatten().map(String::as_str)
    }
}

/// Parses one PDF buffer and extracts its per-page lines.
///
/// # Errors
///
/// Returns [`Error::ParsePdf`] if the buffer is not a parseable PDF or a
/// page's text cannot be extracted.
#[instrument(name = "text::extract_document", skip_all, fields(byte_len = bytes.len()))]
pub fn extract_document_text(bytes: &[u8]) -> Result<DocumentText> {
    let doc = Document::load_mem(bytes).map_err(|source| Error::ParsePdf { source })?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys() {
        let text = doc
            .extract_text(&[*page_number])
            .map_err(|source| Error::ParsePdf { source })?;
        pages.push(text.split('\n').map(str::to_string).collect());
    }

    debug!(page_count = pages.len(), "Extracted document text");

    Ok(DocumentText { pages })
}

/// Extracts text from a list of decoded PDF buffers, preserving order.
///
/// # Errors
///
/// Fails on the first corrupt document (fail-fast, matching the
/// attachment decode policy).
pub fn extract_all(pdfs: &[Vec<u8>]) -> Result<Vec<DocumentText>> {
    pdfs.iter()
        .map(|bytes| extract_document_text(bytes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Builds a minimal single-page PDF whose page shows `text`.
    fn single_page_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extracts_page_text() {
        let pdf = single_page_pdf("INVOICE #4471");
        let text = extract_document_text(&pdf).unwrap();
        assert_eq!(text.page_count(), 1);
        assert!(text.lines().any(|line| line.contains("INVOICE #4471")));
    }

    #[test]
    fn test_corrupt_pdf_is_parse_error() {
        let result = extract_document_text(b"this is not a pdf");
        assert!(matches!(result, Err(Error::ParsePdf { .. })));
    }

    #[test]
    fn test_extract_all_preserves_order() {
        let pdfs = vec![single_page_pdf("first document"), single_page_pdf("second document")];
        let texts = extract_all(&pdfs).unwrap();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].lines().any(|l| l.contains("first document")));
        assert!(texts[1].lines().any(|l| l.contains("second document")));
    }

    #[test]
    fn test_extract_all_fails_fast_on_corrupt_document() {
        let pdfs = vec![single_page_pdf("fine"), b"broken".to_vec()];
        assert!(extract_all(&pdfs).is_err());
    }
}
