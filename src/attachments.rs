//! Attachment extractor: pulls decoded PDF payloads out of fetched messages.
//!
//! Only multipart messages are inspected; a flat message contributes
//! nothing. Parts are selected by an exact `application/pdf` content type
//! and transfer-decoded (base64) to raw bytes. Traversal recurses into
//! nested `multipart/*` containers up to [`MAX_PART_DEPTH`], so an
//! attachment inside e.g. `multipart/mixed > multipart/related` is still
//! found.
//!
//! Decode failures are fail-fast: a malformed attachment aborts the whole
//! extraction rather than being silently skipped.

use crate::error::{Error, Result};
use crate::fetcher::Message;
use mailparse::ParsedMail;
use tracing::{debug, instrument};

/// Maximum multipart nesting depth inspected for attachments.
pub const MAX_PART_DEPTH: usize = 3;

/// Content type selecting attachment parts.
const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Extracts every decoded PDF payload from a list of fetched messages.
///
/// Results preserve message order, then part order within each message.
///
/// # Errors
///
/// Returns [`Error::ParseMail`] if a message is not parseable MIME, or
/// [`Error::DecodeAttachment`] if a selected part's payload cannot be
/// transfer-decoded.
#[instrument(name = "attachments::extract", skip_all, fields(message_count = messages.len()))]
pub fn extract_pdf_attachments(messages: &[Message]) -> Result<Vec<Vec<u8>>> {
    let mut pdfs = Vec::new();

    for message in messages {
        let parsed = message.parsed()?;
        if parsed.subparts.is_empty() {
            debug!(uid = ?message.uid(), "Message is not multipart, skipping");
            continue;
        }
        collect_pdf_parts(&parsed, 1, &mut pdfs)?;
    }

    debug!(pdf_count = pdfs.len(), "Attachment extraction complete");

    Ok(pdfs)
}

/// Walks a part's immediate children, descending into nested multiparts up
/// to [`MAX_PART_DEPTH`] levels.
fn collect_pdf_parts(part: &ParsedMail<'_>, depth: usize, out: &mut Vec<Vec<u8>>) -> Result<()> {
    for sub in &part.subparts {
        // mailparse normalizes mimetypes to lowercase.
        let mimetype = sub.ctype.mimetype.as_str();
        if mimetype == PDF_CONTENT_TYPE {
            let payload = sub
                .get_body_raw()
                .map_err(|source| Error::DecodeAttachment { source })?;
            out.push(payload);
        } else if depth < MAX_PART_DEPTH && mimetype.starts_with("multipart/") {
            collect_pdf_parts(sub, depth + 1, out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn pdf_part(payload: &[u8], boundary: &str) -> String {
        format!(
            "--{boundary}\r\n\
             Content-Type: application/pdf\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"doc.pdf\"\r\n\r\n\
             {}\r\n",
            STANDARD.encode(payload)
        )
    }

    fn text_part(text: &str, boundary: &str) -> String {
        format!(
            "--{boundary}\r\n\
             Content-Type: text/plain\r\n\r\n\
             {text}\r\n"
        )
    }

    fn multipart_message(parts: &[String], boundary: &str) -> Message {
        let raw = format!(
            "From: a@example.com\r\n\
             To: b@example.com\r\n\
             Subject: statement\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n\
             {}--{boundary}--\r\n",
            parts.concat()
        );
        Message::from_bytes(raw.into_bytes())
    }

    #[test]
    fn test_flat_message_yields_nothing() {
        let message =
            Message::from_bytes(b"From: a@example.com\r\n\r\nJust plain text.".to_vec());
        let pdfs = extract_pdf_attachments(&[message]).unwrap();
        assert!(pdfs.is_empty());
    }

    #[test]
    fn test_non_pdf_parts_excluded_regardless_of_order() {
        let b = "bnd01";
        let message = multipart_message(
            &[
                text_part("see attached", b),
                pdf_part(b"%PDF-1.5 fake", b),
                text_part("regards", b),
            ],
            b,
        );
        let pdfs = extract_pdf_attachments(&[message]).unwrap();
        assert_eq!(pdfs.len(), 1);
        assert_eq!(pdfs[0], b"%PDF-1.5 fake");
    }

    #[test]
    fn test_base64_round_trip() {
        // Arbitrary bytes, including non-ASCII, survive encode + extract.
        let payload: Vec<u8> = (0u8..=255).collect();
        let b = "bnd02";
        let message = multipart_message(&[pdf_part(&payload, b)], b);
        let pdfs = extract_pdf_attachments(&[message]).unwrap();
        assert_eq!(pdfs, vec![payload]);
    }

    #[test]
    fn test_multiple_attachments_preserve_order() {
        let b = "bnd03";
        let message = multipart_message(
            &[pdf_part(b"first", b), pdf_part(b"second", b)],
            b,
        );
        let pdfs = extract_pdf_attachments(&[message]).unwrap();
        assert_eq!(pdfs, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn test_nested_multipart_is_searched() {
        let outer = "outer01";
        let inner = "inner01";
        let nested = format!(
            "--{outer}\r\n\
             Content-Type: multipart/related; boundary=\"{inner}\"\r\n\r\n\
             {}--{inner}--\r\n",
            pdf_part(b"nested pdf", inner)
        );
        let message = multipart_message(&[nested], outer);
        let pdfs = extract_pdf_attachments(&[message]).unwrap();
        assert_eq!(pdfs, vec![b"nested pdf".to_vec()]);
    }

    #[test]
    fn test_unparseable_message_fails_extraction() {
        // A bare boundary header with a body that is not valid MIME
        // structure still parses leniently in most cases, so use bytes that
        // cannot be a header block at all.
        let message = Message::from_bytes(vec![0xff, 0xfe, 0x00]);
        // mailparse is lenient; whatever it yields must not be a PDF.
        match extract_pdf_attachments(&[message]) {
            Ok(pdfs) => assert!(pdfs.is_empty()),
            Err(e) => assert!(matches!(
                e,
                Error::ParseMail { .. } | Error::DecodeAttachment { .. }
            )),
        }
    }
}
