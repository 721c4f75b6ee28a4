//! Shared fixtures: generated PDFs and multipart MIME messages.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfwatch::Message;

/// Builds a PDF where each element of `pages` is a page and each element of
/// a page is one line of text.
#[must_use]
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
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

    let mut kids: Vec<Object> = Vec::new();
    for page_lines in pages {
        let mut operations = Vec::new();
        for (i, line) in page_lines.iter().enumerate() {
            // One text block per line; extraction yields one line per block.
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), (720 - 20 * i as i64).into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = i64::try_from(kids.len()).unwrap();
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Builds a flat (non-multipart) plain-text message.
#[must_use]
pub fn flat_message(body: &str) -> Message {
    Message::from_bytes(
        format!(
            "From: sender@example.com\r\n\
             To: watcher@example.com\r\n\
             Subject: plain\r\n\r\n\
             {body}"
        )
        .into_bytes(),
    )
}

/// Builds a multipart message with a text part and one PDF attachment.
#[must_use]
pub fn message_with_pdf(pdf: &[u8]) -> Message {
    let boundary = "fixture-boundary";
    let raw = format!(
        "From: sender@example.com\r\n\
         To: watcher@example.com\r\n\
         Subject: statement attached\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n\
         --{boundary}\r\n\
         Content-Type: text/plain\r\n\r\n\
         Please find the statement attached.\r\n\
         --{boundary}\r\n\
         Content-Type: application/pdf\r\n\
         Content-Transfer-Encoding: base64\r\n\
         Content-Disposition: attachment; filename=\"statement.pdf\"\r\n\r\n\
         {}\r\n\
         --{boundary}--\r\n",
        STANDARD.encode(pdf)
    );
    Message::from_bytes(raw.into_bytes())
}
