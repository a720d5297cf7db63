//! Document text extraction
//!
//! Turns an uploaded PDF payload into one plain-text string by joining the
//! text of every page in page order. No layout reconstruction.

use lopdf::Document;
use tracing::{debug, info};

use crate::error::FinsightError;
use crate::Result;

/// Parses raw document bytes into ordered per-page text.
///
/// A page that yields no decodable text is reported as `None`. Failing to
/// parse the container itself is an error.
pub trait DocumentParser: Send + Sync {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<Option<String>>>;
}

/// PDF parser backed by lopdf
pub struct LopdfParser;

impl DocumentParser for LopdfParser {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<Option<String>>> {
        let doc = Document::load_mem(bytes).map_err(FinsightError::PdfParse)?;

        // get_pages() is a BTreeMap keyed by page number, so iteration is in page order.
        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => Some(text),
                Err(e) => {
                    debug!(page = page_num, error = %e, "No extractable text on page");
                    None
                }
            })
            .collect();

        Ok(pages)
    }
}

/// Extract the full text of a document, pages concatenated without separator.
pub fn extract_text(parser: &dyn DocumentParser, bytes: &[u8]) -> Result<String> {
    let pages = parser.page_texts(bytes)?;
    let page_count = pages.len();

    let text: String = pages.into_iter().map(Option::unwrap_or_default).collect();

    info!(
        pages = page_count,
        chars = text.chars().count(),
        "Extracted document text"
    );

    Ok(text)
}

/// Convenience wrapper using the default PDF parser
pub fn extract_text_from_pdf(bytes: &[u8]) -> Result<String> {
    extract_text(&LopdfParser, bytes)
}

/// Build a minimal PDF with one line of Helvetica text per page.
#[cfg(test)]
pub(crate) fn build_test_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}
