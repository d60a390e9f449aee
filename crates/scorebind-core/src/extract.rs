//! Page extraction: keep a set of pages, drop the rest.
//!
//! This is a filter, not a pipeline step: it takes raw bytes and a kept-index
//! list and returns raw bytes. It cannot be combined with other
//! modifications in the same call.

use std::collections::HashSet;

use crate::document::PdfDocument;
use crate::error::TransformError;

/// Keep only the pages named in `kept` (zero-based), preserving their
/// relative order. Keeping every index is a no-op; keeping none yields a
/// document with zero pages.
pub fn extract_pages(bytes: &[u8], kept: &[usize]) -> Result<Vec<u8>, TransformError> {
    let doc = PdfDocument::load(bytes)?;
    let page_count = doc.page_count();
    if let Some(&index) = kept.iter().find(|&&page| page >= page_count) {
        return Err(TransformError::InvalidPageIndex { index, page_count });
    }
    let kept_set: HashSet<usize> = kept.iter().copied().collect();
    tracing::debug!("extracting {} of {} pages", kept_set.len(), page_count);

    let mut working = doc.copy();
    // Descending order keeps the positions of not-yet-visited pages stable.
    for index in working.page_indices().into_iter().rev() {
        if !kept_set.contains(&index) {
            working.remove_page(index)?;
        }
    }
    working.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream};

    // Helper to create a simple PDF with N pages of identifiable content
    fn create_test_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut page_ids = Vec::new();
        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Page {}", i + 1).into_bytes(),
                            lopdf::StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn page_texts(data: &[u8]) -> Vec<String> {
        let doc = Document::load_mem(data).unwrap();
        doc.get_pages()
            .into_values()
            .map(|id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
            .collect()
    }

    #[test]
    fn keeps_pages_in_original_order() {
        let input = create_test_pdf(5);
        let out = extract_pages(&input, &[4, 0, 2]).unwrap();
        let texts = page_texts(&out);
        assert_eq!(texts.len(), 3);
        assert!(texts[0].contains("Page 1"));
        assert!(texts[1].contains("Page 3"));
        assert!(texts[2].contains("Page 5"));
    }

    #[test]
    fn keeping_every_page_is_a_no_op() {
        let input = create_test_pdf(3);
        let out = extract_pages(&input, &[0, 1, 2]).unwrap();
        assert_eq!(page_texts(&out).len(), 3);
    }

    #[test]
    fn keeping_no_pages_yields_empty_document() {
        let input = create_test_pdf(3);
        let out = extract_pages(&input, &[]).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        assert_eq!(doc.get_pages().len(), 0);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let input = create_test_pdf(3);
        let err = extract_pages(&input, &[1, 7]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidPageIndex {
                index: 7,
                page_count: 3
            }
        ));
    }
}
