//! Page-geometry transformations for scanned score PDFs.
//!
//! This crate is the document-processing core of the scorebind admin tool:
//! it takes an uploaded score and an ordered list of edits (scale to A4,
//! crop/zoom, remove, rotate, split into halves, reorder) and produces a new
//! document, wrapping existing page content in coordinate transforms rather
//! than re-rendering it. Parsing and serialization of the PDF object model
//! are delegated to `lopdf`; this crate only reasons about page geometry and
//! page-tree structure.
//!
//! Entry points:
//! - [`apply_modifications`]: fold an ordered [`Modification`] list over a
//!   document.
//! - [`extract_pages`]: keep-only page filter.

pub mod apply_modifications;
pub mod booklet;
pub mod document;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod modification;

pub use apply_modifications::{apply_modifications, A4};
pub use booklet::booklet_page_order;
pub use document::PdfDocument;
pub use error::TransformError;
pub use extract::extract_pages;
pub use modification::{Modification, PdfFile};

/// Parse PDF bytes and return the page count.
pub fn get_page_count(bytes: &[u8]) -> Result<usize, TransformError> {
    Ok(PdfDocument::load(bytes)?.page_count())
}

/// Check that `bytes` parse as a well-formed document, without keeping it.
pub fn validate_document(bytes: &[u8]) -> Result<(), TransformError> {
    PdfDocument::load(bytes).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object};

    fn create_test_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        });
        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn counts_pages() {
        let pdf = create_test_pdf();
        assert_eq!(get_page_count(&pdf).unwrap(), 1);
    }

    #[test]
    fn validates_well_formed_document() {
        let pdf = create_test_pdf();
        assert!(validate_document(&pdf).is_ok());
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = validate_document(b"not a score").unwrap_err();
        assert!(matches!(err, TransformError::Provider(_)));
    }
}
