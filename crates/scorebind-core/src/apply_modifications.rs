//! Modification handlers and the sequential pipeline that applies them.
//!
//! The pipeline folds an ordered modification list over a working document:
//! each handler receives ownership of the current working copy, takes an
//! explicit copy, mutates that, and hands it back. The caller's input bytes
//! are never touched, and an error in any handler aborts the whole run with
//! no output (already-applied steps inside the working copy are not rolled
//! back).

use crate::document::{
    self, PageRef, PdfDocument, pop_graphics_state, push_graphics_state, rotate_degrees,
};
use crate::error::TransformError;
use crate::geometry::{self, Rect, Size};
use crate::modification::{Modification, PdfFile};

/// A4 page box in PDF points.
pub const A4: Size = Size {
    width: 595.28,
    height: 841.89,
};

/// Apply `modifications` in list order to `bytes` and return the resulting
/// document plus its page count.
///
/// Page indices inside each modification refer to the document as it stands
/// when that modification runs; structural edits earlier in the list shift
/// what later indices mean, and no remapping happens here.
pub fn apply_modifications(
    bytes: &[u8],
    modifications: &[Modification],
) -> Result<PdfFile, TransformError> {
    let mut doc = PdfDocument::load(bytes)?;
    tracing::debug!(
        "applying {} modifications to a {}-page document",
        modifications.len(),
        doc.page_count()
    );
    for (step, modification) in modifications.iter().enumerate() {
        tracing::debug!("step {}: {}", step + 1, modification.kind());
        doc = apply_modification(doc, modification)?;
    }
    let page_count = doc.page_count();
    let data = doc.save()?;
    tracing::debug!("produced {} bytes, {} pages", data.len(), page_count);
    Ok(PdfFile { data, page_count })
}

fn apply_modification(
    doc: PdfDocument,
    modification: &Modification,
) -> Result<PdfDocument, TransformError> {
    let mut working = doc.copy();
    match modification {
        Modification::ScaleToA4 { pages } => scale_pages_to_a4(&mut working, pages)?,
        Modification::Zoom { bounds, pages } => zoom_pages(&mut working, *bounds, pages)?,
        Modification::Remove { pages } => remove_pages(&mut working, pages)?,
        Modification::RotatePage { pages } => rotate_pages(&mut working, pages)?,
        Modification::RotateContent { degrees, pages } => {
            rotate_page_contents(&mut working, *degrees, pages)?
        }
        Modification::CutPageLeftRight { pages } => cut_pages_left_right(&mut working, pages)?,
        Modification::OrderPages { permutation } => order_pages(&mut working, permutation)?,
    }
    Ok(working)
}

fn validate_pages(doc: &PdfDocument, pages: &[usize]) -> Result<(), TransformError> {
    let page_count = doc.page_count();
    if let Some(&index) = pages.iter().find(|&&page| page >= page_count) {
        return Err(TransformError::InvalidPageIndex { index, page_count });
    }
    Ok(())
}

fn scale_pages_to_a4(doc: &mut PdfDocument, pages: &[usize]) -> Result<(), TransformError> {
    validate_pages(doc, pages)?;
    for &index in pages {
        let size = doc.page_size(index)?;
        let fit = geometry::scale_ratio(size, A4);
        doc.set_page_size(index, A4.width, A4.height)?;
        doc.scale_content(index, fit.ratio, fit.ratio)?;
        doc.translate_content(index, fit.translate_x, fit.translate_y)?;
    }
    Ok(())
}

fn zoom_pages(doc: &mut PdfDocument, bounds: Rect, pages: &[usize]) -> Result<(), TransformError> {
    validate_bounds(&bounds)?;
    validate_pages(doc, pages)?;
    for &index in pages {
        let size = doc.page_size(index)?;
        let absolute = Rect {
            x: bounds.x * size.width,
            y: bounds.y * size.height,
            width: bounds.width * size.width,
            height: bounds.height * size.height,
        };
        let fit = geometry::scale_ratio(absolute.size(), size);
        // Move the selected region's center to the origin, magnify, then
        // translate so the magnified region sits centered on the page.
        doc.translate_content(
            index,
            -absolute.x - absolute.width / 2.0,
            -absolute.y - absolute.height / 2.0,
        )?;
        doc.scale_content(index, fit.ratio, fit.ratio)?;
        doc.translate_content(
            index,
            fit.translate_x + absolute.width / 2.0 * fit.ratio,
            fit.translate_y + absolute.height / 2.0 * fit.ratio,
        )?;
    }
    Ok(())
}

fn validate_bounds(bounds: &Rect) -> Result<(), TransformError> {
    let in_unit = |v: f64| (0.0..=1.0).contains(&v);
    if !(in_unit(bounds.x) && in_unit(bounds.y) && in_unit(bounds.width) && in_unit(bounds.height))
    {
        return Err(TransformError::MalformedBounds(format!(
            "components must lie in [0, 1], got {bounds:?}"
        )));
    }
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return Err(TransformError::MalformedBounds(format!(
            "width and height must be positive, got {bounds:?}"
        )));
    }
    Ok(())
}

fn remove_pages(doc: &mut PdfDocument, pages: &[usize]) -> Result<(), TransformError> {
    validate_pages(doc, pages)?;
    // Descending order keeps the positions of not-yet-removed pages stable.
    let mut targets = pages.to_vec();
    targets.sort_unstable_by(|a, b| b.cmp(a));
    targets.dedup();
    for index in targets {
        doc.remove_page(index)?;
    }
    Ok(())
}

fn rotate_pages(doc: &mut PdfDocument, pages: &[usize]) -> Result<(), TransformError> {
    validate_pages(doc, pages)?;
    for &index in pages {
        let size = doc.page_size(index)?;
        doc.normalize_page(index)?;
        // Quarter-turn the sheet: content rotates clockwise and the
        // translation lifts it back into the swapped page box.
        doc.wrap_content(
            index,
            vec![
                push_graphics_state(),
                document::translate(0.0, size.width),
                rotate_degrees(-90.0),
            ],
            vec![pop_graphics_state()],
        )?;
        doc.set_page_size(index, size.height, size.width)?;
    }
    Ok(())
}

fn rotate_page_contents(
    doc: &mut PdfDocument,
    degrees: f64,
    pages: &[usize],
) -> Result<(), TransformError> {
    validate_pages(doc, pages)?;
    for &index in pages {
        let size = doc.page_size(index)?;
        let page_rect = Rect {
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: size.height,
        };
        // The rotated page covers a larger axis-aligned box; shrink by the
        // ratio that fits that box back into the unchanged page.
        let rotated_box = geometry::bounding_box(&geometry::rotate_rectangle(page_rect, degrees));
        let fit = geometry::scale_ratio(rotated_box.size(), size);
        doc.normalize_page(index)?;
        doc.wrap_content(
            index,
            vec![
                push_graphics_state(),
                document::translate(size.width / 2.0, size.height / 2.0),
                rotate_degrees(-degrees),
                document::scale(fit.ratio, fit.ratio),
                document::translate(-size.width / 2.0, -size.height / 2.0),
            ],
            vec![pop_graphics_state()],
        )?;
    }
    Ok(())
}

fn cut_pages_left_right(doc: &mut PdfDocument, pages: &[usize]) -> Result<(), TransformError> {
    validate_pages(doc, pages)?;
    // Descending order keeps pending positions stable across insertions.
    let mut targets = pages.to_vec();
    targets.sort_unstable_by(|a, b| b.cmp(a));
    targets.dedup();
    for index in targets {
        let size = doc.page_size(index)?;
        let center_x = size.width / 2.0;
        let left = doc.copy_page(index)?;
        doc.insert_page(index, left)?;
        doc.set_page_size(index, center_x, size.height)?;
        doc.set_page_size(index + 1, center_x, size.height)?;
        doc.translate_content(index + 1, -center_x, 0.0)?;
    }
    Ok(())
}

fn order_pages(doc: &mut PdfDocument, permutation: &[usize]) -> Result<(), TransformError> {
    let page_count = doc.page_count();
    let mut seen = vec![false; page_count];
    for &source in permutation {
        if source >= page_count {
            return Err(TransformError::InvalidPermutation(format!(
                "source index {source} out of range (document has {page_count} pages)"
            )));
        }
        if seen[source] {
            return Err(TransformError::InvalidPermutation(format!(
                "duplicate source index {source}"
            )));
        }
        seen[source] = true;
    }
    // Capture handles before the tree changes; positions move, handles don't.
    let originals: Vec<PageRef> = (0..page_count)
        .map(|index| doc.page(index))
        .collect::<Result<_, _>>()?;
    let mut targets = permutation.to_vec();
    targets.sort_unstable();
    for (order, &target) in targets.iter().enumerate() {
        doc.remove_page(target)?;
        doc.insert_page(target, originals[permutation[order]])?;
    }
    Ok(())
}
