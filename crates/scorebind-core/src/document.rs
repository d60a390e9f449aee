//! Document Provider adapter over `lopdf`.
//!
//! This is the only module that touches the PDF object model. It exposes the
//! minimal capability surface the modification handlers need: positional page
//! access, page-box updates, content-stream wrapping, and structural edits
//! (remove/insert/duplicate). Pages are addressed by zero-based index; an
//! index is only valid until the next structural edit changes the sequence.
//!
//! Structural edits splice the page tree position-precisely (the same page
//! object may transiently appear twice during a reorder, so "remove the page
//! at position n" must not be resolved through object identity).

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::TransformError;
use crate::geometry::Size;

/// Opaque handle to a page object.
///
/// Stays valid across structural edits of the same document (removed pages
/// are only unlinked from the page tree, not destroyed until save-time
/// pruning), while positional indices do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef(ObjectId);

/// Where a page leaf sits in the page tree.
struct PageSlot {
    parent: ObjectId,
    kid_index: usize,
}

/// An in-memory PDF document with the capability interface the
/// transformation engine works against.
pub struct PdfDocument {
    inner: Document,
}

impl PdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self, TransformError> {
        let inner = Document::load_mem(bytes)
            .map_err(|e| TransformError::Provider(format!("failed to load document: {e}")))?;
        Ok(Self { inner })
    }

    /// Serialize the document. Orphaned objects (removed pages and their
    /// content) are pruned and streams compressed first, as callers expect
    /// the output of a removal to actually shrink.
    pub fn save(&mut self) -> Result<Vec<u8>, TransformError> {
        self.inner.prune_objects();
        self.inner.compress();
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| TransformError::Provider(format!("failed to save document: {e}")))?;
        Ok(buffer)
    }

    /// Deep, independent clone. Mutating the copy never affects `self`.
    pub fn copy(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    pub fn page_indices(&self) -> Vec<usize> {
        (0..self.page_count()).collect()
    }

    /// Handle to the page currently at `index`.
    pub fn page(&self, index: usize) -> Result<PageRef, TransformError> {
        Ok(PageRef(self.page_id(index)?))
    }

    pub fn page_size(&self, index: usize) -> Result<Size, TransformError> {
        let media_box = self.media_box(self.page_id(index)?)?;
        Ok(Size {
            width: media_box[2] - media_box[0],
            height: media_box[3] - media_box[1],
        })
    }

    /// Set the page box to `width` × `height`, preserving the lower-left
    /// origin. A `CropBox` on the page is kept in sync so viewers that honor
    /// it show the same region.
    pub fn set_page_size(
        &mut self,
        index: usize,
        width: f64,
        height: f64,
    ) -> Result<(), TransformError> {
        let page_id = self.page_id(index)?;
        let [x0, y0, _, _] = self.media_box(page_id)?;
        let media_box = Object::Array(vec![
            Object::Real(x0 as f32),
            Object::Real(y0 as f32),
            Object::Real((x0 + width) as f32),
            Object::Real((y0 + height) as f32),
        ]);
        let dict = self.dict_mut(page_id)?;
        if dict.has(b"CropBox") {
            dict.set("CropBox", media_box.clone());
        }
        dict.set("MediaBox", media_box);
        Ok(())
    }

    /// Consolidate the page's content streams into a single stream and close
    /// any dangling graphics-state saves, so wrapping can be applied
    /// repeatedly without one layer's `q` leaking into the next.
    pub fn normalize_page(&mut self, index: usize) -> Result<(), TransformError> {
        let page_id = self.page_id(index)?;
        let raw = if self.dict(page_id)?.has(b"Contents") {
            self.inner
                .get_page_content(page_id)
                .map_err(|e| TransformError::Provider(format!("unreadable page content: {e}")))?
        } else {
            Vec::new()
        };
        let mut content = Content::decode(&raw)
            .map_err(|e| TransformError::Provider(format!("undecodable page content: {e}")))?;
        for _ in 0..graphics_state_depth(&content.operations) {
            content.operations.push(Operation::new("Q", vec![]));
        }
        let stream_id = self.add_content_stream(content.operations)?;
        self.dict_mut(page_id)?
            .set("Contents", Object::Array(vec![Object::Reference(stream_id)]));
        Ok(())
    }

    /// Bracket the existing content with `start_ops` before and `end_ops`
    /// after, without altering the drawing operators in between.
    pub fn wrap_content(
        &mut self,
        index: usize,
        start_ops: Vec<Operation>,
        end_ops: Vec<Operation>,
    ) -> Result<(), TransformError> {
        let page_id = self.page_id(index)?;
        let start_id = self.add_content_stream(start_ops)?;
        let end_id = self.add_content_stream(end_ops)?;
        let mut refs = vec![Object::Reference(start_id)];
        refs.extend(
            self.content_stream_ids(page_id)?
                .into_iter()
                .map(Object::Reference),
        );
        refs.push(Object::Reference(end_id));
        self.dict_mut(page_id)?.set("Contents", Object::Array(refs));
        Ok(())
    }

    /// Scale the page content by `sx`/`sy` about the origin.
    pub fn scale_content(&mut self, index: usize, sx: f64, sy: f64) -> Result<(), TransformError> {
        self.normalize_page(index)?;
        self.wrap_content(
            index,
            vec![push_graphics_state(), scale(sx, sy)],
            vec![pop_graphics_state()],
        )
    }

    /// Translate the page content by `dx`/`dy`.
    ///
    /// Transforms applied through repeated `scale_content`/`translate_content`
    /// calls compose: a later call acts on the already-transformed content.
    pub fn translate_content(
        &mut self,
        index: usize,
        dx: f64,
        dy: f64,
    ) -> Result<(), TransformError> {
        self.normalize_page(index)?;
        self.wrap_content(
            index,
            vec![push_graphics_state(), translate(dx, dy)],
            vec![pop_graphics_state()],
        )
    }

    /// Unlink the page at `index` from the page tree. The page object itself
    /// survives until save-time pruning, so handles to it stay usable.
    pub fn remove_page(&mut self, index: usize) -> Result<(), TransformError> {
        let slot = self.locate_page_slot(index)?;
        let kids = self.kids_mut(slot.parent)?;
        kids.remove(slot.kid_index);
        self.adjust_counts(slot.parent, -1)
    }

    /// Splice `page` into the tree so it becomes the page at `index`,
    /// shifting the current occupant (and everything after it) up by one.
    /// `index == page_count` appends.
    pub fn insert_page(&mut self, index: usize, page: PageRef) -> Result<(), TransformError> {
        let page_count = self.page_count();
        let (parent, kid_index) = if index == page_count {
            let parent = self.root_pages_id()?;
            let end = self.kids_mut(parent)?.len();
            (parent, end)
        } else {
            let slot = self.locate_page_slot(index)?;
            (slot.parent, slot.kid_index)
        };
        self.dict_mut(page.0)?
            .set("Parent", Object::Reference(parent));
        let kids = self.kids_mut(parent)?;
        kids.insert(kid_index, Object::Reference(page.0));
        self.adjust_counts(parent, 1)
    }

    /// Duplicate the page at `index` within this document. The copy shares
    /// resources with the original but owns its content streams, so wrapping
    /// one never shows through on the other. The returned page is detached;
    /// splice it in with [`insert_page`](Self::insert_page).
    pub fn copy_page(&mut self, index: usize) -> Result<PageRef, TransformError> {
        let page_id = self.page_id(index)?;
        let mut page_dict = self.dict(page_id)?.clone();
        let mut copied_refs = Vec::new();
        for content_id in self.content_stream_ids(page_id)? {
            let stream = self
                .inner
                .get_object(content_id)
                .and_then(|o| o.as_stream())
                .map_err(|e| TransformError::Provider(format!("bad content stream: {e}")))?
                .clone();
            copied_refs.push(Object::Reference(self.inner.add_object(stream)));
        }
        if !copied_refs.is_empty() {
            page_dict.set("Contents", Object::Array(copied_refs));
        }
        page_dict.remove(b"Parent");
        Ok(PageRef(self.inner.add_object(Object::Dictionary(page_dict))))
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, TransformError> {
        let pages = self.inner.get_pages();
        pages
            .get(&(index as u32 + 1))
            .copied()
            .ok_or(TransformError::InvalidPageIndex {
                index,
                page_count: pages.len(),
            })
    }

    /// Effective page box, following `Parent` links for inherited entries.
    fn media_box(&self, page_id: ObjectId) -> Result<[f64; 4], TransformError> {
        let mut id = page_id;
        loop {
            let dict = self.dict(id)?;
            if let Ok(obj) = dict.get(b"MediaBox") {
                return parse_box(self.resolve(obj)?);
            }
            match dict.get(b"Parent") {
                Ok(parent) => {
                    id = parent.as_reference().map_err(|e| {
                        TransformError::Provider(format!("bad Parent reference: {e}"))
                    })?;
                }
                Err(_) => {
                    return Err(TransformError::Provider(
                        "page has no MediaBox, inherited or otherwise".into(),
                    ))
                }
            }
        }
    }

    /// Content stream references of a page, in order. Pages without content
    /// yield an empty list.
    fn content_stream_ids(&self, page_id: ObjectId) -> Result<Vec<ObjectId>, TransformError> {
        let dict = self.dict(page_id)?;
        let contents = match dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };
        match contents {
            Object::Reference(id) => Ok(vec![*id]),
            Object::Array(entries) => entries
                .iter()
                .map(|entry| {
                    entry.as_reference().map_err(|e| {
                        TransformError::Provider(format!("bad Contents entry: {e}"))
                    })
                })
                .collect(),
            other => Err(TransformError::Provider(format!(
                "unsupported Contents object: {other:?}"
            ))),
        }
    }

    fn add_content_stream(
        &mut self,
        operations: Vec<Operation>,
    ) -> Result<ObjectId, TransformError> {
        let data = Content { operations }
            .encode()
            .map_err(|e| TransformError::Provider(format!("failed to encode content: {e}")))?;
        Ok(self.inner.add_object(Stream::new(Dictionary::new(), data)))
    }

    fn root_pages_id(&self) -> Result<ObjectId, TransformError> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .and_then(|root| root.as_reference())
            .map_err(|e| TransformError::Provider(format!("no document catalog: {e}")))?;
        self.dict(catalog_id)?
            .get(b"Pages")
            .and_then(|pages| pages.as_reference())
            .map_err(|e| TransformError::Provider(format!("catalog has no page tree: {e}")))
    }

    /// Find the tree slot of the `index`-th page leaf, walking `Kids`
    /// in order so the result is position-precise even when the same page
    /// object appears more than once.
    fn locate_page_slot(&self, index: usize) -> Result<PageSlot, TransformError> {
        let root = self.root_pages_id()?;
        let mut remaining = index;
        self.walk_for_slot(root, &mut remaining)?
            .ok_or(TransformError::InvalidPageIndex {
                index,
                page_count: self.page_count(),
            })
    }

    fn walk_for_slot(
        &self,
        node: ObjectId,
        remaining: &mut usize,
    ) -> Result<Option<PageSlot>, TransformError> {
        let kids = self.kid_ids(node)?;
        for (kid_index, kid_id) in kids.into_iter().enumerate() {
            let kid_dict = self.dict(kid_id)?;
            let is_pages_node = match kid_dict.get(b"Type") {
                Ok(Object::Name(name)) => name == b"Pages",
                _ => kid_dict.has(b"Kids"),
            };
            if is_pages_node {
                if let Some(slot) = self.walk_for_slot(kid_id, remaining)? {
                    return Ok(Some(slot));
                }
            } else if *remaining == 0 {
                return Ok(Some(PageSlot {
                    parent: node,
                    kid_index,
                }));
            } else {
                *remaining -= 1;
            }
        }
        Ok(None)
    }

    fn kid_ids(&self, node: ObjectId) -> Result<Vec<ObjectId>, TransformError> {
        self.dict(node)?
            .get(b"Kids")
            .and_then(|kids| kids.as_array())
            .map_err(|e| TransformError::Provider(format!("page tree node has no Kids: {e}")))?
            .iter()
            .map(|kid| {
                kid.as_reference()
                    .map_err(|e| TransformError::Provider(format!("bad Kids entry: {e}")))
            })
            .collect()
    }

    fn kids_mut(&mut self, node: ObjectId) -> Result<&mut Vec<Object>, TransformError> {
        self.dict_mut(node)?
            .get_mut(b"Kids")
            .and_then(|kids| kids.as_array_mut())
            .map_err(|e| TransformError::Provider(format!("page tree node has no Kids: {e}")))
    }

    /// Add `delta` to `Count` on `from` and every ancestor page-tree node.
    fn adjust_counts(&mut self, from: ObjectId, delta: i64) -> Result<(), TransformError> {
        let mut current = Some(from);
        while let Some(node) = current {
            let dict = self.dict_mut(node)?;
            let count = dict
                .get(b"Count")
                .ok()
                .and_then(|count| count.as_i64().ok())
                .unwrap_or(0);
            dict.set("Count", Object::Integer(count + delta));
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|parent| parent.as_reference().ok());
        }
        Ok(())
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, TransformError> {
        match obj {
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .map_err(|e| TransformError::Provider(format!("dangling reference: {e}"))),
            other => Ok(other),
        }
    }

    fn dict(&self, id: ObjectId) -> Result<&Dictionary, TransformError> {
        self.inner
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|e| TransformError::Provider(format!("expected dictionary: {e}")))
    }

    fn dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary, TransformError> {
        self.inner
            .get_object_mut(id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| TransformError::Provider(format!("expected dictionary: {e}")))
    }
}

/// `q`: save the graphics state.
pub fn push_graphics_state() -> Operation {
    Operation::new("q", vec![])
}

/// `Q`: restore the graphics state.
pub fn pop_graphics_state() -> Operation {
    Operation::new("Q", vec![])
}

/// `cm` with an explicit matrix.
pub fn concat_matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Operation {
    Operation::new(
        "cm",
        vec![
            Object::Real(a as f32),
            Object::Real(b as f32),
            Object::Real(c as f32),
            Object::Real(d as f32),
            Object::Real(e as f32),
            Object::Real(f as f32),
        ],
    )
}

pub fn translate(dx: f64, dy: f64) -> Operation {
    concat_matrix(1.0, 0.0, 0.0, 1.0, dx, dy)
}

pub fn scale(sx: f64, sy: f64) -> Operation {
    concat_matrix(sx, 0.0, 0.0, sy, 0.0, 0.0)
}

/// `cm` rotating counterclockwise by `degrees` about the origin.
pub fn rotate_degrees(degrees: f64) -> Operation {
    let radians = degrees.to_radians();
    concat_matrix(
        radians.cos(),
        radians.sin(),
        -radians.sin(),
        radians.cos(),
        0.0,
        0.0,
    )
}

/// Net unclosed `q` depth of an operator sequence.
fn graphics_state_depth(operations: &[Operation]) -> usize {
    let mut depth = 0usize;
    for op in operations {
        match op.operator.as_str() {
            "q" => depth += 1,
            "Q" => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

fn parse_box(obj: &Object) -> Result<[f64; 4], TransformError> {
    let entries = obj
        .as_array()
        .map_err(|e| TransformError::Provider(format!("page box is not an array: {e}")))?;
    if entries.len() != 4 {
        return Err(TransformError::Provider(format!(
            "page box has {} entries, expected 4",
            entries.len()
        )));
    }
    let mut out = [0.0f64; 4];
    for (slot, entry) in out.iter_mut().zip(entries) {
        *slot = match entry {
            Object::Integer(v) => *v as f64,
            Object::Real(v) => *v as f64,
            other => {
                return Err(TransformError::Provider(format!(
                    "page box entry is not a number: {other:?}"
                )))
            }
        };
    }
    Ok(out)
}
