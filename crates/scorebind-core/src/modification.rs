//! The modification model exchanged with the admin client.
//!
//! `Modification` is a closed sum type: adding a new kind of edit means
//! adding a variant here and a handler arm in `apply_modifications`, both
//! checked at compile time. The serde tags match the JSON the score admin
//! UI sends (`"scaleToA4"`, `"zoom"`, ...).

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// One geometric or structural page edit.
///
/// `pages` are zero-based indices into the document *as it stands when the
/// modification is applied*: after a structural edit (`Remove`,
/// `CutPageLeftRight`, `OrderPages`) earlier in the list, indices refer to
/// the already-modified document, not the original input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Modification {
    /// Resize the page box to A4 and scale the content to fit, centered.
    ScaleToA4 { pages: Vec<usize> },
    /// Magnify the region given by `bounds` (fractions of the page size,
    /// each component in [0, 1]) so it fills the page.
    Zoom { bounds: Rect, pages: Vec<usize> },
    /// Delete the given pages.
    Remove { pages: Vec<usize> },
    /// Quarter-turn the whole page: content is rotated and width/height swap.
    RotatePage { pages: Vec<usize> },
    /// Rotate page content by an arbitrary angle, shrinking it so nothing
    /// clips outside the unchanged page box.
    RotateContent { degrees: f64, pages: Vec<usize> },
    /// Split each page into a left and a right half-width page.
    CutPageLeftRight { pages: Vec<usize> },
    /// Rearrange pages: entry *i* is the original index of the page that
    /// ends up at the *i*-th smallest of the targeted positions (the
    /// targeted positions being the sorted entries themselves).
    OrderPages { permutation: Vec<usize> },
}

impl Modification {
    /// Wire-level tag of this modification, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Modification::ScaleToA4 { .. } => "scaleToA4",
            Modification::Zoom { .. } => "zoom",
            Modification::Remove { .. } => "remove",
            Modification::RotatePage { .. } => "rotatePage",
            Modification::RotateContent { .. } => "rotateContent",
            Modification::CutPageLeftRight { .. } => "cutPageLeftRight",
            Modification::OrderPages { .. } => "orderPages",
        }
    }
}

/// Result of a pipeline run: the serialized document and its page count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfFile {
    pub data: Vec<u8>,
    pub page_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_scale_to_a4() {
        let json = r#"{"type":"scaleToA4","pages":[0,2]}"#;
        let modification: Modification = serde_json::from_str(json).unwrap();
        assert_eq!(
            modification,
            Modification::ScaleToA4 { pages: vec![0, 2] }
        );
    }

    #[test]
    fn deserializes_zoom_with_relative_bounds() {
        let json =
            r#"{"type":"zoom","bounds":{"x":0.1,"y":0.2,"width":0.5,"height":0.4},"pages":[1]}"#;
        let modification: Modification = serde_json::from_str(json).unwrap();
        match modification {
            Modification::Zoom { bounds, pages } => {
                assert_eq!(bounds.x, 0.1);
                assert_eq!(bounds.height, 0.4);
                assert_eq!(pages, vec![1]);
            }
            other => panic!("expected zoom, got {other:?}"),
        }
    }

    #[test]
    fn deserializes_rotate_content_with_degrees() {
        let json = r#"{"type":"rotateContent","degrees":-7.5,"pages":[0]}"#;
        let modification: Modification = serde_json::from_str(json).unwrap();
        assert_eq!(
            modification,
            Modification::RotateContent {
                degrees: -7.5,
                pages: vec![0],
            }
        );
    }

    #[test]
    fn deserializes_structural_modifications() {
        let json = r#"[
            {"type":"remove","pages":[3]},
            {"type":"rotatePage","pages":[0]},
            {"type":"cutPageLeftRight","pages":[1]},
            {"type":"orderPages","permutation":[2,0,1]}
        ]"#;
        let modifications: Vec<Modification> = serde_json::from_str(json).unwrap();
        assert_eq!(modifications.len(), 4);
        assert_eq!(modifications[3].kind(), "orderPages");
    }

    #[test]
    fn tag_round_trips() {
        let modification = Modification::CutPageLeftRight { pages: vec![4] };
        let json = serde_json::to_string(&modification).unwrap();
        assert_eq!(json, r#"{"type":"cutPageLeftRight","pages":[4]}"#);
    }

    #[test]
    fn pdf_file_serializes_camel_case() {
        let file = PdfFile {
            data: vec![1, 2],
            page_count: 2,
        };
        let json = serde_json::to_string(&file).unwrap();
        assert_eq!(json, r#"{"data":[1,2],"pageCount":2}"#);
    }
}
