//! Tree abstraction the detection pipeline runs over.
//!
//! The classifier, walker and extractor only ever see a [`GridNode`], so the
//! live page is just one implementation. [`html`] parses markup with
//! `scraper`; [`snapshot`] loads a JSON serialization of a DOM subtree
//! captured in the browser (with computed styles and layout).

pub mod html;
pub mod snapshot;

use serde::{Deserialize, Serialize};

pub use html::{HtmlNode, HtmlPage};
pub use snapshot::{NodeSnapshot, SnapshotNode, SnapshotTree};

/// Bounding rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl Rect {
    pub fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self { top, left, width, height }
    }

    /// Both sides strictly larger than `min_px`.
    pub fn exceeds(&self, min_px: f32) -> bool {
        self.width > min_px && self.height > min_px
    }
}

/// A read-only view of one element of a document tree.
pub trait GridNode: Clone {
    /// Lowercase tag name.
    fn tag_name(&self) -> &str;

    /// ARIA `role` attribute, if present.
    fn role(&self) -> Option<&str>;

    /// Full `class` attribute string, `""` when absent.
    fn class_name(&self) -> &str;

    /// Resolved CSS `display` value, if known.
    fn display(&self) -> Option<&str>;

    /// Direct element children in document order.
    fn children(&self) -> Vec<Self>;

    fn parent(&self) -> Option<Self>;

    /// Zero rect when layout is unknown.
    fn rect(&self) -> Rect;

    /// Raw text content of the whole subtree.
    fn text(&self) -> String;

    fn same_node(&self, other: &Self) -> bool;

    fn is_body(&self) -> bool {
        self.tag_name() == "body"
    }

    fn is_native_table(&self) -> bool {
        self.tag_name() == "table"
    }

    fn child_count(&self) -> usize {
        self.children().len()
    }
}

/// Rows of a native table: `tr` children of the table itself and of its
/// direct `thead`/`tbody`/`tfoot` sections. Nested tables are skipped.
pub fn native_rows<N: GridNode>(table: &N) -> Vec<N> {
    let mut rows = Vec::new();
    for child in table.children() {
        match child.tag_name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .into_iter()
                    .filter(|row| row.tag_name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Direct `td`/`th` children of a native row.
pub fn native_cells<N: GridNode>(row: &N) -> Vec<N> {
    row.children()
        .into_iter()
        .filter(|cell| matches!(cell.tag_name(), "td" | "th"))
        .collect()
}

/// Depth-first, pre-order walk of `root` and all its descendants.
pub fn descendants<N: GridNode>(root: &N) -> Vec<N> {
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        let children = node.children();
        out.push(node);
        stack.extend(children.into_iter().rev());
    }
    out
}

/// Parse a CSS length in pixels (`"120px"`, `"120"`, `"12.5px"`).
pub(crate) fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f32>().ok().filter(|n| n.is_finite())
}
