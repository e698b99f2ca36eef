use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use crate::config::HeaderPolicy;
use crate::dom::{native_cells, native_rows, GridNode};

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("invalid line break regex"));

static ZERO_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{200B}-\u{200D}\u{FEFF}]").expect("invalid zero-width regex"));

/// Normalize one cell: line break runs become a single space, zero-width
/// characters are dropped, surrounding whitespace is trimmed.
pub fn clean_text(text: &str) -> String {
    let joined = LINE_BREAKS.replace_all(text, " ");
    let stripped = ZERO_WIDTH.replace_all(&joined, "");
    stripped.trim().to_string()
}

/// Headers plus body rows pulled out of a page region.
///
/// Rows are not padded or truncated to the header width; consumers must
/// tolerate ragged rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub headers: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<Vec<String>>,
}

impl ExtractedTable {
    /// Split a row matrix according to `policy`.
    pub fn from_rows(mut rows: Vec<Vec<String>>, policy: HeaderPolicy) -> Self {
        match policy {
            HeaderPolicy::FirstRow if !rows.is_empty() => {
                let headers = rows.remove(0);
                Self { headers, rows }
            }
            _ => Self {
                headers: Vec::new(),
                rows,
            },
        }
    }

    /// True when no cell holds any text.
    pub fn is_empty(&self) -> bool {
        self.headers
            .iter()
            .chain(self.rows.iter().flatten())
            .all(|cell| cell.is_empty())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest of the header row and every body row.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Every body row has as many cells as the header row.
    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.headers.len())
    }
}

/// Converts a confirmed region into an [`ExtractedTable`].
///
/// Never fails: an element with nothing in it degrades to a single cell
/// holding its own (possibly empty) text.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    header_policy: HeaderPolicy,
}

impl Extractor {
    pub fn new(header_policy: HeaderPolicy) -> Self {
        Self { header_policy }
    }

    pub fn extract<N: GridNode>(&self, element: &N) -> ExtractedTable {
        let rows = self.extract_rows(element);
        debug!(
            tag = element.tag_name(),
            rows = rows.len(),
            "extracted row matrix"
        );
        ExtractedTable::from_rows(rows, self.header_policy)
    }

    /// Full row matrix before the header split.
    pub fn extract_rows<N: GridNode>(&self, element: &N) -> Vec<Vec<String>> {
        if element.is_native_table() {
            return native_rows(element)
                .iter()
                .map(|row| native_cells(row).iter().map(cell_text).collect())
                .collect();
        }

        let children = element.children();
        if children.is_empty() {
            return vec![vec![cell_text(element)]];
        }

        children.iter().map(heuristic_row).collect()
    }
}

fn cell_text<N: GridNode>(node: &N) -> String {
    clean_text(&node.text())
}

/// Cells of one row of a div-built grid. A single wrapper child holding
/// several children is looked through once.
fn heuristic_row<N: GridNode>(row: &N) -> Vec<String> {
    let columns = row.children();
    if columns.len() > 1 {
        return columns.iter().map(cell_text).collect();
    }

    if let [wrapper] = columns.as_slice() {
        let inner = wrapper.children();
        if inner.len() > 1 {
            return inner.iter().map(cell_text).collect();
        }
    }

    vec![cell_text(row)]
}
