pub mod classifier;
pub mod session;
pub mod walker;

pub use classifier::{is_table_role, CandidateReason, Classifier, Similarity};
pub use session::DetectorSession;
pub use walker::{AncestorWalker, Selection};

use crate::dom::{descendants, GridNode};

/// Elements that are a native `table` or carry `role="grid"`/`role="table"`.
///
/// This is the badge count shown in the panel; it does not run the full
/// classifier.
pub fn count_table_elements<N: GridNode>(root: &N) -> usize {
    descendants(root)
        .iter()
        .filter(|node| node.is_native_table() || node.role().map(is_table_role).unwrap_or(false))
        .count()
}

/// Every region a hover could select, outermost first. An accepted
/// candidate is not searched for nested candidates. The body itself is never
/// a candidate, as in the hover walk. Size is not checked.
pub fn scan_candidates<N: GridNode>(classifier: &Classifier, root: &N) -> Vec<N> {
    let mut found = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if !node.is_body() && classifier.qualifies(&node) {
            found.push(node);
            continue;
        }
        stack.extend(node.children().into_iter().rev());
    }
    found
}
