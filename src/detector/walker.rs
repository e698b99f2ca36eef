use tracing::debug;

use super::classifier::Classifier;
use crate::config::DetectionConfig;
use crate::dom::{GridNode, Rect};

/// The highlighted candidate shown by the overlay.
#[derive(Debug, Clone)]
pub struct Selection<N> {
    pub target: N,
    pub rect: Rect,
    pub visible: bool,
}

/// Finds the nearest qualifying candidate at or above a hovered element.
#[derive(Debug, Clone, Default)]
pub struct AncestorWalker {
    classifier: Classifier,
}

impl AncestorWalker {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            classifier: Classifier::new(config),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Nearest qualifying element within the depth limit, stopping before
    /// the document body. No size check.
    pub fn nearest_qualifying<N: GridNode>(&self, target: &N) -> Option<N> {
        let mut current = Some(target.clone());
        for _ in 0..=self.classifier.config().max_ancestor_depth {
            let node = current?;
            if node.is_body() {
                return None;
            }
            if self.classifier.qualifies(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Selection for a pointer-move target, or `None` when nothing
    /// qualifies or the found element is too small to highlight.
    pub fn find_candidate<N: GridNode>(&self, target: &N) -> Option<Selection<N>> {
        let found = self.nearest_qualifying(target)?;
        let rect = found.rect();
        let min_size = self.classifier.config().min_size_px;
        if !rect.exceeds(min_size) {
            debug!(
                tag = found.tag_name(),
                width = rect.width,
                height = rect.height,
                "candidate below minimum size"
            );
            return None;
        }

        debug!(tag = found.tag_name(), class = found.class_name(), "candidate selected");
        Some(Selection {
            target: found,
            rect,
            visible: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{NodeSnapshot, SnapshotTree};

    fn cell(text: &str) -> NodeSnapshot {
        NodeSnapshot::new("span").with_text(text)
    }

    fn grid_row(id: &str) -> NodeSnapshot {
        NodeSnapshot::new("div")
            .with_id(id)
            .with_class("row")
            .with_size(400.0, 30.0)
            .with_children(vec![cell("a"), cell("b")])
    }

    fn page(grid: NodeSnapshot) -> SnapshotTree {
        SnapshotTree::new(NodeSnapshot::new("body").with_size(1024.0, 768.0).with_child(grid))
    }

    #[test]
    fn test_walks_up_to_grid() {
        let grid = NodeSnapshot::new("div")
            .with_id("grid")
            .with_role("grid")
            .with_size(400.0, 120.0)
            .with_children(vec![grid_row("r0"), grid_row("r1"), grid_row("r2")]);
        let tree = page(grid);
        let walker = AncestorWalker::default();

        let span = tree.find_by_id("r1").unwrap().children()[0];
        let selection = walker.find_candidate(&span).unwrap();
        assert!(selection.target.same_node(&tree.find_by_id("grid").unwrap()));
        assert_eq!(selection.rect.height, 120.0);
        assert!(selection.visible);
    }

    #[test]
    fn test_depth_limit() {
        // grid sits five levels above the hovered leaf
        let mut leaf = NodeSnapshot::new("em").with_id("leaf");
        for _ in 0..4 {
            leaf = NodeSnapshot::new("div").with_child(leaf);
        }
        let grid = NodeSnapshot::new("div")
            .with_role("grid")
            .with_size(400.0, 400.0)
            .with_children(vec![leaf, grid_row("r1"), grid_row("r2")]);
        let tree = page(grid);

        let leaf = tree.find_by_id("leaf").unwrap();
        assert!(AncestorWalker::default().find_candidate(&leaf).is_none());

        let mut config = DetectionConfig::default();
        config.max_ancestor_depth = 5;
        assert!(AncestorWalker::new(config).find_candidate(&leaf).is_some());
    }

    #[test]
    fn test_small_candidate_never_selected() {
        let grid = NodeSnapshot::new("div")
            .with_id("grid")
            .with_role("grid")
            .with_size(20.0, 200.0)
            .with_children(vec![grid_row("r0"), grid_row("r1"), grid_row("r2")]);
        let tree = page(grid);
        let grid = tree.find_by_id("grid").unwrap();

        let walker = AncestorWalker::default();
        assert!(walker.classifier().qualifies(&grid));
        assert!(walker.find_candidate(&grid).is_none());
    }

    #[test]
    fn test_stops_at_body() {
        let body = NodeSnapshot::new("body")
            .with_role("grid")
            .with_size(1024.0, 768.0)
            .with_children(vec![
                NodeSnapshot::new("p").with_id("p"),
                NodeSnapshot::new("p"),
                NodeSnapshot::new("p"),
            ]);
        let tree = SnapshotTree::new(body);
        let p = tree.find_by_id("p").unwrap();
        assert!(AncestorWalker::default().find_candidate(&p).is_none());
    }
}
