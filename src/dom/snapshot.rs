use serde::{Deserialize, Serialize};

use super::{GridNode, Rect};
use crate::error::{GridflowError, GridflowResult};

/// One element of a DOM subtree as serialized by the content script, with
/// computed `display` and the bounding client rect already resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default)]
    pub rect: Rect,
    /// Text directly owned by this element (not by its children).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.rect.width = width;
        self.rect.height = height;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: NodeSnapshot) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSnapshot>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug)]
struct Entry {
    tag: String,
    id: Option<String>,
    role: Option<String>,
    class_name: String,
    display: Option<String>,
    rect: Rect,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Arena-backed tree built from a [`NodeSnapshot`], with parent links.
#[derive(Debug)]
pub struct SnapshotTree {
    entries: Vec<Entry>,
}

impl SnapshotTree {
    pub fn new(root: NodeSnapshot) -> Self {
        let mut tree = Self { entries: Vec::new() };
        tree.insert(root, None);
        tree
    }

    pub fn from_json(json: &str) -> GridflowResult<Self> {
        let root: NodeSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(root))
    }

    fn insert(&mut self, node: NodeSnapshot, parent: Option<usize>) -> usize {
        let index = self.entries.len();
        self.entries.push(Entry {
            tag: node.tag.to_ascii_lowercase(),
            id: node.id,
            role: node.role,
            class_name: node.class_name.unwrap_or_default(),
            display: node.display,
            rect: node.rect,
            text: node.text,
            parent,
            children: Vec::new(),
        });
        for child in node.children {
            let child_index = self.insert(child, Some(index));
            self.entries[index].children.push(child_index);
        }
        index
    }

    pub fn root(&self) -> SnapshotNode<'_> {
        SnapshotNode { tree: self, index: 0 }
    }

    pub fn find_by_id(&self, id: &str) -> GridflowResult<SnapshotNode<'_>> {
        self.entries
            .iter()
            .position(|entry| entry.id.as_deref() == Some(id))
            .map(|index| SnapshotNode { tree: self, index })
            .ok_or_else(|| GridflowError::node_not_found(format!("#{}", id)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SnapshotNode<'t> {
    tree: &'t SnapshotTree,
    index: usize,
}

impl<'t> SnapshotNode<'t> {
    fn entry(&self) -> &'t Entry {
        &self.tree.entries[self.index]
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.entry().text);
        for child in self.children() {
            child.collect_text(out);
        }
    }
}

impl<'t> GridNode for SnapshotNode<'t> {
    fn tag_name(&self) -> &str {
        &self.entry().tag
    }

    fn role(&self) -> Option<&str> {
        self.entry().role.as_deref()
    }

    fn class_name(&self) -> &str {
        &self.entry().class_name
    }

    fn display(&self) -> Option<&str> {
        self.entry().display.as_deref()
    }

    fn children(&self) -> Vec<Self> {
        self.entry()
            .children
            .iter()
            .map(|&index| SnapshotNode { tree: self.tree, index })
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.entry()
            .parent
            .map(|index| SnapshotNode { tree: self.tree, index })
    }

    fn rect(&self) -> Rect {
        self.entry().rect
    }

    fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn same_node(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}
