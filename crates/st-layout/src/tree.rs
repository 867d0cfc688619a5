//! Nested name tree for display.

use std::fmt;

use serde::{Deserialize, Serialize};
use st_blocks::NodeKind;

/// One node of the display tree. Keys are the node display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTree {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutTree>,
}

impl LayoutTree {
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            name: kind.name().to_string(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search for the subtree rooted at `kind`.
    pub fn find(&self, kind: NodeKind) -> Option<&LayoutTree> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }

    /// Whether `kind` appears strictly below this node.
    pub fn contains(&self, kind: NodeKind) -> bool {
        self.children.iter().any(|c| c.find(kind).is_some())
    }

    /// Pre-order list of every node kind.
    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut out = vec![self.kind];
        for c in &self.children {
            out.extend(c.kinds());
        }
        out
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{}", "", self.name, indent = depth * 2)?;
        for c in &self.children {
            c.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
