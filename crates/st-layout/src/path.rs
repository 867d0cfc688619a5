//! Child-slot paths into the loop tree.

use std::fmt;

use serde::{Deserialize, Serialize};
use st_blocks::{NodeMut, NodeRef, ServoLoop};

/// Sequence of child indices from the servo loop down to one node. The
/// empty path is the servo loop itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    pub fn resolve<'a>(&self, root: &'a ServoLoop) -> Option<NodeRef<'a>> {
        let mut node = NodeRef::Loop(root);
        for &i in &self.0 {
            node = match node {
                NodeRef::Loop(l) => l.children().into_iter().nth(i)?,
                NodeRef::Block(_) => return None,
            };
        }
        Some(node)
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut ServoLoop) -> Option<NodeMut<'a>> {
        let mut node = NodeMut::Loop(root);
        for &i in &self.0 {
            node = match node {
                NodeMut::Loop(l) => l.children_mut().into_iter().nth(i)?,
                NodeMut::Block(_) => return None,
            };
        }
        Some(node)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (n, i) in self.0.iter().enumerate() {
            if n > 0 {
                f.write_str("/")?;
            }
            write!(f, "{i}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_blocks::{BlockKind, LoopKind, NodeKind};

    #[test]
    fn resolves_nested_nodes() {
        let root = ServoLoop::default();
        assert_eq!(
            NodePath::root().resolve(&root).map(|n| n.kind()),
            Some(NodeKind::Loop(LoopKind::ServoLoop))
        );
        // Servo Plant → Current Loop → Current Plant → Motor Plant
        let motor = NodePath::root().child(1).child(0).child(1).child(2);
        assert_eq!(
            motor.resolve(&root).map(|n| n.kind()),
            Some(NodeKind::Block(BlockKind::MotorPlant))
        );
        assert_eq!(motor.to_string(), "/1/0/1/2");
        assert_eq!(motor.depth(), 4);
    }

    #[test]
    fn out_of_range_or_through_block_is_none() {
        let mut root = ServoLoop::default();
        assert!(NodePath::root().child(5).resolve(&root).is_none());
        // Servo Controller is a block; it has no children.
        assert!(NodePath::root().child(0).child(0).resolve(&root).is_none());
        assert!(NodePath::root().child(0).child(0).resolve_mut(&mut root).is_none());
        assert!(NodePath::root().child(0).resolve_mut(&mut root).is_some());
    }
}
