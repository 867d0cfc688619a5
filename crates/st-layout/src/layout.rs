//! The block layout: one servo loop plus its derived indices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use st_blocks::{
    AmplifierPlant, AmplifierRolloffFilter, BlockKind, ControlBlock, ControlLoop,
    CurrentFeedbackLowPassFilter, CurrentLoop, CurrentPlant, DigitalCurrentLoop, LoopKind,
    MechanicalPlant, MotorPlant, NodeKind, NodeMut, NodeRef, ServoController, ServoLoop,
    ServoPlant,
};
use tracing::debug;

use crate::error::{LayoutError, LayoutResult};
use crate::path::NodePath;
use crate::tree::LayoutTree;

/// Owned servo loop tree with loop/block indices and a display tree.
///
/// Indices are child-slot paths, so cloning the layout clones the tree and
/// the indices stay valid for the copy. The topology is fixed after
/// construction; only block properties change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ServoLoop", into = "ServoLoop")]
pub struct BlockLayout {
    root: ServoLoop,
    loop_by_kind: BTreeMap<LoopKind, NodePath>,
    block_by_kind: BTreeMap<BlockKind, NodePath>,
    tree: LayoutTree,
}

struct Indexer {
    loops: BTreeMap<LoopKind, NodePath>,
    blocks: BTreeMap<BlockKind, NodePath>,
}

impl Indexer {
    fn visit(&mut self, node: NodeRef<'_>, path: NodePath) -> LayoutResult<LayoutTree> {
        match node {
            NodeRef::Loop(l) => {
                let kind = l.kind();
                if self.loops.insert(kind, path.clone()).is_some() {
                    return Err(LayoutError::DuplicateKind {
                        kind: NodeKind::Loop(kind),
                    });
                }
                let children = l.children();
                if children.is_empty() {
                    return Err(LayoutError::MissingChildren { kind });
                }
                let children = children
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| self.visit(child, path.child(i)))
                    .collect::<LayoutResult<Vec<_>>>()?;
                Ok(LayoutTree {
                    name: kind.name().to_string(),
                    kind: NodeKind::Loop(kind),
                    children,
                })
            }
            NodeRef::Block(b) => {
                let kind = b.kind();
                if self.blocks.insert(kind, path).is_some() {
                    return Err(LayoutError::DuplicateKind {
                        kind: NodeKind::Block(kind),
                    });
                }
                Ok(LayoutTree::leaf(NodeKind::Block(kind)))
            }
        }
    }
}

fn addr<T: ?Sized>(r: &T) -> *const () {
    std::ptr::from_ref(r).cast::<()>()
}

impl BlockLayout {
    /// # Panics
    ///
    /// If the tree is malformed; see [`BlockLayout::try_from_root`].
    pub fn new(root: ServoLoop) -> Self {
        match Self::try_from_root(root) {
            Ok(layout) => layout,
            Err(e) => panic!("malformed block layout: {e}"),
        }
    }

    /// Indexes `root` and checks that every index entry references the same
    /// instance as the typed accessors.
    pub fn try_from_root(root: ServoLoop) -> LayoutResult<Self> {
        let mut indexer = Indexer {
            loops: BTreeMap::new(),
            blocks: BTreeMap::new(),
        };
        let tree = indexer.visit(NodeRef::Loop(&root), NodePath::root())?;

        let layout = Self {
            root,
            loop_by_kind: indexer.loops,
            block_by_kind: indexer.blocks,
            tree,
        };
        layout.check_identity()?;
        debug!(
            loops = layout.loop_by_kind.len(),
            blocks = layout.block_by_kind.len(),
            "block layout indexed"
        );
        Ok(layout)
    }

    fn check_identity(&self) -> LayoutResult<()> {
        let kinds = LoopKind::ALL
            .into_iter()
            .map(NodeKind::Loop)
            .chain(BlockKind::ALL.into_iter().map(NodeKind::Block));
        for kind in kinds {
            let indexed = self.try_find(kind)?;
            if !std::ptr::addr_eq(indexed.addr(), self.typed_addr(kind)) {
                return Err(LayoutError::IdentityMismatch { kind });
            }
        }
        Ok(())
    }

    fn typed_addr(&self, kind: NodeKind) -> *const () {
        match kind {
            NodeKind::Loop(LoopKind::ServoLoop) => addr(self.servo_loop()),
            NodeKind::Loop(LoopKind::ServoPlant) => addr(self.servo_plant()),
            NodeKind::Loop(LoopKind::CurrentLoop) => addr(self.current_loop()),
            NodeKind::Loop(LoopKind::CurrentPlant) => addr(self.current_plant()),
            NodeKind::Block(BlockKind::ServoController) => addr(self.servo_controller()),
            NodeKind::Block(BlockKind::DigitalCurrentLoop) => addr(self.digital_current_loop()),
            NodeKind::Block(BlockKind::AmplifierPlant) => addr(self.amplifier_plant()),
            NodeKind::Block(BlockKind::AmplifierRolloffFilter) => {
                addr(self.amplifier_rolloff_filter())
            }
            NodeKind::Block(BlockKind::MotorPlant) => addr(self.motor_plant()),
            NodeKind::Block(BlockKind::CurrentFeedbackLowPassFilter) => {
                addr(self.current_feedback_low_pass_filter())
            }
            NodeKind::Block(BlockKind::MechanicalPlant) => addr(self.mechanical_plant()),
        }
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn path_of(&self, kind: NodeKind) -> Option<&NodePath> {
        match kind {
            NodeKind::Loop(k) => self.loop_by_kind.get(&k),
            NodeKind::Block(k) => self.block_by_kind.get(&k),
        }
    }

    // --- lookup ---------------------------------------------------------

    pub fn try_find(&self, kind: NodeKind) -> LayoutResult<NodeRef<'_>> {
        self.path_of(kind)
            .and_then(|p| p.resolve(&self.root))
            .ok_or(LayoutError::NotFound { what: kind })
    }

    pub fn try_find_mut(&mut self, kind: NodeKind) -> LayoutResult<NodeMut<'_>> {
        let path = match kind {
            NodeKind::Loop(k) => self.loop_by_kind.get(&k),
            NodeKind::Block(k) => self.block_by_kind.get(&k),
        };
        path.and_then(|p| p.resolve_mut(&mut self.root))
            .ok_or(LayoutError::NotFound { what: kind })
    }

    pub fn try_find_loop(&self, kind: LoopKind) -> LayoutResult<&dyn ControlLoop> {
        match self.try_find(NodeKind::Loop(kind))? {
            NodeRef::Loop(l) => Ok(l),
            NodeRef::Block(_) => Err(LayoutError::NotFound {
                what: NodeKind::Loop(kind),
            }),
        }
    }

    pub fn try_find_block(&self, kind: BlockKind) -> LayoutResult<&dyn ControlBlock> {
        match self.try_find(NodeKind::Block(kind))? {
            NodeRef::Block(b) => Ok(b),
            NodeRef::Loop(_) => Err(LayoutError::NotFound {
                what: NodeKind::Block(kind),
            }),
        }
    }

    pub fn try_find_loop_mut(&mut self, kind: LoopKind) -> LayoutResult<&mut dyn ControlLoop> {
        match self.try_find_mut(NodeKind::Loop(kind))? {
            NodeMut::Loop(l) => Ok(l),
            NodeMut::Block(_) => Err(LayoutError::NotFound {
                what: NodeKind::Loop(kind),
            }),
        }
    }

    pub fn try_find_block_mut(&mut self, kind: BlockKind) -> LayoutResult<&mut dyn ControlBlock> {
        match self.try_find_mut(NodeKind::Block(kind))? {
            NodeMut::Block(b) => Ok(b),
            NodeMut::Loop(_) => Err(LayoutError::NotFound {
                what: NodeKind::Block(kind),
            }),
        }
    }

    /// # Panics
    ///
    /// If the loop is missing, which cannot happen for a validated layout.
    pub fn find_loop(&self, kind: LoopKind) -> &dyn ControlLoop {
        match self.try_find_loop(kind) {
            Ok(l) => l,
            Err(e) => panic!("{e}"),
        }
    }

    /// # Panics
    ///
    /// If the block is missing, which cannot happen for a validated layout.
    pub fn find_block(&self, kind: BlockKind) -> &dyn ControlBlock {
        match self.try_find_block(kind) {
            Ok(b) => b,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn find_block_mut(&mut self, kind: BlockKind) -> &mut dyn ControlBlock {
        match self.try_find_block_mut(kind) {
            Ok(b) => b,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn find_loop_mut(&mut self, kind: LoopKind) -> &mut dyn ControlLoop {
        match self.try_find_loop_mut(kind) {
            Ok(l) => l,
            Err(e) => panic!("{e}"),
        }
    }

    /// Resolves a display name in any common spelling ("Servo Controller",
    /// "servo_controller", ...).
    pub fn find_by_name(&self, name: &str) -> LayoutResult<NodeRef<'_>> {
        let kind = NodeKind::from_name(name).ok_or_else(|| LayoutError::UnknownName {
            name: name.to_string(),
        })?;
        self.try_find(kind)
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> LayoutResult<NodeMut<'_>> {
        let kind = NodeKind::from_name(name).ok_or_else(|| LayoutError::UnknownName {
            name: name.to_string(),
        })?;
        self.try_find_mut(kind)
    }

    /// Every block, in tree pre-order.
    pub fn flatten_blocks(&self) -> Vec<&dyn ControlBlock> {
        self.tree
            .kinds()
            .into_iter()
            .filter_map(|kind| match kind {
                NodeKind::Block(k) => self.try_find_block(k).ok(),
                NodeKind::Loop(_) => None,
            })
            .collect()
    }

    /// Whether `target` sits anywhere below `parent`.
    pub fn is_descendant(&self, parent: LoopKind, target: NodeKind) -> bool {
        self.tree
            .find(NodeKind::Loop(parent))
            .is_some_and(|t| t.contains(target))
    }

    // --- typed accessors ------------------------------------------------

    pub fn servo_loop(&self) -> &ServoLoop {
        &self.root
    }

    pub fn servo_loop_mut(&mut self) -> &mut ServoLoop {
        &mut self.root
    }

    pub fn into_servo_loop(self) -> ServoLoop {
        self.root
    }

    pub fn servo_controller(&self) -> &ServoController {
        &self.root.servo_controller
    }

    pub fn servo_controller_mut(&mut self) -> &mut ServoController {
        &mut self.root.servo_controller
    }

    pub fn servo_plant(&self) -> &ServoPlant {
        &self.root.servo_plant
    }

    pub fn servo_plant_mut(&mut self) -> &mut ServoPlant {
        &mut self.root.servo_plant
    }

    pub fn current_loop(&self) -> &CurrentLoop {
        &self.root.servo_plant.current_loop
    }

    pub fn current_loop_mut(&mut self) -> &mut CurrentLoop {
        &mut self.root.servo_plant.current_loop
    }

    pub fn digital_current_loop(&self) -> &DigitalCurrentLoop {
        &self.current_loop().digital_current_loop
    }

    pub fn digital_current_loop_mut(&mut self) -> &mut DigitalCurrentLoop {
        &mut self.current_loop_mut().digital_current_loop
    }

    pub fn current_plant(&self) -> &CurrentPlant {
        &self.current_loop().current_plant
    }

    pub fn current_plant_mut(&mut self) -> &mut CurrentPlant {
        &mut self.current_loop_mut().current_plant
    }

    pub fn amplifier_plant(&self) -> &AmplifierPlant {
        &self.current_plant().amplifier_plant
    }

    pub fn amplifier_plant_mut(&mut self) -> &mut AmplifierPlant {
        &mut self.current_plant_mut().amplifier_plant
    }

    pub fn amplifier_rolloff_filter(&self) -> &AmplifierRolloffFilter {
        &self.current_plant().amplifier_rolloff_filter
    }

    pub fn motor_plant(&self) -> &MotorPlant {
        &self.current_plant().motor_plant
    }

    pub fn current_feedback_low_pass_filter(&self) -> &CurrentFeedbackLowPassFilter {
        &self.current_plant().current_feedback_low_pass_filter
    }

    pub fn mechanical_plant(&self) -> &MechanicalPlant {
        &self.root.servo_plant.mechanical_plant
    }

    pub fn mechanical_plant_mut(&mut self) -> &mut MechanicalPlant {
        &mut self.root.servo_plant.mechanical_plant
    }
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self::new(ServoLoop::default())
    }
}

impl TryFrom<ServoLoop> for BlockLayout {
    type Error = LayoutError;

    fn try_from(root: ServoLoop) -> LayoutResult<Self> {
        Self::try_from_root(root)
    }
}

impl From<BlockLayout> for ServoLoop {
    fn from(layout: BlockLayout) -> Self {
        layout.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st_blocks::PropertyValue;

    #[test]
    fn indexes_every_kind() {
        let layout = BlockLayout::default();
        for kind in LoopKind::ALL {
            assert_eq!(layout.find_loop(kind).kind(), kind);
        }
        for kind in BlockKind::ALL {
            assert_eq!(layout.find_block(kind).kind(), kind);
        }
        assert_eq!(layout.tree().kinds().len(), 11);
    }

    #[test]
    fn index_references_tree_instance() {
        let mut layout = BlockLayout::default();
        layout
            .find_block_mut(BlockKind::MechanicalPlant)
            .set_property("Mass", PropertyValue::Float(3.0))
            .unwrap();
        assert_eq!(layout.mechanical_plant().properties.mass_kg, 3.0);
        assert!(std::ptr::addr_eq(
            NodeRef::Block(layout.find_block(BlockKind::ServoController)).addr(),
            addr(layout.servo_controller()),
        ));
    }

    #[test]
    fn clone_is_independent() {
        let original = BlockLayout::default();
        let mut copy = original.clone();
        copy.servo_controller_mut().properties.k = 9.0;
        assert_eq!(original.servo_controller().properties.k, 1.0);
        assert_eq!(
            copy.find_by_name("servo_controller").unwrap().name(),
            "Servo Controller"
        );
        // The copy's indices resolve into the copy.
        match copy.find_by_name("Servo Controller").unwrap() {
            NodeRef::Block(b) => {
                assert_eq!(b.property("K").unwrap(), PropertyValue::Float(9.0));
            }
            NodeRef::Loop(_) => panic!("expected block"),
        }
    }

    #[test]
    fn descendants() {
        let layout = BlockLayout::default();
        let motor = NodeKind::Block(BlockKind::MotorPlant);
        assert!(layout.is_descendant(LoopKind::ServoLoop, motor));
        assert!(layout.is_descendant(LoopKind::CurrentPlant, motor));
        assert!(!layout.is_descendant(
            LoopKind::CurrentPlant,
            NodeKind::Block(BlockKind::MechanicalPlant)
        ));
        assert!(!layout.is_descendant(LoopKind::ServoPlant, NodeKind::Loop(LoopKind::ServoPlant)));
    }

    #[test]
    fn unknown_name_is_error() {
        let layout = BlockLayout::default();
        assert_eq!(
            layout.find_by_name("Torque Sensor").err(),
            Some(LayoutError::UnknownName {
                name: "Torque Sensor".into()
            })
        );
    }
}
