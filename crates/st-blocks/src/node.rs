//! Block and loop traits, and the tagged union used to walk the tree.

use std::fmt;

use st_core::{Complex64, Frd, Real};

use crate::error::{BlockError, BlockResult};
use crate::kind::{BlockKind, BlockRepresentation, LoopKind, NodeKind};
use crate::property::{PropertyDescriptor, PropertyValue};

/// Inputs every block evaluation needs.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// Angular frequency grid, rad/s.
    pub omega: &'a [Real],
    /// Servo drive sample rate, Hz. The current loop runs at this rate.
    pub drive_frequency_hz: Real,
}

impl<'a> EvalContext<'a> {
    pub fn new(omega: &'a [Real], drive_frequency_hz: Real) -> Self {
        Self {
            omega,
            drive_frequency_hz,
        }
    }
}

/// Leaf of the topology.
pub trait ControlBlock: fmt::Debug + Send {
    fn kind(&self) -> BlockKind;

    /// Continuous-time zeros, or `None` when the block has no single
    /// zero/pole/gain form for its current settings.
    fn zeros(&self) -> Option<Vec<Complex64>>;

    fn poles(&self) -> Option<Vec<Complex64>>;

    fn gain(&self) -> Real;

    /// Computes the block response. Never fails: degenerate parameters
    /// produce a logged unity fallback.
    fn compute(&mut self, ctx: &EvalContext<'_>) -> Frd;

    fn cache_mut(&mut self) -> &mut Option<Frd>;

    fn last_response(&self) -> Option<&Frd>;

    fn descriptors(&self) -> &'static [PropertyDescriptor];

    fn property(&self, name: &str) -> BlockResult<PropertyValue>;

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()>;

    /// Computes and caches the response.
    fn evaluate(&mut self, ctx: &EvalContext<'_>) -> Frd {
        let frd = self.compute(ctx);
        *self.cache_mut() = Some(frd.clone());
        frd
    }

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Every property with its current value, in declaration order.
    fn properties(&self) -> Vec<(PropertyDescriptor, PropertyValue)> {
        self.descriptors()
            .iter()
            .filter_map(|d| self.property(d.name).ok().map(|v| (*d, v)))
            .collect()
    }
}

/// Fixed-shape container of blocks and loops.
pub trait ControlLoop: fmt::Debug + Send {
    fn kind(&self) -> LoopKind;

    /// Children in declaration order. Never empty for a well-formed loop.
    fn children(&self) -> Vec<NodeRef<'_>>;

    fn children_mut(&mut self) -> Vec<NodeMut<'_>>;

    /// Plant loops can be switched to an imported response.
    fn representation(&self) -> Option<BlockRepresentation> {
        None
    }

    fn descriptors(&self) -> &'static [PropertyDescriptor] {
        &[]
    }

    fn property(&self, name: &str) -> BlockResult<PropertyValue> {
        Err(BlockError::UnknownProperty {
            node: self.kind().name(),
            name: name.to_string(),
        })
    }

    fn set_property(&mut self, name: &str, _value: PropertyValue) -> BlockResult<()> {
        Err(BlockError::UnknownProperty {
            node: self.kind().name(),
            name: name.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Loop(&'a dyn ControlLoop),
    Block(&'a dyn ControlBlock),
}

#[derive(Debug)]
pub enum NodeMut<'a> {
    Loop(&'a mut dyn ControlLoop),
    Block(&'a mut dyn ControlBlock),
}

impl NodeRef<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Loop(l) => NodeKind::Loop(l.kind()),
            NodeRef::Block(b) => NodeKind::Block(b.kind()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Address of the referenced node, for identity comparisons.
    pub fn addr(&self) -> *const () {
        match self {
            NodeRef::Loop(l) => std::ptr::from_ref(*l).cast::<()>(),
            NodeRef::Block(b) => std::ptr::from_ref(*b).cast::<()>(),
        }
    }
}

impl NodeMut<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeMut::Loop(l) => NodeKind::Loop(l.kind()),
            NodeMut::Block(b) => NodeKind::Block(b.kind()),
        }
    }
}

/// `frd` unchanged when every value is finite, otherwise the unity fallback.
pub(crate) fn finite_or_unity(kind: BlockKind, frd: Frd, reason: &'static str) -> Frd {
    if frd.response().iter().all(|c| c.is_finite()) {
        frd
    } else {
        unity_fallback(kind, frd.frequency(), reason)
    }
}

/// Logged unity response used when a block's parameters are degenerate.
pub(crate) fn unity_fallback(kind: BlockKind, omega: &[Real], reason: &'static str) -> Frd {
    tracing::warn!(block = %kind, reason, "degenerate parameters, defaulting to unity gain");
    Frd::unity(omega)
}
