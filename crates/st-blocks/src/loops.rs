//! Fixed-shape loop containers.
//!
//! Loops own their children by value; the child list returned through
//! [`ControlLoop`] is always in declaration order.

use serde::{Deserialize, Serialize};
use st_core::Frd;

use crate::current_controller::DigitalCurrentLoop;
use crate::error::BlockResult;
use crate::imported::ImportedResponse;
use crate::kind::{BlockRepresentation, LoopKind};
use crate::node::{ControlBlock, ControlLoop, EvalContext, NodeMut, NodeRef};
use crate::plants::{
    AmplifierPlant, AmplifierRolloffFilter, CurrentFeedbackLowPassFilter, MechanicalPlant,
    MotorPlant,
};
use crate::property::{PropertyDescriptor, PropertyKind, PropertyValue, resolve};
use crate::servo_controller::ServoController;

const REPRESENTATION: &str = "Block Representation";
const FREQUENCY_RESPONSE: &str = "Frequency Response";

const PLANT_DESCRIPTORS: &[PropertyDescriptor] = &[
    PropertyDescriptor::new(REPRESENTATION, PropertyKind::Enum),
    PropertyDescriptor::new(FREQUENCY_RESPONSE, PropertyKind::FrequencyResponse),
];

/// Representation flag plus imported curve shared by the two plant loops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantSource {
    pub representation: BlockRepresentation,
    pub frequency_response: ImportedResponse,
}

impl PlantSource {
    pub fn is_frequency_response(&self) -> bool {
        self.representation == BlockRepresentation::FrequencyResponse
    }

    fn property(&self, node: &'static str, name: &str) -> BlockResult<PropertyValue> {
        Ok(match resolve(PLANT_DESCRIPTORS, node, name)? {
            REPRESENTATION => PropertyValue::Representation(self.representation),
            _ => PropertyValue::FrequencyResponse(self.frequency_response.clone()),
        })
    }

    fn set_property(&mut self, node: &'static str, name: &str, value: PropertyValue) -> BlockResult<()> {
        match resolve(PLANT_DESCRIPTORS, node, name)? {
            REPRESENTATION => self.representation = value.into_representation(REPRESENTATION)?,
            _ => self.frequency_response = value.into_response(FREQUENCY_RESPONSE)?,
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------

/// Outermost loop: servo controller over the servo plant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoLoop {
    pub servo_controller: ServoController,
    pub servo_plant: ServoPlant,
}

impl ControlLoop for ServoLoop {
    fn kind(&self) -> LoopKind {
        LoopKind::ServoLoop
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Block(&self.servo_controller),
            NodeRef::Loop(&self.servo_plant),
        ]
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        vec![
            NodeMut::Block(&mut self.servo_controller),
            NodeMut::Loop(&mut self.servo_plant),
        ]
    }
}

/// Everything the servo controller drives: the closed current loop and the
/// mechanics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoPlant {
    #[serde(flatten)]
    pub source: PlantSource,
    pub current_loop: CurrentLoop,
    pub mechanical_plant: MechanicalPlant,
}

impl ServoPlant {
    pub fn is_frequency_response(&self) -> bool {
        self.source.is_frequency_response()
    }
}

impl ControlLoop for ServoPlant {
    fn kind(&self) -> LoopKind {
        LoopKind::ServoPlant
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Loop(&self.current_loop),
            NodeRef::Block(&self.mechanical_plant),
        ]
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        vec![
            NodeMut::Loop(&mut self.current_loop),
            NodeMut::Block(&mut self.mechanical_plant),
        ]
    }

    fn representation(&self) -> Option<BlockRepresentation> {
        Some(self.source.representation)
    }

    fn descriptors(&self) -> &'static [PropertyDescriptor] {
        PLANT_DESCRIPTORS
    }

    fn property(&self, name: &str) -> BlockResult<PropertyValue> {
        self.source.property(LoopKind::ServoPlant.name(), name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
        self.source.set_property(LoopKind::ServoPlant.name(), name, value)
    }
}

/// Digital current controller over the electrical plant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentLoop {
    pub digital_current_loop: DigitalCurrentLoop,
    pub current_plant: CurrentPlant,
}

impl ControlLoop for CurrentLoop {
    fn kind(&self) -> LoopKind {
        LoopKind::CurrentLoop
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Block(&self.digital_current_loop),
            NodeRef::Loop(&self.current_plant),
        ]
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        vec![
            NodeMut::Block(&mut self.digital_current_loop),
            NodeMut::Loop(&mut self.current_plant),
        ]
    }
}

/// Amplifier, roll-off, motor winding and feedback filter in series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentPlant {
    #[serde(flatten)]
    pub source: PlantSource,
    pub amplifier_plant: AmplifierPlant,
    pub amplifier_rolloff_filter: AmplifierRolloffFilter,
    pub motor_plant: MotorPlant,
    pub current_feedback_low_pass_filter: CurrentFeedbackLowPassFilter,
}

impl CurrentPlant {
    pub fn is_frequency_response(&self) -> bool {
        self.source.is_frequency_response()
    }

    /// Product of the four series blocks, each cached on the way.
    pub fn evaluate(&mut self, ctx: &EvalContext<'_>) -> Frd {
        self.amplifier_plant.evaluate(ctx)
            * self.amplifier_rolloff_filter.evaluate(ctx)
            * self.motor_plant.evaluate(ctx)
            * self.current_feedback_low_pass_filter.evaluate(ctx)
    }
}

impl ControlLoop for CurrentPlant {
    fn kind(&self) -> LoopKind {
        LoopKind::CurrentPlant
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        vec![
            NodeRef::Block(&self.amplifier_plant),
            NodeRef::Block(&self.amplifier_rolloff_filter),
            NodeRef::Block(&self.motor_plant),
            NodeRef::Block(&self.current_feedback_low_pass_filter),
        ]
    }

    fn children_mut(&mut self) -> Vec<NodeMut<'_>> {
        vec![
            NodeMut::Block(&mut self.amplifier_plant),
            NodeMut::Block(&mut self.amplifier_rolloff_filter),
            NodeMut::Block(&mut self.motor_plant),
            NodeMut::Block(&mut self.current_feedback_low_pass_filter),
        ]
    }

    fn representation(&self) -> Option<BlockRepresentation> {
        Some(self.source.representation)
    }

    fn descriptors(&self) -> &'static [PropertyDescriptor] {
        PLANT_DESCRIPTORS
    }

    fn property(&self, name: &str) -> BlockResult<PropertyValue> {
        self.source.property(LoopKind::CurrentPlant.name(), name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> BlockResult<()> {
        self.source.set_property(LoopKind::CurrentPlant.name(), name, value)
    }
}
