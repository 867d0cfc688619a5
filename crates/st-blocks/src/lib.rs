//! Control-system blocks and loops for the cascaded servo model.
//!
//! The topology is fixed and closed:
//!
//! ```text
//! Servo Loop
//! ├── Servo Controller
//! └── Servo Plant
//!     ├── Current Loop
//!     │   ├── Digital Current Loop
//!     │   └── Current Plant
//!     │       ├── Amplifier Plant
//!     │       ├── Amplifier Rolloff Filter
//!     │       ├── Motor Plant
//!     │       └── Current Feedback Low Pass Filter
//!     └── Mechanical Plant
//! ```
//!
//! Leaves implement [`ControlBlock`] (zeros, poles, gain and a frequency
//! response); containers implement [`ControlLoop`] and expose their children
//! through the [`NodeRef`]/[`NodeMut`] tagged unions so that traversals match
//! exhaustively on loop vs. block.

pub mod current_controller;
pub mod error;
pub mod imported;
pub mod kind;
pub mod loops;
pub mod node;
pub mod plants;
pub mod property;
pub mod servo_controller;

pub use current_controller::{CURRENT_LOOP_SCALE, CurrentLoopProperties, DigitalCurrentLoop};
pub use error::{BlockError, BlockResult};
pub use imported::ImportedResponse;
pub use kind::{BlockKind, BlockRepresentation, LoopKind, NodeKind};
pub use loops::{CurrentLoop, CurrentPlant, PlantSource, ServoLoop, ServoPlant};
pub use node::{ControlBlock, ControlLoop, EvalContext, NodeMut, NodeRef};
pub use plants::{
    AmplifierPlant, AmplifierProperties, AmplifierRolloffFilter, CurrentFeedbackLowPassFilter,
    MechanicalPlant, MechanicalProperties, MotorPlant, MotorProperties, RcProperties,
};
pub use property::{PropertyDescriptor, PropertyKind, PropertyValue};
pub use servo_controller::{
    DriveType, EnhancedTrackingControl, EtcSetup, FEEDFORWARD_FILTER_COUNT, MAX_ADVANCE_SAMPLES,
    SERVO_FILTER_COUNT, ServoController, ServoProperties,
};
