//! Closed sets of loop and block kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoopKind {
    ServoLoop,
    ServoPlant,
    CurrentLoop,
    CurrentPlant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    ServoController,
    DigitalCurrentLoop,
    AmplifierPlant,
    AmplifierRolloffFilter,
    MotorPlant,
    CurrentFeedbackLowPassFilter,
    MechanicalPlant,
}

/// Either kind of node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Loop(LoopKind),
    Block(BlockKind),
}

/// How a plant produces its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockRepresentation {
    /// Analytic model from the node's own parameters.
    #[default]
    Parameters,
    /// Imported measurement; nested blocks are ignored.
    FrequencyResponse,
}

impl LoopKind {
    pub const ALL: [LoopKind; 4] = [
        LoopKind::ServoLoop,
        LoopKind::ServoPlant,
        LoopKind::CurrentLoop,
        LoopKind::CurrentPlant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LoopKind::ServoLoop => "Servo Loop",
            LoopKind::ServoPlant => "Servo Plant",
            LoopKind::CurrentLoop => "Current Loop",
            LoopKind::CurrentPlant => "Current Plant",
        }
    }
}

impl BlockKind {
    pub const ALL: [BlockKind; 7] = [
        BlockKind::ServoController,
        BlockKind::DigitalCurrentLoop,
        BlockKind::AmplifierPlant,
        BlockKind::AmplifierRolloffFilter,
        BlockKind::MotorPlant,
        BlockKind::CurrentFeedbackLowPassFilter,
        BlockKind::MechanicalPlant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::ServoController => "Servo Controller",
            BlockKind::DigitalCurrentLoop => "Digital Current Loop",
            BlockKind::AmplifierPlant => "Amplifier Plant",
            BlockKind::AmplifierRolloffFilter => "Amplifier Rolloff Filter",
            BlockKind::MotorPlant => "Motor Plant",
            BlockKind::CurrentFeedbackLowPassFilter => "Current Feedback Low Pass Filter",
            BlockKind::MechanicalPlant => "Mechanical Plant",
        }
    }

    /// Other names the UI and saved files use for the same block.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            BlockKind::DigitalCurrentLoop => &["current controller"],
            BlockKind::CurrentFeedbackLowPassFilter => &["current feedback lpf"],
            BlockKind::AmplifierPlant => &["amplifier plant block"],
            BlockKind::AmplifierRolloffFilter => &["amplifier rolloff filter block"],
            BlockKind::MotorPlant => &["motor plant block"],
            _ => &[],
        }
    }
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Loop(k) => k.name(),
            NodeKind::Block(k) => k.name(),
        }
    }

    /// Resolves a display name. Case, surrounding whitespace and the choice
    /// of `_` or space as separator are ignored.
    pub fn from_name(name: &str) -> Option<NodeKind> {
        let wanted = normalize_name(name);
        LoopKind::ALL
            .into_iter()
            .find(|k| normalize_name(k.name()) == wanted)
            .map(NodeKind::Loop)
            .or_else(|| {
                BlockKind::ALL
                    .into_iter()
                    .find(|k| {
                        normalize_name(k.name()) == wanted
                            || k.aliases().iter().any(|a| *a == wanted)
                    })
                    .map(NodeKind::Block)
            })
    }
}

/// Lowercase, `_` → space, collapsed whitespace.
pub fn normalize_name(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for BlockRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockRepresentation::Parameters => "Parameters",
            BlockRepresentation::FrequencyResponse => "Frequency Response",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_in_any_spelling() {
        for spelling in ["Servo Controller", "Servo_Controller", "servo_controller", "  SERVO   controller "] {
            assert_eq!(
                NodeKind::from_name(spelling),
                Some(NodeKind::Block(BlockKind::ServoController))
            );
        }
        assert_eq!(
            NodeKind::from_name("Current_Plant"),
            Some(NodeKind::Loop(LoopKind::CurrentPlant))
        );
        assert_eq!(
            NodeKind::from_name("Current_Feedback_LPF"),
            Some(NodeKind::Block(BlockKind::CurrentFeedbackLowPassFilter))
        );
        assert_eq!(NodeKind::from_name("Flux Capacitor"), None);
    }

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for k in LoopKind::ALL {
            assert_eq!(NodeKind::from_name(k.name()), Some(NodeKind::Loop(k)));
        }
        for k in BlockKind::ALL {
            assert_eq!(NodeKind::from_name(k.name()), Some(NodeKind::Block(k)));
        }
    }
}
