//! Loop and response identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use st_core::Frd;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LoopType {
    #[default]
    Servo,
    Current,
}

/// Every derived response. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResponseType {
    ServoOpenLoop,
    ServoPlant,
    ServoSensitivity,
    ServoComplementarySensitivity,
    ServoProcessSensitivity,
    ServoFeedforward,
    ServoInverseFeedforward,
    ServoClosedLoop,
    ServoController,

    CurrentOpenLoop,
    CurrentPlant,
    CurrentSensitivity,
    CurrentComplementarySensitivity,
    CurrentProcessSensitivity,
    CurrentFeedforward,
    CurrentInverseFeedforward,
    CurrentClosedLoop,
    CurrentController,

    ServoControllerOnly,
    ServoFilters,
    MechanicalPlant,

    AmplifierPlant,
    AmplifierRolloffFilter,
    MotorPlant,
    CurrentFeedbackLowPassFilter,
}

impl LoopType {
    pub const ALL: [LoopType; 2] = [LoopType::Servo, LoopType::Current];

    pub fn name(self) -> &'static str {
        match self {
            LoopType::Servo => "Servo",
            LoopType::Current => "Current",
        }
    }

    /// Responses owned by this loop, in display order.
    pub fn responses(self) -> impl Iterator<Item = ResponseType> {
        ResponseType::ALL
            .into_iter()
            .filter(move |r| r.loop_type() == self)
    }
}

impl ResponseType {
    pub const ALL: [ResponseType; 25] = [
        ResponseType::ServoOpenLoop,
        ResponseType::ServoPlant,
        ResponseType::ServoSensitivity,
        ResponseType::ServoComplementarySensitivity,
        ResponseType::ServoProcessSensitivity,
        ResponseType::ServoFeedforward,
        ResponseType::ServoInverseFeedforward,
        ResponseType::ServoClosedLoop,
        ResponseType::ServoController,
        ResponseType::CurrentOpenLoop,
        ResponseType::CurrentPlant,
        ResponseType::CurrentSensitivity,
        ResponseType::CurrentComplementarySensitivity,
        ResponseType::CurrentProcessSensitivity,
        ResponseType::CurrentFeedforward,
        ResponseType::CurrentInverseFeedforward,
        ResponseType::CurrentClosedLoop,
        ResponseType::CurrentController,
        ResponseType::ServoControllerOnly,
        ResponseType::ServoFilters,
        ResponseType::MechanicalPlant,
        ResponseType::AmplifierPlant,
        ResponseType::AmplifierRolloffFilter,
        ResponseType::MotorPlant,
        ResponseType::CurrentFeedbackLowPassFilter,
    ];

    pub fn loop_type(self) -> LoopType {
        use ResponseType::*;
        match self {
            ServoOpenLoop | ServoPlant | ServoSensitivity | ServoComplementarySensitivity
            | ServoProcessSensitivity | ServoFeedforward | ServoInverseFeedforward
            | ServoClosedLoop | ServoController | ServoControllerOnly | ServoFilters
            | MechanicalPlant => LoopType::Servo,
            CurrentOpenLoop | CurrentPlant | CurrentSensitivity | CurrentComplementarySensitivity
            | CurrentProcessSensitivity | CurrentFeedforward | CurrentInverseFeedforward
            | CurrentClosedLoop | CurrentController | AmplifierPlant | AmplifierRolloffFilter
            | MotorPlant | CurrentFeedbackLowPassFilter => LoopType::Current,
        }
    }

    /// Full label, e.g. `Servo Open Loop`.
    pub fn label(self) -> &'static str {
        use ResponseType::*;
        match self {
            ServoOpenLoop => "Servo Open Loop",
            ServoPlant => "Servo Plant",
            ServoSensitivity => "Servo Sensitivity",
            ServoComplementarySensitivity => "Servo Complementary Sensitivity",
            ServoProcessSensitivity => "Servo Process Sensitivity",
            ServoFeedforward => "Servo Feedforward",
            ServoInverseFeedforward => "Servo Inverse Feedforward",
            ServoClosedLoop => "Servo Closed Loop",
            ServoController => "Servo Controller",
            CurrentOpenLoop => "Current Open Loop",
            CurrentPlant => "Current Plant",
            CurrentSensitivity => "Current Sensitivity",
            CurrentComplementarySensitivity => "Current Complementary Sensitivity",
            CurrentProcessSensitivity => "Current Process Sensitivity",
            CurrentFeedforward => "Current Feedforward",
            CurrentInverseFeedforward => "Current Inverse Feedforward",
            CurrentClosedLoop => "Current Closed Loop",
            CurrentController => "Current Controller",
            ServoControllerOnly => "Servo Controller Only",
            ServoFilters => "Servo Filters",
            MechanicalPlant => "Mechanical Plant",
            AmplifierPlant => "Amplifier Plant",
            AmplifierRolloffFilter => "Amplifier Rolloff Filter",
            MotorPlant => "Motor Plant",
            CurrentFeedbackLowPassFilter => "Current Feedback Low Pass Filter",
        }
    }

    /// Label with the owning loop's name trimmed, e.g. `Open Loop`.
    pub fn short_label(self) -> &'static str {
        let label = self.label();
        label
            .strip_prefix(self.loop_type().name())
            .map(str::trim_start)
            .unwrap_or(label)
    }

    /// Resolves a label or variant name in any spelling.
    pub fn from_name(name: &str) -> Option<ResponseType> {
        let wanted = st_blocks::kind::normalize_name(name);
        let squashed = wanted.replace(' ', "");
        ResponseType::ALL.into_iter().find(|r| {
            let label = st_blocks::kind::normalize_name(r.label());
            label == wanted || label.replace(' ', "") == squashed
        })
    }
}

impl fmt::Display for LoopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Candidate and baseline response for one entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrdPair {
    pub shaped: Option<Frd>,
    pub original: Option<Frd>,
}
