use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of readiness tags written back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessLabel {
    RestLifestyle,
    HighRiskLoad,
    RestSympathetic,
    CautionParasympathetic,
    TrainEasy,
    GoHard,
}

impl ReadinessLabel {
    pub const ALL: [ReadinessLabel; 6] = [
        ReadinessLabel::RestLifestyle,
        ReadinessLabel::HighRiskLoad,
        ReadinessLabel::RestSympathetic,
        ReadinessLabel::CautionParasympathetic,
        ReadinessLabel::TrainEasy,
        ReadinessLabel::GoHard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadinessLabel::RestLifestyle => "REST_LIFESTYLE",
            ReadinessLabel::HighRiskLoad => "HIGH_RISK_LOAD",
            ReadinessLabel::RestSympathetic => "REST_SYMPATHETIC",
            ReadinessLabel::CautionParasympathetic => "CAUTION_PARASYMPATHETIC",
            ReadinessLabel::TrainEasy => "TRAIN_EASY",
            ReadinessLabel::GoHard => "GO_HARD",
        }
    }
}

impl fmt::Display for ReadinessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score is a label code drawn from {1, 2, 3, 6, 7, 10}, not a magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessDecision {
    pub score: u8,
    pub label: ReadinessLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_serializes_as_wire_tag() {
        for label in ReadinessLabel::ALL {
            let v = serde_json::to_value(label).unwrap();
            assert_eq!(v, serde_json::Value::String(label.as_str().to_string()));
        }
    }
}
