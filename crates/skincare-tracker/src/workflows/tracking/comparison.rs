use serde::{Deserialize, Serialize};

/// Direction a concern's score moved between baseline and the latest analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementStatus {
    Improved,
    Worsened,
    NoChange,
    InsufficientData,
}

impl ImprovementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Improved => "Improved",
            Self::Worsened => "Worsened",
            Self::NoChange => "No Change",
            Self::InsufficientData => "Not Enough Data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComparison {
    pub difference: Option<f64>,
    pub status: ImprovementStatus,
}

/// Compare a baseline score against the current one.
///
/// Equality is exact; scores arrive as rounded integers from the analysis
/// service. Values outside 0..=100 are passed through untouched. A non-finite
/// score counts as missing.
pub fn compare(baseline: Option<f64>, current: Option<f64>) -> ScoreComparison {
    let (Some(baseline), Some(current)) = (
        baseline.filter(|score| score.is_finite()),
        current.filter(|score| score.is_finite()),
    ) else {
        return ScoreComparison {
            difference: None,
            status: ImprovementStatus::InsufficientData,
        };
    };

    let difference = current - baseline;
    let status = if difference > 0.0 {
        ImprovementStatus::Improved
    } else if difference < 0.0 {
        ImprovementStatus::Worsened
    } else {
        ImprovementStatus::NoChange
    };

    ScoreComparison {
        difference: Some(difference),
        status,
    }
}
