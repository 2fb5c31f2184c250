//! The result record of one validation call.

use serde::{Deserialize, Serialize};

use crate::sides::SideTriple;

/// The model's view of a triple.
///
/// All three values exist together or not at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiAssessment {
    score: f64,
    is_valid: bool,
    is_consistent: bool,
}

impl AiAssessment {
    /// Thresholds `score` with a strict `>` and compares the outcome to the
    /// geometric result.
    pub fn new(score: f64, threshold: f64, math_result: bool) -> Self {
        let is_valid = score > threshold;
        Self {
            score,
            is_valid,
            is_consistent: is_valid == math_result,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_consistent(&self) -> bool {
        self.is_consistent
    }
}

/// Combined geometric and model verdict for one side triple.
///
/// Serializes to a flat record with the fields `sides`, `math_result`,
/// `ai_prediction_value`, `is_valid_by_ai` and `is_consistent`; the last three
/// are `null` when no model verdict was available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VerdictRecord", into = "VerdictRecord")]
pub struct Verdict {
    sides: SideTriple,
    math_result: bool,
    ai: Option<AiAssessment>,
}

impl Verdict {
    pub fn new(sides: SideTriple, math_result: bool, ai: Option<AiAssessment>) -> Self {
        Self {
            sides,
            math_result,
            ai,
        }
    }

    /// A verdict with no model contribution.
    pub fn geometric_only(sides: SideTriple, math_result: bool) -> Self {
        Self::new(sides, math_result, None)
    }

    pub fn sides(&self) -> SideTriple {
        self.sides
    }

    pub fn math_result(&self) -> bool {
        self.math_result
    }

    pub fn ai(&self) -> Option<&AiAssessment> {
        self.ai.as_ref()
    }

    pub fn ai_prediction_value(&self) -> Option<f64> {
        self.ai.map(|ai| ai.score)
    }

    pub fn is_valid_by_ai(&self) -> Option<bool> {
        self.ai.map(|ai| ai.is_valid)
    }

    pub fn is_consistent(&self) -> Option<bool> {
        self.ai.map(|ai| ai.is_consistent)
    }

    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VerdictRecord {
    sides: SideTriple,
    math_result: bool,
    ai_prediction_value: Option<f64>,
    is_valid_by_ai: Option<bool>,
    is_consistent: Option<bool>,
}

impl From<Verdict> for VerdictRecord {
    fn from(v: Verdict) -> Self {
        VerdictRecord {
            sides: v.sides,
            math_result: v.math_result,
            ai_prediction_value: v.ai_prediction_value(),
            is_valid_by_ai: v.is_valid_by_ai(),
            is_consistent: v.is_consistent(),
        }
    }
}

impl TryFrom<VerdictRecord> for Verdict {
    type Error = String;

    fn try_from(r: VerdictRecord) -> Result<Self, Self::Error> {
        let ai = match (r.ai_prediction_value, r.is_valid_by_ai, r.is_consistent) {
            (None, None, None) => None,
            (Some(score), Some(is_valid), Some(is_consistent)) => {
                if is_consistent != (is_valid == r.math_result) {
                    return Err("is_consistent disagrees with math_result and is_valid_by_ai".into());
                }
                Some(AiAssessment {
                    score,
                    is_valid,
                    is_consistent,
                })
            }
            _ => return Err("AI fields must be all present or all absent".into()),
        };
        Ok(Verdict::new(r.sides, r.math_result, ai))
    }
}
