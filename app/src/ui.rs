//! Text rendering of verdicts.

use trivalid::Verdict;

use crate::app::ViewChange;

fn possible(flag: bool) -> &'static str {
    if flag { "possible" } else { "impossible" }
}

/// One-line, human-readable summary of a verdict.
pub fn summary(verdict: &Verdict) -> String {
    let math = format!(
        "Result: triangle {} (geometric check)",
        possible(verdict.math_result())
    );
    match verdict.ai() {
        Some(ai) => format!(
            "{}, AI prediction: {} (score: {:.2}), {}",
            math,
            possible(ai.is_valid()),
            ai.score(),
            if ai.is_consistent() {
                "methods agree"
            } else {
                "methods DISAGREE"
            }
        ),
        None => format!("{}, AI prediction unavailable", math),
    }
}

/// Describes a change between two successive verdicts, for the `watch` mode.
pub fn describe_change(change: &ViewChange, verdict: &Verdict) -> String {
    match change {
        ViewChange::Sides => format!("sides -> {}", verdict.sides()),
        ViewChange::MathResult => format!("geometric check -> {}", possible(verdict.math_result())),
        ViewChange::AiAvailability => {
            if verdict.has_ai() {
                "AI prediction -> available".to_string()
            } else {
                "AI prediction -> unavailable".to_string()
            }
        }
        ViewChange::AiScore => match verdict.ai_prediction_value() {
            Some(score) => format!("AI score -> {:.2}", score),
            None => "AI score -> none".to_string(),
        },
        ViewChange::AiVerdict => match verdict.is_valid_by_ai() {
            Some(valid) => format!("AI verdict -> {}", possible(valid)),
            None => "AI verdict -> none".to_string(),
        },
        ViewChange::Consistency => match verdict.is_consistent() {
            Some(true) => "methods -> agree".to_string(),
            Some(false) => "methods -> DISAGREE".to_string(),
            None => "methods -> not compared".to_string(),
        },
    }
}
