//! Presentation state: the latest verdict and what changed since the last one.

use trivalid::Verdict;

/// Something the presentation layer should redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Sides,
    MathResult,
    AiAvailability,
    AiScore,
    AiVerdict,
    Consistency,
}

/// Holds the most recent verdict for a front end.
///
/// The validator hands out immutable verdicts; this holder compares each new
/// one against the previous and reports the fields that differ, so a front end
/// only redraws what moved.
#[derive(Debug, Default)]
pub struct ViewState {
    current: Option<Verdict>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `verdict` and returns the changes relative to the previous one.
    /// The first verdict reports every field as changed.
    pub fn apply(&mut self, verdict: Verdict) -> Vec<ViewChange> {
        let changes = match &self.current {
            None => vec![
                ViewChange::Sides,
                ViewChange::MathResult,
                ViewChange::AiAvailability,
                ViewChange::AiScore,
                ViewChange::AiVerdict,
                ViewChange::Consistency,
            ],
            Some(previous) => diff(previous, &verdict),
        };
        self.current = Some(verdict);
        changes
    }
}

fn diff(old: &Verdict, new: &Verdict) -> Vec<ViewChange> {
    let mut changes = Vec::new();
    if old.sides() != new.sides() {
        changes.push(ViewChange::Sides);
    }
    if old.math_result() != new.math_result() {
        changes.push(ViewChange::MathResult);
    }
    if old.has_ai() != new.has_ai() {
        changes.push(ViewChange::AiAvailability);
    }
    if old.ai_prediction_value() != new.ai_prediction_value() {
        changes.push(ViewChange::AiScore);
    }
    if old.is_valid_by_ai() != new.is_valid_by_ai() {
        changes.push(ViewChange::AiVerdict);
    }
    if old.is_consistent() != new.is_consistent() {
        changes.push(ViewChange::Consistency);
    }
    changes
}
