//! Triangle inequality check.

use tracing::debug;

/// Why a triple was classified the way it was.
///
/// Both rejection reasons produce `false` from [`is_triangle`]; they are kept
/// apart so traces can tell a degenerate input from a failed inequality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    Triangle,
    /// A side is zero, negative or not finite.
    NonPositiveSide,
    InequalityViolated,
}

impl Feasibility {
    pub fn is_triangle(self) -> bool {
        matches!(self, Feasibility::Triangle)
    }
}

/// Classifies three side lengths.
///
/// Non-finite values never form a triangle. The inequality is strict, so
/// collinear (degenerate) triples are infeasible.
pub fn classify(a: f64, b: f64, c: f64) -> Feasibility {
    // NaN fails every comparison below, so test for it up front.
    if !(a.is_finite() && b.is_finite() && c.is_finite()) || a <= 0.0 || b <= 0.0 || c <= 0.0 {
        return Feasibility::NonPositiveSide;
    }
    if a + b > c && a + c > b && b + c > a {
        Feasibility::Triangle
    } else {
        Feasibility::InequalityViolated
    }
}

pub fn is_triangle(a: f64, b: f64, c: f64) -> bool {
    let feasibility = classify(a, b, c);
    match feasibility {
        Feasibility::NonPositiveSide => {
            debug!(a, b, c, "geometric check failed: side not strictly positive")
        }
        Feasibility::InequalityViolated => {
            debug!(a, b, c, "geometric check failed: triangle inequality violated")
        }
        Feasibility::Triangle => debug!(a, b, c, "geometric check passed"),
    }
    feasibility.is_triangle()
}
