//! Multiple importance sampling heuristics.

use serde::{Deserialize, Serialize};

/// Weighting strategy for combining two sampling techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    #[default]
    Balance,
    Power,
}

impl Heuristic {
    /// Weight of the technique with density `p1` against one with density `p2`.
    pub fn weight(self, p1: f32, p2: f32) -> f32 {
        match self {
            Heuristic::Balance => balance_heuristic(p1, p2),
            Heuristic::Power => power_heuristic(p1, p2),
        }
    }
}

/// `p1 / (p1 + p2)`, or 0 when both densities are zero.
#[inline]
pub fn balance_heuristic(p1: f32, p2: f32) -> f32 {
    let sum = p1 + p2;
    if sum > 0.0 {
        p1 / sum
    } else {
        0.0
    }
}

/// `p1² / (p1² + p2²)`, or 0 when both densities are zero.
#[inline]
pub fn power_heuristic(p1: f32, p2: f32) -> f32 {
    let (a, b) = (p1 * p1, p2 * p2);
    let sum = a + b;
    if sum > 0.0 {
        a / sum
    } else {
        0.0
    }
}
