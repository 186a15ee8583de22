//! Sibling weight arithmetic shared by resize and delete.
//!
//! Weights are proportional shares; the direct children of a container sum
//! to [`LayoutPolicy::total_weight`]. Resize trades weight between one
//! adjacent pair without ever breaking the pair sum, delete spreads the
//! removed share over the survivors, and [`renormalize`] absorbs drift.

use serde::{Deserialize, Serialize};

/// Tunable weight constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPolicy {
    /// Smallest weight a resize may leave on either side of a pair.
    pub min_weight: f64,
    /// Allowed drift of a sibling sum before it is rescaled.
    pub renormalize_tolerance: f64,
    /// Sum of sibling weights inside every container.
    pub total_weight: f64,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            min_weight: 10.0,
            renormalize_tolerance: 1.0,
            total_weight: 100.0,
        }
    }
}

impl LayoutPolicy {
    /// Weight given to each half of a fresh split.
    #[must_use]
    pub fn split_share(&self) -> f64 {
        self.total_weight / 2.0
    }

    /// List range errors; empty when the policy is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.total_weight.is_finite() || self.total_weight <= 0.0 {
            errors.push(format!(
                "layout.total_weight must be positive, got {}",
                self.total_weight
            ));
        }
        if !self.min_weight.is_finite() || self.min_weight < 0.0 {
            errors.push(format!(
                "layout.min_weight must be >= 0, got {}",
                self.min_weight
            ));
        } else if self.min_weight * 2.0 > self.total_weight {
            errors.push(format!(
                "layout.min_weight {} leaves no room for two siblings in {}",
                self.min_weight, self.total_weight
            ));
        }
        if !self.renormalize_tolerance.is_finite() || self.renormalize_tolerance < 0.0 {
            errors.push(format!(
                "layout.renormalize_tolerance must be >= 0, got {}",
                self.renormalize_tolerance
            ));
        }
        errors
    }
}

/// Move `delta` from `b` to `a`, keeping both at or above `floor`.
///
/// Whatever a clamp adds to one side is taken from the other, so
/// `a' + b' == a + b` always holds. When the pair is too small to seat both
/// sides at the floor, neither side may shrink below `min(current, floor)`.
#[must_use]
pub fn clamp_pair(a: f64, b: f64, delta: f64, floor: f64) -> (f64, f64) {
    let pair = a + b;
    if pair < 2.0 * floor {
        let left = (a + delta).clamp(a.min(floor), pair - b.min(floor));
        return (left, pair - left);
    }

    let mut left = a + delta;
    let mut right = b - delta;

    if left < floor {
        right += left - floor;
        left = floor;
    }
    if right < floor {
        left += right - floor;
        right = floor;
    }
    (left, right)
}

/// Rescale `weights` to sum to `total` when they drift by more than `tolerance`.
///
/// Returns `true` if the weights were rescaled.
pub fn renormalize(weights: &mut [f64], total: f64, tolerance: f64) -> bool {
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 || (sum - total).abs() <= tolerance {
        return false;
    }
    let scale = total / sum;
    for weight in weights.iter_mut() {
        *weight *= scale;
    }
    true
}

/// Spread `removed` equally across `weights`.
///
/// No floor is applied; a later [`renormalize`] handles any drift.
pub fn redistribute(weights: &mut [f64], removed: f64) {
    if weights.is_empty() {
        return;
    }
    let share = removed / weights.len() as f64;
    for weight in weights.iter_mut() {
        *weight += share;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn unclamped_transfer_moves_full_delta() {
        assert_eq!(clamp_pair(40.0, 30.0, 20.0, 10.0), (60.0, 10.0));
        assert_eq!(clamp_pair(50.0, 50.0, -5.0, 10.0), (45.0, 55.0));
    }

    #[test]
    fn left_clamp_credits_right() {
        assert_eq!(clamp_pair(15.0, 85.0, -10.0, 10.0), (10.0, 90.0));
    }

    #[test]
    fn right_clamp_credits_left() {
        assert_eq!(clamp_pair(50.0, 50.0, 45.0, 10.0), (90.0, 10.0));
    }

    #[test]
    fn undersized_pair_never_shrinks_below_current() {
        assert_eq!(clamp_pair(5.0, 5.0, 0.0, 10.0), (5.0, 5.0));
        assert_eq!(clamp_pair(5.0, 5.0, 3.0, 10.0), (5.0, 5.0));
        assert_eq!(clamp_pair(5.0, 5.0, -3.0, 10.0), (5.0, 5.0));
        assert_eq!(clamp_pair(4.0, 12.0, 4.0, 10.0), (6.0, 10.0));
        assert_eq!(clamp_pair(4.0, 12.0, -2.0, 10.0), (4.0, 12.0));
    }

    #[test]
    fn clamp_preserves_pair_sum() {
        for delta in [-200.0, -45.5, -0.25, 0.0, 3.75, 60.0, 500.0] {
            let (left, right) = clamp_pair(37.5, 22.5, delta, 10.0);
            assert!(close(left + right, 60.0), "delta={delta}");
        }
    }

    #[test]
    fn renormalize_ignores_small_drift() {
        let mut weights = [33.5, 33.5, 33.5];
        assert!(!renormalize(&mut weights, 100.0, 1.0));
        assert_eq!(weights, [33.5, 33.5, 33.5]);
    }

    #[test]
    fn renormalize_rescales_large_drift() {
        let mut weights = [30.0, 30.0];
        assert!(renormalize(&mut weights, 100.0, 1.0));
        assert!(close(weights[0], 50.0));
        assert!(close(weights[1], 50.0));
    }

    #[test]
    fn renormalize_skips_zero_sum() {
        let mut weights = [0.0, 0.0];
        assert!(!renormalize(&mut weights, 100.0, 1.0));
    }

    #[test]
    fn redistribute_adds_equal_share() {
        let mut weights = [20.0, 50.0];
        redistribute(&mut weights, 30.0);
        assert_eq!(weights, [35.0, 65.0]);

        let mut none: [f64; 0] = [];
        redistribute(&mut none, 30.0);
    }

    #[test]
    fn default_policy_matches_editor_constants() {
        let policy = LayoutPolicy::default();
        assert_eq!(policy.min_weight, 10.0);
        assert_eq!(policy.renormalize_tolerance, 1.0);
        assert_eq!(policy.total_weight, 100.0);
        assert_eq!(policy.split_share(), 50.0);
        assert!(policy.validate().is_empty());
    }

    #[test]
    fn policy_validation_reports_bad_ranges() {
        let policy = LayoutPolicy {
            min_weight: 60.0,
            renormalize_tolerance: -1.0,
            total_weight: 100.0,
        };
        let errors = policy.validate();
        assert_eq!(errors.len(), 2, "{errors:?}");

        let policy = LayoutPolicy {
            total_weight: 0.0,
            ..LayoutPolicy::default()
        };
        assert!(!policy.validate().is_empty());
    }
}
