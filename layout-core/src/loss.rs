//! Mean-squared-error stress loss over a sparse target-distance matrix.
//!
//! For a point `p` with a known target distance `t` to a point `q`,
//! the per-pair error is `(‖p − q‖ − t)²`. A point's loss is the mean
//! of its per-pair errors; the gradient follows from
//!
//! ```text
//! E = (D - t)^2
//! dE/dx = 2(D - t) * (dD/dx)
//! dD/dx = (1/D)(x1 - x2)
//! ```
//!
//! giving `((D − t) / D) · (p − q)` per pair (the constant 2 is folded
//! into the learning rate).

use crate::point::{Point, PointSet};
use crate::types::PointId;
use log::warn;
use nalgebra::DVector;

/// MSE loss and gradient over a borrowed [`PointSet`].
pub struct MseLoss<'a> {
    points: &'a PointSet,
}

impl<'a> MseLoss<'a> {
    pub fn new(points: &'a PointSet) -> Self {
        Self { points }
    }

    /// Mean squared distance error for one point, over its known
    /// targets only.
    ///
    /// ### Returns
    /// The arithmetic mean of `(‖p − q‖ − t)²` over known targets, or
    /// `0.0` if the point has no known targets.
    pub fn point_loss(&self, id: PointId) -> f32 {
        let point = &self.points.points[id];

        let mut sum = 0.0;
        let mut count = 0u32;
        for (target, target_distance) in self.known_targets(point) {
            let actual_distance = (&point.position - &target.position).norm();
            let diff = actual_distance - target_distance;
            sum += diff * diff;
            count += 1;
        }

        if count == 0 { 0.0 } else { sum / count as f32 }
    }

    /// Per-point losses for the whole set, in point order.
    pub fn point_losses(&self) -> Vec<f32> {
        (0..self.points.len()).map(|id| self.point_loss(id)).collect()
    }

    /// Aggregate loss over the whole set.
    ///
    /// Unweighted, this is the arithmetic mean of the per-point
    /// losses. Weighted, each point's loss counts proportionally to
    /// its number of known targets, so heavily constrained points
    /// dominate the aggregate.
    pub fn total_loss(&self, weighted: bool) -> f32 {
        let losses = self.point_losses();
        if losses.is_empty() {
            return 0.0;
        }

        if weighted {
            let mut weighted_sum = 0.0;
            let mut weight_sum = 0.0;
            for (point, loss) in self.points.points.iter().zip(&losses) {
                let w = point.known_target_count() as f32;
                weighted_sum += w * loss;
                weight_sum += w;
            }
            if weight_sum == 0.0 {
                0.0
            } else {
                weighted_sum / weight_sum
            }
        } else {
            losses.iter().sum::<f32>() / losses.len() as f32
        }
    }

    /// Gradient of the point's loss with respect to its position.
    ///
    /// Averages `((D − t) / D) · (p − q)` over the point's known
    /// targets. Pairs at zero actual distance have an undefined
    /// direction and are skipped (with a warning) rather than letting
    /// a division by zero poison the position with NaN. If no usable
    /// pairs remain — no known targets, or all of them degenerate —
    /// the gradient is the zero vector and the step is a no-op.
    pub fn gradient(&self, id: PointId) -> DVector<f32> {
        let point = &self.points.points[id];
        let dims = point.position.len();

        let mut sum = DVector::zeros(dims);
        let mut count = 0u32;
        for (target, target_distance) in self.known_targets(point) {
            let offset = &point.position - &target.position;
            let actual_distance = offset.norm();

            if actual_distance == 0.0 {
                warn!(
                    "skipping degenerate gradient term: point {:?} coincides with target {:?}",
                    point.label, target.label
                );
                continue;
            }

            sum += offset * ((actual_distance - target_distance) / actual_distance);
            count += 1;
        }

        if count == 0 { sum } else { sum / count as f32 }
    }

    /// Iterates over `(target_point, target_distance)` pairs for which
    /// a distance is known.
    fn known_targets<'b>(&'b self, point: &'b Point) -> impl Iterator<Item = (&'b Point, f32)> {
        self.points
            .points
            .iter()
            .zip(&point.target_distances)
            .filter_map(|(target, distance)| distance.map(|d| (target, d)))
    }
}
