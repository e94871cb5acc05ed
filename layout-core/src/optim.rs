use crate::point::Point;
use crate::types::PointId;
use nalgebra::DVector;

/// Momentum gradient descent over individual points.
///
/// Each point carries its own velocity vector, lazily allocated the
/// first time the optimizer sees the set size. Because the loop
/// updates a different point on almost every call, a single shared
/// accumulator would bleed one point's momentum into another's
/// trajectory; keeping velocity per point makes successive updates of
/// the same point the only thing momentum smooths.
pub struct Momentum {
    /// Scale applied to the gradient before it enters the velocity.
    pub learning_rate: f32,
    /// Fraction of the previous velocity carried into this step.
    pub momentum: f32,
    /// Total number of steps applied, across all points.
    pub total_steps: u64,
    velocity: Vec<DVector<f32>>,
    dims: usize,
}

impl Momentum {
    pub fn new(learning_rate: f32, momentum: f32, dims: usize) -> Self {
        Self {
            learning_rate,
            momentum,
            total_steps: 0,
            velocity: Vec::new(),
            dims,
        }
    }

    /// Ensures one velocity slot per point, preserving existing
    /// velocities when the count already matches.
    fn ensure_len(&mut self, len: usize) {
        if self.velocity.len() != len {
            self.velocity.resize(len, DVector::zeros(self.dims));
        }
    }

    /// Applies one momentum-smoothed descent step to a point.
    ///
    /// `velocity = learning_rate · gradient + momentum · velocity`,
    /// then the velocity is subtracted from the point's position and
    /// the step counter advances by one.
    ///
    /// ### Parameters
    /// - `point` - The point whose position is mutated in place.
    /// - `id` - The point's index, selecting its velocity slot.
    /// - `num_points` - Current set size, used to size velocity storage.
    /// - `gradient` - Loss gradient at the point's current position.
    pub fn step(&mut self, point: &mut Point, id: PointId, num_points: usize, gradient: &DVector<f32>) {
        self.ensure_len(num_points);

        let velocity = &mut self.velocity[id];
        *velocity = gradient * self.learning_rate + &*velocity * self.momentum;
        point.position -= &*velocity;

        self.total_steps += 1;
    }

    /// Velocity currently stored for a point, if any step has sized
    /// the storage yet.
    pub fn velocity(&self, id: PointId) -> Option<&DVector<f32>> {
        self.velocity.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    fn free_point(x: f32, y: f32) -> Point {
        Point::new(dvector![x, y], vec![None], "p")
    }

    #[test]
    fn step_without_momentum_is_plain_descent() {
        let mut optimizer = Momentum::new(0.5, 0.0, 2);
        let mut point = free_point(0.0, 0.0);

        optimizer.step(&mut point, 0, 1, &dvector![2.0, 0.0]);

        // position -= 0.5 * (2, 0) = (1, 0).
        assert_eq!(point.position, dvector![-1.0, 0.0]);
        assert_eq!(optimizer.total_steps, 1);
    }

    #[test]
    fn momentum_carries_velocity_between_steps_of_one_point() {
        let mut optimizer = Momentum::new(1.0, 0.5, 2);
        let mut point = free_point(0.0, 0.0);
        let gradient = dvector![1.0, 0.0];

        optimizer.step(&mut point, 0, 1, &gradient);
        // First step: velocity (1, 0), position (-1, 0).
        assert_eq!(point.position, dvector![-1.0, 0.0]);

        optimizer.step(&mut point, 0, 1, &gradient);
        // Second step: velocity 1·(1,0) + 0.5·(1,0) = (1.5, 0).
        assert_eq!(point.position, dvector![-2.5, 0.0]);
        assert_eq!(optimizer.velocity(0), Some(&dvector![1.5, 0.0]));
    }

    #[test]
    fn velocities_are_independent_per_point() {
        let mut optimizer = Momentum::new(1.0, 0.9, 2);
        let mut a = free_point(0.0, 0.0);
        let mut b = free_point(10.0, 0.0);

        // Build up velocity on point 0 only.
        optimizer.step(&mut a, 0, 2, &dvector![1.0, 0.0]);

        // Point 1's first step must see zero carried velocity, not
        // point 0's.
        optimizer.step(&mut b, 1, 2, &dvector![0.0, 2.0]);
        assert_eq!(b.position, dvector![10.0, -2.0]);
        assert_eq!(optimizer.velocity(1), Some(&dvector![0.0, 2.0]));
        assert_eq!(optimizer.velocity(0), Some(&dvector![1.0, 0.0]));
    }

    #[test]
    fn total_steps_counts_every_step_once() {
        let mut optimizer = Momentum::new(0.1, 0.9, 2);
        let mut point = free_point(0.0, 0.0);

        for expected in 1..=5 {
            optimizer.step(&mut point, 0, 1, &dvector![1.0, 1.0]);
            assert_eq!(optimizer.total_steps, expected);
        }
    }

    #[test]
    fn zero_gradient_with_no_velocity_leaves_position_unchanged() {
        let mut optimizer = Momentum::new(0.5, 0.9, 2);
        let mut point = free_point(3.0, 4.0);

        optimizer.step(&mut point, 0, 1, &dvector![0.0, 0.0]);

        assert_eq!(point.position, dvector![3.0, 4.0]);
        assert_eq!(optimizer.total_steps, 1);
    }
}
