use crate::error::ValidateError;
use nalgebra::DVector;
use rand::Rng;

/// A single point being laid out.
///
/// `target_distances` is indexed by [`crate::types::PointId`] in the owning
/// [`PointSet`]'s order. `None` marks an unknown distance; a point's
/// own entry is always `None` (there is no self-distance constraint).
#[derive(Clone, Debug)]
pub struct Point {
    /// Current position, `dims` real coordinates. Mutated in place by
    /// the optimizer every step.
    pub position: DVector<f32>,
    /// Sparse target distances to every point in the set, `None` where
    /// no distance is known.
    pub target_distances: Vec<Option<f32>>,
    /// Display label; not consumed by the algorithm.
    pub label: String,
}

impl Point {
    pub fn new(position: DVector<f32>, target_distances: Vec<Option<f32>>, label: &str) -> Self {
        Self {
            position,
            target_distances,
            label: label.to_owned(),
        }
    }

    /// Re-randomizes the position uniformly in a hypercube of the
    /// current dimensionality, centered at the origin with the given
    /// half extent.
    pub fn scatter_position(&mut self, half_range: f32, rng: &mut impl Rng) {
        for coord in self.position.iter_mut() {
            *coord = rng.random_range(-half_range..=half_range);
        }
    }

    /// Number of known (non-`None`) target distances.
    pub fn known_target_count(&self) -> usize {
        self.target_distances.iter().filter(|d| d.is_some()).count()
    }
}

/// Ordered set of points. Order is significant: the index of a
/// `target_distances` entry refers to a position in this order.
#[derive(Clone, Debug)]
pub struct PointSet {
    pub points: Vec<Point>,
}

impl PointSet {
    /// Wraps an existing point list without validating it; call
    /// [`PointSet::validate`] (or build a solver, which does) before
    /// optimizing.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Builds a synthetic set from known ground-truth positions.
    ///
    /// Every pairwise distance is derived from the true positions and
    /// recorded as a target (self-entries stay `None`), points are
    /// labeled by index, and each point's working position is then
    /// scattered uniformly in `[-init_half_range, init_half_range]`
    /// per coordinate so the optimizer has to rediscover the shape.
    ///
    /// ### Parameters
    /// - `true_positions` - Ground-truth positions, all with the same
    ///   dimensionality.
    /// - `init_half_range` - Half extent of the initial random scatter.
    /// - `rng` - Random number generator used for the scatter.
    pub fn from_true_positions(
        true_positions: &[DVector<f32>],
        init_half_range: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let points = true_positions
            .iter()
            .enumerate()
            .map(|(i, pos)| {
                let target_distances = true_positions
                    .iter()
                    .enumerate()
                    .map(|(j, other)| {
                        if i == j {
                            None
                        } else {
                            Some((pos - other).norm())
                        }
                    })
                    .collect();

                let mut point = Point::new(pos.clone(), target_distances, &i.to_string());
                point.scatter_position(init_half_range, rng);
                point
            })
            .collect();

        Self { points }
    }

    /// Builds a synthetic benchmark set: `count` ground-truth points
    /// drawn uniformly from a centered hypercube of the given half
    /// extent, turned into a set via [`PointSet::from_true_positions`].
    pub fn random_cloud(count: usize, dims: usize, half_range: f32, rng: &mut impl Rng) -> Self {
        let true_positions: Vec<DVector<f32>> = (0..count)
            .map(|_| {
                DVector::from_fn(dims, |_, _| rng.random_range(-half_range..=half_range))
            })
            .collect();

        Self::from_true_positions(&true_positions, half_range, rng)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimensionality shared by all positions, taken from the first
    /// point. `None` for an empty set.
    pub fn dims(&self) -> Option<usize> {
        self.points.first().map(|p| p.position.len())
    }

    /// Checks the structural invariants the optimizer relies on:
    ///
    /// - at least one point,
    /// - every position has the first point's dimensionality,
    /// - every target-distance vector has one entry per point.
    ///
    /// ### Returns
    /// `Ok(())` if the set is well-formed, otherwise the first
    /// [`ValidateError`] encountered in point order.
    pub fn validate(&self) -> Result<(), ValidateError> {
        let num_points = self.len();
        if num_points == 0 {
            return Err(ValidateError::EmptyCollection);
        }

        let dims = self.points[0].position.len();

        for (index, point) in self.points.iter().enumerate() {
            if point.position.len() != dims {
                return Err(ValidateError::DimensionMismatch {
                    index,
                    expected: dims,
                    found: point.position.len(),
                });
            }

            if point.target_distances.len() != num_points {
                return Err(ValidateError::TargetDistanceLengthMismatch {
                    index,
                    expected: num_points,
                    found: point.target_distances.len(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn validate_accepts_a_well_formed_pair() {
        let set = PointSet::new(vec![
            Point::new(dvector![0.0, 0.0], vec![None, Some(10.0)], "a"),
            Point::new(dvector![5.0, 0.0], vec![Some(10.0), None], "b"),
        ]);

        assert_eq!(set.validate(), Ok(()));
        assert_eq!(set.dims(), Some(2));
    }

    #[test]
    fn validate_rejects_empty_set() {
        let set = PointSet::new(Vec::new());
        assert_eq!(set.validate(), Err(ValidateError::EmptyCollection));
        assert_eq!(set.dims(), None);
    }

    #[test]
    fn validate_rejects_mismatched_dimensions() {
        let set = PointSet::new(vec![
            Point::new(dvector![0.0, 0.0], vec![None, None], "a"),
            Point::new(dvector![1.0, 2.0, 3.0], vec![None, None], "b"),
        ]);

        assert_eq!(
            set.validate(),
            Err(ValidateError::DimensionMismatch {
                index: 1,
                expected: 2,
                found: 3,
            })
        );
    }

    #[test]
    fn validate_rejects_short_target_distances() {
        let set = PointSet::new(vec![
            Point::new(dvector![0.0, 0.0], vec![None, None], "a"),
            Point::new(dvector![1.0, 0.0], vec![None], "b"),
        ]);

        assert_eq!(
            set.validate(),
            Err(ValidateError::TargetDistanceLengthMismatch {
                index: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn from_true_positions_derives_pairwise_distances() {
        let mut rng = rand::rng();
        let true_positions = vec![dvector![0.0, 0.0], dvector![3.0, 4.0]];

        let set = PointSet::from_true_positions(&true_positions, 100.0, &mut rng);

        assert_eq!(set.len(), 2);
        assert_eq!(set.validate(), Ok(()));

        // Self-entries stay unknown; the cross entries hold the true
        // Euclidean distance (3-4-5 triangle).
        assert_eq!(set.points[0].target_distances[0], None);
        assert_eq!(set.points[1].target_distances[1], None);
        assert_eq!(set.points[0].target_distances[1], Some(5.0));
        assert_eq!(set.points[1].target_distances[0], Some(5.0));

        // Labels follow point order.
        assert_eq!(set.points[0].label, "0");
        assert_eq!(set.points[1].label, "1");
    }

    #[test]
    fn scatter_position_stays_in_range_and_keeps_dims() {
        let mut rng = rand::rng();
        let mut point = Point::new(dvector![1.0, 2.0, 3.0], vec![None], "p");

        point.scatter_position(50.0, &mut rng);

        assert_eq!(point.position.len(), 3);
        for coord in point.position.iter() {
            assert!((-50.0..=50.0).contains(coord));
        }
    }

    #[test]
    fn random_cloud_produces_a_valid_set() {
        let mut rng = rand::rng();
        let set = PointSet::random_cloud(7, 2, 100.0, &mut rng);

        assert_eq!(set.len(), 7);
        assert_eq!(set.dims(), Some(2));
        assert_eq!(set.validate(), Ok(()));

        // Every point knows its distance to every other point.
        for point in &set.points {
            assert_eq!(point.known_target_count(), 6);
        }
    }

    #[test]
    fn known_target_count_ignores_unknown_entries() {
        let point = Point::new(
            dvector![0.0],
            vec![None, Some(1.0), None, Some(2.5)],
            "p",
        );
        assert_eq!(point.known_target_count(), 2);
    }
}
