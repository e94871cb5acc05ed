/// Identifier for a point in a [`crate::point::PointSet`].
///
/// This is an index into `PointSet::points`, and is only meaningful
/// within the lifetime of a given `PointSet` instance.
pub type PointId = usize;
