/// Tuning knobs for a [`crate::solve::Solver`] run.
#[derive(Clone, Copy, Debug)]
pub struct SolveConfig {
    /// Scale applied to the gradient in each descent step.
    pub learning_rate: f32,
    /// Weight on the velocity carried over from the previous step.
    pub momentum: f32,
    /// Hard iteration cap; exceeding it ends the run as
    /// [`crate::solve::RunState::StepLimitReached`].
    pub max_steps: u64,
    /// Total-loss threshold at or below which the run ends as
    /// [`crate::solve::RunState::Converged`].
    pub minimum_loss: f32,
    /// Starting annealing temperature.
    pub initial_temperature: f32,
    /// Additive per-step temperature delta, typically negative. The
    /// loop floors the temperature at 1.0.
    pub change_temperature: f32,
    /// Whether the convergence check weights each point's loss by its
    /// known-target count.
    pub weighted: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.03,
            momentum: 0.99,
            max_steps: 30_000,
            minimum_loss: 0.0,
            initial_temperature: 500.0,
            change_temperature: -0.007,
            weighted: false,
        }
    }
}
