//! Driving loop for the annealed stochastic layout optimization.
//!
//! Each step of a running [`Solver`]:
//! 1. Checks the aggregate loss against the convergence threshold and
//!    the step counter against the step cap; either check ends the run.
//! 2. Samples one point via [`crate::select::choose`], biased toward
//!    high-loss points by the current temperature.
//! 3. Computes the point's gradient and applies one
//!    [`crate::optim::Momentum`] step, mutating its position in place.
//! 4. Anneals the temperature (floored at 1.0) and emits a
//!    [`StepEvent`] describing the post-step state.
//!
//! The loop is strictly sequential: every step depends on the previous
//! step's mutated positions. A UI can either drive [`Solver::step_once`]
//! itself (one step per frame) or run [`Solver::run`] on a worker
//! thread and consume the snapshots its callback receives.

use crate::config::SolveConfig;
use crate::error::ValidateError;
use crate::loss::MseLoss;
use crate::optim::Momentum;
use crate::point::{Point, PointSet};
use crate::select;
use crate::types::PointId;
use log::debug;

/// Lifecycle of an optimization run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Steps are still being taken.
    Running,
    /// The aggregate loss dropped to or below the configured minimum.
    Converged,
    /// The step cap was reached before convergence.
    StepLimitReached,
}

/// Observation record emitted once per completed step.
///
/// `points` is a snapshot taken after the step's position update, so
/// consumers on other threads never race with in-place mutation.
#[derive(Clone, Debug)]
pub struct StepEvent {
    /// Total steps taken so far, counting this one.
    pub step: u64,
    /// Post-step copy of every point in set order.
    pub points: Vec<Point>,
    /// Index of the point this step updated.
    pub selected: PointId,
    /// The selected point's loss after the update.
    pub point_loss: f32,
    /// Aggregate loss after the update.
    pub total_loss: f32,
    /// Temperature after this step's annealing.
    pub temperature: f32,
}

/// Owns a validated [`PointSet`] and steps it toward its target
/// distances.
pub struct Solver {
    points: PointSet,
    cfg: SolveConfig,
    optimizer: Momentum,
    temperature: f32,
    state: RunState,
    rng: rand::rngs::ThreadRng,
}

impl Solver {
    /// Validates the set and prepares a run.
    ///
    /// ### Returns
    /// - `Ok(Solver)` in the `Running` state, with the configured
    ///   initial temperature and zero steps taken.
    /// - `Err` if the set violates a structural invariant; nothing is
    ///   mutated in that case.
    pub fn new(points: PointSet, cfg: SolveConfig) -> Result<Self, ValidateError> {
        points.validate()?;
        let dims = points.dims().unwrap_or(0);

        Ok(Self {
            optimizer: Momentum::new(cfg.learning_rate, cfg.momentum, dims),
            temperature: cfg.initial_temperature,
            state: RunState::Running,
            rng: rand::rng(),
            points,
            cfg,
        })
    }

    /// Executes one loop transition.
    ///
    /// While running, this either takes exactly one optimization step
    /// and returns its [`StepEvent`], or moves to a terminal state and
    /// returns `None`. Once terminal it always returns `None`.
    pub fn step_once(&mut self) -> Option<StepEvent> {
        if self.state != RunState::Running {
            return None;
        }

        let loss = MseLoss::new(&self.points);

        let total_loss = loss.total_loss(self.cfg.weighted);
        if total_loss <= self.cfg.minimum_loss {
            debug!(
                "converged after {} steps, total loss {total_loss}",
                self.optimizer.total_steps
            );
            self.state = RunState::Converged;
            return None;
        }

        if self.optimizer.total_steps >= self.cfg.max_steps {
            debug!(
                "step limit {} reached, total loss {total_loss}",
                self.cfg.max_steps
            );
            self.state = RunState::StepLimitReached;
            return None;
        }

        // Pick one point, biased toward high loss, and step it.
        let point_losses = loss.point_losses();
        let selected = select::choose(&point_losses, self.temperature, &mut self.rng);
        let gradient = loss.gradient(selected);

        let num_points = self.points.len();
        self.optimizer
            .step(&mut self.points.points[selected], selected, num_points, &gradient);

        // Post-step losses, for reporting.
        let loss = MseLoss::new(&self.points);
        let point_loss = loss.point_loss(selected);
        let total_loss = loss.total_loss(self.cfg.weighted);

        self.temperature = (self.temperature + self.cfg.change_temperature).max(1.0);

        Some(StepEvent {
            step: self.optimizer.total_steps,
            points: self.points.points.clone(),
            selected,
            point_loss,
            total_loss,
            temperature: self.temperature,
        })
    }

    /// Drives [`Solver::step_once`] to a terminal state, invoking the
    /// callback once per completed step.
    ///
    /// ### Parameters
    /// - `callback` - Observer receiving each step's [`StepEvent`];
    ///   its return value is not consulted.
    ///
    /// ### Returns
    /// The terminal [`RunState`] (`Converged` or `StepLimitReached`).
    pub fn run(&mut self, mut callback: impl FnMut(&StepEvent)) -> RunState {
        while let Some(event) = self.step_once() {
            callback(&event);
        }
        self.state
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn total_steps(&self) -> u64 {
        self.optimizer.total_steps
    }

    pub fn config(&self) -> &SolveConfig {
        &self.cfg
    }
}
