//! Annealed stochastic layout of points against a sparse
//! target-distance matrix.
//!
//! Main components:
//! - [`point`] — points, point sets, validation, synthetic ingestion.
//! - [`loss`] — MSE stress loss and per-point gradients.
//! - [`select`] — annealed softmax point selection.
//! - [`optim`] — momentum gradient-descent stepping.
//! - [`solve`] — the driving optimization loop and its step events.
//! - [`config`] — configuration surface for a run.
//! - [`error`] — validation errors.
//! - [`types`] — shared type aliases and IDs.

pub mod config;
pub mod error;
pub mod loss;
pub mod optim;
pub mod point;
pub mod select;
pub mod solve;
pub mod types;
