//! Stage-boundary hooks for inspecting intermediate results.
//!
//! The heat method passes through a fixed sequence of stages. A
//! [`StageObserver`] is called once at the end of each with a borrowed view of
//! what that stage produced, so callers can log, plot or dump intermediates
//! without a separate "verbose" code path.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use geoheat::algo::observe::{Stage, StageObserver};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let observer = StageObserver::new(move |stage: &Stage<'_>| {
//!     sink.lock().unwrap().push(stage.name());
//! });
//!
//! observer.notify(&Stage::TimeStep { mean_edge_length: 1.0, time_step: 1.0 });
//! assert_eq!(*seen.lock().unwrap(), vec!["time_step"]);
//! ```

use nalgebra::{DVector, Vector3};
use nalgebra_sparse::CscMatrix;
use tracing::{debug, enabled, trace, Level};

/// Intermediate data produced by one stage of the heat method.
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    /// Lumped vertex areas (diagonal of the mass matrix).
    Mass(&'a DVector<f64>),
    /// Cotangent Laplacian.
    Laplacian(&'a CscMatrix<f64>),
    /// Diffusion time selection.
    TimeStep {
        /// Mean edge length `h`.
        mean_edge_length: f64,
        /// Diffusion time `t`.
        time_step: f64,
    },
    /// Heat system matrix `M - tL`, before factorization.
    HeatSystem(&'a CscMatrix<f64>),
    /// Heat distribution after diffusion.
    Heat(&'a DVector<f64>),
    /// Per-face heat gradient.
    Gradient(&'a [Vector3<f64>]),
    /// Per-face unit direction field (negated, normalized gradient).
    Direction(&'a [Vector3<f64>]),
    /// Per-vertex divergence of the direction field.
    Divergence(&'a DVector<f64>),
    /// Reduced Poisson matrix, before factorization.
    PoissonSystem(&'a CscMatrix<f64>),
    /// Final distances.
    Distance(&'a [f64]),
}

impl Stage<'_> {
    /// Short snake_case name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Mass(_) => "mass",
            Stage::Laplacian(_) => "laplacian",
            Stage::TimeStep { .. } => "time_step",
            Stage::HeatSystem(_) => "heat_system",
            Stage::Heat(_) => "heat",
            Stage::Gradient(_) => "gradient",
            Stage::Direction(_) => "direction",
            Stage::Divergence(_) => "divergence",
            Stage::PoissonSystem(_) => "poisson_system",
            Stage::Distance(_) => "distance",
        }
    }
}

/// A callback invoked at each stage boundary.
pub struct StageObserver {
    callback: Box<dyn Fn(&Stage<'_>) + Send + Sync>,
}

impl StageObserver {
    /// Create an observer from a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Stage<'_>) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report a stage.
    #[inline]
    pub fn notify(&self, stage: &Stage<'_>) {
        (self.callback)(stage);
    }

    /// Create a no-op observer.
    pub fn none() -> Self {
        Self::new(|_| {})
    }

    /// An observer that logs every stage through `tracing`.
    ///
    /// Summaries (sizes, non-zero counts, value ranges) go to `debug`; every
    /// matrix entry and vector value goes to `trace`.
    pub fn tracing() -> Self {
        Self::new(log_stage)
    }
}

impl Default for StageObserver {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for StageObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageObserver").finish_non_exhaustive()
    }
}

fn range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn log_matrix(stage: &'static str, m: &CscMatrix<f64>) {
    debug!(stage, rows = m.nrows(), cols = m.ncols(), nnz = m.nnz(), "Stage complete");
    if enabled!(Level::TRACE) {
        for (i, j, v) in m.triplet_iter() {
            trace!(stage, row = i, col = j, value = *v);
        }
    }
}

fn log_scalars(stage: &'static str, values: &[f64]) {
    let (min, max) = range(values.iter().copied());
    debug!(stage, len = values.len(), min, max, "Stage complete");
    if enabled!(Level::TRACE) {
        for (i, v) in values.iter().enumerate() {
            trace!(stage, index = i, value = *v);
        }
    }
}

fn log_vectors(stage: &'static str, values: &[Vector3<f64>]) {
    let (min, max) = range(values.iter().map(|v| v.norm()));
    debug!(stage, len = values.len(), min_norm = min, max_norm = max, "Stage complete");
    if enabled!(Level::TRACE) {
        for (i, v) in values.iter().enumerate() {
            trace!(stage, index = i, x = v.x, y = v.y, z = v.z);
        }
    }
}

fn log_stage(stage: &Stage<'_>) {
    let name = stage.name();
    match *stage {
        Stage::Mass(v) | Stage::Heat(v) | Stage::Divergence(v) => log_scalars(name, v.as_slice()),
        Stage::Laplacian(m) | Stage::HeatSystem(m) | Stage::PoissonSystem(m) => log_matrix(name, m),
        Stage::TimeStep {
            mean_edge_length,
            time_step,
        } => debug!(stage = name, mean_edge_length, time_step, "Stage complete"),
        Stage::Gradient(v) | Stage::Direction(v) => log_vectors(name, v),
        Stage::Distance(d) => log_scalars(name, d),
    }
}
