//! # Per-Row SGD Schedule

use serde::{Deserialize, Serialize};

/// Default Robbins-Monro delay.
pub const DEFAULT_TAU: f32 = 0.0;

/// Default Robbins-Monro decay exponent.
pub const DEFAULT_KAPPA: f32 = 0.6;

/// Default learning-rate floor.
pub const DEFAULT_RHO_LOWER_BOUND: f32 = 0.0;

/// Options for [`Sgd`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SgdOptions {
    /// Robbins-Monro delay `tau`.
    pub tau: f32,
    /// Robbins-Monro decay exponent `kappa`.
    pub kappa: f32,
    /// Learning-rate floor.
    pub rho_lower_bound: f32,
}

impl Default for SgdOptions {
    fn default() -> Self {
        Self {
            tau: DEFAULT_TAU,
            kappa: DEFAULT_KAPPA,
            rho_lower_bound: DEFAULT_RHO_LOWER_BOUND,
        }
    }
}

impl SgdOptions {
    /// Set the delay `tau`.
    pub fn with_tau(
        self,
        tau: f32,
    ) -> Self {
        Self { tau, ..self }
    }

    /// Set the decay exponent `kappa`.
    pub fn with_kappa(
        self,
        kappa: f32,
    ) -> Self {
        Self { kappa, ..self }
    }

    /// Set the learning-rate floor.
    pub fn with_rho_lower_bound(
        self,
        rho_lower_bound: f32,
    ) -> Self {
        Self {
            rho_lower_bound,
            ..self
        }
    }

    /// Initialize an [`Sgd`] over `dimension` rows from these options.
    pub fn init(
        self,
        dimension: usize,
    ) -> Sgd {
        Sgd::new(dimension, self)
    }
}

/// Per-row Robbins-Monro learning-rate schedule.
///
/// Each row decays independently:
/// `rho[e] = max(rho_lower_bound, (tau + t[e])^(-kappa))` where `t[e]`
/// counts that row's steps. Rows of a streaming vocabulary are born at
/// different times and an evicted row restarts its schedule via
/// [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sgd {
    options: SgdOptions,
    rho: Vec<f32>,
    t: Vec<u64>,
}

impl Sgd {
    /// Create a schedule over `dimension` rows.
    pub fn new(
        dimension: usize,
        options: SgdOptions,
    ) -> Self {
        let initial = compute_rho(&options, 0);
        Self {
            options,
            rho: vec![initial; dimension],
            t: vec![0; dimension],
        }
    }

    /// The schedule options.
    pub fn options(&self) -> SgdOptions {
        self.options
    }

    /// The current learning rate of row `row`.
    pub fn rho(
        &self,
        row: usize,
    ) -> f32 {
        self.rho[row]
    }

    /// The step count of row `row`.
    pub fn step_count(
        &self,
        row: usize,
    ) -> u64 {
        self.t[row]
    }

    /// Advance row `row` one step and recompute its rate.
    pub fn step(
        &mut self,
        row: usize,
    ) {
        self.t[row] += 1;
        self.rho[row] = compute_rho(&self.options, self.t[row]);
    }

    /// `x <- x - rho[row] * g`.
    pub fn gradient_update(
        &self,
        row: usize,
        g: &[f32],
        x: &mut [f32],
    ) {
        let rho = self.rho[row];
        debug_assert_eq!(g.len(), x.len());
        for (xi, gi) in x.iter_mut().zip(g.iter()) {
            *xi -= rho * gi;
        }
    }

    /// `x <- x - alpha * rho[row] * g`.
    pub fn scaled_gradient_update(
        &self,
        row: usize,
        g: &[f32],
        x: &mut [f32],
        alpha: f32,
    ) {
        let scale = alpha * self.rho[row];
        debug_assert_eq!(g.len(), x.len());
        for (xi, gi) in x.iter_mut().zip(g.iter()) {
            *xi -= scale * gi;
        }
    }

    /// Restart row `row`'s schedule (step count and rate).
    pub fn reset(
        &mut self,
        row: usize,
    ) {
        self.t[row] = 0;
        self.rho[row] = compute_rho(&self.options, 0);
    }
}

// (tau + t)^(-kappa) is undefined at tau + t = 0 (the default tau is 0);
// the first step clamps to 1 so the schedule starts finite and stays
// non-increasing.
fn compute_rho(
    options: &SgdOptions,
    t: u64,
) -> f32 {
    let raw = (options.tau + t as f32).powf(-options.kappa);
    let raw = if raw.is_finite() { raw } else { 1.0 };
    raw.max(options.rho_lower_bound)
}
