use super::{make_rng, time_grid, validate_grid, validate_non_negative, PathBatch, PathGenerator};
use crate::errors::EngineResult;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Vasicek mean-reverting rate parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VasicekParams {
    /// Initial short rate.
    pub r0: f64,
    /// Mean-reversion speed.
    pub kappa: f64,
    /// Long-run mean level.
    pub theta: f64,
    /// Rate volatility.
    pub sigma: f64,
    /// Horizon in years.
    pub t_max: f64,
    /// Number of time steps (grid has n_steps + 1 points).
    pub n_steps: usize,
}

impl Default for VasicekParams {
    fn default() -> Self {
        Self {
            r0: 0.03,
            kappa: 0.1,
            theta: 0.05,
            sigma: 0.02,
            t_max: 1.0,
            n_steps: 50,
        }
    }
}

/// Vasicek short-rate path generator.
///
/// Explicit Euler-Maruyama recurrence, inherently sequential per path:
/// r_{t+1} = r_t + kappa * (theta - r_t) * dt + sigma * sqrt(dt) * Z.
pub struct VasicekGenerator {
    params: VasicekParams,
}

impl VasicekGenerator {
    pub fn new(params: VasicekParams) -> EngineResult<Self> {
        validate_grid(params.n_steps, params.t_max)?;
        validate_non_negative("sigma", params.sigma)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &VasicekParams {
        &self.params
    }
}

impl PathGenerator for VasicekGenerator {
    fn name(&self) -> &'static str {
        "vasicek"
    }

    fn generate(&self, batch_size: usize, seed: Option<u64>) -> EngineResult<PathBatch> {
        let p = self.params;
        let n = p.n_steps;
        let dt = p.t_max / n as f64;
        let sqrt_dt = dt.sqrt();

        let mut rng = make_rng(seed);
        let times = time_grid(p.t_max, n);

        let mut paths = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            let mut path = Vec::with_capacity(n + 1);
            let mut rate = p.r0;
            path.push(rate);
            for _ in 0..n {
                let z: f64 = rng.sample(StandardNormal);
                rate += p.kappa * (p.theta - rate) * dt + p.sigma * sqrt_dt * z;
                path.push(rate);
            }
            paths.push(path);
        }

        Ok(PathBatch { paths, times })
    }
}
