use super::{make_rng, time_grid, validate_grid, validate_non_negative, PathBatch, PathGenerator};
use crate::errors::EngineResult;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Merton-style jump-diffusion parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JumpDiffusionParams {
    /// Initial price level.
    pub s0: f64,
    /// Risk-free drift rate.
    pub r: f64,
    /// Diffusive volatility.
    pub sigma: f64,
    /// Jump arrival intensity (expected jumps per year).
    pub jump_intensity: f64,
    /// Mean log jump size.
    pub jump_mean: f64,
    /// Std of the log jump size.
    pub jump_vol: f64,
    /// Horizon in years.
    pub t_max: f64,
    /// Number of time steps (grid has n_steps + 1 points).
    pub n_steps: usize,
}

impl Default for JumpDiffusionParams {
    fn default() -> Self {
        Self {
            s0: 100.0,
            r: 0.05,
            sigma: 0.2,
            jump_intensity: 0.1,
            jump_mean: 0.0,
            jump_vol: 0.1,
            t_max: 1.0,
            n_steps: 50,
        }
    }
}

/// Jump-diffusion path generator.
///
/// Per step the log-price increment combines a continuous Gaussian part
/// with an independent Bernoulli(lambda * dt) jump of Normal(mu_J, sigma_J)
/// size, composed multiplicatively:
///
///   S_{t+1} = S_t * exp(r*dt + sigma*sqrt(dt)*Z + 1{U < lambda*dt} * J)
///
/// The uniform and jump-size draws happen on every step, taken or not, so
/// the random stream layout is fixed and seeded runs are reproducible.
pub struct JumpDiffusionGenerator {
    params: JumpDiffusionParams,
}

impl JumpDiffusionGenerator {
    pub fn new(params: JumpDiffusionParams) -> EngineResult<Self> {
        validate_grid(params.n_steps, params.t_max)?;
        validate_non_negative("sigma", params.sigma)?;
        validate_non_negative("jump_vol", params.jump_vol)?;
        validate_non_negative("jump_intensity", params.jump_intensity)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &JumpDiffusionParams {
        &self.params
    }
}

impl PathGenerator for JumpDiffusionGenerator {
    fn name(&self) -> &'static str {
        "jump_diffusion"
    }

    fn generate(&self, batch_size: usize, seed: Option<u64>) -> EngineResult<PathBatch> {
        let p = self.params;
        let n = p.n_steps;
        let dt = p.t_max / n as f64;
        let sqrt_dt = dt.sqrt();
        let jump_prob = p.jump_intensity * dt;

        let mut rng = make_rng(seed);
        let times = time_grid(p.t_max, n);

        let mut paths = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            let mut path = Vec::with_capacity(n + 1);
            let mut spot = p.s0;
            path.push(spot);
            for _ in 0..n {
                let z: f64 = rng.sample(StandardNormal);
                let u: f64 = rng.gen();
                let jump_z: f64 = rng.sample(StandardNormal);

                let jump = if u < jump_prob {
                    p.jump_mean + p.jump_vol * jump_z
                } else {
                    0.0
                };

                spot *= (p.r * dt + p.sigma * sqrt_dt * z + jump).exp();
                path.push(spot);
            }
            paths.push(path);
        }

        Ok(PathBatch { paths, times })
    }
}
