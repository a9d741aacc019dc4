use super::{make_rng, time_grid, validate_grid, validate_non_negative, PathBatch, PathGenerator};
use crate::errors::EngineResult;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Geometric Brownian motion parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GbmParams {
    /// Initial price level.
    pub s0: f64,
    /// Risk-free drift rate.
    pub r: f64,
    /// Annualized volatility.
    pub sigma: f64,
    /// Horizon in years.
    pub t_max: f64,
    /// Number of time steps (grid has n_steps + 1 points).
    pub n_steps: usize,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            s0: 100.0,
            r: 0.05,
            sigma: 0.2,
            t_max: 1.0,
            n_steps: 50,
        }
    }
}

/// Geometric Brownian motion path generator.
///
/// Uses the closed form S_t = S0 * exp((r - sigma^2/2) * t + sigma * W_t)
/// with W built from one cumulative sum of sqrt(dt)-scaled Gaussian
/// increments. This avoids the compounding rounding error of a stepwise
/// multiplicative scheme and makes S[0] == S0 exact.
pub struct GbmGenerator {
    params: GbmParams,
}

impl GbmGenerator {
    pub fn new(params: GbmParams) -> EngineResult<Self> {
        validate_grid(params.n_steps, params.t_max)?;
        validate_non_negative("sigma", params.sigma)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &GbmParams {
        &self.params
    }
}

impl PathGenerator for GbmGenerator {
    fn name(&self) -> &'static str {
        "gbm"
    }

    fn generate(&self, batch_size: usize, seed: Option<u64>) -> EngineResult<PathBatch> {
        let p = self.params;
        let n = p.n_steps;
        let dt = p.t_max / n as f64;
        let sqrt_dt = dt.sqrt();
        let drift_coeff = p.r - 0.5 * p.sigma * p.sigma;

        let mut rng = make_rng(seed);
        let times = time_grid(p.t_max, n);

        let mut paths = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            let mut path = Vec::with_capacity(n + 1);
            path.push(p.s0);
            let mut w = 0.0;
            for i in 1..=n {
                let z: f64 = rng.sample(StandardNormal);
                w += sqrt_dt * z;
                let t = times[i];
                path.push(p.s0 * (drift_coeff * t + p.sigma * w).exp());
            }
            paths.push(path);
        }

        Ok(PathBatch { paths, times })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_s0_exactly() {
        let gen = GbmGenerator::new(GbmParams::default()).unwrap();
        let batch = gen.generate(16, Some(7)).unwrap();
        for path in &batch.paths {
            assert_eq!(path[0], 100.0);
            assert_eq!(path.len(), 51);
        }
        assert_eq!(batch.times.len(), 51);
    }

    #[test]
    fn test_seed_reproducibility() {
        let gen = GbmGenerator::new(GbmParams::default()).unwrap();
        let a = gen.generate(4, Some(42)).unwrap();
        let b = gen.generate(4, Some(42)).unwrap();
        assert_eq!(a.paths, b.paths);
        let c = gen.generate(4, Some(43)).unwrap();
        assert_ne!(a.paths, c.paths);
    }

    #[test]
    fn test_zero_vol_is_deterministic_drift() {
        let gen = GbmGenerator::new(GbmParams {
            sigma: 0.0,
            ..GbmParams::default()
        })
        .unwrap();
        let batch = gen.generate(1, Some(1)).unwrap();
        let terminal = batch.paths[0][50];
        let expected = 100.0 * (0.05f64).exp();
        assert!((terminal - expected).abs() < 1e-9, "terminal = {terminal}");
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(GbmGenerator::new(GbmParams {
            sigma: -0.2,
            ..GbmParams::default()
        })
        .is_err());
        assert!(GbmGenerator::new(GbmParams {
            n_steps: 0,
            ..GbmParams::default()
        })
        .is_err());
        assert!(GbmGenerator::new(GbmParams {
            t_max: 0.0,
            ..GbmParams::default()
        })
        .is_err());
    }

    #[test]
    fn test_all_values_positive() {
        let gen = GbmGenerator::new(GbmParams::default()).unwrap();
        let batch = gen.generate(32, Some(99)).unwrap();
        for path in &batch.paths {
            assert!(path.iter().all(|s| *s > 0.0 && s.is_finite()));
        }
    }
}
