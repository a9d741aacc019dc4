use super::{make_rng, time_grid, validate_grid, validate_non_negative, PathBatch, PathGenerator};
use crate::errors::{EngineError, EngineResult};
use nalgebra::{Cholesky, DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Diagonal jitter added to the covariance matrix so the Cholesky
/// factorization stays positive-definite in floating point.
const COVARIANCE_JITTER: f64 = 1e-6;

/// Approximate fractional process parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FractionalParams {
    /// Initial price level.
    pub s0: f64,
    /// Hurst exponent, strictly inside (0, 1).
    pub hurst: f64,
    /// Volatility scale applied to the correlated increments.
    pub sigma: f64,
    /// Horizon in years.
    pub t_max: f64,
    /// Number of time steps (grid has n_steps + 1 points).
    pub n_steps: usize,
}

impl Default for FractionalParams {
    fn default() -> Self {
        Self {
            s0: 100.0,
            hurst: 0.7,
            sigma: 0.2,
            t_max: 1.0,
            n_steps: 50,
        }
    }
}

/// Approximate fractional-process path generator.
///
/// Builds the (N+1)x(N+1) covariance from the fractional Brownian kernel
/// 0.5 * (|s|^{2H} + |t|^{2H} - |s - t|^{2H}), adds a small diagonal jitter,
/// Cholesky-factors it once per batch, and applies the factor to i.i.d.
/// standard normals to obtain correlated increments. This is a covariance
/// approximation, not exact fractional-process sampling; the memory
/// structure is right but the increments are consumed as if independent in
/// the multiplicative composition.
pub struct FractionalGenerator {
    params: FractionalParams,
}

impl FractionalGenerator {
    pub fn new(params: FractionalParams) -> EngineResult<Self> {
        validate_grid(params.n_steps, params.t_max)?;
        validate_non_negative("sigma", params.sigma)?;
        if !(params.hurst > 0.0 && params.hurst < 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "hurst exponent must be in (0, 1), got {}",
                params.hurst
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &FractionalParams {
        &self.params
    }

    fn covariance(&self, times: &[f64]) -> DMatrix<f64> {
        let two_h = 2.0 * self.params.hurst;
        let n = times.len();
        let mut cov = DMatrix::from_fn(n, n, |i, j| {
            let ti = times[i];
            let tj = times[j];
            0.5 * (ti.powf(two_h) + tj.powf(two_h) - (ti - tj).abs().powf(two_h))
        });
        for i in 0..n {
            cov[(i, i)] += COVARIANCE_JITTER;
        }
        cov
    }
}

impl PathGenerator for FractionalGenerator {
    fn name(&self) -> &'static str {
        "fractional"
    }

    fn generate(&self, batch_size: usize, seed: Option<u64>) -> EngineResult<PathBatch> {
        let p = self.params;
        let n = p.n_steps;
        let times = time_grid(p.t_max, n);

        tracing::debug!(
            hurst = p.hurst,
            grid = n + 1,
            "sampling approximate fractional paths via covariance Cholesky"
        );

        let cov = self.covariance(&times);
        let chol = Cholesky::new(cov).ok_or_else(|| {
            EngineError::Numeric("fractional covariance matrix is not positive definite".into())
        })?;
        let l = chol.l();

        let mut rng = make_rng(seed);
        let mut paths = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            let z = DVector::from_fn(n + 1, |_, _| rng.sample::<f64, _>(StandardNormal));
            let increments = &l * z;

            let mut path = Vec::with_capacity(n + 1);
            let mut spot = p.s0;
            path.push(spot);
            for i in 1..=n {
                spot *= (p.sigma * increments[i]).exp();
                path.push(spot);
            }
            paths.push(path);
        }

        Ok(PathBatch { paths, times })
    }
}
