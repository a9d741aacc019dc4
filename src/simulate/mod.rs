pub mod fractional;
pub mod gbm;
pub mod jump_diffusion;
pub mod vasicek;

pub use fractional::{FractionalGenerator, FractionalParams};
pub use gbm::{GbmGenerator, GbmParams};
pub use jump_diffusion::{JumpDiffusionGenerator, JumpDiffusionParams};
pub use vasicek::{VasicekGenerator, VasicekParams};

use crate::errors::{EngineError, EngineResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A batch of simulated sample paths over a shared uniform time grid.
///
/// `paths` holds `batch_size` rows of `n_steps + 1` points; `times` is the
/// strictly increasing grid `0, dt, 2*dt, ..., t_max` with `dt = t_max / N`.
/// Every row starts at the generator's configured initial level exactly.
/// Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathBatch {
    pub paths: Vec<Vec<f64>>,
    pub times: Vec<f64>,
}

impl PathBatch {
    pub fn batch_size(&self) -> usize {
        self.paths.len()
    }

    /// Number of grid points per path (N + 1).
    pub fn grid_len(&self) -> usize {
        self.times.len()
    }
}

/// All path generators implement this trait.
///
/// `generate` must be reproducible: the same seed yields a bit-identical
/// batch. `None` seeds from OS entropy. Parameter validation happens at
/// generator construction, so generation itself only fails on internal
/// numeric problems.
pub trait PathGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, batch_size: usize, seed: Option<u64>) -> EngineResult<PathBatch>;
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn time_grid(t_max: f64, n_steps: usize) -> Vec<f64> {
    let dt = t_max / n_steps as f64;
    (0..=n_steps).map(|i| i as f64 * dt).collect()
}

pub(crate) fn validate_grid(n_steps: usize, t_max: f64) -> EngineResult<()> {
    if n_steps < 1 {
        return Err(EngineError::InvalidParameter(
            "n_steps must be at least 1".into(),
        ));
    }
    if !(t_max > 0.0) {
        return Err(EngineError::InvalidParameter(format!(
            "t_max must be positive, got {t_max}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_non_negative(name: &str, value: f64) -> EngineResult<()> {
    if !(value >= 0.0) {
        return Err(EngineError::InvalidParameter(format!(
            "{name} must be non-negative, got {value}"
        )));
    }
    Ok(())
}
