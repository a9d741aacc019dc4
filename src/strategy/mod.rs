pub mod callable_bond;
pub mod option_arbitrage;

pub use callable_bond::{CallableBondParams, CallableBondStrategy};
pub use option_arbitrage::{OptionArbitrageParams, OptionArbitrageStrategy};

use crate::errors::{EngineError, EngineResult};
use crate::metrics;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Per call-date decision record.
///
/// Absorbing-state rule: once one decision in a path has `called = true`,
/// every later decision in the same path has `called = false`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallDecision {
    /// Call date on the normalized [0, 1] grid.
    pub time: f64,
    /// Price the issuer pays on call.
    pub call_price: f64,
    /// Value of leaving the bond outstanding, from the supplied sequence or
    /// the discounted-cashflow fallback.
    pub continuation_value: f64,
    pub called: bool,
}

/// Strategy-specific outputs attached to a [`PathResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyOutcome {
    OptionArbitrage {
        /// Liquidation index chosen up front from the continuation sequence.
        optimal_stop_index: usize,
        /// Continuation value at that index (closed-form price when no
        /// sequence is supplied).
        optimal_value: f64,
        positions: Vec<f64>,
        hedge_positions: Vec<f64>,
        cash: Vec<f64>,
        hedge_ratios: Vec<f64>,
        option_values: Vec<f64>,
    },
    CallableBond {
        cashflows: Vec<f64>,
        call_decisions: SmallVec<[CallDecision; 4]>,
        present_value: f64,
        yield_to_maturity: f64,
        called: bool,
        total_coupons: f64,
    },
}

/// Per-path output record. Produced once per path, immutable thereafter.
///
/// `max_drawdown` here is the running minimum of the pnl series (a level
/// statistic), intentionally distinct from the peak-to-trough definition in
/// the metrics module. `sharpe_ratio` is annualized from the first
/// differences of the pnl series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathResult {
    pub path_id: usize,
    /// Normalized time grid over [0, 1].
    pub times: Vec<f64>,
    pub prices: Vec<f64>,
    pub portfolio_values: Vec<f64>,
    pub pnl: Vec<f64>,
    pub final_pnl: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// 1.0 when the path finished profitable, else 0.0.
    pub win_rate: f64,
    pub outcome: StrategyOutcome,
}

/// All strategies implement this trait.
///
/// `execute` consumes one immutable price path plus an optional parallel
/// continuation-value sequence and produces a frozen [`PathResult`].
/// Send + Sync so the orchestrator can fan paths out across threads.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self, prices: &[f64], continuation: Option<&[f64]>) -> EngineResult<PathResult>;
}

/// Normalized [0, 1] grid with `len` points.
pub(crate) fn unit_time_grid(len: usize) -> Vec<f64> {
    let dt = 1.0 / (len - 1) as f64;
    (0..len).map(|i| i as f64 * dt).collect()
}

/// Shared entry checks: a usable path has at least two points, and a
/// supplied continuation sequence must match it point for point.
pub(crate) fn validate_path_inputs(
    prices: &[f64],
    continuation: Option<&[f64]>,
) -> EngineResult<()> {
    if prices.len() < 2 {
        return Err(EngineError::InvalidParameter(format!(
            "price path must contain at least 2 points, got {}",
            prices.len()
        )));
    }
    if let Some(seq) = continuation {
        if seq.len() != prices.len() {
            return Err(EngineError::ShapeMismatch(format!(
                "continuation sequence has {} points but the price path has {}",
                seq.len(),
                prices.len()
            )));
        }
    }
    Ok(())
}

/// Annualized Sharpe ratio of a pnl level series, computed from its first
/// differences at the default daily annualization.
pub(crate) fn pnl_sharpe(pnl: &[f64]) -> f64 {
    metrics::sharpe_ratio(&metrics::diff(pnl), 0.0, metrics::TRADING_DAYS_PER_YEAR)
}

/// Running minimum of a pnl series. Empty series -> 0.0.
pub(crate) fn pnl_max_drawdown(pnl: &[f64]) -> f64 {
    if pnl.is_empty() {
        return 0.0;
    }
    pnl.iter().copied().fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_time_grid() {
        let grid = unit_time_grid(5);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[4], 1.0);
        assert_eq!(grid.len(), 5);
    }

    #[test]
    fn test_validate_path_inputs() {
        assert!(validate_path_inputs(&[100.0], None).is_err());
        assert!(validate_path_inputs(&[100.0, 101.0], None).is_ok());
        assert!(validate_path_inputs(&[100.0, 101.0], Some(&[1.0])).is_err());
        assert!(validate_path_inputs(&[100.0, 101.0], Some(&[1.0, 2.0])).is_ok());
    }

    #[test]
    fn test_pnl_max_drawdown_is_min() {
        assert_eq!(pnl_max_drawdown(&[1.0, -3.0, 2.0]), -3.0);
        assert_eq!(pnl_max_drawdown(&[]), 0.0);
    }
}
