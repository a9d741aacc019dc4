use crate::errors::{EngineError, EngineResult};
use crate::metrics;
use crate::strategy::{pnl_sharpe, Strategy};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Weighted combination of several strategies on one path.
///
/// Component pnl series are truncated to the shortest before mixing, so a
/// portfolio over strategies with different output lengths stays aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPathResult {
    pub path_id: usize,
    /// Weighted pnl series, truncated to the shortest component.
    pub pnl: Vec<f64>,
    pub final_pnl: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Final pnl of each component strategy, in strategy order.
    pub strategy_final_pnls: Vec<f64>,
}

/// Cross-path summary of a portfolio run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_paths: usize,
    pub strategy_count: usize,
    /// Normalized weights, summing to one.
    pub weights: Vec<f64>,
    pub mean_final_pnl: f64,
    pub std_final_pnl: f64,
    pub median_final_pnl: f64,
    pub min_final_pnl: f64,
    pub max_final_pnl: f64,
    pub mean_max_drawdown: f64,
    pub mean_sharpe: f64,
    pub win_rate: f64,
    /// Weighted sum of component volatilities over the portfolio
    /// volatility. Exactly 1.0 for a single strategy or a zero-volatility
    /// portfolio.
    pub diversification_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRun {
    pub results: Vec<PortfolioPathResult>,
    pub summary: PortfolioSummary,
}

/// Runs several strategies over a shared batch and mixes their pnl by
/// fixed weights.
pub struct PortfolioEngine {
    strategies: Vec<Box<dyn Strategy>>,
    weights: Vec<f64>,
}

impl PortfolioEngine {
    /// Builds a portfolio over `strategies`. `weights` defaults to equal
    /// weighting; when supplied it must match the strategy count and sum to
    /// a positive total, and is normalized to sum to one.
    pub fn new(
        strategies: Vec<Box<dyn Strategy>>,
        weights: Option<Vec<f64>>,
    ) -> EngineResult<Self> {
        if strategies.is_empty() {
            return Err(EngineError::InvalidParameter(
                "portfolio requires at least one strategy".into(),
            ));
        }
        let weights = match weights {
            Some(w) => {
                if w.len() != strategies.len() {
                    return Err(EngineError::ShapeMismatch(format!(
                        "{} weights supplied for {} strategies",
                        w.len(),
                        strategies.len()
                    )));
                }
                let total: f64 = w.iter().sum();
                if !(total > 0.0) {
                    return Err(EngineError::InvalidParameter(format!(
                        "weights must sum to a positive total, got {total}"
                    )));
                }
                w.iter().map(|x| x / total).collect()
            }
            None => vec![1.0 / strategies.len() as f64; strategies.len()],
        };
        Ok(Self {
            strategies,
            weights,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn run(
        &self,
        paths: &[Vec<f64>],
        continuation: Option<&[Vec<f64>]>,
    ) -> EngineResult<PortfolioRun> {
        if let Some(seqs) = continuation {
            if seqs.len() != paths.len() {
                return Err(EngineError::ShapeMismatch(format!(
                    "continuation batch has {} rows but the path batch has {}",
                    seqs.len(),
                    paths.len()
                )));
            }
            for (i, (path, seq)) in paths.iter().zip(seqs).enumerate() {
                if seq.len() != path.len() {
                    return Err(EngineError::ShapeMismatch(format!(
                        "row {i}: continuation has {} points but the path has {}",
                        seq.len(),
                        path.len()
                    )));
                }
            }
        }

        tracing::info!(
            strategies = self.strategies.len(),
            paths = paths.len(),
            "running portfolio batch"
        );

        let results: Vec<PortfolioPathResult> = paths
            .par_iter()
            .enumerate()
            .map(|(i, path)| {
                let seq = continuation.map(|seqs| seqs[i].as_slice());
                self.run_path(i, path, seq)
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let summary = self.summarize(&results);
        Ok(PortfolioRun { results, summary })
    }

    fn run_path(
        &self,
        path_id: usize,
        path: &[f64],
        continuation: Option<&[f64]>,
    ) -> EngineResult<PortfolioPathResult> {
        let mut component_pnls = Vec::with_capacity(self.strategies.len());
        let mut strategy_final_pnls = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let result = strategy.execute(path, continuation)?;
            strategy_final_pnls.push(result.final_pnl);
            component_pnls.push(result.pnl);
        }

        let horizon = component_pnls
            .iter()
            .map(|pnl| pnl.len())
            .min()
            .unwrap_or(0);
        let mut pnl = vec![0.0; horizon];
        for (weight, component) in self.weights.iter().zip(&component_pnls) {
            for (mixed, value) in pnl.iter_mut().zip(component) {
                *mixed += weight * value;
            }
        }

        let final_pnl = pnl.last().copied().unwrap_or(0.0);
        let max_drawdown = pnl.iter().copied().fold(f64::INFINITY, f64::min);
        let max_drawdown = if pnl.is_empty() { 0.0 } else { max_drawdown };
        Ok(PortfolioPathResult {
            path_id,
            sharpe_ratio: pnl_sharpe(&pnl),
            pnl,
            final_pnl,
            max_drawdown,
            strategy_final_pnls,
        })
    }

    fn summarize(&self, results: &[PortfolioPathResult]) -> PortfolioSummary {
        let finals: Vec<f64> = results.iter().map(|r| r.final_pnl).collect();
        let drawdowns: Vec<f64> = results.iter().map(|r| r.max_drawdown).collect();
        let sharpes: Vec<f64> = results.iter().map(|r| r.sharpe_ratio).collect();

        let (min_final, max_final) = if finals.is_empty() {
            (0.0, 0.0)
        } else {
            (
                finals.iter().copied().fold(f64::INFINITY, f64::min),
                finals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };

        PortfolioSummary {
            total_paths: results.len(),
            strategy_count: self.strategies.len(),
            weights: self.weights.clone(),
            mean_final_pnl: metrics::mean(&finals),
            std_final_pnl: metrics::std_dev(&finals),
            median_final_pnl: metrics::median(&finals),
            min_final_pnl: min_final,
            max_final_pnl: max_final,
            mean_max_drawdown: metrics::mean(&drawdowns),
            mean_sharpe: metrics::mean(&sharpes),
            win_rate: metrics::win_rate(&finals),
            diversification_ratio: self.diversification_ratio(results, &finals),
        }
    }

    /// Weighted component volatility over portfolio volatility. Degenerate
    /// portfolios (one strategy, or zero portfolio volatility) pin the
    /// ratio at exactly 1.0.
    fn diversification_ratio(&self, results: &[PortfolioPathResult], finals: &[f64]) -> f64 {
        if self.strategies.len() <= 1 {
            return 1.0;
        }
        let portfolio_vol = metrics::std_dev(finals);
        if portfolio_vol == 0.0 {
            return 1.0;
        }
        let weighted_component_vol: f64 = (0..self.strategies.len())
            .map(|s| {
                let component: Vec<f64> =
                    results.iter().map(|r| r.strategy_final_pnls[s]).collect();
                self.weights[s] * metrics::std_dev(&component)
            })
            .sum();
        weighted_component_vol / portfolio_vol
    }
}
