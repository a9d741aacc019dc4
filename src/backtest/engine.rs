use crate::errors::{EngineError, EngineResult};
use crate::metrics;
use crate::strategy::{PathResult, Strategy};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Cross-path summary of one batch run. All statistics are computed over
/// the per-path records; an empty batch yields the zeroed default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_paths: usize,
    pub mean_final_pnl: f64,
    pub std_final_pnl: f64,
    pub median_final_pnl: f64,
    pub min_final_pnl: f64,
    pub max_final_pnl: f64,
    pub mean_max_drawdown: f64,
    pub std_max_drawdown: f64,
    pub mean_sharpe: f64,
    pub std_sharpe: f64,
    /// Fraction of paths that finished with positive final pnl.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub calmar_ratio: f64,
}

/// Tail and shape statistics over the final-pnl distribution of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    pub confidence: f64,
    pub value_at_risk: f64,
    pub expected_shortfall: f64,
    pub sortino_ratio: f64,
    pub omega_ratio: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub volatility: f64,
}

/// Output of one batch run: per-path records in path order plus the
/// aggregated summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRun {
    pub results: Vec<PathResult>,
    pub summary: BacktestSummary,
}

impl BacktestRun {
    fn final_pnls(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.final_pnl).collect()
    }

    /// Tail statistics of the final-pnl distribution at the given
    /// confidence level.
    pub fn risk_profile(&self, confidence: f64) -> RiskProfile {
        let finals = self.final_pnls();
        // VaR at 95% confidence reads the 5th percentile of outcomes.
        let tail = 1.0 - confidence;
        RiskProfile {
            confidence,
            value_at_risk: metrics::value_at_risk(&finals, tail),
            expected_shortfall: metrics::expected_shortfall(&finals, tail),
            sortino_ratio: metrics::sortino_ratio(&finals, 0.0, metrics::TRADING_DAYS_PER_YEAR),
            omega_ratio: metrics::omega_ratio(&finals, 0.0),
            skewness: metrics::skewness(&finals),
            kurtosis: metrics::kurtosis(&finals),
            volatility: metrics::std_dev(&finals),
        }
    }
}

/// Runs one strategy over a batch of simulated paths.
///
/// Paths are fanned out across the rayon pool; each worker gets an
/// immutable borrow of the strategy and one path, and produces an
/// independent [`PathResult`]. Results come back in path order regardless
/// of completion order, so batch runs are deterministic given deterministic
/// inputs.
pub struct BacktestEngine {
    strategy: Box<dyn Strategy>,
    periods_per_year: f64,
}

impl BacktestEngine {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            strategy,
            periods_per_year: metrics::TRADING_DAYS_PER_YEAR,
        }
    }

    /// Overrides the annualization used by the summary's Calmar ratio.
    pub fn with_periods_per_year(mut self, periods_per_year: f64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Executes the strategy on every path and aggregates the results.
    ///
    /// Shapes are checked up front: a continuation batch must match the
    /// price batch row for row and point for point, so no worker starts on
    /// a malformed batch.
    pub fn run(
        &self,
        paths: &[Vec<f64>],
        continuation: Option<&[Vec<f64>]>,
    ) -> EngineResult<BacktestRun> {
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
            strategy = self.strategy.name(),
            paths = paths.len(),
            "running backtest batch"
        );

        let results: Vec<PathResult> = paths
            .par_iter()
            .enumerate()
            .map(|(i, path)| {
                let seq = continuation.map(|seqs| seqs[i].as_slice());
                let mut result = self.strategy.execute(path, seq)?;
                result.path_id = i;
                Ok(result)
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let summary = self.summarize(&results);
        tracing::info!(
            strategy = self.strategy.name(),
            mean_final_pnl = summary.mean_final_pnl,
            win_rate = summary.win_rate,
            "batch complete"
        );

        Ok(BacktestRun { results, summary })
    }

    fn summarize(&self, results: &[PathResult]) -> BacktestSummary {
        if results.is_empty() {
            return BacktestSummary::default();
        }

        let finals: Vec<f64> = results.iter().map(|r| r.final_pnl).collect();
        let drawdowns: Vec<f64> = results.iter().map(|r| r.max_drawdown).collect();
        let sharpes: Vec<f64> = results.iter().map(|r| r.sharpe_ratio).collect();

        let worst_drawdown = drawdowns.iter().copied().fold(f64::INFINITY, f64::min);
        let calmar_ratio = if worst_drawdown == 0.0 {
            0.0
        } else {
            metrics::mean(&finals) * self.periods_per_year / worst_drawdown.abs()
        };

        BacktestSummary {
            total_paths: results.len(),
            mean_final_pnl: metrics::mean(&finals),
            std_final_pnl: metrics::std_dev(&finals),
            median_final_pnl: metrics::median(&finals),
            min_final_pnl: finals.iter().copied().fold(f64::INFINITY, f64::min),
            max_final_pnl: finals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean_max_drawdown: metrics::mean(&drawdowns),
            std_max_drawdown: metrics::std_dev(&drawdowns),
            mean_sharpe: metrics::mean(&sharpes),
            std_sharpe: metrics::std_dev(&sharpes),
            win_rate: metrics::win_rate(&finals),
            profit_factor: metrics::profit_factor(&finals),
            calmar_ratio,
        }
    }
}
