pub mod engine;
pub mod portfolio;

pub use engine::{BacktestEngine, BacktestRun, BacktestSummary, RiskProfile};
pub use portfolio::{PortfolioEngine, PortfolioPathResult, PortfolioRun, PortfolioSummary};

/// Collapses a batch sampled with an asset dimension down to single-asset
/// paths by keeping the first asset's series.
pub fn collapse_asset_dim(paths: &[Vec<Vec<f64>>]) -> Vec<Vec<f64>> {
    paths
        .iter()
        .map(|path| path.iter().map(|assets| assets[0]).collect())
        .collect()
}
