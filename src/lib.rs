//! Monte Carlo backtesting engine for path-dependent trading strategies.
//!
//! The crate is organised as a pipeline: `simulate` samples batches of
//! price or rate paths under several stochastic models, `strategy` executes
//! a trading strategy over each path (optionally steered by an externally
//! supplied continuation-value sequence), `backtest` fans the paths out
//! across a thread pool and aggregates per-path results, and `metrics`
//! holds the statistical vocabulary the summaries are built from.

pub mod backtest;
pub mod errors;
pub mod metrics;
pub mod pricing;
pub mod simulate;
pub mod strategy;

pub use errors::{EngineError, EngineResult};
