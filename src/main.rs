use snellback::backtest::{BacktestEngine, PortfolioEngine};
use snellback::simulate::{GbmGenerator, GbmParams, PathGenerator};
use snellback::strategy::{
    CallableBondParams, CallableBondStrategy, OptionArbitrageParams, OptionArbitrageStrategy,
};
use snellback::EngineResult;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run() {
        tracing::error!("backtest failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> EngineResult<()> {
    let generator = GbmGenerator::new(GbmParams::default())?;
    let batch = generator.generate(1000, Some(42))?;
    tracing::info!(
        model = generator.name(),
        paths = batch.batch_size(),
        steps = batch.grid_len(),
        "sampled path batch"
    );

    let engine = BacktestEngine::new(Box::new(OptionArbitrageStrategy::new(
        OptionArbitrageParams::default(),
    )));
    let run = engine.run(&batch.paths, None)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&run.summary).unwrap_or_default()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&run.risk_profile(0.95)).unwrap_or_default()
    );

    let portfolio = PortfolioEngine::new(
        vec![
            Box::new(OptionArbitrageStrategy::new(
                OptionArbitrageParams::default(),
            )),
            Box::new(CallableBondStrategy::new(CallableBondParams::default())?),
        ],
        None,
    )?;
    let portfolio_run = portfolio.run(&batch.paths, None)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&portfolio_run.summary).unwrap_or_default()
    );

    Ok(())
}
