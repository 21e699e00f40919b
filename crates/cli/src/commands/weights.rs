//! `srp weights` - show the heuristic weight record

use anyhow::{Context, Result};
use salary_lib::heuristic::HeuristicEstimator;
use salary_lib::EngineConfig;
use std::path::Path;

pub fn run(data_dir: &Path) -> Result<()> {
    let config = EngineConfig::in_dir(data_dir);
    let estimator = HeuristicEstimator::with_store(&config.weights_path);

    let json = serde_json::to_string_pretty(estimator.weights())
        .context("Failed to encode weights record")?;
    println!("{json}");
    Ok(())
}
