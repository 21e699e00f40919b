//! `srp predict` - run one prediction and print the payload

use anyhow::{Context, Result};
use salary_lib::{EngineConfig, JobQuery, PredictionEngine};
use std::path::Path;

pub fn run(data_dir: &Path, query: JobQuery) -> Result<()> {
    // Opening with an empty corpus still yields a usable engine: the
    // training pass substitutes synthetic records when nothing is on disk
    let engine = PredictionEngine::open(EngineConfig::in_dir(data_dir), &[]);

    let prediction = engine.predict_salary(&query);
    let json = serde_json::to_string_pretty(&prediction)
        .context("Failed to encode prediction payload")?;
    println!("{json}");
    Ok(())
}
