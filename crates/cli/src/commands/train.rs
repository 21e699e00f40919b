//! `srp train` - train both model tiers and persist them

use anyhow::{Context, Result};
use salary_lib::synthetic::generate_corpus;
use salary_lib::{EngineConfig, JobRecord, PredictionEngine};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run(data_dir: &Path, corpus_path: Option<&Path>, synthetic: usize, seed: u64) -> Result<()> {
    let corpus = match corpus_path {
        Some(path) => load_corpus(path)?,
        None => {
            info!(count = synthetic, seed, "No corpus file given; training on synthetic records");
            generate_corpus(synthetic, seed)
        }
    };

    let mut engine = PredictionEngine::with_config(EngineConfig::in_dir(data_dir));
    let report = engine.retrain(&corpus);

    println!("Training complete");
    println!("  parsed rows:     {}", report.parsed_rows);
    println!("  synthetic rows:  {}", report.synthetic_rows);
    println!("  held-out MSE:    {:.2}", report.mse);
    println!("  held-out R2:     {:.4}", report.r2);
    if report.used_fallback_regressor {
        println!("  note: forest fit failed, constant regressor substituted");
    }
    Ok(())
}

fn load_corpus(path: &Path) -> Result<Vec<JobRecord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
    let records: Vec<JobRecord> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse corpus file {}", path.display()))?;
    info!(count = records.len(), path = %path.display(), "Loaded corpus");
    Ok(records)
}
