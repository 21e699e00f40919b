//! Training pass for the tree-ensemble tier
//!
//! Parses salary labels, tops up sparse corpora with synthetic records,
//! fits the encoder and forest, and reports held-out diagnostics. The
//! pass always produces a usable artifact: a fit failure substitutes the
//! constant regressor.

use super::SalaryModel;
use crate::encoder::FeatureEncoder;
use crate::forest::Regressor;
use crate::models::JobRecord;
use crate::parser::SalaryTextParser;
use crate::store::TrainedArtifact;
use crate::synthetic::generate_corpus;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

/// Minimum viable labeled sample count before synthetic top-up kicks in
pub const MIN_TRAINING_SAMPLES: usize = 40;

/// Synthetic records generated when the real corpus is too sparse
const SYNTHETIC_CORPUS_SIZE: usize = 200;

/// Fraction of rows held out for diagnostic metrics
const HELD_OUT_FRACTION: f64 = 0.2;

/// Diagnostics from one training pass; never used to gate acceptance
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Rows that survived salary parsing (real corpus only)
    pub parsed_rows: usize,
    /// Synthetic rows added to reach a viable sample
    pub synthetic_rows: usize,
    /// Held-out mean squared error
    pub mse: f64,
    /// Held-out explained variance
    pub r2: f64,
    /// Whether the constant fallback regressor was substituted
    pub used_fallback_regressor: bool,
}

/// Run a full training pass over the corpus. Returns the fitted artifact
/// together with the labeled rows it trained on, so the caller can feed
/// the same rows (synthetic top-up included) to the heuristic tier.
pub(crate) fn run_training_pass(
    corpus: &[JobRecord],
    parser: &SalaryTextParser,
    min_samples: usize,
    seed: u64,
) -> (TrainedArtifact, Vec<(JobRecord, f64)>, TrainingReport) {
    // 1. Parse salary labels; unparsable rows are dropped, not errors
    let mut labeled: Vec<(JobRecord, f64)> = corpus
        .iter()
        .filter_map(|record| {
            parser
                .parse(&record.salary)
                .map(|salary| (record.clone(), salary))
        })
        .collect();
    let parsed_rows = labeled.len();

    // 2. Top up sparse corpora so the pipeline never starves. This branch
    //    is loud on purpose: it must not mask upstream data problems.
    let mut synthetic_rows = 0;
    if labeled.len() < min_samples {
        warn!(
            parsed_rows,
            required = min_samples,
            generated = SYNTHETIC_CORPUS_SIZE,
            "Too few parsable salary rows; substituting synthetic records"
        );
        for record in generate_corpus(SYNTHETIC_CORPUS_SIZE, seed) {
            if let Some(salary) = parser.parse(&record.salary) {
                labeled.push((record, salary));
                synthetic_rows += 1;
            }
        }
    }

    // 3. Seeded shuffle split for reproducible diagnostics
    let mut indices: Vec<usize> = (0..labeled.len()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let held_out = ((indices.len() as f64 * HELD_OUT_FRACTION) as usize).max(1);
    let (test_idx, train_idx) = indices.split_at(held_out.min(indices.len().saturating_sub(1)));
    let train_rows: Vec<(JobRecord, f64)> = train_idx.iter().map(|&i| labeled[i].clone()).collect();

    // 4. Fit the trained tier; a fit failure substitutes the constant
    //    regressor so a usable artifact always exists
    let mut artifact = TrainedArtifact::untrained();
    let used_fallback_regressor = match artifact.fit(&train_rows) {
        Ok(()) => false,
        Err(e) => {
            warn!(error = %e, "Forest fit failed; substituting constant regressor");
            let records: Vec<JobRecord> = labeled.iter().map(|(r, _)| r.clone()).collect();
            artifact = TrainedArtifact::new(FeatureEncoder::fit(&records), Regressor::constant_fallback());
            true
        }
    };

    // 5. Held-out diagnostics; reported, never gating
    let (mse, r2) = held_out_metrics(&artifact, &labeled, test_idx);
    info!(
        parsed_rows,
        synthetic_rows,
        train_rows = train_idx.len(),
        held_out_rows = test_idx.len(),
        mse,
        r2,
        regressor = %artifact.regressor.describe(),
        "Training pass complete"
    );

    let report = TrainingReport {
        parsed_rows,
        synthetic_rows,
        mse,
        r2,
        used_fallback_regressor,
    };
    (artifact, labeled, report)
}

fn held_out_metrics(
    artifact: &TrainedArtifact,
    labeled: &[(JobRecord, f64)],
    test_idx: &[usize],
) -> (f64, f64) {
    if test_idx.is_empty() {
        return (0.0, 0.0);
    }
    let n = test_idx.len() as f64;
    let mse = test_idx
        .iter()
        .map(|&i| {
            let (record, label) = &labeled[i];
            let estimate = artifact.regressor.predict(&artifact.encoder.transform(record));
            (estimate - label).powi(2)
        })
        .sum::<f64>()
        / n;

    let mean = test_idx.iter().map(|&i| labeled[i].1).sum::<f64>() / n;
    let ss_tot: f64 = test_idx.iter().map(|&i| (labeled[i].1 - mean).powi(2)).sum();
    let r2 = if ss_tot < f64::EPSILON {
        0.0
    } else {
        1.0 - (mse * n) / ss_tot
    };
    (mse, r2)
}
