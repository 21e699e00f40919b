//! Prediction engine: lifecycle and tier routing
//!
//! An explicit service object (constructed once by the embedding
//! application, no global state) that owns the load-or-train lifecycle
//! and routes inference through the best available tier. The prediction
//! surface is total: every internal failure degrades to a lower tier and
//! the result is always a bounded number.

mod output;
mod training;

pub use output::{display_salary, OutputConfig, OutputFormatter, MAX_SALARY, MIN_SALARY};
pub use training::{TrainingReport, MIN_TRAINING_SAMPLES};

use crate::encoder::FeatureEncoder;
use crate::forest::{RandomForest, Regressor, DEFAULT_TREES};
use crate::heuristic::{HeuristicEstimator, HeuristicSample};
use crate::models::{JobQuery, JobRecord, SalaryPrediction};
use crate::parser::SalaryTextParser;
use crate::store::{ArtifactStore, TrainedArtifact};
use anyhow::{ensure, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default seed for reproducible splits and fits
pub const DEFAULT_SEED: u64 = 42;

/// Common fit/predict interface over the two model tiers
pub trait SalaryModel {
    /// Fit the model over labeled rows of (record, monthly salary)
    fn fit(&mut self, labeled: &[(JobRecord, f64)]) -> Result<()>;

    /// Point estimate for a fully filled-in record
    fn predict(&self, record: &JobRecord) -> Result<f64>;
}

impl SalaryModel for TrainedArtifact {
    fn fit(&mut self, labeled: &[(JobRecord, f64)]) -> Result<()> {
        let records: Vec<JobRecord> = labeled.iter().map(|(record, _)| record.clone()).collect();
        let labels: Vec<f64> = labeled.iter().map(|(_, salary)| *salary).collect();
        let encoder = FeatureEncoder::fit(&records);
        let features: Vec<Vec<f64>> = records.iter().map(|r| encoder.transform(r)).collect();
        let forest = RandomForest::fit(&features, &labels, DEFAULT_TREES, DEFAULT_SEED)?;
        self.encoder = encoder;
        self.regressor = Regressor::Forest(forest);
        Ok(())
    }

    fn predict(&self, record: &JobRecord) -> Result<f64> {
        let features = self.encoder.transform(record);
        ensure!(
            features.len() == self.feature_width,
            "encoded {} features, artifact expects {}",
            features.len(),
            self.feature_width
        );
        let estimate = self.regressor.predict(&features);
        ensure!(estimate.is_finite(), "regressor produced {estimate}");
        Ok(estimate)
    }
}

impl SalaryModel for HeuristicEstimator {
    fn fit(&mut self, labeled: &[(JobRecord, f64)]) -> Result<()> {
        let samples: Vec<HeuristicSample> = labeled
            .iter()
            .map(|(record, salary)| HeuristicSample::from_labeled(record, *salary))
            .collect();
        self.train(&samples);
        Ok(())
    }

    fn predict(&self, record: &JobRecord) -> Result<f64> {
        // The heuristic is total by construction
        Ok(HeuristicEstimator::predict(
            self,
            &record.experience,
            &record.education,
            &record.location,
            &record.industry,
        ))
    }
}

/// The tier that actually produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Trained,
    Heuristic,
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path of the tree-ensemble artifact blob
    pub artifact_path: PathBuf,
    /// Path of the heuristic weights record
    pub weights_path: PathBuf,
    /// Minimum labeled rows before synthetic top-up
    pub min_samples: usize,
    /// Seed for splits, bootstrap sampling, and synthetic generation
    pub seed: u64,
}

impl EngineConfig {
    /// Conventional file layout under a data directory
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        let dir = data_dir.as_ref();
        Self {
            artifact_path: dir.join("salary_model.bin"),
            weights_path: dir.join("heuristic_weights.json"),
            min_samples: MIN_TRAINING_SAMPLES,
            seed: DEFAULT_SEED,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

/// Orchestrates both model tiers behind a total prediction surface
pub struct PredictionEngine {
    config: EngineConfig,
    store: ArtifactStore,
    artifact: Option<TrainedArtifact>,
    heuristic: HeuristicEstimator,
    parser: SalaryTextParser,
    formatter: OutputFormatter,
}

impl PredictionEngine {
    /// Build an engine from persisted state only; never trains. The
    /// trained tier stays absent until [`train`](Self::train) runs or a
    /// valid artifact was on disk.
    pub fn with_config(config: EngineConfig) -> Self {
        let store = ArtifactStore::new(&config.artifact_path);
        let artifact = store.load();
        let heuristic = HeuristicEstimator::with_store(&config.weights_path);
        Self {
            store,
            artifact,
            heuristic,
            parser: SalaryTextParser::new(),
            formatter: OutputFormatter::new(),
            config,
        }
    }

    /// Load-or-train lifecycle: reuse the persisted artifact when one
    /// loads cleanly, otherwise run a full training pass over `corpus`
    /// and persist the result.
    pub fn open(config: EngineConfig, corpus: &[JobRecord]) -> Self {
        let mut engine = Self::with_config(config);
        if engine.artifact.is_none() {
            info!("No usable artifact; running initial training pass");
            engine.train(corpus);
        }
        engine
    }

    /// Run a training pass over the corpus, update both tiers, and
    /// persist them. Training always yields a usable in-memory artifact
    /// even when persistence fails.
    pub fn train(&mut self, corpus: &[JobRecord]) -> TrainingReport {
        let (artifact, labeled, report) = training::run_training_pass(
            corpus,
            &self.parser,
            self.config.min_samples,
            self.config.seed,
        );

        if let Err(e) = self.store.save(&artifact) {
            warn!(error = %e, "Failed to persist artifact; keeping it in memory");
        }
        self.artifact = Some(artifact);

        // Both tiers train on the same labeled rows, synthetic top-up
        // included, so a cold start leaves neither tier at defaults
        if !labeled.is_empty() {
            if let Err(e) = self.heuristic.fit(&labeled) {
                warn!(error = %e, "Heuristic fit failed; keeping previous weights");
            }
        }

        report
    }

    /// Drop the current artifact and train from scratch
    pub fn retrain(&mut self, corpus: &[JobRecord]) -> TrainingReport {
        self.artifact = None;
        self.train(corpus)
    }

    /// The explicit fallback chain: tier 1 when available and healthy,
    /// tier 2 otherwise. Returns the raw (unclamped) estimate and the
    /// tier that produced it.
    pub fn route(&self, record: &JobRecord) -> (f64, Tier) {
        if let Some(artifact) = &self.artifact {
            match artifact.predict(record) {
                Ok(estimate) => return (estimate, Tier::Trained),
                Err(e) => {
                    debug!(error = %e, "Trained tier failed; degrading to heuristic");
                }
            }
        } else {
            debug!("No trained artifact; using heuristic tier");
        }

        let estimate = SalaryModel::predict(&self.heuristic, record)
            .unwrap_or(crate::heuristic::HEURISTIC_FLOOR);
        (estimate, Tier::Heuristic)
    }

    /// Total point prediction, clamped to [`MIN_SALARY`], [`MAX_SALARY`]
    pub fn predict(&self, query: &JobQuery) -> f64 {
        let record = query.to_record();
        let (estimate, tier) = self.route(&record);
        debug!(estimate, ?tier, "Prediction routed");
        self.formatter.clamp(estimate)
    }

    /// Full prediction payload with the display-formatted range
    pub fn predict_salary(&self, query: &JobQuery) -> SalaryPrediction {
        self.formatter.format(self.predict(query))
    }

    pub fn heuristic(&self) -> &HeuristicEstimator {
        &self.heuristic
    }

    pub fn has_trained_tier(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
