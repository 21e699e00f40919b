//! Closed-form salary heuristic (tier 2)
//!
//! A human-interpretable weighted-sum model: bias plus a per-year
//! experience contribution plus base lookups for education, location, and
//! industry. Serves both as a lightweight standalone model and as the
//! last-resort fallback, so its prediction surface never fails.

use crate::models::JobRecord;
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Heuristic predictions never drop below this floor
pub const HEURISTIC_FLOOR: f64 = 3_000.0;

/// Half-width of the uniform perturbation added at inference
pub const PERTURBATION: f64 = 1_500.0;

/// Years assumed when nothing is extractable from the experience text
const DEFAULT_YEARS: f64 = 3.0;

/// Catch-all bucket for values missing from a base table
const OTHER_BUCKET: &str = "其他";

/// The small durable weight record for the heuristic tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicWeights {
    pub experience_slope: f64,
    pub education_base: BTreeMap<String, f64>,
    pub location_base: BTreeMap<String, f64>,
    pub industry_base: BTreeMap<String, f64>,
    pub bias: f64,
    pub trained_at: Option<String>,
}

fn base_table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            experience_slope: 3_000.0,
            education_base: base_table(&[
                ("大专", 5_000.0),
                ("本科", 8_000.0),
                ("硕士", 12_000.0),
                ("博士", 18_000.0),
                (OTHER_BUCKET, 5_000.0),
            ]),
            location_base: base_table(&[
                ("北京", 12_000.0),
                ("上海", 11_000.0),
                ("广州", 8_000.0),
                ("深圳", 9_000.0),
                ("杭州", 7_000.0),
                (OTHER_BUCKET, 5_000.0),
            ]),
            industry_base: base_table(&[
                ("互联网", 10_000.0),
                ("金融", 9_000.0),
                ("教育", 6_000.0),
                ("医疗", 7_000.0),
                (OTHER_BUCKET, 5_000.0),
            ]),
            bias: 3_000.0,
            trained_at: None,
        }
    }
}

impl HeuristicWeights {
    fn lookup(table: &BTreeMap<String, f64>, key: &str) -> f64 {
        table
            .get(key)
            .or_else(|| table.get(OTHER_BUCKET))
            .copied()
            .unwrap_or(0.0)
    }
}

/// One labeled observation for adaptive slope training
#[derive(Debug, Clone)]
pub struct HeuristicSample {
    pub experience_years: f64,
    pub education: String,
    pub location: String,
    pub industry: String,
    pub salary: f64,
}

impl HeuristicSample {
    /// Derive a sample from a record and its parsed salary label
    pub fn from_labeled(record: &JobRecord, salary: f64) -> Self {
        Self {
            experience_years: extract_experience_years(&record.experience),
            education: record.education.clone(),
            location: record.location.clone(),
            industry: record.industry.clone(),
            salary,
        }
    }
}

/// Extract a year count from free-form experience text
pub fn extract_experience_years(text: &str) -> f64 {
    if text.contains("应届") {
        return 0.0;
    }
    if text.contains("1年以下") {
        return 0.5;
    }
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(DEFAULT_YEARS)
}

/// The tier-2 estimator with optionally persisted weights
pub struct HeuristicEstimator {
    weights: HeuristicWeights,
    path: Option<PathBuf>,
}

impl HeuristicEstimator {
    /// Start from the default weight tables, no persistence
    pub fn new() -> Self {
        Self {
            weights: HeuristicWeights::default(),
            path: None,
        }
    }

    /// Load weights from the given path when present, defaults otherwise;
    /// subsequent training saves back to the same path
    pub fn with_store<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let weights = match load_weights(&path) {
            Some(weights) => {
                info!(path = %path.display(), "Loaded heuristic weights");
                weights
            }
            None => HeuristicWeights::default(),
        };
        Self {
            weights,
            path: Some(path),
        }
    }

    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// The deterministic part of the estimate, without perturbation
    pub fn estimate(&self, experience: &str, education: &str, location: &str, industry: &str) -> f64 {
        let years = extract_experience_years(experience);
        self.weights.bias
            + years * self.weights.experience_slope
            + HeuristicWeights::lookup(&self.weights.education_base, education)
            + HeuristicWeights::lookup(&self.weights.location_base, location)
            + HeuristicWeights::lookup(&self.weights.industry_base, industry)
    }

    /// Predict with a bounded perturbation so identical inputs do not
    /// render visibly identical outputs; floored at [`HEURISTIC_FLOOR`]
    pub fn predict(&self, experience: &str, education: &str, location: &str, industry: &str) -> f64 {
        let noise = rand::thread_rng().gen_range(-PERTURBATION..PERTURBATION);
        (self.estimate(experience, education, location, industry) + noise).max(HEURISTIC_FLOOR)
    }

    /// Adaptive training: for every (education, location, industry) bucket
    /// combination with more than one observation and non-zero experience
    /// variance, re-derive the per-year slope and blend it with the current
    /// one by simple averaging.
    pub fn train(&mut self, samples: &[HeuristicSample]) {
        let mut updates = 0usize;

        let education_keys: Vec<String> = self.weights.education_base.keys().cloned().collect();
        let location_keys: Vec<String> = self.weights.location_base.keys().cloned().collect();
        let industry_keys: Vec<String> = self.weights.industry_base.keys().cloned().collect();

        for education in &education_keys {
            for location in &location_keys {
                for industry in &industry_keys {
                    let subset: Vec<&HeuristicSample> = samples
                        .iter()
                        .filter(|s| {
                            &s.education == education
                                && &s.location == location
                                && &s.industry == industry
                        })
                        .collect();
                    if subset.len() < 2 {
                        continue;
                    }

                    let mean_years = subset.iter().map(|s| s.experience_years).sum::<f64>()
                        / subset.len() as f64;
                    let variance = subset
                        .iter()
                        .map(|s| (s.experience_years - mean_years).powi(2))
                        .sum::<f64>()
                        / subset.len() as f64;
                    if variance < f64::EPSILON || mean_years.abs() < f64::EPSILON {
                        continue;
                    }

                    let mean_salary =
                        subset.iter().map(|s| s.salary).sum::<f64>() / subset.len() as f64;
                    let implied_slope = (mean_salary
                        - HeuristicWeights::lookup(&self.weights.education_base, education)
                        - HeuristicWeights::lookup(&self.weights.location_base, location)
                        - HeuristicWeights::lookup(&self.weights.industry_base, industry)
                        - self.weights.bias)
                        / mean_years;

                    if implied_slope.is_finite() && implied_slope > 0.0 {
                        self.weights.experience_slope =
                            (self.weights.experience_slope + implied_slope) / 2.0;
                        updates += 1;
                    }
                }
            }
        }

        self.weights.trained_at = Some(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());
        debug!(
            samples = samples.len(),
            slope_updates = updates,
            slope = self.weights.experience_slope,
            "Heuristic training pass complete"
        );

        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist heuristic weights");
        }
    }

    /// Persist the weight record when a store path is configured
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create weights directory {}", parent.display())
                })?;
            }
        }
        let json =
            serde_json::to_string_pretty(&self.weights).context("Failed to encode weights")?;
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(json.as_bytes()))
            .with_context(|| format!("Failed to write weights {}", path.display()))?;
        info!(path = %path.display(), "Saved heuristic weights");
        Ok(())
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::new()
    }
}

fn load_weights(path: &Path) -> Option<HeuristicWeights> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read heuristic weights");
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(weights) => Some(weights),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Rejected heuristic weights record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_experience_years() {
        assert_eq!(extract_experience_years("应届"), 0.0);
        assert_eq!(extract_experience_years("1年以下"), 0.5);
        assert_eq!(extract_experience_years("3-5年"), 3.0);
        assert_eq!(extract_experience_years("10年以上"), 10.0);
        assert_eq!(extract_experience_years("经验不限"), DEFAULT_YEARS);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = HeuristicEstimator::new();
        let a = estimator.estimate("3-5年", "本科", "北京", "互联网");
        let b = estimator.estimate("3-5年", "本科", "北京", "互联网");
        assert_eq!(a, b);
        // bias 3000 + 3 years * 3000 + 本科 8000 + 北京 12000 + 互联网 10000
        assert_eq!(a, 42_000.0);
    }

    #[test]
    fn test_beijing_beats_default_bucket() {
        let estimator = HeuristicEstimator::new();
        let beijing = estimator.estimate("3-5年", "本科", "北京", "互联网");
        let other = estimator.estimate("3-5年", "本科", "其他", "互联网");
        assert!(beijing > other);
    }

    #[test]
    fn test_predict_stays_within_noise_band() {
        let estimator = HeuristicEstimator::new();
        let center = estimator.estimate("3-5年", "本科", "北京", "互联网");
        for _ in 0..50 {
            let p = estimator.predict("3-5年", "本科", "北京", "互联网");
            assert!((p - center).abs() <= PERTURBATION);
            assert!(p >= HEURISTIC_FLOOR);
        }
    }

    #[test]
    fn test_unknown_buckets_fall_back_to_other() {
        let estimator = HeuristicEstimator::new();
        let explicit = estimator.estimate("应届", "中专", "拉萨", "航天");
        let other = estimator.estimate("应届", "其他", "其他", "其他");
        assert_eq!(explicit, other);
    }

    #[test]
    fn test_training_blends_slope_towards_data() {
        let mut estimator = HeuristicEstimator::new();
        let initial_slope = estimator.weights().experience_slope;

        // Two observations in one bucket combination implying a steeper
        // slope: salaries far above the base sum
        let sample = |years: f64, salary: f64| HeuristicSample {
            experience_years: years,
            education: "本科".to_string(),
            location: "北京".to_string(),
            industry: "互联网".to_string(),
            salary,
        };
        estimator.train(&[sample(2.0, 50_000.0), sample(6.0, 70_000.0)]);

        let trained_slope = estimator.weights().experience_slope;
        assert!(trained_slope > initial_slope);
        assert!(estimator.weights().trained_at.is_some());

        // implied = (60000 - 8000 - 12000 - 10000 - 3000) / 4 = 6750,
        // blended = (3000 + 6750) / 2
        assert!((trained_slope - 4_875.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_from_labeled_record() {
        let record = JobRecord {
            experience: "5-10年".to_string(),
            education: "硕士".to_string(),
            location: "上海".to_string(),
            industry: "金融".to_string(),
            ..JobRecord::default()
        };
        let sample = HeuristicSample::from_labeled(&record, 25_000.0);
        assert_eq!(sample.experience_years, 5.0);
        assert_eq!(sample.education, "硕士");
        assert_eq!(sample.location, "上海");
        assert_eq!(sample.salary, 25_000.0);
    }

    #[test]
    fn test_single_observation_buckets_ignored() {
        let mut estimator = HeuristicEstimator::new();
        let before = estimator.weights().experience_slope;
        estimator.train(&[HeuristicSample {
            experience_years: 5.0,
            education: "本科".to_string(),
            location: "北京".to_string(),
            industry: "互联网".to_string(),
            salary: 80_000.0,
        }]);
        assert_eq!(estimator.weights().experience_slope, before);
    }

    #[test]
    fn test_weights_roundtrip_through_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.json");

        let mut estimator = HeuristicEstimator::with_store(&path);
        estimator.weights.experience_slope = 4_321.0;
        estimator.save().unwrap();

        let restored = HeuristicEstimator::with_store(&path);
        assert_eq!(restored.weights().experience_slope, 4_321.0);
    }

    #[test]
    fn test_corrupt_weights_record_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("weights.json");
        fs::write(&path, "{ not json").unwrap();

        let estimator = HeuristicEstimator::with_store(&path);
        assert_eq!(estimator.weights(), &HeuristicWeights::default());
    }
}
