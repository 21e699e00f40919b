//! Prediction output bounds and display formatting
//!
//! Clamps point estimates into the supported salary band and renders the
//! API-facing result with a ±10% display range.

use crate::models::SalaryPrediction;

/// Lower bound for any emitted estimate
pub const MIN_SALARY: f64 = 5_000.0;

/// Upper bound for any emitted estimate
pub const MAX_SALARY: f64 = 100_000.0;

/// Half-width of the displayed range, as a fraction of the point estimate
pub const RANGE_SPREAD: f64 = 0.10;

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub min_salary: f64,
    pub max_salary: f64,
    pub range_spread: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            min_salary: MIN_SALARY,
            max_salary: MAX_SALARY,
            range_spread: RANGE_SPREAD,
        }
    }
}

/// Formats point estimates into the API-facing prediction payload
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    config: OutputConfig,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Clamp a point estimate into the supported band
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.config.min_salary, self.config.max_salary)
    }

    /// Build the full prediction payload around a point estimate
    pub fn format(&self, point: f64) -> SalaryPrediction {
        let point = self.clamp(point);
        let min = point * (1.0 - self.config.range_spread);
        let max = point * (1.0 + self.config.range_spread);
        SalaryPrediction {
            success: true,
            predicted_salary: point.round(),
            salary_range: format!("{}-{}", display_salary(min), display_salary(max)),
            min_salary: min.round(),
            max_salary: max.round(),
        }
    }
}

/// Render a salary for display: one-decimal 万 at or above 10000, whole k
/// below
pub fn display_salary(value: f64) -> String {
    if value >= 10_000.0 {
        format!("{:.1}万", value / 10_000.0)
    } else {
        format!("{:.0}k", value / 1_000.0)
    }
}
