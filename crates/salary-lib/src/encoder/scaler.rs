//! Mean/standard-deviation feature standardization

use serde::{Deserialize, Serialize};

/// Per-column standardizer fit once over the training matrix and reused
/// unchanged at inference time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    spreads: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and standard deviations over a feature matrix
    pub fn fit(matrix: &[Vec<f64>]) -> Self {
        let width = matrix.first().map(|row| row.len()).unwrap_or(0);
        let count = matrix.len() as f64;

        let mut means = vec![0.0; width];
        for row in matrix {
            for (i, value) in row.iter().enumerate() {
                means[i] += value;
            }
        }
        for mean in &mut means {
            *mean /= count.max(1.0);
        }

        let mut spreads = vec![0.0; width];
        for row in matrix {
            for (i, value) in row.iter().enumerate() {
                spreads[i] += (value - means[i]).powi(2);
            }
        }
        for spread in &mut spreads {
            *spread = (*spread / count.max(1.0)).sqrt();
        }

        Self { means, spreads }
    }

    /// Standardize one row using the fitted parameters; a zero-spread
    /// column passes through centered only
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.spreads.iter()))
            .map(|(value, (mean, spread))| {
                if *spread < f64::EPSILON {
                    value - mean
                } else {
                    (value - mean) / spread
                }
            })
            .collect()
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }
}
