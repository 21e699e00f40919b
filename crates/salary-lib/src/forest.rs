//! Tree-ensemble regression
//!
//! A bootstrap-aggregated forest of variance-reduction regression trees,
//! plus a constant-output variant used when fitting fails so a usable
//! regressor always exists. Seeded throughout for reproducible fits.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Number of trees in the ensemble
pub const DEFAULT_TREES: usize = 100;

/// Maximum tree depth
const MAX_DEPTH: usize = 12;

/// Minimum samples on each side of a split
const MIN_LEAF: usize = 2;

/// The two bracketing labels whose median the constant fallback predicts
pub const FALLBACK_BRACKET: (f64, f64) = (8_000.0, 30_000.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf { value } => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = row.get(*feature).copied().unwrap_or(0.0);
                if value <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// A single variance-reduction regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    fn fit(features: &[Vec<f64>], labels: &[f64], indices: &[usize]) -> Self {
        Self {
            root: grow(features, labels, indices, MAX_DEPTH),
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.root.predict(row)
    }
}

fn mean(labels: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| labels[i]).sum::<f64>() / indices.len() as f64
}

fn sum_squared_error(labels: &[f64], indices: &[usize]) -> f64 {
    let m = mean(labels, indices);
    indices.iter().map(|&i| (labels[i] - m).powi(2)).sum()
}

fn grow(features: &[Vec<f64>], labels: &[f64], indices: &[usize], depth: usize) -> Node {
    if depth == 0 || indices.len() < 2 * MIN_LEAF {
        return Node::Leaf {
            value: mean(labels, indices),
        };
    }

    match best_split(features, labels, indices) {
        Some((feature, threshold, left_idx, right_idx)) => Node::Split {
            feature,
            threshold,
            left: Box::new(grow(features, labels, &left_idx, depth - 1)),
            right: Box::new(grow(features, labels, &right_idx, depth - 1)),
        },
        None => Node::Leaf {
            value: mean(labels, indices),
        },
    }
}

/// Find the split minimizing the summed squared error of the two halves.
/// Returns `None` when no split improves on the unsplit node.
///
/// Running label sums let every cut point be scored in constant time:
/// SSE = sum(y^2) - sum(y)^2 / n for each side.
fn best_split(
    features: &[Vec<f64>],
    labels: &[f64],
    indices: &[usize],
) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
    let width = features.first().map(|row| row.len()).unwrap_or(0);
    let n = indices.len();
    let parent_sse = sum_squared_error(labels, indices);
    let total_sum: f64 = indices.iter().map(|&i| labels[i]).sum();
    let total_sum_sq: f64 = indices.iter().map(|&i| labels[i] * labels[i]).sum();
    let mut best: Option<(f64, usize, f64)> = None;

    for feature in 0..width {
        let mut ordered: Vec<usize> = indices.to_vec();
        ordered.sort_by(|&a, &b| {
            features[a][feature]
                .partial_cmp(&features[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sum_sq = 0.0;
        for cut in 1..n {
            let y = labels[ordered[cut - 1]];
            left_sum += y;
            left_sum_sq += y * y;

            if cut < MIN_LEAF || n - cut < MIN_LEAF {
                continue;
            }
            let low = features[ordered[cut - 1]][feature];
            let high = features[ordered[cut]][feature];
            if (high - low).abs() < f64::EPSILON {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sum_sq = total_sum_sq - left_sum_sq;
            let left_sse = left_sum_sq - left_sum * left_sum / cut as f64;
            let right_sse = right_sum_sq - right_sum * right_sum / (n - cut) as f64;
            let score = left_sse + right_sse;

            if score < parent_sse && best.map_or(true, |(s, _, _)| score < s) {
                best = Some((score, feature, (low + high) / 2.0));
            }
        }
    }

    let (_, feature, threshold) = best?;
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| features[i][feature] <= threshold);
    Some((feature, threshold, left, right))
}

/// Bootstrap-aggregated ensemble of regression trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fit the forest over the feature matrix and labels
    pub fn fit(features: &[Vec<f64>], labels: &[f64], n_trees: usize, seed: u64) -> Result<Self> {
        if features.is_empty() || labels.is_empty() {
            bail!("cannot fit a forest on an empty training set");
        }
        if features.len() != labels.len() {
            bail!(
                "feature rows ({}) and labels ({}) differ in length",
                features.len(),
                labels.len()
            );
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let n = features.len();
        let trees = (0..n_trees)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(features, labels, &sample)
            })
            .collect();

        Ok(Self { trees })
    }

    /// Mean prediction across all trees
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// The persisted regressor: a fitted forest, or a constant output when
/// fitting failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    Forest(RandomForest),
    Constant(f64),
}

impl Regressor {
    /// The trivial regressor substituted when fitting fails: predicts the
    /// median of the two bracketing labels
    pub fn constant_fallback() -> Self {
        let (low, high) = FALLBACK_BRACKET;
        Regressor::Constant((low + high) / 2.0)
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Regressor::Forest(forest) => forest.predict(row),
            Regressor::Constant(value) => *value,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Regressor::Forest(forest) => format!("forest({} trees)", forest.tree_count()),
            Regressor::Constant(value) => format!("constant({value})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y = 1000 * x0 + 500 * x1 over a small grid
    fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for x0 in 0..6 {
            for x1 in 0..6 {
                features.push(vec![x0 as f64, x1 as f64]);
                labels.push(1000.0 * x0 as f64 + 500.0 * x1 as f64);
            }
        }
        (features, labels)
    }

    #[test]
    fn test_forest_learns_monotone_signal() {
        let (features, labels) = linear_data();
        let forest = RandomForest::fit(&features, &labels, 30, 42).unwrap();

        let low = forest.predict(&[0.0, 0.0]);
        let high = forest.predict(&[5.0, 5.0]);
        assert!(high > low, "expected {high} > {low}");

        // Predictions stay within the label range
        for row in &features {
            let p = forest.predict(row);
            assert!((0.0..=7500.0).contains(&p), "prediction {p} out of range");
        }
    }

    #[test]
    fn test_fit_is_reproducible_for_a_seed() {
        let (features, labels) = linear_data();
        let a = RandomForest::fit(&features, &labels, 10, 42).unwrap();
        let b = RandomForest::fit(&features, &labels, 10, 42).unwrap();
        for row in features.iter().take(5) {
            assert_eq!(a.predict(row), b.predict(row));
        }
    }

    #[test]
    fn test_empty_training_set_rejected() {
        assert!(RandomForest::fit(&[], &[], 10, 42).is_err());
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![1.0];
        assert!(RandomForest::fit(&features, &labels, 10, 42).is_err());
    }

    #[test]
    fn test_constant_fallback_predicts_bracket_median() {
        let regressor = Regressor::constant_fallback();
        assert_eq!(regressor.predict(&[0.0; 6]), 19_000.0);
        assert_eq!(regressor.predict(&[100.0; 6]), 19_000.0);
    }

    #[test]
    fn test_identical_rows_become_a_leaf() {
        let features = vec![vec![1.0, 1.0]; 8];
        let labels = vec![10_000.0; 8];
        let forest = RandomForest::fit(&features, &labels, 5, 7).unwrap();
        assert_eq!(forest.predict(&[1.0, 1.0]), 10_000.0);
    }

    #[test]
    fn test_regressor_roundtrips_through_bincode() {
        let (features, labels) = linear_data();
        let forest = RandomForest::fit(&features, &labels, 5, 42).unwrap();
        let regressor = Regressor::Forest(forest);

        let bytes = bincode::serialize(&regressor).unwrap();
        let restored: Regressor = bincode::deserialize(&bytes).unwrap();
        for row in features.iter().take(5) {
            assert_eq!(regressor.predict(row), restored.predict(row));
        }
    }
}
