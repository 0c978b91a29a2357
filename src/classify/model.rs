//! Frozen structure classifier artifacts.
//!
//! The classifier is an opaque scored capability: given a feature matrix,
//! return per-row class probabilities. Any frozen statistical or rule-based
//! model satisfying [`StructureModel`] is substitutable; no training logic
//! lives in this crate.

use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FEATURE_COLUMNS;

/// Probability column for body text.
pub const CLASS_BODY: usize = 0;
/// Probability column for the document title.
pub const CLASS_TITLE: usize = 1;
/// Probability column for headings.
pub const CLASS_HEADING: usize = 2;

/// Number of output classes: {body, title, heading}.
pub const NUM_CLASSES: usize = 3;

/// A frozen classifier over span feature rows.
pub trait StructureModel {
    /// Per-row probability distribution over {body, title, heading}.
    ///
    /// Input is an N×7 matrix in [`FEATURE_COLUMNS`] order; output is N×3
    /// with rows summing to 1, row order preserved. Called exactly once
    /// per document.
    fn predict_proba(&self, features: &Array2<f32>) -> Result<Array2<f32>>;
}

/// Multinomial logistic model loaded from a JSON artifact.
///
/// The artifact stores one weight row and one bias per class; inference is
/// a softmax over the class logits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// NUM_CLASSES rows of FEATURE_COLUMNS.len() weights each
    weights: Vec<Vec<f32>>,
    /// One bias per class
    bias: Vec<f32>,
}

impl LinearModel {
    /// Build a model from raw coefficients, validating shape.
    pub fn new(weights: Vec<Vec<f32>>, bias: Vec<f32>) -> Result<Self> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    /// Parse a model from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self =
            serde_json::from_str(json).map_err(|e| Error::Model(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Load the frozen artifact from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Model(format!(
                "cannot read model file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.weights.len() != NUM_CLASSES || self.bias.len() != NUM_CLASSES {
            return Err(Error::Model(format!(
                "expected {} classes, got {} weight rows and {} biases",
                NUM_CLASSES,
                self.weights.len(),
                self.bias.len()
            )));
        }
        for row in &self.weights {
            if row.len() != FEATURE_COLUMNS.len() {
                return Err(Error::Model(format!(
                    "expected {} features per class, got {}",
                    FEATURE_COLUMNS.len(),
                    row.len()
                )));
            }
        }
        Ok(())
    }
}

impl StructureModel for LinearModel {
    fn predict_proba(&self, features: &Array2<f32>) -> Result<Array2<f32>> {
        if features.ncols() != FEATURE_COLUMNS.len() {
            return Err(Error::Model(format!(
                "feature matrix has {} columns, expected {}",
                features.ncols(),
                FEATURE_COLUMNS.len()
            )));
        }

        let n = features.nrows();
        let mut probs = Array2::zeros((n, NUM_CLASSES));

        for (i, row) in features.outer_iter().enumerate() {
            let mut logits = [0f32; NUM_CLASSES];
            for (c, logit) in logits.iter_mut().enumerate() {
                *logit = self.bias[c]
                    + self.weights[c]
                        .iter()
                        .zip(row.iter())
                        .map(|(w, x)| w * x)
                        .sum::<f32>();
            }

            // Softmax, shifted by the max logit for numeric stability.
            let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
            let total: f32 = exps.iter().sum();
            for (c, e) in exps.iter().enumerate() {
                probs[[i, c]] = e / total;
            }
        }

        Ok(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn heading_biased_model() -> LinearModel {
        // Large size_ratio (column 3) pushes toward title, boldness
        // (column 5) toward heading.
        LinearModel::new(
            vec![
                vec![0.0; 7],
                vec![0.0, 0.0, 0.0, 2.0, -1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 1.0],
            ],
            vec![1.0, -2.0, -1.5],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_sum_to_one() {
        let model = heading_biased_model();
        let features = arr2(&[
            [11.0, 2.0, 0.0, 1.0, 3.0, 0.0, 0.0],
            [8.0, 1.0, 1.0, 2.4, 1.0, 1.0, 0.0],
        ]);
        let probs = model.predict_proba(&features).unwrap();
        assert_eq!(probs.shape(), &[2, 3]);
        for row in probs.outer_iter() {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            for &p in row.iter() {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_bold_large_span_scores_heading() {
        let model = heading_biased_model();
        let features = arr2(&[[8.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0]]);
        let probs = model.predict_proba(&features).unwrap();
        assert!(probs[[0, CLASS_HEADING]] > probs[[0, CLASS_BODY]]);
    }

    #[test]
    fn test_wrong_column_count_rejected() {
        let model = heading_biased_model();
        let features = arr2(&[[1.0, 2.0, 3.0]]);
        assert!(matches!(
            model.predict_proba(&features),
            Err(Error::Model(_))
        ));
    }

    #[test]
    fn test_artifact_shape_validation() {
        let result = LinearModel::new(vec![vec![0.0; 7]; 2], vec![0.0; 2]);
        assert!(matches!(result, Err(Error::Model(_))));

        let result = LinearModel::new(vec![vec![0.0; 4]; 3], vec![0.0; 3]);
        assert!(matches!(result, Err(Error::Model(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let model = heading_biased_model();
        let json = serde_json::to_string(&model).unwrap();
        let restored = LinearModel::from_json(&json).unwrap();
        let features = arr2(&[[5.0, 1.0, 0.0, 1.0, 2.0, 0.0, 0.0]]);
        assert_eq!(
            model.predict_proba(&features).unwrap(),
            restored.predict_proba(&features).unwrap()
        );
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            LinearModel::from_json("{\"weights\": 3}"),
            Err(Error::Model(_))
        ));
    }
}
