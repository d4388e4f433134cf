use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::class::StellarClass;
use crate::error::{Error, Result};
use crate::features::EngineeredFeatureVector;

/// Input dimensionality the trained models expect.
pub const EXPECTED_INPUT_DIM: usize = 7;

/// Number of target classes.
pub const CLASS_COUNT: usize = 3;

/// Probability vectors must sum to one within this tolerance.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Trained parameters of one multinomial softmax estimator, as serialized.
///
/// `coefficients[k]` and `intercepts[k]` belong to `classes[k]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorParams {
    pub classes: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

/// On-disk shape of the trained classifier (JSON). The variant is selected
/// by an explicit tag, never inferred from how many pieces the file packs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ClassifierArtifact {
    SingleEstimator {
        estimator: EstimatorParams,
    },
    EnsembleEstimator {
        estimators: Vec<EstimatorParams>,
        /// Soft-voting weights, one per member. Uniform when absent.
        #[serde(default)]
        weights: Option<Vec<f64>>,
    },
}

/// Probability assigned to each class, in [`StellarClass::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities([f64; CLASS_COUNT]);

impl ClassProbabilities {
    pub fn get(&self, class: StellarClass) -> f64 {
        self.0[class.index()]
    }

    /// Values in [`StellarClass::ALL`] order.
    pub fn as_array(&self) -> [f64; CLASS_COUNT] {
        self.0
    }

    /// Argmax class and its probability. Stable: the first of equal maxima
    /// wins.
    pub fn max(&self) -> (StellarClass, f64) {
        let mut best = (StellarClass::ALL[0], self.0[0]);
        for (class, p) in StellarClass::ALL.into_iter().zip(self.0).skip(1) {
            if p > best.1 {
                best = (class, p);
            }
        }
        best
    }
}

/// One validated softmax estimator, rows re-ordered into canonical class
/// order at load time.
#[derive(Debug, Clone)]
pub struct SoftmaxEstimator {
    coefficients: [[f64; EXPECTED_INPUT_DIM]; CLASS_COUNT],
    intercepts: [f64; CLASS_COUNT],
}

impl SoftmaxEstimator {
    fn from_params(params: EstimatorParams) -> Result<Self> {
        if params.classes.len() != CLASS_COUNT
            || params.coefficients.len() != CLASS_COUNT
            || params.intercepts.len() != CLASS_COUNT
        {
            return Err(Error::ModelUnavailable(format!(
                "estimator must carry {CLASS_COUNT} classes, got {}/{}/{} \
                 (classes/coefficients/intercepts)",
                params.classes.len(),
                params.coefficients.len(),
                params.intercepts.len()
            )));
        }
        let mut coefficients = [[0.0; EXPECTED_INPUT_DIM]; CLASS_COUNT];
        let mut intercepts = [0.0; CLASS_COUNT];
        let mut seen = [false; CLASS_COUNT];
        for (row, label) in params.classes.iter().enumerate() {
            let class: StellarClass = label.parse()?;
            let idx = class.index();
            if seen[idx] {
                return Err(Error::ModelUnavailable(format!(
                    "duplicate class label '{label}' in estimator"
                )));
            }
            seen[idx] = true;

            let coefs = &params.coefficients[row];
            if coefs.len() != EXPECTED_INPUT_DIM {
                return Err(Error::ModelUnavailable(format!(
                    "estimator row for '{label}' must carry {EXPECTED_INPUT_DIM} coefficients, \
                     got {}",
                    coefs.len()
                )));
            }
            for (col, value) in coefs.iter().enumerate() {
                if !value.is_finite() {
                    return Err(Error::ModelUnavailable(format!(
                        "non-finite coefficient for '{label}' at column {col}"
                    )));
                }
                coefficients[idx][col] = *value;
            }
            if !params.intercepts[row].is_finite() {
                return Err(Error::ModelUnavailable(format!(
                    "non-finite intercept for '{label}'"
                )));
            }
            intercepts[idx] = params.intercepts[row];
        }
        Ok(Self {
            coefficients,
            intercepts,
        })
    }

    fn probabilities(&self, features: &[f64]) -> [f64; CLASS_COUNT] {
        let mut logits = [0.0; CLASS_COUNT];
        for (idx, (coefs, intercept)) in self
            .coefficients
            .iter()
            .zip(self.intercepts)
            .enumerate()
        {
            logits[idx] = coefs.iter().zip(features).map(|(c, x)| c * x).sum::<f64>() + intercept;
        }
        softmax(&logits)
    }
}

/// Pre-trained classifier, loaded once and shared read-only. Inference is a
/// pure forward pass.
#[derive(Debug, Clone)]
pub enum Classifier {
    Single(SoftmaxEstimator),
    Ensemble {
        members: Vec<SoftmaxEstimator>,
        /// Normalized soft-voting weights, one per member.
        weights: Vec<f64>,
    },
}

impl Classifier {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::ModelUnavailable(format!("classifier artifact {}: {e}", path.display()))
        })?;
        let artifact: ClassifierArtifact = serde_json::from_str(&raw).map_err(|e| {
            Error::ModelUnavailable(format!("classifier artifact {}: {e}", path.display()))
        })?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self> {
        match artifact {
            ClassifierArtifact::SingleEstimator { estimator } => {
                Ok(Self::Single(SoftmaxEstimator::from_params(estimator)?))
            }
            ClassifierArtifact::EnsembleEstimator {
                estimators,
                weights,
            } => {
                if estimators.is_empty() {
                    return Err(Error::ModelUnavailable(
                        "ensemble artifact holds no estimators".to_string(),
                    ));
                }
                let members: Vec<SoftmaxEstimator> = estimators
                    .into_iter()
                    .map(SoftmaxEstimator::from_params)
                    .collect::<Result<_>>()?;
                let weights = match weights {
                    None => vec![1.0 / members.len() as f64; members.len()],
                    Some(raw) => {
                        if raw.len() != members.len() {
                            return Err(Error::ModelUnavailable(format!(
                                "ensemble carries {} estimators but {} weights",
                                members.len(),
                                raw.len()
                            )));
                        }
                        if raw.iter().any(|w| !w.is_finite() || *w < 0.0) {
                            return Err(Error::ModelUnavailable(
                                "ensemble weights must be finite and non-negative".to_string(),
                            ));
                        }
                        let sum: f64 = raw.iter().sum();
                        if sum <= 0.0 {
                            return Err(Error::ModelUnavailable(
                                "ensemble weights sum to zero".to_string(),
                            ));
                        }
                        raw.into_iter().map(|w| w / sum).collect()
                    }
                };
                Ok(Self::Ensemble { members, weights })
            }
        }
    }

    /// Probability per class for an engineered feature vector.
    pub fn predict_proba(&self, features: &EngineeredFeatureVector) -> Result<ClassProbabilities> {
        self.predict_proba_slice(&features.as_array())
    }

    /// Slice-level forward pass. Fails when the slice length differs from
    /// the trained input dimensionality.
    pub fn predict_proba_slice(&self, features: &[f64]) -> Result<ClassProbabilities> {
        if features.len() != EXPECTED_INPUT_DIM {
            return Err(Error::InvalidInput(format!(
                "classifier expects {EXPECTED_INPUT_DIM} features, got {}",
                features.len()
            )));
        }
        let values = match self {
            Classifier::Single(estimator) => estimator.probabilities(features),
            Classifier::Ensemble { members, weights } => {
                let mut acc = [0.0; CLASS_COUNT];
                for (member, weight) in members.iter().zip(weights) {
                    let member_probs = member.probabilities(features);
                    for (slot, p) in acc.iter_mut().zip(member_probs) {
                        *slot += weight * p;
                    }
                }
                let sum: f64 = acc.iter().sum();
                for value in &mut acc {
                    *value /= sum;
                }
                acc
            }
        };
        Ok(ClassProbabilities(values))
    }

    /// Argmax class together with the full probability vector.
    pub fn predict(
        &self,
        features: &EngineeredFeatureVector,
    ) -> Result<(StellarClass, ClassProbabilities)> {
        let probabilities = self.predict_proba(features)?;
        Ok((probabilities.max().0, probabilities))
    }
}

fn softmax(logits: &[f64; CLASS_COUNT]) -> [f64; CLASS_COUNT] {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut exps = [0.0; CLASS_COUNT];
    for (slot, logit) in exps.iter_mut().zip(logits) {
        *slot = (logit - max).exp();
    }
    let sum: f64 = exps.iter().sum();
    for value in &mut exps {
        *value /= sum;
    }
    exps
}
