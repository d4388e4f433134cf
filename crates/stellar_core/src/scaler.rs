use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::{FIELD_NAMES, FeatureVector, ScaledFeatureVector};

/// On-disk shape of the fitted scaler (JSON). Produced by the out-of-scope
/// training process; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub fields: Vec<String>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Pre-fit per-field standardization: (x - mean) / std.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: [f64; 8],
    std: [f64; 8],
}

impl StandardScaler {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::ModelUnavailable(format!("scaler artifact {}: {e}", path.display()))
        })?;
        let artifact: ScalerArtifact = serde_json::from_str(&raw).map_err(|e| {
            Error::ModelUnavailable(format!("scaler artifact {}: {e}", path.display()))
        })?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self> {
        if artifact.fields.len() != FIELD_NAMES.len()
            || artifact.mean.len() != FIELD_NAMES.len()
            || artifact.std.len() != FIELD_NAMES.len()
        {
            return Err(Error::ModelUnavailable(format!(
                "scaler artifact must carry {} fields, got {}/{}/{} (fields/mean/std)",
                FIELD_NAMES.len(),
                artifact.fields.len(),
                artifact.mean.len(),
                artifact.std.len()
            )));
        }
        for (expected, got) in FIELD_NAMES.iter().zip(&artifact.fields) {
            if expected != got {
                return Err(Error::ModelUnavailable(format!(
                    "scaler artifact field order mismatch: expected '{expected}', got '{got}'"
                )));
            }
        }
        let mut mean = [0.0; 8];
        let mut std = [0.0; 8];
        for idx in 0..FIELD_NAMES.len() {
            let (m, s) = (artifact.mean[idx], artifact.std[idx]);
            if !m.is_finite() || !s.is_finite() || s <= 0.0 {
                return Err(Error::ModelUnavailable(format!(
                    "scaler artifact has invalid parameters for '{}' (mean {m}, std {s})",
                    FIELD_NAMES[idx]
                )));
            }
            mean[idx] = m;
            std[idx] = s;
        }
        Ok(Self { mean, std })
    }

    /// Applies the fitted transform. Fails on non-finite input; no side
    /// effects, field order preserved.
    pub fn scale(&self, raw: &FeatureVector) -> Result<ScaledFeatureVector> {
        raw.validate()?;
        let mut fields = raw.as_array();
        for (idx, value) in fields.iter_mut().enumerate() {
            *value = (*value - self.mean[idx]) / self.std[idx];
        }
        Ok(ScaledFeatureVector::new(FeatureVector::from_array(fields)))
    }
}
