use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Recognized input fields, in the order the fitted scaler expects them.
pub const FIELD_NAMES: [&str; 8] = ["alpha", "delta", "u", "g", "r", "i", "z", "redshift"];

/// Engineered fields, in the order the classifier expects them.
pub const ENGINEERED_FIELD_NAMES: [&str; 7] = ["redshift", "g-r", "i-z", "u-r", "i-r", "z-r", "g"];

/// One raw observation as supplied by the UI collaborator.
///
/// `alpha`/`delta` are angles in degrees, `u`..`z` are photometric band
/// magnitudes, `redshift` is the spectral shift. Range enforcement is the
/// collaborator's job; finiteness is always checked here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub alpha: f64,
    pub delta: f64,
    pub u: f64,
    pub g: f64,
    pub r: f64,
    pub i: f64,
    pub z: f64,
    pub redshift: f64,
}

impl FeatureVector {
    /// Binds name/value pairs from the input boundary into a feature vector.
    ///
    /// Fails when a recognized field is missing or duplicated, when an
    /// unrecognized field appears, or when any value is non-finite.
    pub fn from_named(values: &[(&str, f64)]) -> Result<Self> {
        let mut bound = [None::<f64>; 8];
        for (name, value) in values {
            let Some(idx) = FIELD_NAMES.iter().position(|field| *field == *name) else {
                return Err(Error::InvalidInput(format!(
                    "unrecognized feature field '{name}'"
                )));
            };
            if bound[idx].replace(*value).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate feature field '{name}'"
                )));
            }
        }
        let mut fields = [0.0; 8];
        for (idx, slot) in bound.iter().enumerate() {
            match slot {
                Some(value) => fields[idx] = *value,
                None => {
                    return Err(Error::InvalidInput(format!(
                        "missing feature field '{}'",
                        FIELD_NAMES[idx]
                    )));
                }
            }
        }
        let vector = Self::from_array(fields);
        vector.validate()?;
        Ok(vector)
    }

    /// Rejects NaN and infinite values.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in FIELD_NAMES.iter().zip(self.as_array()) {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "feature '{name}' is not finite ({value})"
                )));
            }
        }
        Ok(())
    }

    /// Field values in [`FIELD_NAMES`] order.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.alpha,
            self.delta,
            self.u,
            self.g,
            self.r,
            self.i,
            self.z,
            self.redshift,
        ]
    }

    pub(crate) fn from_array(fields: [f64; 8]) -> Self {
        let [alpha, delta, u, g, r, i, z, redshift] = fields;
        Self {
            alpha,
            delta,
            u,
            g,
            r,
            i,
            z,
            redshift,
        }
    }
}

/// Feature vector after the pre-fit standard scaling.
///
/// Same shape and field order as [`FeatureVector`]; only the feature
/// engineering step consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledFeatureVector(FeatureVector);

impl ScaledFeatureVector {
    pub(crate) fn new(inner: FeatureVector) -> Self {
        Self(inner)
    }

    /// Field values in [`FIELD_NAMES`] order.
    pub fn as_array(&self) -> [f64; 8] {
        self.0.as_array()
    }
}

/// Reduced feature set the classifier was trained on: four band differences
/// plus redshift and the g magnitude, all from scaled inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineeredFeatureVector {
    pub redshift: f64,
    pub g_r: f64,
    pub i_z: f64,
    pub u_r: f64,
    pub i_r: f64,
    pub z_r: f64,
    pub g: f64,
}

impl EngineeredFeatureVector {
    /// Field values in [`ENGINEERED_FIELD_NAMES`] order. The order binds
    /// directly to classifier input columns.
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.redshift,
            self.g_r,
            self.i_z,
            self.u_r,
            self.i_r,
            self.z_r,
            self.g,
        ]
    }
}

/// Derives the engineered features from a scaled vector. Pure and
/// deterministic.
pub fn engineer(scaled: &ScaledFeatureVector) -> EngineeredFeatureVector {
    let f = &scaled.0;
    EngineeredFeatureVector {
        redshift: f.redshift,
        g_r: f.g - f.r,
        i_z: f.i - f.z,
        u_r: f.u - f.r,
        i_r: f.i - f.r,
        z_r: f.z - f.r,
        g: f.g,
    }
}
