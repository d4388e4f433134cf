use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the three target classes an observation can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StellarClass {
    Star,
    Galaxy,
    /// Quasi-stellar object (quasar).
    Qso,
}

impl StellarClass {
    /// All classes, in the canonical order used by probability vectors.
    pub const ALL: [StellarClass; 3] = [StellarClass::Star, StellarClass::Galaxy, StellarClass::Qso];

    pub(crate) fn index(self) -> usize {
        match self {
            StellarClass::Star => 0,
            StellarClass::Galaxy => 1,
            StellarClass::Qso => 2,
        }
    }

    /// Name shown to the user in the result sentence and caption.
    pub fn display_name(self) -> &'static str {
        match self {
            StellarClass::Star => "Star",
            StellarClass::Galaxy => "Galaxy",
            StellarClass::Qso => "Quasi-Stellar Object",
        }
    }

    /// Label string used by classifier artifacts.
    pub fn label(self) -> &'static str {
        match self {
            StellarClass::Star => "STAR",
            StellarClass::Galaxy => "GALAXY",
            StellarClass::Qso => "QSO",
        }
    }

    /// Subdirectory name under the gallery root for per-class asset routing.
    pub fn asset_dir(self) -> &'static str {
        match self {
            StellarClass::Star => "star",
            StellarClass::Galaxy => "galaxy",
            StellarClass::Qso => "qso",
        }
    }
}

impl FromStr for StellarClass {
    type Err = Error;

    /// Parses an artifact label. Unknown labels are rejected here, at load
    /// time, so the display mapping never has to guess a fallback class.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "STAR" => Ok(StellarClass::Star),
            "GALAXY" => Ok(StellarClass::Galaxy),
            "QSO" => Ok(StellarClass::Qso),
            other => Err(Error::ModelUnavailable(format!(
                "unknown class label '{other}' in classifier artifact"
            ))),
        }
    }
}

impl fmt::Display for StellarClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
