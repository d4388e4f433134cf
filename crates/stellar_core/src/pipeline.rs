use std::path::Path;

use crate::class::StellarClass;
use crate::classifier::Classifier;
use crate::compose::{Prediction, compose};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::features::{FIELD_NAMES, FeatureVector, engineer};
use crate::illustration::{self, AssetPicker, IllustrationLibrary, RenderedIllustration};
use crate::scaler::StandardScaler;

/// Everything the terminal pipeline state yields for one query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub prediction: Prediction,
    pub illustration: RenderedIllustration,
}

/// One query retained for CSV export: the raw inputs plus the prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedObservation {
    pub input: FeatureVector,
    pub class: StellarClass,
    pub confidence: f64,
}

/// The end-to-end inference pipeline.
///
/// Both model artifacts are loaded exactly once, at construction; queries
/// share them read-only and never touch disk for model state. Each `run`
/// call is an independent synchronous chain with no retries: the first
/// failing stage aborts the query with no partial result.
#[derive(Debug)]
pub struct Pipeline {
    scaler: StandardScaler,
    classifier: Classifier,
    illustrations: IllustrationLibrary,
}

impl Pipeline {
    pub fn new(
        scaler: StandardScaler,
        classifier: Classifier,
        illustrations: IllustrationLibrary,
    ) -> Self {
        Self {
            scaler,
            classifier,
            illustrations,
        }
    }

    /// Loads both artifacts and wires up the gallery per the configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let scaler = StandardScaler::load(&config.scaler_path)?;
        let classifier = Classifier::load(&config.classifier_path)?;
        tracing::info!(
            "model artifacts loaded: scaler {}, classifier {}",
            config.scaler_path.display(),
            config.classifier_path.display()
        );
        Ok(Self::new(
            scaler,
            classifier,
            IllustrationLibrary::new(&config.asset_root, config.asset_routing),
        ))
    }

    /// Runs one query through Fetch, Preprocess, Featurize, and Predict, in
    /// that order.
    pub fn run(&self, raw: &FeatureVector, picker: &mut dyn AssetPicker) -> Result<QueryOutcome> {
        // Fetch: the query datapoint must be complete and finite.
        raw.validate()?;
        // Preprocess: the pre-fit standardization.
        let scaled = self.scaler.scale(raw)?;
        // Featurize: band differences in the trained column order.
        let features = engineer(&scaled);
        // Predict: forward pass, conclusion, illustration.
        let (class, probabilities) = self.classifier.predict(&features)?;
        let prediction = compose(class, &probabilities);
        let asset = self.illustrations.select(class, picker)?;
        let illustration = illustration::render(&asset)?;
        tracing::debug!(
            "classified query as {} ({}%)",
            prediction.class.label(),
            prediction.confidence
        );
        Ok(QueryOutcome {
            prediction,
            illustration,
        })
    }
}

/// Exports classified observations to CSV with headers:
/// alpha,delta,u,g,r,i,z,redshift,class,confidence
pub fn export_csv(rows: &[ClassifiedObservation], path: impl AsRef<Path>) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).map_err(|e| Error::Export(e.to_string()))?;
    let mut header: Vec<&str> = FIELD_NAMES.to_vec();
    header.push("class");
    header.push("confidence");
    wtr.write_record(&header)
        .map_err(|e| Error::Export(e.to_string()))?;

    for row in rows {
        let mut record: Vec<String> = row
            .input
            .as_array()
            .iter()
            .map(|v| format!("{v}"))
            .collect();
        record.push(row.class.label().to_string());
        record.push(format!("{}", row.confidence));
        wtr.write_record(&record)
            .map_err(|e| Error::Export(e.to_string()))?;
    }

    wtr.flush().map_err(|e| Error::Export(e.to_string()))?;
    Ok(())
}
