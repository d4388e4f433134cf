//! Inference pipeline for classifying astronomical observations into
//! star, galaxy, or quasi-stellar object.
//!
//! A query flows through four stages: input binding, standard scaling with a
//! pre-fit scaler, feature engineering (photometric band differences), and
//! prediction with a pre-trained softmax classifier. The terminal stage also
//! composes the human-readable conclusion and picks a representative gallery
//! image for the predicted class.
//!
//! Model artifacts are loaded once when a [`Pipeline`] is built and shared
//! read-only across queries; inference never mutates them.

pub mod class;
pub mod classifier;
pub mod compose;
pub mod config;
pub mod error;
pub mod features;
pub mod illustration;
pub mod pipeline;
pub mod scaler;

pub use class::StellarClass;
pub use classifier::{ClassProbabilities, Classifier, ClassifierArtifact, EstimatorParams};
pub use compose::{Prediction, compose, format_confidence};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use features::{
    EngineeredFeatureVector, FIELD_NAMES, FeatureVector, ScaledFeatureVector, engineer,
};
pub use illustration::{
    AssetPicker, AssetRouting, IllustrationLibrary, RenderedIllustration, UniformPicker,
};
pub use pipeline::{ClassifiedObservation, Pipeline, QueryOutcome, export_csv};
pub use scaler::{ScalerArtifact, StandardScaler};
