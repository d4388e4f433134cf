use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use stellar_core::{
    AssetPicker, AssetRouting, ClassifierArtifact, Error, EstimatorParams, FIELD_NAMES,
    FeatureVector, Pipeline, PipelineConfig, ScalerArtifact, StellarClass,
};

struct FixedPicker(usize);

impl AssetPicker for FixedPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

fn identity_scaler() -> ScalerArtifact {
    ScalerArtifact {
        fields: FIELD_NAMES.iter().map(|s| s.to_string()).collect(),
        mean: vec![0.0; 8],
        std: vec![1.0; 8],
    }
}

/// Intercept-only estimator whose softmax reproduces the given prior.
fn prior_estimator(prior: [(&str, f64); 3]) -> EstimatorParams {
    EstimatorParams {
        classes: prior.iter().map(|(label, _)| label.to_string()).collect(),
        coefficients: vec![vec![0.0; 7]; 3],
        intercepts: prior.iter().map(|(_, p)| p.ln()).collect(),
    }
}

fn write_png(path: &Path, color: [u8; 3]) {
    RgbImage::from_pixel(8, 8, Rgb(color)).save(path).unwrap();
}

/// Writes artifacts and a per-class gallery into a tempdir and returns the
/// matching configuration.
fn deployment(classifier: &ClassifierArtifact) -> (TempDir, PipelineConfig) {
    let dir = TempDir::new().unwrap();
    let models = dir.path().join("models");
    fs::create_dir(&models).unwrap();
    fs::write(
        models.join("scaler.json"),
        serde_json::to_string(&identity_scaler()).unwrap(),
    )
    .unwrap();
    fs::write(
        models.join("classifier.json"),
        serde_json::to_string(classifier).unwrap(),
    )
    .unwrap();

    let gallery = dir.path().join("gallery");
    fs::create_dir(&gallery).unwrap();
    for class in StellarClass::ALL {
        let class_dir = gallery.join(class.asset_dir());
        fs::create_dir(&class_dir).unwrap();
        write_png(&class_dir.join("a.png"), [10, 10, 10]);
        write_png(&class_dir.join("b.png"), [20, 20, 20]);
    }

    let config = PipelineConfig {
        scaler_path: models.join("scaler.json"),
        classifier_path: models.join("classifier.json"),
        asset_root: gallery,
        asset_routing: AssetRouting::PerClass,
    };
    (dir, config)
}

fn qso_artifact() -> ClassifierArtifact {
    ClassifierArtifact::SingleEstimator {
        estimator: prior_estimator([("QSO", 0.87), ("STAR", 0.04), ("GALAXY", 0.09)]),
    }
}

fn scenario_input() -> FeatureVector {
    FeatureVector {
        alpha: 150.0,
        delta: 150.0,
        u: 22.0,
        g: 22.0,
        r: 25.0,
        i: 10.0,
        z: 5.0,
        redshift: 2.0,
    }
}

#[test]
fn scenario_1_qso_prediction_with_illustration() {
    let (_guard, config) = deployment(&qso_artifact());
    let pipeline = Pipeline::from_config(&config).unwrap();

    let outcome = pipeline.run(&scenario_input(), &mut FixedPicker(0)).unwrap();
    assert_eq!(
        outcome.prediction.sentence,
        "The predicted class is 'Quasi-Stellar Object' with a confidence of 87.0%."
    );
    assert_eq!(outcome.prediction.class, StellarClass::Qso);
    assert!(
        outcome
            .illustration
            .path
            .starts_with(config.asset_root.join("qso")),
        "illustration from wrong class directory: {}",
        outcome.illustration.path.display()
    );
}

#[test]
fn scenario_2_missing_redshift_fails_before_the_classifier() {
    let err = FeatureVector::from_named(&[
        ("alpha", 150.0),
        ("delta", 150.0),
        ("u", 22.0),
        ("g", 22.0),
        ("r", 25.0),
        ("i", 10.0),
        ("z", 5.0),
    ])
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "got {err:?}");
    assert!(err.to_string().contains("redshift"));
}

#[test]
fn scenario_3_absent_scaler_artifact_aborts_construction() {
    let (_guard, config) = deployment(&qso_artifact());
    fs::remove_file(&config.scaler_path).unwrap();
    let err = Pipeline::from_config(&config).unwrap_err();
    assert!(matches!(err, Error::ModelUnavailable(_)), "got {err:?}");
}

#[test]
fn identical_queries_yield_identical_predictions() {
    let (_guard, config) = deployment(&qso_artifact());
    let pipeline = Pipeline::from_config(&config).unwrap();

    let first = pipeline.run(&scenario_input(), &mut FixedPicker(0)).unwrap();
    let second = pipeline.run(&scenario_input(), &mut FixedPicker(1)).unwrap();

    // Class and confidence are deterministic; the illustration choice is
    // allowed to differ between runs.
    assert_eq!(first.prediction.class, second.prediction.class);
    assert_eq!(first.prediction.confidence, second.prediction.confidence);
    assert_eq!(first.prediction.sentence, second.prediction.sentence);
    assert_ne!(first.illustration.path, second.illustration.path);
}

#[test]
fn ensemble_artifact_runs_end_to_end() {
    let artifact = ClassifierArtifact::EnsembleEstimator {
        estimators: vec![
            prior_estimator([("GALAXY", 0.70), ("QSO", 0.20), ("STAR", 0.10)]),
            prior_estimator([("GALAXY", 0.60), ("QSO", 0.30), ("STAR", 0.10)]),
        ],
        weights: Some(vec![0.5, 0.5]),
    };
    let (_guard, config) = deployment(&artifact);
    let pipeline = Pipeline::from_config(&config).unwrap();

    let outcome = pipeline.run(&scenario_input(), &mut FixedPicker(0)).unwrap();
    assert_eq!(outcome.prediction.class, StellarClass::Galaxy);
    assert_eq!(
        outcome.prediction.sentence,
        "The predicted class is 'Galaxy' with a confidence of 65.0%."
    );
}

#[test]
fn shared_routing_serves_every_class_from_one_directory() {
    let (_guard, mut config) = deployment(&qso_artifact());
    let shared = config.asset_root.join("shared");
    fs::create_dir(&shared).unwrap();
    write_png(&shared.join("common.png"), [5, 5, 5]);
    config.asset_root = shared.clone();
    config.asset_routing = AssetRouting::Shared;

    let pipeline = Pipeline::from_config(&config).unwrap();
    let outcome = pipeline.run(&scenario_input(), &mut FixedPicker(0)).unwrap();
    assert_eq!(outcome.illustration.path, shared.join("common.png"));
}

#[test]
fn empty_class_gallery_aborts_the_query_without_partial_result() {
    let (_guard, config) = deployment(&qso_artifact());
    let qso_dir = config.asset_root.join("qso");
    for entry in fs::read_dir(&qso_dir).unwrap() {
        fs::remove_file(entry.unwrap().path()).unwrap();
    }
    let pipeline = Pipeline::from_config(&config).unwrap();
    let err = pipeline
        .run(&scenario_input(), &mut FixedPicker(0))
        .unwrap_err();
    assert!(matches!(err, Error::AssetUnavailable(_)), "got {err:?}");
}
