use crate::class::StellarClass;
use crate::classifier::ClassProbabilities;

/// Display-ready outcome of one classification query. Produced once per
/// query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class: StellarClass,
    /// Max class probability as a percentage, rounded to two decimals.
    pub confidence: f64,
    /// Fixed-template conclusion sentence.
    pub sentence: String,
}

/// Turns a predicted class and its probability vector into the
/// human-readable result.
pub fn compose(class: StellarClass, probabilities: &ClassProbabilities) -> Prediction {
    let confidence = round_to_percent(probabilities.max().1);
    let sentence = format!(
        "The predicted class is '{}' with a confidence of {}%.",
        class.display_name(),
        format_confidence(confidence)
    );
    Prediction {
        class,
        confidence,
        sentence,
    }
}

fn round_to_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

/// Renders a rounded confidence the way the result sentence expects it:
/// at most two decimals, trailing zeros trimmed, at least one decimal kept.
pub fn format_confidence(value: f64) -> String {
    let rendered = format!("{value:.2}");
    let trimmed = rendered.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}
