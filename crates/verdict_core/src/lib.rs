//! Turns loosely typed prediction responses into a binary verdict.
//!
//! Model-serving backends disagree on field names (`label`, `class`,
//! `prediction`, ...), on encodings (fractions vs percentages, numbers vs
//! numeric strings) and on whether a decision threshold is reported. The
//! [`Interpreter`] runs a fixed chain of resolver stages over the raw JSON and
//! never fails: missing or malformed evidence degrades to [`Verdict::Unknown`].

pub mod config;
pub mod numeric;
pub mod presentation;
mod resolve;
pub mod text;

pub use config::{ConfigError, InterpreterConfig};
pub use presentation::{Tone, VerdictCard};

use once_cell::sync::Lazy;
use resolve::{Context, resolve};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use text::KeywordMatcher;

/// Binary classification outcome, or the lack of one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Positive,
    Negative,
    /// No label, class id, probability or threshold settled the question.
    #[default]
    Unknown,
}

impl Verdict {
    pub fn is_known(self) -> bool {
        self != Verdict::Unknown
    }

    pub fn is_positive(self) -> Option<bool> {
        match self {
            Verdict::Positive => Some(true),
            Verdict::Negative => Some(false),
            Verdict::Unknown => None,
        }
    }
}

/// Normalized interpretation of a single prediction response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretedResult {
    /// Display label; the configured placeholder when nothing was found.
    pub label_text: String,
    /// Lowercase, separator-collapsed label; empty when nothing was found.
    pub label_norm: String,
    pub verdict: Verdict,
    /// Integer percentage in [0, 100].
    pub confidence_pct: Option<u8>,
    /// Latency reported by the server, if any.
    pub server_latency_ms: Option<u64>,
}

/// Interpreter with a compiled keyword matcher.
#[derive(Debug, Clone)]
pub struct Interpreter {
    config: InterpreterConfig,
    matcher: KeywordMatcher,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Result<Self, ConfigError> {
        let matcher = KeywordMatcher::new(&config.keywords)?;
        Ok(Self { config, matcher })
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn interpret(&self, payload: &Value) -> InterpretedResult {
        let resolution = resolve(&Context {
            payload,
            config: &self.config,
            matcher: &self.matcher,
        });
        let result = InterpretedResult {
            label_text: resolution
                .label
                .unwrap_or_else(|| self.config.wording.placeholder_label.clone()),
            label_norm: resolution.label_norm.unwrap_or_default(),
            verdict: resolution.verdict,
            confidence_pct: resolution.confidence.map(numeric::round_percent),
            server_latency_ms: server_latency(payload, &self.config),
        };
        tracing::debug!(
            label = %result.label_text,
            verdict = ?result.verdict,
            confidence = ?result.confidence_pct,
            "interpreted prediction response"
        );
        result
    }
}

static DEFAULT_INTERPRETER: Lazy<Interpreter> = Lazy::new(|| {
    Interpreter::new(InterpreterConfig::default()).expect("built-in keyword tables compile")
});

/// Interprets `payload` with the built-in aliases and keywords.
pub fn interpret(payload: &Value) -> InterpretedResult {
    DEFAULT_INTERPRETER.interpret(payload)
}

fn server_latency(payload: &Value, config: &InterpreterConfig) -> Option<u64> {
    payload
        .get(config.fields.server_latency.as_str())
        .and_then(Value::as_f64)
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        // Sub-millisecond timings still count as server-reported.
        .map(|ms| ms.round().max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn empty_object_is_unknown_placeholder() {
        let result = interpret(&json!({}));
        assert_eq!(
            result,
            InterpretedResult {
                label_text: "Prediction".into(),
                label_norm: String::new(),
                verdict: Verdict::Unknown,
                confidence_pct: None,
                server_latency_ms: None,
            }
        );
    }

    #[test]
    fn flask_backend_response() {
        let result = interpret(&json!({
            "probability_tumor": 0.9479,
            "threshold": 0.05,
            "label_id": 1,
            "label_name": "tumor",
            "inference_ms": 41.6,
        }));
        assert_eq!(result.label_text, "tumor");
        assert_eq!(result.verdict, Verdict::Positive);
        assert_eq!(result.confidence_pct, Some(95));
        assert_eq!(result.server_latency_ms, Some(42));
    }

    #[rstest]
    #[case(json!({ "inference_ms": "12" }), None)]
    #[case(json!({ "inference_ms": -3 }), None)]
    #[case(json!({ "inference_ms": 0 }), None)]
    #[case(json!({ "inference_ms": 0.4 }), Some(1))]
    #[case(json!({ "inference_ms": 7 }), Some(7))]
    fn server_latency_only_from_numbers(#[case] payload: Value, #[case] expected: Option<u64>) {
        assert_eq!(interpret(&payload).server_latency_ms, expected);
    }

    #[test]
    fn custom_config_changes_aliases_and_wording() -> Result<(), ConfigError> {
        let config = InterpreterConfig::from_toml_str(
            r#"
            [fields]
            positive_probability = ["p_malignant"]

            [wording]
            positive_label = "malignant"
            negative_label = "benign"
            placeholder_label = "Result"
            "#,
        )?;
        let interpreter = Interpreter::new(config)?;

        let result = interpreter.interpret(&json!({ "p_malignant": "0.81" }));
        assert_eq!(result.label_text, "malignant");
        assert_eq!(result.verdict, Verdict::Positive);
        assert_eq!(result.confidence_pct, Some(81));

        let result = interpreter.interpret(&json!({ "probability_tumor": 0.9 }));
        assert_eq!(result.label_text, "Result");
        assert_eq!(result.verdict, Verdict::Unknown);
        Ok(())
    }

    #[test]
    fn result_serializes_with_lowercase_verdict() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(interpret(&json!({ "label": "glioma", "score": 0.7 })))?;
        assert_eq!(value["verdict"], "positive");
        assert_eq!(value["confidence_pct"], 70);
        assert_eq!(value["label_norm"], "glioma");
        Ok(())
    }

    #[test]
    fn is_positive_maps_tri_state() {
        assert_eq!(Verdict::Positive.is_positive(), Some(true));
        assert_eq!(Verdict::Negative.is_positive(), Some(false));
        assert_eq!(Verdict::Unknown.is_positive(), None);
    }
}
