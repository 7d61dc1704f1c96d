//! Field aliases and keyword tables used by the interpreter.
//!
//! Every list is ordered: earlier entries take priority over later ones.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read interpreter config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid interpreter config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid keyword pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Where the interpreter looks for each piece of evidence in a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    /// Preferred label field, consulted before `label`.
    pub primary_label: String,
    pub label: Vec<String>,
    /// Binary class id, 1 = positive, 0 = negative.
    pub label_id: String,
    /// Numeric index into one of `class_names`.
    pub class_index: String,
    pub class_names: Vec<String>,
    pub confidence: Vec<String>,
    pub score_bag: Vec<String>,
    pub entry_score: Vec<String>,
    pub entry_label: Vec<String>,
    pub positive_probability: Vec<String>,
    pub negative_probability: Vec<String>,
    pub threshold: String,
    pub server_latency: String,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            primary_label: "label_name".into(),
            label: strings(&[
                "label",
                "class",
                "prediction",
                "predicted_label",
                "result",
                "verdict",
            ]),
            label_id: "label_id".into(),
            class_index: "prediction".into(),
            class_names: strings(&["classes", "labels", "class_names", "classNames"]),
            confidence: strings(&[
                "confidence",
                "score",
                "probability",
                "prob",
                "p",
                "conf",
                "confidence_score",
            ]),
            score_bag: strings(&[
                "scores",
                "probs",
                "probabilities",
                "softmax",
                "class_scores",
                "confidences",
            ]),
            entry_score: strings(&["score", "confidence", "prob"]),
            entry_label: strings(&["label", "class", "name"]),
            positive_probability: strings(&[
                "probability_tumor",
                "tumor_probability",
                "prob_tumor",
                "p_tumor",
            ]),
            negative_probability: strings(&[
                "probability_no_tumor",
                "probability_normal",
                "p_no_tumor",
                "probability_negative",
            ]),
            threshold: "threshold".into(),
            server_latency: "inference_ms".into(),
        }
    }
}

/// Vocabulary for deciding a verdict from label text alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keywords {
    /// Normalized labels that are negative as a whole.
    pub negative_phrases: Vec<String>,
    /// Words that negate a following condition term ("no", "absence of").
    pub negation_cues: Vec<String>,
    /// Optional words allowed between a cue and the condition ("brain").
    pub negation_qualifiers: Vec<String>,
    pub condition_terms: Vec<String>,
    /// Substrings that mark a label as positive.
    pub positive: Vec<String>,
    /// Shown as "Subtype: ..." on the verdict card.
    pub subtypes: Vec<String>,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            negative_phrases: strings(&[
                "no tumor",
                "no tumour",
                "no_tumor",
                "notumor",
                "normal",
                "negative",
                "healthy",
                "no mass",
                "no abnormality",
                "no brain tumor",
                "no brain tumour",
            ]),
            negation_cues: strings(&["no", "without", "absence of"]),
            negation_qualifiers: strings(&["brain"]),
            condition_terms: strings(&["tumor", "tumour"]),
            positive: strings(&[
                "tumor",
                "tumour",
                "lesion",
                "mass",
                "glioma",
                "meningioma",
                "pituitary",
                "gbm",
                "lgg",
                "astrocytoma",
                "oligodendroglioma",
                "metastasis",
            ]),
            subtypes: strings(&[
                "glioma",
                "meningioma",
                "pituitary",
                "gbm",
                "lgg",
                "astrocytoma",
                "oligodendroglioma",
            ]),
        }
    }
}

/// Texts used when a label or a headline has to be made up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wording {
    pub placeholder_label: String,
    pub positive_label: String,
    pub negative_label: String,
    pub positive_headline: String,
    pub negative_headline: String,
    pub unknown_headline: String,
}

impl Default for Wording {
    fn default() -> Self {
        Self {
            placeholder_label: "Prediction".into(),
            positive_label: "tumor".into(),
            negative_label: "no_tumor".into(),
            positive_headline: "Tumor detected".into(),
            negative_headline: "No tumor detected".into(),
            unknown_headline: "Inconclusive result".into(),
        }
    }
}

/// Complete interpreter configuration. Missing TOML tables and keys fall back
/// to the defaults, which describe the brain MRI tumor classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub fields: FieldAliases,
    pub keywords: Keywords,
    pub wording: Wording,
}

impl InterpreterConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_toml_yields_defaults() -> Result<(), ConfigError> {
        let cfg = InterpreterConfig::from_toml_str("")?;
        assert_eq!(cfg, InterpreterConfig::default());
        Ok(())
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() -> Result<(), ConfigError> {
        let cfg = InterpreterConfig::from_toml_str(
            r#"
            [fields]
            positive_probability = ["p_malignant"]

            [wording]
            positive_label = "malignant"
            "#,
        )?;
        assert_eq!(cfg.fields.positive_probability, vec!["p_malignant"]);
        assert_eq!(cfg.fields.primary_label, "label_name");
        assert_eq!(cfg.wording.positive_label, "malignant");
        assert_eq!(cfg.wording.placeholder_label, "Prediction");
        assert_eq!(cfg.keywords, Keywords::default());
        Ok(())
    }

    #[test]
    fn load_reads_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[fields]\nthreshold = \"cutoff\"")?;
        let cfg = InterpreterConfig::load(file.path())?;
        assert_eq!(cfg.fields.threshold, "cutoff");
        Ok(())
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = InterpreterConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = InterpreterConfig::from_toml_str("[fields\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
