//! Label normalization and keyword based verdicts.

use crate::Verdict;
use crate::config::{ConfigError, Keywords};
use regex::Regex;
use std::collections::HashSet;

/// Lowercases, turns runs of `_`/`-` into spaces and collapses whitespace.
pub fn normalize_label(raw: &str) -> String {
    raw.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decides a verdict from a normalized label using negation phrases, a
/// "no/without/absence of (qualifier) <condition>" pattern and positive keywords.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    negative_phrases: HashSet<String>,
    negation: Option<Regex>,
    positive: Vec<String>,
}

impl KeywordMatcher {
    pub fn new(keywords: &Keywords) -> Result<Self, ConfigError> {
        let negation = negation_pattern(keywords)
            .map(|p| Regex::new(&p))
            .transpose()?;
        Ok(Self {
            negative_phrases: keywords.negative_phrases.iter().cloned().collect(),
            negation,
            positive: keywords
                .positive
                .iter()
                .filter(|k| !k.is_empty())
                .cloned()
                .collect(),
        })
    }

    /// Negation is checked first, so "no tumor" never counts as positive.
    pub fn classify(&self, label_norm: &str) -> Verdict {
        if label_norm.is_empty() {
            return Verdict::Unknown;
        }
        if self.negative_phrases.contains(label_norm)
            || self
                .negation
                .as_ref()
                .is_some_and(|re| re.is_match(label_norm))
        {
            return Verdict::Negative;
        }
        if self.positive.iter().any(|k| label_norm.contains(k.as_str())) {
            return Verdict::Positive;
        }
        Verdict::Unknown
    }
}

fn negation_pattern(keywords: &Keywords) -> Option<String> {
    let cues = alternation(&keywords.negation_cues)?;
    let conditions = alternation(&keywords.condition_terms)?;
    let qualifiers = alternation(&keywords.negation_qualifiers)
        .map(|q| format!(r"(?:{q}\s+)?"))
        .unwrap_or_default();
    Some(format!(
        r"(?:^|\s)(?:{cues})\s+{qualifiers}(?:{conditions})(?:\s|$)"
    ))
}

/// Escaped `a|b|c`, with inner spaces matching any whitespace run.
fn alternation(words: &[String]) -> Option<String> {
    let parts: Vec<String> = words
        .iter()
        .map(|w| w.split_whitespace().map(regex::escape).collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .map(|tokens| tokens.join(r"\s+"))
        .collect();
    (!parts.is_empty()).then(|| parts.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new(&Keywords::default()).expect("default keywords compile")
    }

    #[rstest]
    #[case("no_tumor", "no tumor")]
    #[case("  Pituitary--Tumor ", "pituitary tumor")]
    #[case("GLIOMA", "glioma")]
    #[case("no\t\tbrain   tumour", "no brain tumour")]
    #[case("", "")]
    #[case("__", "")]
    fn normalize_label_collapses_separators(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_label(raw), expected);
    }

    #[rstest]
    #[case("no tumor")]
    #[case("notumor")]
    #[case("healthy")]
    #[case("normal")]
    #[case("no mass")]
    #[case("no brain tumour")]
    #[case("scan shows no tumor")]
    #[case("without brain tumor")]
    #[case("absence of tumour")]
    #[case("absence  of tumor detected")]
    fn negative_labels(#[case] label: &str) {
        assert_eq!(matcher().classify(label), Verdict::Negative);
    }

    #[rstest]
    #[case("tumor")]
    #[case("glioma")]
    #[case("meningioma")]
    #[case("pituitary tumor")]
    #[case("suspicious lesion")]
    #[case("lgg")]
    #[case("tumors present")]
    fn positive_labels(#[case] label: &str) {
        assert_eq!(matcher().classify(label), Verdict::Positive);
    }

    #[rstest]
    #[case("")]
    #[case("prediction")]
    #[case("class 3")]
    #[case("abnormal")]
    fn inconclusive_labels(#[case] label: &str) {
        assert_eq!(matcher().classify(label), Verdict::Unknown);
    }

    #[test]
    fn negation_requires_word_boundary() {
        // "piano tumor" contains "no tumor" but not as a separate cue.
        assert_eq!(matcher().classify("piano tumor"), Verdict::Positive);
    }

    #[test]
    fn empty_negation_tables_disable_pattern() -> Result<(), ConfigError> {
        let keywords = Keywords {
            negation_cues: vec![],
            ..Keywords::default()
        };
        let matcher = KeywordMatcher::new(&keywords)?;
        assert_eq!(matcher.classify("without tumor"), Verdict::Positive);
        assert_eq!(matcher.classify("no tumor"), Verdict::Negative);
        Ok(())
    }
}
