//! What a rendering layer shows for an [`InterpretedResult`].

use crate::config::InterpreterConfig;
use crate::{InterpretedResult, Verdict};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

const MISSING: &str = "—";

/// Visual treatment of a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Positive finding.
    Alert,
    /// Negative finding.
    Clear,
    /// Nothing resolved the verdict.
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictCard {
    pub tone: Tone,
    pub headline: String,
    pub subtitle: String,
    pub confidence: String,
    pub latency: String,
    /// Neither a verdict nor a confidence could be derived, so the raw
    /// response is worth showing.
    pub show_raw: bool,
}

impl VerdictCard {
    /// Builds the card. Server-reported latency is preferred over the
    /// client-measured `round_trip` when it is non-zero.
    pub fn from_result(
        result: &InterpretedResult,
        config: &InterpreterConfig,
        round_trip: Option<Duration>,
    ) -> Self {
        let wording = &config.wording;
        let (tone, headline) = match result.verdict {
            Verdict::Positive => (Tone::Alert, &wording.positive_headline),
            Verdict::Negative => (Tone::Clear, &wording.negative_headline),
            Verdict::Unknown => (Tone::Neutral, &wording.unknown_headline),
        };

        let subtype = config
            .keywords
            .subtypes
            .iter()
            .find(|k| !k.is_empty() && result.label_norm.contains(k.as_str()));
        let subtitle = match subtype {
            Some(subtype) => format!("Subtype: {}", capitalize(subtype)),
            None if !result.label_text.is_empty()
                && result.label_text != wording.placeholder_label =>
            {
                format!("Model label: {}", result.label_text)
            }
            None => "Model result".to_string(),
        };

        let confidence = result
            .confidence_pct
            .map_or_else(|| MISSING.to_string(), |pct| format!("{pct}%"));

        let latency = match (result.server_latency_ms, round_trip) {
            (Some(ms), _) if ms > 0 => format!("{ms} ms (server)"),
            (_, Some(elapsed)) => format!("{} ms (round-trip)", elapsed.as_millis()),
            _ => MISSING.to_string(),
        };

        Self {
            tone,
            headline: headline.clone(),
            subtitle,
            confidence,
            latency,
            show_raw: !result.verdict.is_known() && result.confidence_pct.is_none(),
        }
    }
}

impl fmt::Display for VerdictCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.tone {
            Tone::Alert => "[!]",
            Tone::Clear => "[ok]",
            Tone::Neutral => "[?]",
        };
        writeln!(f, "{marker} {}", self.headline)?;
        writeln!(f, "    {}", self.subtitle)?;
        writeln!(f, "    Confidence: {}", self.confidence)?;
        write!(f, "    Latency:    {}", self.latency)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
