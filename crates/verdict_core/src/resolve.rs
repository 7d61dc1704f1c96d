//! Ordered resolver stages.
//!
//! Each stage reads the immutable payload plus the resolution built so far and
//! may return a [`Partial`]. Partials are merged left to right: a field set by a
//! partial replaces the earlier value, so a stage that must not override checks
//! `so_far` before contributing.

use crate::Verdict;
use crate::config::InterpreterConfig;
use crate::numeric::{first_of, invert_fraction, number_like, text, to_percent};
use crate::text::{KeywordMatcher, normalize_label};
use serde_json::{Map, Value};

pub(crate) struct Context<'a> {
    pub payload: &'a Value,
    pub config: &'a InterpreterConfig,
    pub matcher: &'a KeywordMatcher,
}

/// Evidence gathered so far. `confidence` is an unrounded percentage.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Resolution {
    pub label: Option<String>,
    pub label_norm: Option<String>,
    pub verdict: Verdict,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Partial {
    pub label: Option<String>,
    pub verdict: Option<Verdict>,
    pub confidence: Option<f64>,
}

impl Resolution {
    fn merge(self, partial: Partial) -> Self {
        let (label, label_norm) = match partial.label {
            Some(label) => {
                let norm = normalize_label(&label);
                (Some(label), Some(norm))
            }
            None => (self.label, self.label_norm),
        };
        Self {
            label,
            label_norm,
            verdict: partial.verdict.unwrap_or(self.verdict),
            confidence: partial.confidence.or(self.confidence),
        }
    }

    fn text_verdict(&self, matcher: &KeywordMatcher) -> Verdict {
        self.label_norm
            .as_deref()
            .map_or(Verdict::Unknown, |norm| matcher.classify(norm))
    }
}

type Stage = fn(&Context<'_>, &Resolution) -> Option<Partial>;

const STAGES: &[(&str, Stage)] = &[
    ("label_text", label_text as Stage),
    ("class_id", class_id as Stage),
    ("class_index", class_index as Stage),
    ("scalar_confidence", scalar_confidence as Stage),
    ("score_bag", score_bag as Stage),
    ("positive_probability", positive_probability as Stage),
    ("text_fallback", text_fallback as Stage),
];

pub(crate) fn resolve(ctx: &Context<'_>) -> Resolution {
    STAGES
        .iter()
        .fold(Resolution::default(), |so_far, (name, stage)| {
            match stage(ctx, &so_far) {
                Some(partial) => {
                    tracing::debug!(stage = *name, ?partial, "resolver stage contributed");
                    so_far.merge(partial)
                }
                None => so_far,
            }
        })
}

fn label_text(ctx: &Context<'_>, so_far: &Resolution) -> Option<Partial> {
    if so_far.label.is_some() {
        return None;
    }
    let fields = &ctx.config.fields;
    let label = ctx
        .payload
        .get(fields.primary_label.as_str())
        .and_then(text)
        .or_else(|| first_of(ctx.payload, &fields.label, text))?;
    Some(Partial {
        label: Some(label.to_owned()),
        ..Partial::default()
    })
}

/// 1 is positive, 0 is negative; other ids say nothing.
fn class_id(ctx: &Context<'_>, so_far: &Resolution) -> Option<Partial> {
    if so_far.verdict.is_known() {
        return None;
    }
    let id = ctx
        .payload
        .get(ctx.config.fields.label_id.as_str())
        .and_then(number_like)?
        .trunc();
    let verdict = if id == 1.0 {
        Verdict::Positive
    } else if id == 0.0 {
        Verdict::Negative
    } else {
        return None;
    };
    Some(Partial {
        label: synthesized_label(ctx.config, so_far, verdict),
        verdict: Some(verdict),
        confidence: None,
    })
}

fn class_index(ctx: &Context<'_>, _so_far: &Resolution) -> Option<Partial> {
    let index = ctx
        .payload
        .get(ctx.config.fields.class_index.as_str())
        .and_then(number_like)?;
    if index < 0.0 {
        return None;
    }
    let name = class_name(ctx, index.trunc() as usize)?;
    Some(Partial {
        label: Some(name),
        ..Partial::default()
    })
}

fn scalar_confidence(ctx: &Context<'_>, so_far: &Resolution) -> Option<Partial> {
    if so_far.confidence.is_some() {
        return None;
    }
    let value = first_of(ctx.payload, &ctx.config.fields.confidence, number_like)?;
    Some(Partial {
        confidence: Some(to_percent(value)),
        ..Partial::default()
    })
}

fn score_bag(ctx: &Context<'_>, so_far: &Resolution) -> Option<Partial> {
    if so_far.confidence.is_some() {
        return None;
    }
    let bag = first_of(ctx.payload, &ctx.config.fields.score_bag, |v| {
        (v.is_array() || v.is_object()).then_some(v)
    })?;
    let (score, label) = match bag {
        Value::Array(items) => match items.first()? {
            Value::Number(_) => best_of_numbers(ctx, items)?,
            Value::Object(_) => best_of_entries(ctx, items)?,
            _ => return None,
        },
        Value::Object(map) => best_of_map(map)?,
        _ => return None,
    };
    Some(Partial {
        label,
        verdict: None,
        confidence: Some(to_percent(score)),
    })
}

/// A dedicated positive-class probability decides the verdict; the label (or
/// class id) only chooses between `p` and `1 - p` when it is conclusive.
fn positive_probability(ctx: &Context<'_>, so_far: &Resolution) -> Option<Partial> {
    let fields = &ctx.config.fields;
    let p = first_of(ctx.payload, &fields.positive_probability, number_like).or_else(|| {
        first_of(ctx.payload, &fields.negative_probability, number_like).map(invert_fraction)
    })?;
    let p_pct = to_percent(p);

    let hinted = match so_far.text_verdict(ctx.matcher) {
        Verdict::Unknown => so_far.verdict,
        verdict => verdict,
    };
    let (verdict, synthesize) = if hinted.is_known() {
        (hinted, false)
    } else {
        let cutoff = ctx
            .payload
            .get(fields.threshold.as_str())
            .and_then(number_like)
            .map_or(50.0, |t| if t <= 1.0 { t * 100.0 } else { t });
        let verdict = if p_pct >= cutoff {
            Verdict::Positive
        } else {
            Verdict::Negative
        };
        (verdict, true)
    };

    let confidence = match verdict {
        Verdict::Positive => p_pct,
        _ => 100.0 - p_pct,
    };
    Some(Partial {
        label: if synthesize {
            synthesized_label(ctx.config, so_far, verdict)
        } else {
            None
        },
        verdict: Some(verdict),
        confidence: Some(confidence),
    })
}

fn text_fallback(ctx: &Context<'_>, so_far: &Resolution) -> Option<Partial> {
    if so_far.verdict.is_known() {
        return None;
    }
    let verdict = so_far.text_verdict(ctx.matcher);
    verdict.is_known().then(|| Partial {
        verdict: Some(verdict),
        ..Partial::default()
    })
}

fn synthesized_label(
    config: &InterpreterConfig,
    so_far: &Resolution,
    verdict: Verdict,
) -> Option<String> {
    if so_far.label.is_some() {
        return None;
    }
    match verdict {
        Verdict::Positive => Some(config.wording.positive_label.clone()),
        Verdict::Negative => Some(config.wording.negative_label.clone()),
        Verdict::Unknown => None,
    }
}

/// Name at `index` in the first non-empty class-name array.
fn class_name(ctx: &Context<'_>, index: usize) -> Option<String> {
    let names = first_of(ctx.payload, &ctx.config.fields.class_names, |v| {
        v.as_array().filter(|a| !a.is_empty())
    })?;
    names.get(index).and_then(text).map(str::to_owned)
}

fn best_of_numbers(ctx: &Context<'_>, items: &[Value]) -> Option<(f64, Option<String>)> {
    let (index, score) = items
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.as_f64().filter(|n| n.is_finite()).map(|n| (i, n)))
        .fold(None, keep_highest)?;
    Some((score, class_name(ctx, index)))
}

fn best_of_entries(ctx: &Context<'_>, items: &[Value]) -> Option<(f64, Option<String>)> {
    let fields = &ctx.config.fields;
    items
        .iter()
        .filter_map(|entry| {
            let score = first_of(entry, &fields.entry_score, number_like)?;
            let label = first_of(entry, &fields.entry_label, text).map(str::to_owned);
            Some((label, score))
        })
        .fold(None, keep_highest)
        .map(|(label, score)| (score, label))
}

fn best_of_map(map: &Map<String, Value>) -> Option<(f64, Option<String>)> {
    map.iter()
        .filter_map(|(key, value)| number_like(value).map(|score| (key, score)))
        .fold(None, keep_highest)
        .map(|(key, score)| (score, (!key.is_empty()).then(|| key.clone())))
}

/// Fold step keeping the first of equally scored candidates.
fn keep_highest<T>(best: Option<(T, f64)>, candidate: (T, f64)) -> Option<(T, f64)> {
    match best {
        Some(current) if current.1 >= candidate.1 => Some(current),
        _ => Some(candidate),
    }
}
