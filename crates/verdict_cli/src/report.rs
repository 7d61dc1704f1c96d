//! Reading saved responses and printing results.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use verdict_core::{InterpretedResult, Interpreter, VerdictCard};

/// Reads a JSON response from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_saved_response(path: Option<&Path>) -> Result<Value> {
    let raw = match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading response from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("response is not valid JSON")
}

/// Interprets `payload` and formats it either as JSON or as a verdict card.
/// Unresolved responses get the raw payload appended to the card.
pub fn render(
    interpreter: &Interpreter,
    payload: &Value,
    round_trip: Option<Duration>,
    as_json: bool,
) -> Result<String> {
    let result: InterpretedResult = interpreter.interpret(payload);
    if as_json {
        return Ok(serde_json::to_string_pretty(&result)?);
    }
    let card = VerdictCard::from_result(&result, interpreter.config(), round_trip);
    let mut out = card.to_string();
    if card.show_raw {
        out.push_str("\n\nRaw response:\n");
        out.push_str(&serde_json::to_string_pretty(payload)?);
    }
    Ok(out)
}
