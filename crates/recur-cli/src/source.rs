//! Reading the source definition from a file or stdin.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use recur_engine::{CalendarEvent, DateRange};
use serde_json::Value;

use crate::cli::SourceKind;

/// A decoded source definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Event(CalendarEvent),
    Range(DateRange),
}

/// Read the source JSON from `input` (stdin when `None` or `-`).
pub fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => io::read_to_string(io::stdin()).context("failed to read stdin"),
    }
}

/// Decode `text` as a source of the given kind, or detect the kind from the
/// presence of an `_id` field.
pub fn parse_source(text: &str, kind: Option<SourceKind>) -> Result<Source> {
    let value: Value = serde_json::from_str(text).context("source is not valid JSON")?;
    let kind = kind.unwrap_or_else(|| detect_kind(&value));
    tracing::debug!(?kind, "decoding source");

    let source = match kind {
        SourceKind::Event => Source::Event(
            serde_json::from_value(value).context("source is not a valid calendar event")?,
        ),
        SourceKind::Range => Source::Range(
            serde_json::from_value(value).context("source is not a valid date range")?,
        ),
    };
    Ok(source)
}

fn detect_kind(value: &Value) -> SourceKind {
    if value.get("_id").is_some() {
        SourceKind::Event
    } else {
        SourceKind::Range
    }
}
