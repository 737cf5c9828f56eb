//! Raw recurrence lines: detection and normalization into rule-set text.
//!
//! Sources carry recurrence as an ordered list of RFC 5545 content lines
//! (`RRULE:`, `EXRULE:`, `RDATE:`, `EXDATE:`, optionally `DTSTART:`). The
//! cursor parses them as one combined set, so they are joined with newlines
//! after a few normalizations:
//!
//! - blank lines are dropped and every line is trimmed
//! - a bare rule value (`FREQ=WEEKLY;COUNT=3`) is treated as an `RRULE` line
//! - a `DTSTART=` part embedded in an `RRULE` value (the `rrule.js` dialect)
//!   is lifted into its own `DTSTART` line
//! - when no `DTSTART` is present at all, the series is anchored at the
//!   source start

use chrono::{DateTime, Utc};

use crate::timespan::format_ical_utc;

/// Whether these lines describe a repeating series.
///
/// Exclusion and inclusion dates alone do not make a source recurring; at
/// least one repetition rule is required.
pub fn is_recurrent(lines: &[String]) -> bool {
    lines.iter().any(|line| is_repetition_rule(line))
}

/// Whether the lines fix their own series start, either as a `DTSTART` line
/// or as a `DTSTART=` part embedded in a rule value.
///
/// When they do not, [`to_rule_set_text`] anchors the series at the source
/// start instead.
pub fn declares_start(lines: &[String]) -> bool {
    lines.iter().map(|l| l.trim()).any(|line| {
        let name = property_name(line);
        if name.eq_ignore_ascii_case("DTSTART") {
            true
        } else if is_bare_rule(name) {
            lift_dtstart(line).1.is_some()
        } else if name.eq_ignore_ascii_case("RRULE") {
            let value = line.split_once(':').map_or("", |(_, value)| value);
            lift_dtstart(value).1.is_some()
        } else {
            false
        }
    })
}

/// Build the aggregate rule-set text for `lines`, anchored at `anchor` when
/// the lines carry no start of their own.
pub fn to_rule_set_text(lines: &[String], anchor: DateTime<Utc>) -> String {
    let mut body = Vec::with_capacity(lines.len() + 1);
    let mut has_dtstart = false;
    let mut embedded_dtstart = None;

    for line in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        let name = property_name(line);
        if name.eq_ignore_ascii_case("DTSTART") {
            has_dtstart = true;
            body.push(line.to_string());
        } else if is_bare_rule(name) {
            let (rule, dtstart) = lift_dtstart(line);
            embedded_dtstart = embedded_dtstart.or(dtstart);
            body.push(format!("RRULE:{}", rule));
        } else if name.eq_ignore_ascii_case("RRULE") {
            let value = line.split_once(':').map_or("", |(_, value)| value);
            let (rule, dtstart) = lift_dtstart(value);
            embedded_dtstart = embedded_dtstart.or(dtstart);
            body.push(format!("RRULE:{}", rule));
        } else {
            body.push(line.to_string());
        }
    }

    if !has_dtstart {
        let dtstart = embedded_dtstart.unwrap_or_else(|| format_ical_utc(&anchor));
        body.insert(0, format!("DTSTART:{}", dtstart));
    }

    body.join("\n")
}

fn is_repetition_rule(line: &str) -> bool {
    let name = property_name(line.trim());
    name.eq_ignore_ascii_case("RRULE") || is_bare_rule(name)
}

/// The property name of a content line: everything before the first `:` or `;`.
fn property_name(line: &str) -> &str {
    let end = line.find([':', ';']).unwrap_or(line.len());
    &line[..end]
}

/// `FREQ=DAILY;...` has no property name; its first segment is a rule part.
fn is_bare_rule(name: &str) -> bool {
    name.split_once('=')
        .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case("FREQ"))
}

/// Split an embedded `DTSTART=<value>` part out of a rule value.
fn lift_dtstart(rule: &str) -> (String, Option<String>) {
    let mut dtstart = None;
    let parts: Vec<&str> = rule
        .split(';')
        .filter(|part| match part.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("DTSTART") => {
                dtstart = Some(value.trim().to_string());
                false
            }
            _ => true,
        })
        .collect();
    (parts.join(";"), dtstart)
}

// ── Tests ───────────────────────────────────────────────────────────────────
