//! Rule-set cursor: "first valid occurrence start at/after X" queries.
//!
//! The factory only ever walks a recurrence rule set forward from some date,
//! so the parser sits behind [`OccurrenceCursor`]. [`RuleSetCursor`] is the
//! default implementation, backed by the `rrule` crate.
//!
//! Exclusions (`EXDATE`, `EXRULE`) are never returned. A query date that
//! is itself excluded is simply skipped past.

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;

use crate::error::{RecurError, Result};
use crate::rule_text;
use crate::timespan::subsecond_offset;

/// Ascending occurrence starts, as produced by [`OccurrenceCursor::iter_from`].
pub type Starts = Box<dyn Iterator<Item = DateTime<Utc>>>;

/// Answers start-date queries against a parsed recurrence set.
pub trait OccurrenceCursor {
    /// Every valid occurrence start `>= date`, in ascending order.
    ///
    /// The walk owns its state, so callers may keep it around while they
    /// pull from it.
    fn iter_from(&self, date: DateTime<Utc>) -> Starts;

    /// Smallest valid occurrence start `>= date`.
    fn first_at(&self, date: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.iter_from(date).next()
    }

    /// Smallest valid occurrence start `> date`.
    fn first_after(&self, date: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.iter_from(date).find(|start| *start > date)
    }
}

/// [`OccurrenceCursor`] over an aggregate `RRULE`/`EXDATE`/`RDATE` set.
#[derive(Debug, Clone)]
pub struct RuleSetCursor {
    set: RRuleSet,
    /// Added to every date the rule set yields. Rules work on whole seconds,
    /// so a series anchored at a fractional-second start carries the
    /// fraction here.
    offset: Duration,
}

impl RuleSetCursor {
    /// Build a cursor from raw recurrence lines.
    ///
    /// `anchor` becomes the series `DTSTART` unless the lines carry one. Its
    /// sub-second part is kept, so the anchor itself is the first date.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidRule`] if the combined text cannot be parsed.
    pub fn parse(lines: &[String], anchor: DateTime<Utc>) -> Result<Self> {
        let text = rule_text::to_rule_set_text(lines, anchor);
        let cursor = Self::from_text(&text)?;
        if rule_text::declares_start(lines) {
            return Ok(cursor);
        }
        Ok(Self {
            offset: subsecond_offset(&anchor),
            ..cursor
        })
    }

    /// Build a cursor from already-assembled rule-set text (lines joined with `\n`).
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidRule`] if the text cannot be parsed.
    pub fn from_text(text: &str) -> Result<Self> {
        let set = text
            .parse::<RRuleSet>()
            .map_err(|e| RecurError::InvalidRule(format!("'{}': {}", text, e)))?;
        tracing::trace!(rule_set = %text, "parsed recurrence set");
        Ok(Self {
            set,
            offset: Duration::zero(),
        })
    }
}

impl OccurrenceCursor for RuleSetCursor {
    fn iter_from(&self, date: DateTime<Utc>) -> Starts {
        tracing::trace!(%date, offset_ns = ?self.offset.num_nanoseconds(), "walk rule set");
        let offset = self.offset;
        let shifted = date
            .checked_sub_signed(offset)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let walk = (&self.set)
            .into_iter()
            .map(|dt| dt.with_timezone(&Utc))
            .skip_while(move |dt| *dt < shifted)
            .map_while(move |dt| dt.checked_add_signed(offset));
        Box::new(walk)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
