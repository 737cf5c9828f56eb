//! The recurrence factory: expands one source span into its occurrences.
//!
//! A [`RecurrenceFactory`] owns a template clone of its source, the fixed
//! occurrence duration, and (for recurring sources) an [`OccurrenceCursor`].
//! It offers three ways to reach occurrences:
//!
//! - forward iteration ([`Iterator`]), single-pass and not restartable
//! - bounded slices ([`RecurrenceFactory::take_from`], [`RecurrenceFactory::take_until`])
//! - point lookups ([`RecurrenceFactory::after`], [`RecurrenceFactory::find_by_timestamp`])
//!
//! Slices and lookups take `&self` and never move the iteration cursor, so
//! they can be called any number of times, before, during, or after
//! iteration.
//!
//! Every occurrence is produced by cloning the template and handing it to the
//! materializer together with the computed [`Timeframe`]. A non-recurring
//! source is materialized without a timeframe and comes back unchanged.

use std::fmt;
use std::iter::FusedIterator;

use chrono::{DateTime, Duration, Utc};

use crate::cursor::{OccurrenceCursor, RuleSetCursor, Starts};
use crate::error::{RecurError, Result};
use crate::rule_text;
use crate::timespan::{from_millis, SpanSource, Timeframe};

/// Which instant of an occurrence a slice boundary is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    ByStart,
    ByEnd,
}

/// Iteration state. `Exhausted` is terminal.
enum IterState {
    /// Non-recurring source not yet emitted.
    Single,
    /// Live walk over the remaining starts of a recurring source.
    Walking(Starts),
    Exhausted,
}

impl fmt::Debug for IterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterState::Single => f.write_str("Single"),
            IterState::Walking(_) => f.write_str("Walking"),
            IterState::Exhausted => f.write_str("Exhausted"),
        }
    }
}

pub struct RecurrenceFactory<T, F> {
    source: T,
    duration: Duration,
    cursor: Option<Box<dyn OccurrenceCursor>>,
    state: IterState,
    materialize: F,
}

impl<T: fmt::Debug, F> fmt::Debug for RecurrenceFactory<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecurrenceFactory")
            .field("source", &self.source)
            .field("duration", &self.duration)
            .field("recurrent", &self.cursor.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl<T, F> RecurrenceFactory<T, F>
where
    T: SpanSource,
    F: Fn(T, Option<Timeframe>) -> T,
{
    /// Build a factory for `source`, materializing occurrences with `materialize`.
    ///
    /// The source is recurring when its lines contain a repetition rule; in that
    /// case the lines are parsed into a [`RuleSetCursor`] anchored at the
    /// source start.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidSpan`] if the source ends before it starts,
    /// or [`RecurError::InvalidRule`] if its recurrence lines cannot be parsed.
    pub fn with_materializer(source: T, materialize: F) -> Result<Self> {
        let duration = span_duration(&source)?;
        let cursor: Option<Box<dyn OccurrenceCursor>> =
            if rule_text::is_recurrent(source.recurrence()) {
                let parsed = RuleSetCursor::parse(source.recurrence(), source.start())?;
                Some(Box::new(parsed))
            } else {
                None
            };
        Ok(Self::assemble(source, duration, cursor, materialize))
    }

    /// Build a recurring factory driven by a caller-supplied cursor.
    ///
    /// The source's own recurrence lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidSpan`] if the source ends before it starts.
    pub fn with_cursor<C>(source: T, cursor: C, materialize: F) -> Result<Self>
    where
        C: OccurrenceCursor + 'static,
    {
        let duration = span_duration(&source)?;
        Ok(Self::assemble(source, duration, Some(Box::new(cursor)), materialize))
    }

    fn assemble(
        source: T,
        duration: Duration,
        cursor: Option<Box<dyn OccurrenceCursor>>,
        materialize: F,
    ) -> Self {
        let state = match &cursor {
            None => IterState::Single,
            Some(cursor) => IterState::Walking(cursor.iter_from(source.start())),
        };
        tracing::debug!(
            recurrent = cursor.is_some(),
            duration_ms = duration.num_milliseconds(),
            start = %source.start(),
            "recurrence factory created"
        );
        Self {
            source,
            duration,
            cursor,
            state,
            materialize,
        }
    }

    pub fn is_recurrent(&self) -> bool {
        self.cursor.is_some()
    }

    /// The template every occurrence is cloned from.
    pub fn source(&self) -> &T {
        &self.source
    }

    /// Fixed length of every occurrence (`source.end - source.start`).
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Clone the template and materialize it.
    ///
    /// The timeframe is only passed through for recurring sources; a
    /// non-recurring source always comes back as itself.
    pub(crate) fn make_instance(&self, timeframe: Option<Timeframe>) -> T {
        let target = self.source.clone();
        match timeframe {
            Some(tf) if self.is_recurrent() => (self.materialize)(target, Some(tf)),
            _ => (self.materialize)(target, None),
        }
    }

    /// The occurrence window whose start is the first valid start at
    /// (`inclusive`) or strictly after `candidate`.
    ///
    /// `candidate` need not be a valid occurrence start itself; excluded or
    /// off-pattern dates are snapped forward. A non-recurring source behaves
    /// as a one-element series.
    ///
    /// `None` at exhaustion, and when the occurrence would end past the
    /// representable range.
    pub fn occurrence_from(
        &self,
        candidate: DateTime<Utc>,
        inclusive: bool,
    ) -> Option<Timeframe> {
        let start = match &self.cursor {
            Some(cursor) if inclusive => cursor.first_at(candidate),
            Some(cursor) => cursor.first_after(candidate),
            None => {
                let start = self.source.start();
                let hit = if inclusive {
                    start >= candidate
                } else {
                    start > candidate
                };
                hit.then_some(start)
            }
        }?;
        Timeframe::starting_at(start, self.duration)
    }

    /// Valid starts `>= date`: the cursor's walk, or the source start alone.
    fn starts_from(&self, date: DateTime<Utc>) -> Starts {
        match &self.cursor {
            Some(cursor) => cursor.iter_from(date),
            None => {
                let start = self.source.start();
                Box::new((start >= date).then_some(start).into_iter())
            }
        }
    }

    /// Occurrence windows between two boundaries.
    ///
    /// An occurrence is skipped when it lies before `from`:
    /// `start < from` for [`BoundaryKind::ByStart`], `end <= from` for
    /// [`BoundaryKind::ByEnd`]. The walk stops at the first occurrence past
    /// `to`: `start >= to` for `ByStart`, `end > to` for `ByEnd`. The stop
    /// test runs before the skip test.
    ///
    /// The series is walked once from the source start.
    pub fn bounded_slice(
        &self,
        from: DateTime<Utc>,
        from_kind: BoundaryKind,
        to: DateTime<Utc>,
        to_kind: BoundaryKind,
    ) -> Vec<Timeframe> {
        let skip = |span: &Timeframe| match from_kind {
            BoundaryKind::ByStart => span.start < from,
            BoundaryKind::ByEnd => span.end <= from,
        };
        let stop = |span: &Timeframe| match to_kind {
            BoundaryKind::ByStart => span.start >= to,
            BoundaryKind::ByEnd => span.end > to,
        };

        let duration = self.duration;
        let mut result = Vec::new();
        let spans = self
            .starts_from(self.source.start())
            .map_while(|start| Timeframe::starting_at(start, duration));
        for span in spans {
            if stop(&span) {
                break;
            }
            if !skip(&span) {
                result.push(span);
            }
        }

        tracing::trace!(%from, ?from_kind, %to, ?to_kind, count = result.len(), "bounded slice");
        result
    }

    /// Occurrences overlapping a window.
    ///
    /// An occurrence is in range once its end passes `from`. The upper bound
    /// is by start (`start < to_start`) unless `to_end` is given and is
    /// tighter than `to_start + duration`, in which case occurrences must end
    /// no later than `to_end`. A `to_start + duration` past the representable
    /// range keeps the bound by start.
    pub fn take_from(
        &self,
        from: DateTime<Utc>,
        to_start: DateTime<Utc>,
        to_end: Option<DateTime<Utc>>,
    ) -> Vec<T> {
        let (to, to_kind) = match to_end {
            Some(end)
                if to_start
                    .checked_add_signed(self.duration)
                    .is_some_and(|limit| end < limit) =>
            {
                (end, BoundaryKind::ByEnd)
            }
            _ => (to_start, BoundaryKind::ByStart),
        };

        self.bounded_slice(from, BoundaryKind::ByEnd, to, to_kind)
            .into_iter()
            .map(|span| self.make_instance(Some(span)))
            .collect()
    }

    /// [`take_from`](Self::take_from) starting at the source's own start.
    pub fn take_until(
        &self,
        start_until: DateTime<Utc>,
        end_until: Option<DateTime<Utc>>,
    ) -> Vec<T> {
        self.take_from(self.source.start(), start_until, end_until)
    }

    /// The first occurrence starting at or after `date`.
    ///
    /// A non-recurring source is returned as-is when it starts at or after
    /// `date`; its span is not clipped to `date`.
    pub fn after(&self, date: DateTime<Utc>) -> Option<T> {
        if !self.is_recurrent() {
            return (self.source.start() >= date).then(|| self.make_instance(None));
        }
        self.occurrence_from(date, true)
            .map(|span| self.make_instance(Some(span)))
    }

    /// The occurrence starting exactly at `timestamp_ms` (milliseconds since
    /// the Unix epoch), if any.
    ///
    /// Never snaps to a later occurrence: a timestamp that is not exactly an
    /// occurrence start yields `None`, as does one outside the representable
    /// range.
    pub fn find_by_timestamp(&self, timestamp_ms: i64) -> Option<T> {
        let expected = from_millis(timestamp_ms)?;
        let span = self.occurrence_from(expected, true)?;
        (span.start == expected).then(|| self.make_instance(Some(span)))
    }
}

impl<T, F> Iterator for RecurrenceFactory<T, F>
where
    T: SpanSource,
    F: Fn(T, Option<Timeframe>) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let duration = self.duration;
        match self.state {
            IterState::Exhausted => None,
            IterState::Single => {
                self.state = IterState::Exhausted;
                Some(self.make_instance(None))
            }
            IterState::Walking(ref mut walk) => {
                let next = walk
                    .next()
                    .and_then(|start| Timeframe::starting_at(start, duration));
                let Some(span) = next else {
                    self.state = IterState::Exhausted;
                    return None;
                };
                Some(self.make_instance(Some(span)))
            }
        }
    }
}

impl<T, F> FusedIterator for RecurrenceFactory<T, F>
where
    T: SpanSource,
    F: Fn(T, Option<Timeframe>) -> T,
{
}

fn span_duration<T: SpanSource>(source: &T) -> Result<Duration> {
    let (start, end) = (source.start(), source.end());
    if end < start {
        return Err(RecurError::InvalidSpan(format!(
            "end {} is before start {}",
            end, start
        )));
    }
    Ok(end - start)
}

// ── Tests ───────────────────────────────────────────────────────────────────
