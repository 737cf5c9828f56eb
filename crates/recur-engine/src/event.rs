//! Calendar events: recurring instances get a composite identity.
//!
//! An occurrence of a recurring event is identified as
//! `<source id>_<start in milliseconds since the Unix epoch>`. That string is
//! the only representation of an instance that leaves the engine, so
//! [`EventGenerator::find_by_event_id`] must resolve every id the generator
//! produces and nothing else.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::factory::RecurrenceFactory;
use crate::timespan::{to_millis, SpanSource, Timeframe};

const ID_SEPARATOR: char = '_';

/// A calendar event as supplied by the schema layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
}

impl SpanSource for CalendarEvent {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }

    fn recurrence(&self) -> &[String] {
        self.recurrence.as_deref().unwrap_or(&[])
    }
}

/// Identity of one instance of a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OccurrenceId {
    pub source_id: String,
    pub start_ms: i64,
}

impl OccurrenceId {
    pub fn new(source_id: impl Into<String>, start: &DateTime<Utc>) -> Self {
        Self {
            source_id: source_id.into(),
            start_ms: to_millis(start),
        }
    }

    /// Split on the last separator, so source ids may contain `_` themselves.
    /// The suffix must be a canonical integer (`1704708000000`, not
    /// `+1704708000000`, `01704708000000` or `1704708000000abc`).
    pub fn parse(s: &str) -> Option<Self> {
        let (source_id, suffix) = s.rsplit_once(ID_SEPARATOR)?;
        let start_ms: i64 = suffix.parse().ok()?;
        if start_ms.to_string() != suffix {
            return None;
        }
        Some(Self {
            source_id: source_id.to_string(),
            start_ms,
        })
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.source_id, ID_SEPARATOR, self.start_ms)
    }
}

pub type EventMaterializer = fn(CalendarEvent, Option<Timeframe>) -> CalendarEvent;

/// Recurrence expansion over [`CalendarEvent`] sources.
pub type EventGenerator = RecurrenceFactory<CalendarEvent, EventMaterializer>;

impl EventGenerator {
    /// # Errors
    ///
    /// See [`RecurrenceFactory::with_materializer`].
    pub fn new(event: CalendarEvent) -> Result<Self> {
        Self::with_materializer(event, materialize_event as EventMaterializer)
    }

    /// Resolve an event id produced by this generator.
    ///
    /// A non-recurring event only answers to its own id. A recurring event
    /// answers to composite ids whose prefix is its id and whose suffix is
    /// exactly the start of one of its occurrences.
    pub fn find_by_event_id(&self, event_id: &str) -> Option<CalendarEvent> {
        let origin = &self.source().id;

        if !self.is_recurrent() {
            return (event_id == origin).then(|| self.make_instance(None));
        }

        let id = OccurrenceId::parse(event_id)?;
        if id.source_id != *origin {
            return None;
        }
        self.find_by_timestamp(id.start_ms)
    }
}

fn materialize_event(mut event: CalendarEvent, timeframe: Option<Timeframe>) -> CalendarEvent {
    if let Some(tf) = timeframe {
        event.id = OccurrenceId::new(event.id.as_str(), &tf.start).to_string();
        event.start = tf.start;
        event.end = tf.end;
    }
    event
}

// ── Tests ───────────────────────────────────────────────────────────────────
