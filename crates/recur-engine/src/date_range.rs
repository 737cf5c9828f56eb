//! Plain date ranges: occurrences keep the source identity, only dates move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::factory::RecurrenceFactory;
use crate::timespan::{SpanSource, Timeframe};

/// A start/end pair with optional recurrence lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
}

impl SpanSource for DateRange {
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

pub type DateRangeMaterializer = fn(DateRange, Option<Timeframe>) -> DateRange;

/// Recurrence expansion over [`DateRange`] sources.
pub type Recurrence = RecurrenceFactory<DateRange, DateRangeMaterializer>;

impl Recurrence {
    /// # Errors
    ///
    /// See [`RecurrenceFactory::with_materializer`].
    pub fn new(range: DateRange) -> Result<Self> {
        Self::with_materializer(range, materialize_range as DateRangeMaterializer)
    }
}

fn materialize_range(mut range: DateRange, timeframe: Option<Timeframe>) -> DateRange {
    if let Some(tf) = timeframe {
        range.start = tf.start;
        range.end = tf.end;
    }
    range
}
