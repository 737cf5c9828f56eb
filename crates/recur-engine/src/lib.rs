//! # recur-engine
//!
//! Recurrence expansion for time spans.
//!
//! Given one source definition (a start, an end and optional RFC 5545
//! recurrence lines) the engine produces its concrete occurrences on demand:
//! by forward iteration, by bounded window, or by point lookup. Recurring
//! calendar events get a stable composite identity per occurrence that can be
//! resolved back to the occurrence.
//!
//! ## Modules
//!
//! - [`timespan`] — `Timeframe`, the `SpanSource` trait, instant conversions
//! - [`rule_text`] — recurrence detection and rule-set text normalization
//! - [`cursor`] — first-valid-start queries over a parsed rule set
//! - [`factory`] — iteration, slicing and lookup over one source
//! - [`date_range`] — facade for plain date ranges
//! - [`event`] — facade for calendar events with composite occurrence ids
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use recur_engine::{parse_rfc3339, CalendarEvent, EventGenerator};
//!
//! let event = CalendarEvent {
//!     id: "sync".to_string(),
//!     title: "Weekly sync".to_string(),
//!     location: None,
//!     all_day: false,
//!     start: parse_rfc3339("2024-01-01T10:00:00Z").unwrap(),
//!     end: parse_rfc3339("2024-01-01T11:00:00Z").unwrap(),
//!     recurrence: Some(vec!["RRULE:FREQ=WEEKLY;COUNT=3".to_string()]),
//! };
//!
//! let generator = EventGenerator::new(event).unwrap();
//! let window = generator.take_from(
//!     parse_rfc3339("2024-01-01T00:00:00Z").unwrap(),
//!     parse_rfc3339("2024-01-10T00:00:00Z").unwrap(),
//!     None,
//! );
//! assert_eq!(window.len(), 2);
//! assert_eq!(window[1].id, "sync_1704708000000");
//! assert!(generator.find_by_event_id("sync_1704708000000").is_some());
//! ```

pub mod cursor;
pub mod date_range;
pub mod error;
pub mod event;
pub mod factory;
pub mod rule_text;
pub mod timespan;

pub use cursor::{OccurrenceCursor, RuleSetCursor, Starts};
pub use date_range::{DateRange, Recurrence};
pub use error::RecurError;
pub use event::{CalendarEvent, EventGenerator, OccurrenceId};
pub use factory::{BoundaryKind, RecurrenceFactory};
pub use timespan::{format_rfc3339, from_millis, parse_rfc3339, to_millis, SpanSource, Timeframe};
