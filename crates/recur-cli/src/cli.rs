//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

/// Expand recurring time spans into concrete occurrences.
///
/// Reads one source definition as JSON (a calendar event with an `_id`, or a
/// plain date range) and prints the requested occurrences as JSON.
#[derive(Debug, Parser)]
#[command(name = "recur", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Source JSON file. Reads stdin when absent or `-`.
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// How to interpret the source. Detected from the `_id` field by default.
    #[arg(long, global = true, value_enum)]
    pub kind: Option<SourceKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Calendar event; recurring instances get composite ids.
    Event,
    /// Plain date range.
    Range,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Iterate occurrences from the start of the series.
    Expand {
        /// Maximum number of occurrences (defaults to `default_limit` from config).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Occurrences overlapping a window.
    Range {
        /// Occurrences ending at or before this instant are skipped.
        #[arg(long, value_parser = parse_instant)]
        from: DateTime<Utc>,

        /// Occurrences must start strictly before this instant.
        #[arg(long, value_parser = parse_instant)]
        to: DateTime<Utc>,

        /// Optional cap on occurrence end.
        #[arg(long, value_parser = parse_instant)]
        to_end: Option<DateTime<Utc>>,
    },

    /// Occurrences from the series start up to a bound.
    Until {
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<Utc>,

        #[arg(long, value_parser = parse_instant)]
        end: Option<DateTime<Utc>>,
    },

    /// First occurrence starting at or after a date.
    After {
        #[arg(long, value_parser = parse_instant)]
        date: DateTime<Utc>,
    },

    /// Look up a single occurrence.
    Find {
        /// Exact occurrence start in milliseconds since the Unix epoch.
        #[arg(
            long,
            allow_negative_numbers = true,
            conflicts_with = "id",
            required_unless_present = "id"
        )]
        timestamp: Option<i64>,

        /// Occurrence id (`<event id>_<start ms>`). Events only.
        #[arg(long)]
        id: Option<String>,
    },

    /// Show whether the source recurs and its occurrence duration.
    Info,
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    recur_engine::parse_rfc3339(s).map_err(|e| e.to_string())
}
