//! Command execution: build the matching generator and run one query.

use anyhow::{bail, Context, Result};
use recur_engine::{
    format_rfc3339, EventGenerator, Recurrence, RecurrenceFactory, SpanSource, Timeframe,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::Commands;
use crate::config::Config;
use crate::source::Source;

/// Run `command` against `source`, returning the JSON to print.
pub fn run(command: &Commands, source: Source, config: &Config) -> Result<Value> {
    match source {
        Source::Event(event) => {
            let generator = EventGenerator::new(event).context("failed to expand event")?;
            if let Commands::Find { id: Some(id), .. } = command {
                return Ok(serde_json::to_value(generator.find_by_event_id(id))?);
            }
            execute(generator, command, config)
        }
        Source::Range(range) => {
            if let Commands::Find { id: Some(_), .. } = command {
                bail!("lookup by id requires an event source (a JSON object with `_id`)");
            }
            let recurrence = Recurrence::new(range).context("failed to expand date range")?;
            execute(recurrence, command, config)
        }
    }
}

fn execute<T, F>(
    factory: RecurrenceFactory<T, F>,
    command: &Commands,
    config: &Config,
) -> Result<Value>
where
    T: SpanSource + Serialize,
    F: Fn(T, Option<Timeframe>) -> T,
{
    let value = match command {
        Commands::Expand { limit } => {
            let limit = limit.unwrap_or(config.default_limit);
            let occurrences: Vec<T> = factory.take(limit).collect();
            tracing::debug!(limit, count = occurrences.len(), "expanded");
            serde_json::to_value(occurrences)?
        }
        Commands::Range { from, to, to_end } => {
            serde_json::to_value(factory.take_from(*from, *to, *to_end))?
        }
        Commands::Until { start, end } => serde_json::to_value(factory.take_until(*start, *end))?,
        Commands::After { date } => serde_json::to_value(factory.after(*date))?,
        Commands::Find { timestamp, .. } => {
            let found = timestamp.and_then(|ms| factory.find_by_timestamp(ms));
            serde_json::to_value(found)?
        }
        Commands::Info => json!({
            "recurrent": factory.is_recurrent(),
            "durationMs": factory.duration().num_milliseconds(),
            "startDate": format_rfc3339(&factory.source().start()),
        }),
    };
    Ok(value)
}

/// Serialize output according to config.
pub fn render(value: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
