//! Library surface of the `recur` binary, split out so commands can be tested
//! without spawning a process.

pub mod cli;
pub mod commands;
pub mod config;
pub mod source;

pub use cli::{Cli, Commands, SourceKind};
pub use config::Config;
pub use source::Source;
