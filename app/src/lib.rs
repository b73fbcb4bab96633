//! # ExpoHub command-line shell
//!
//! Wires the API client, the persisted session and the role panels behind a
//! `clap` interface. The session lives in a JSON file between invocations, so
//! a typical admin run looks like:
//!
//! ```text
//! expohub login admin admin@expohub.test --password secret
//! expohub events list
//! expohub applications approve --exhibition 3 7
//! expohub scan 5c0f...e1 9a2b...44
//! ```
//!
//! Views are opened through the [`Shell`], which applies the route guard
//! exactly as a browser front end would.

pub mod cli;
pub mod commands;
pub mod config;
pub mod prompt;
pub mod shell;

pub use cli::{Cli, Command};
pub use commands::App;
pub use config::{Config, ConfigError};
pub use prompt::TerminalPrompt;
pub use shell::{Navigation, Shell, ShellError};
