//! Extract Studio CLI library.
//!
//! This library provides the core functionality for the Extract Studio
//! command-line tools: configuration management, the extraction task state,
//! input loading, command execution, the interactive form and output
//! formatting. The embedded clinical notes and schema used by the
//! `clinical-extract` batch binary live in [`clinical`].

pub mod backend;
pub mod cli;
pub mod clinical;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod input;
pub mod logging;
pub mod output;
pub mod session;

pub use backend::Backend;
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use session::Session;
