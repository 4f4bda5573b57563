#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod logging;

pub use cli::{Cli, run};
pub use error::{CliError, Result};
