//! Runner library behind the `corten-vm` binary
//!
//! Provides argument parsing, the [`Runtime`] that loads an image and
//! drives the VM, and the error type mapped onto exit codes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod runtime;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runtime::Runtime;
