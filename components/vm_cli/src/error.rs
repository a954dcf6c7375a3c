//! Error types for the CLI

use bytecode_system::FormatError;
use interpreter::VmError;
use thiserror::Error;

/// Exit code for usage errors and unreadable images.
pub const EXIT_USAGE: i32 = 1;

/// Exit code for uncaught exceptions and fatal VM errors.
pub const EXIT_SOFTWARE: i32 = 70;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The image could not be read
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    /// The image is not a valid module or bundle
    #[error("invalid image: {0}")]
    Format(#[from] FormatError),

    /// The magic bytes match neither format
    #[error("unrecognized image magic {0:02x?}")]
    UnknownImage(Vec<u8>),

    /// Execution failed
    #[error(transparent)]
    Vm(#[from] VmError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Vm(_) => EXIT_SOFTWARE,
            CliError::Io(_) | CliError::Format(_) | CliError::UnknownImage(_) => EXIT_USAGE,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
