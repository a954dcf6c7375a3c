//! Interpreter errors
//!
//! Two classes leave the interpreter: script exceptions, which carry a
//! [`JsError`] and unwind through call frames, and fatal errors, which
//! mean the bytecode stream or the VM itself is broken.

use core_types::{JsError, SourcePosition, StackFrame};
use thiserror::Error;

/// Invariant violations below the script level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// Operand stack capacity exceeded
    #[error("stack overflow (capacity {0})")]
    StackOverflow(usize),

    /// Pop below the current frame's stack marker
    #[error("stack underflow")]
    StackUnderflow,

    /// CALL on a value that is not a function
    #[error("callee is not a function (got {0})")]
    NotCallable(&'static str),

    /// A native function id without a registered callback
    #[error("native function #{0} is not registered")]
    MissingNative(u32),

    /// POP_SCOPE at the global scope
    #[error("no parent scope to pop")]
    ScopeUnderflow,

    /// A handle whose slot has been freed
    #[error("dangling {0} handle")]
    DanglingHandle(&'static str),

    /// An instruction referencing something that does not exist
    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    /// A module hash that is neither loaded nor registered natively
    #[error("unknown module {0:016x}")]
    UnknownModule(u64),
}

/// Error leaving the interpreter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    /// Uncaught script exception
    #[error("Uncaught {0}")]
    Exception(JsError),

    /// Fatal VM error
    #[error("fatal: {error}")]
    Fatal {
        /// What went wrong
        error: FatalError,
        /// Instruction being executed, once known
        position: Option<SourcePosition>,
    },
}

impl VmError {
    /// Records the raising position if none is set yet.
    pub fn at(self, position: SourcePosition) -> Self {
        match self {
            VmError::Exception(error) => VmError::Exception(error.at(position)),
            VmError::Fatal { error, position: None } => VmError::Fatal {
                error,
                position: Some(position),
            },
            fatal @ VmError::Fatal { .. } => fatal,
        }
    }

    /// Appends an interpreted frame the exception unwound through.
    pub(crate) fn through(mut self, frame: StackFrame) -> Self {
        if let VmError::Exception(error) = &mut self {
            error.stack.push(frame);
        }
        self
    }

    /// Where the error was raised.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            VmError::Exception(error) => error.source_position,
            VmError::Fatal { position, .. } => *position,
        }
    }

    /// True for fatal errors.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VmError::Fatal { .. })
    }

    /// The script exception, if this is one.
    pub fn exception(&self) -> Option<&JsError> {
        match self {
            VmError::Exception(error) => Some(error),
            VmError::Fatal { .. } => None,
        }
    }
}

impl From<JsError> for VmError {
    fn from(error: JsError) -> Self {
        VmError::Exception(error)
    }
}

impl From<FatalError> for VmError {
    fn from(error: FatalError) -> Self {
        VmError::Fatal {
            error,
            position: None,
        }
    }
}

/// Result type for interpreter operations
pub type VmResult<T> = Result<T, VmError>;
