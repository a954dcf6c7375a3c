//! Catchable script-level errors.
//!
//! A [`JsError`] is the exception value raised by TypeError-class and
//! ReferenceError-class conditions. It propagates through interpreted call
//! frames, collecting a [`StackFrame`] per frame it leaves, and can be
//! observed and handled by native callers.

use crate::{SourcePosition, StackFrame};
use std::fmt;
use thiserror::Error;

/// The kind of JavaScript error.
///
/// These correspond to JavaScript's built-in error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic `Error`, used for values thrown by host code
    Error,
    /// Type error (e.g., reading a property of undefined)
    TypeError,
    /// Reference to an undeclared binding
    ReferenceError,
    /// Value out of allowed range (e.g., call depth exceeded)
    RangeError,
    /// Internal engine error surfaced to script
    InternalError,
}

impl ErrorKind {
    /// Name of the corresponding constructor.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JavaScript exception with message and stack trace.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::type_error("undefined is not an object");
/// assert_eq!(error.kind, ErrorKind::TypeError);
/// assert_eq!(error.to_string(), "TypeError: undefined is not an object");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Interpreted frames the error unwound through, innermost first
    pub stack: Vec<StackFrame>,
    /// Where the error was raised, once known
    pub source_position: Option<SourcePosition>,
}

impl JsError {
    /// Creates an error of the given kind with an empty stack.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        JsError {
            kind,
            message: message.into(),
            stack: Vec::new(),
            source_position: None,
        }
    }

    /// Shorthand for a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Shorthand for a `ReferenceError`.
    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceError, message)
    }

    /// Shorthand for a `RangeError`.
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    /// Records the raising position if none is set yet.
    pub fn at(mut self, position: SourcePosition) -> Self {
        self.source_position.get_or_insert(position);
        self
    }

    /// Formats the error followed by one `at ...` line per frame.
    pub fn stack_trace(&self) -> String {
        let mut out = self.to_string();
        for frame in &self.stack {
            out.push_str("\n    ");
            out.push_str(&frame.to_string());
        }
        out
    }
}
