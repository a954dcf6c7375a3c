//! Core value types, heap handles and error handling.
//!
//! This crate provides the foundational, heap-independent pieces of the
//! virtual machine: value representation, the handle types used to address
//! garbage-collected entities, catchable script errors, bytecode locations
//! and the pure Number algorithms.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of JavaScript values
//! - [`JsString`] - Immutable shared strings
//! - [`ObjectId`], [`FunctionId`], [`ScopeId`], [`AccessorId`] - Generation-checked heap handles
//! - [`JsError`] - Catchable JavaScript errors with stack traces
//! - [`ErrorKind`] - Types of JavaScript errors
//! - [`SourcePosition`] - Module hash plus instruction index
//! - [`StackFrame`] - Call stack frame information
//! - [`number`] - IEEE-754 arithmetic and Number/String conversion
//!
//! # Examples
//!
//! ```
//! use core_types::{number, ErrorKind, JsError, Value};
//!
//! let num = Value::Number(42.0);
//! assert!(num.to_boolean());
//! assert_eq!(num.type_of(), "number");
//! assert_eq!(number::to_js_string(0.5), "0.5");
//!
//! let error = JsError::type_error("undefined is not a function");
//! assert_eq!(error.kind, ErrorKind::TypeError);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod handle;
pub mod number;
mod source;
mod string;
mod value;

pub use error::{ErrorKind, JsError};
pub use handle::{AccessorId, FunctionId, ObjectId, ScopeId, SlotHandle};
pub use source::{SourcePosition, StackFrame};
pub use string::JsString;
pub use value::Value;
