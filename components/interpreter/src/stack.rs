//! Bounded operand stack

use crate::error::FatalError;
use core_types::Value;

/// The single operand stack shared by every active frame.
///
/// Frames address it through a `stack_start` marker; the stack itself
/// only enforces its capacity.
#[derive(Debug, Clone)]
pub struct OperandStack {
    values: Vec<Value>,
    capacity: usize,
}

impl OperandStack {
    /// Create an empty stack holding at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    /// Push a value, failing once the capacity is reached
    pub fn push(&mut self, value: Value) -> Result<(), FatalError> {
        if self.values.len() >= self.capacity {
            return Err(FatalError::StackOverflow(self.capacity));
        }
        self.values.push(value);
        Ok(())
    }

    /// Pop the top value
    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// The top value
    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Value at an absolute position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Capacity in values
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop everything above `len`
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    /// Remove the top `count` values, returned top first.
    ///
    /// Arguments are pushed last to first, so this yields them in
    /// natural order.
    pub fn take_args(&mut self, count: usize) -> Option<Vec<Value>> {
        let start = self.values.len().checked_sub(count)?;
        let mut args: Vec<Value> = self.values.drain(start..).collect();
        args.reverse();
        Some(args)
    }

    /// All values, bottom first
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}
