//! VM configuration

use memory_manager::DEFAULT_GC_THRESHOLD;

/// Default operand stack capacity, in values.
pub const DEFAULT_STACK_SIZE: usize = 1024;

/// Default maximum number of nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Tunables for a [`Vm`](crate::Vm).
///
/// # Examples
///
/// ```
/// use interpreter::VmConfig;
///
/// let config = VmConfig::default().with_stack_size(64).with_gc_threshold(0);
/// assert_eq!(config.stack_size, 64);
/// assert_eq!(config.gc_threshold, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Operand stack capacity
    pub stack_size: usize,
    /// Maximum number of nested calls before a RangeError
    pub max_call_depth: usize,
    /// Allocations between automatic collections, 0 disables them
    pub gc_threshold: usize,
}

impl VmConfig {
    /// Sets the operand stack capacity.
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Sets the maximum call depth.
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Sets the allocation threshold of the automatic collector.
    pub fn with_gc_threshold(mut self, gc_threshold: usize) -> Self {
        self.gc_threshold = gc_threshold;
        self
    }
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            stack_size: DEFAULT_STACK_SIZE,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}
