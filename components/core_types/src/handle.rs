//! Generation-checked handles into the garbage-collected heap.
//!
//! Every heap-resident entity (objects, functions, scopes, accessor boxes)
//! is addressed by an index into a slot registry plus the generation the
//! slot had when the entity was allocated. Freeing a slot bumps its
//! generation, so a handle that outlives its entity never resolves to the
//! slot's next occupant.

use std::fmt;

/// Common behaviour of typed heap handles.
///
/// Implemented by [`ObjectId`], [`FunctionId`], [`ScopeId`] and
/// [`AccessorId`]. The heap is generic over this trait so one slot
/// registry implementation serves every entity type.
pub trait SlotHandle: Copy + Eq + fmt::Debug {
    /// Builds a handle from a raw slot index and generation.
    fn from_raw(index: u32, generation: u32) -> Self;

    /// Returns the slot index.
    fn index(self) -> u32;

    /// Returns the generation the slot had when this handle was issued.
    fn generation(self) -> u32;
}

macro_rules! slot_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl SlotHandle for $name {
            #[inline]
            fn from_raw(index: u32, generation: u32) -> Self {
                $name { index, generation }
            }

            #[inline]
            fn index(self) -> u32 {
                self.index
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}v{}", $prefix, self.index, self.generation)
            }
        }
    };
}

slot_handle!(
    /// Handle to a heap object (plain objects, arrays, symbols, boxed primitives).
    ObjectId,
    "obj"
);

slot_handle!(
    /// Handle to a function (native or interpreted).
    FunctionId,
    "fn"
);

slot_handle!(
    /// Handle to a lexical scope.
    ScopeId,
    "scope"
);

slot_handle!(
    /// Handle to an accessor box (getter/setter pair).
    AccessorId,
    "acc"
);
