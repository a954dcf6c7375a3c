//! Slot-block registry backing every kind of heap entity.
//!
//! A [`Space`] is a list of fixed-capacity blocks. Each slot holds an
//! optional entity and a marked bit. Allocation takes the first free slot
//! of the first block with room and creates a block only when every
//! existing block is full. Sweeping frees unmarked slots, bumps their
//! generation so outstanding handles go stale, and releases blocks that
//! become empty.

use core_types::SlotHandle;
use std::marker::PhantomData;

/// Slots per block.
pub const BLOCK_SLOTS: usize = 32;

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    marked: bool,
}

#[derive(Debug)]
struct Block<T> {
    slots: Vec<Slot<T>>,
    occupied: usize,
}

impl<T> Block<T> {
    fn new() -> Self {
        Block {
            slots: (0..BLOCK_SLOTS)
                .map(|_| Slot {
                    value: None,
                    marked: false,
                })
                .collect(),
            occupied: 0,
        }
    }
}

/// Occupancy snapshot of a [`Space`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceStats {
    /// Live entities
    pub live: usize,
    /// Blocks currently allocated
    pub blocks: usize,
}

/// Typed slot registry addressed by handles of type `H`.
#[derive(Debug)]
pub struct Space<H, T> {
    blocks: Vec<Option<Block<T>>>,
    // Indexed by global slot number; survives block release so a recycled
    // block never reissues an old handle.
    generations: Vec<u32>,
    live: usize,
    _handle: PhantomData<fn() -> H>,
}

impl<H: SlotHandle, T> Space<H, T> {
    /// Creates an empty space.
    pub fn new() -> Self {
        Space {
            blocks: Vec::new(),
            generations: Vec::new(),
            live: 0,
            _handle: PhantomData,
        }
    }

    fn locate(handle: H) -> (usize, usize) {
        let index = handle.index() as usize;
        (index / BLOCK_SLOTS, index % BLOCK_SLOTS)
    }

    /// Stores `value` in a free slot and returns its handle.
    pub fn allocate(&mut self, value: T) -> H {
        let block_index = match self
            .blocks
            .iter()
            .position(|b| matches!(b, Some(block) if block.occupied < BLOCK_SLOTS))
        {
            Some(i) => i,
            None => self.new_block(),
        };

        let generation_base = block_index * BLOCK_SLOTS;
        let block = self.blocks[block_index].get_or_insert_with(Block::new);
        let slot_index = block
            .slots
            .iter()
            .position(|s| s.value.is_none())
            .expect("block with occupied < BLOCK_SLOTS has a free slot");
        let slot = &mut block.slots[slot_index];
        slot.value = Some(value);
        slot.marked = false;
        block.occupied += 1;
        self.live += 1;

        let index = generation_base + slot_index;
        H::from_raw(index as u32, self.generations[index])
    }

    /// Reuses a released block position or appends one.
    fn new_block(&mut self) -> usize {
        match self.blocks.iter().position(Option::is_none) {
            Some(i) => i,
            None => {
                self.blocks.push(None);
                self.generations.resize(self.blocks.len() * BLOCK_SLOTS, 0);
                self.blocks.len() - 1
            }
        }
    }

    fn slot(&self, handle: H) -> Option<&Slot<T>> {
        let (b, s) = Self::locate(handle);
        if self.generations.get(handle.index() as usize) != Some(&handle.generation()) {
            return None;
        }
        self.blocks.get(b)?.as_ref().map(|block| &block.slots[s])
    }

    fn slot_mut(&mut self, handle: H) -> Option<&mut Slot<T>> {
        let (b, s) = Self::locate(handle);
        if self.generations.get(handle.index() as usize) != Some(&handle.generation()) {
            return None;
        }
        self.blocks.get_mut(b)?.as_mut().map(|block| &mut block.slots[s])
    }

    /// Resolves a handle, or `None` if its entity has been freed.
    pub fn get(&self, handle: H) -> Option<&T> {
        self.slot(handle)?.value.as_ref()
    }

    /// Resolves a handle mutably, or `None` if its entity has been freed.
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slot_mut(handle)?.value.as_mut()
    }

    /// True if the handle still resolves.
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Sets the marked bit. Returns true only the first time a live slot is
    /// marked in a cycle; stale handles and already-marked slots return false.
    pub fn mark(&mut self, handle: H) -> bool {
        match self.slot_mut(handle) {
            Some(slot) if slot.value.is_some() && !slot.marked => {
                slot.marked = true;
                true
            }
            _ => false,
        }
    }

    /// Frees every unmarked slot and clears the marked bit on the rest.
    /// Returns the number of entities freed.
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for (block_index, entry) in self.blocks.iter_mut().enumerate() {
            let Some(block) = entry else { continue };
            for (slot_index, slot) in block.slots.iter_mut().enumerate() {
                if slot.value.is_none() {
                    continue;
                }
                if slot.marked {
                    slot.marked = false;
                } else {
                    slot.value = None;
                    block.occupied -= 1;
                    let index = block_index * BLOCK_SLOTS + slot_index;
                    self.generations[index] = self.generations[index].wrapping_add(1);
                    freed += 1;
                }
            }
            if block.occupied == 0 {
                *entry = None;
            }
        }
        self.live -= freed;
        freed
    }

    /// Current occupancy.
    pub fn stats(&self) -> SpaceStats {
        SpaceStats {
            live: self.live,
            blocks: self.blocks.iter().filter(|b| b.is_some()).count(),
        }
    }
}

impl<H: SlotHandle, T> Default for Space<H, T> {
    fn default() -> Self {
        Self::new()
    }
}
