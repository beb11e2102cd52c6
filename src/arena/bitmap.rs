use bitvec::prelude::*;

use crate::arena::{Allocator, CAPACITY, Error, Result, SlotIdx};

type SlotBits = BitArr!(for CAPACITY, in u32, Lsb0);

/// A bitmap-backed `Allocator`.
/// A set bit marks a slot as in use.
#[derive(Clone)]
pub struct BitmapAllocator {
    bits: SlotBits,
    count: usize,
    available: usize,
}

impl BitmapAllocator {
    /// Constructs a bitmap for `count` slots.
    ///
    /// # Panics
    /// Panics if:
    /// - `count` is zero
    /// - `count` is larger than `CAPACITY`
    pub fn new(count: usize) -> Self {
        assert!(count != 0, "an arena must hold at least one slot");
        assert!(
            count <= CAPACITY,
            "'count' {} exceeds arena capacity {}",
            count,
            CAPACITY
        );
        Self {
            bits: SlotBits::ZERO,
            count,
            available: count,
        }
    }

    /// Returns the occupancy bits of managed slots.
    pub fn bits(&self) -> &BitSlice<u32, Lsb0> {
        &self.bits[..self.count]
    }

    /// Returns an iterator over allocated slots in slot order.
    pub fn allocated(&self) -> impl Iterator<Item = SlotIdx> + '_ {
        self.bits().iter_ones()
    }
}

impl Allocator for BitmapAllocator {
    fn allocate(&mut self) -> Result<SlotIdx> {
        let slot = self.bits().first_zero().ok_or(Error::Full)?;
        self.bits.set(slot, true);
        self.available -= 1;
        Ok(slot)
    }

    fn allocate_at(&mut self, slot: SlotIdx) -> Result<()> {
        if slot >= self.count {
            return Err(Error::SlotOutOfBounds);
        }

        if self.bits[slot] {
            return Err(Error::Occupied);
        }

        self.bits.set(slot, true);
        self.available -= 1;
        Ok(())
    }

    fn deallocate(&mut self, slot: SlotIdx) -> Result<()> {
        if slot >= self.count {
            return Err(Error::SlotOutOfBounds);
        }

        if !self.bits[slot] {
            return Err(Error::NotAllocated);
        }

        self.bits.set(slot, false);
        self.available += 1;
        Ok(())
    }

    fn is_allocated(&self, slot: SlotIdx) -> bool {
        slot < self.count && self.bits[slot]
    }

    fn available(&self) -> usize {
        self.available
    }

    fn capacity(&self) -> usize {
        self.count
    }
}
