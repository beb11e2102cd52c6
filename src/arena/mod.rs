pub mod bitmap;

pub use bitmap::BitmapAllocator;

/// An index of a node slot.
pub type SlotIdx = usize;

/// How many node slots an arena holds.
pub const CAPACITY: usize = 32;

/// An implementation of `Allocator` can manage node slot allocation.
///
/// Slots are handed out in slot order: `allocate` always returns the lowest free slot.
pub trait Allocator {
    /// Allocates the first free slot, returning its index.
    fn allocate(&mut self) -> Result<SlotIdx>;

    /// Allocates the slot at `slot`.
    fn allocate_at(&mut self, slot: SlotIdx) -> Result<()>;

    /// Deallocates the slot at `slot`.
    fn deallocate(&mut self, slot: SlotIdx) -> Result<()>;

    /// Checks whether the slot at `slot` is allocated.
    fn is_allocated(&self, slot: SlotIdx) -> bool;

    /// Returns the number of slots available for allocation.
    fn available(&self) -> usize;

    /// Returns the number of slots the allocator manages.
    fn capacity(&self) -> usize;
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Full,
    SlotOutOfBounds,
    Occupied,
    NotAllocated,
}

impl From<Error> for libc::c_int {
    fn from(err: Error) -> Self {
        match err {
            Error::Full => libc::ENOSPC,
            Error::SlotOutOfBounds => libc::EIO,
            Error::Occupied => libc::EIO,
            Error::NotAllocated => libc::EIO,
        }
    }
}
