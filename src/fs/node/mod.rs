pub mod dir;
use dir::*;
pub mod file;
use file::*;

use super::error::*;

use core::num::NonZeroU16;

use zerocopy::FromZeros;

use crate::arena::{Allocator, BitmapAllocator, CAPACITY, SlotIdx};

/// A node handle.
///
/// A handle names a slot together with the slot's generation when the handle was issued.
/// Releasing a slot bumps its generation, so handles to removed nodes never alias a node
/// that later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    slot: u16,
    generation: u32,
}

impl NodeId {
    fn new(slot: SlotIdx, generation: u32) -> Self {
        let slot = u16::try_from(slot).expect("'slot' must fit the arena");
        Self { slot, generation }
    }

    /// Returns the arena slot the handle points at.
    pub fn slot(&self) -> SlotIdx {
        SlotIdx::from(self.slot)
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Node kinds.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(FromZeros)]
pub enum NodeKind {
    #[default]
    File = 0,
    Dir = 1,
}

/// A filesystem object stored in an arena slot.
/// A zeroed node is the cleared state of a free slot.
#[repr(C)]
#[derive(Clone, Copy)]
#[derive(FromZeros)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NonZeroU16>,
    pub name: NodeName,
    size: u16,
    content: [u8; CONTENT_CAPACITY],
}

impl Node {
    /// Constructs an empty node of given kind.
    pub fn new(kind: NodeKind, parent: Option<SlotIdx>, name: NodeName) -> Self {
        let mut node = Self::new_zeroed();
        node.kind = kind;
        // Stored off by one so that a zeroed node has no parent.
        node.parent = parent.map(|slot| {
            let stored = u16::try_from(slot + 1).expect("'slot' must fit the arena");
            NonZeroU16::new(stored).expect("'stored' is at least 1")
        });
        node.name = name;
        node
    }

    /// Returns the slot of the owning directory.
    pub fn parent(&self) -> Option<SlotIdx> {
        self.parent.map(|stored| SlotIdx::from(stored.get()) - 1)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }

    /// Returns the content of the node, empty for directories.
    pub fn content(&self) -> &[u8] {
        &self.content[..usize::from(self.size)]
    }

    /// Replaces the content of the node.
    pub fn set_content(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > CONTENT_CAPACITY {
            return Err(Error::CapacityExceeded);
        }
        self.content[..data.len()].copy_from_slice(data);
        self.content[data.len()..].fill(0);
        self.size = u16::try_from(data.len()).map_err(|_| Error::CapacityExceeded)?;
        Ok(())
    }

    /// Allocates a slot for a new node under `parent`.
    pub fn create(
        table: &mut NodeTable,
        kind: NodeKind,
        parent: SlotIdx,
        name: NodeName,
    ) -> Result<NodeId> {
        let slot = table.slots.allocate()?;
        table.nodes[slot] = Node::new(kind, Some(parent), name);
        let id = table.id_of(slot);
        log::debug!(
            "created {:?} '{}' in slot {} under slot {}",
            kind,
            name.as_str(),
            slot,
            parent
        );
        Ok(id)
    }

    /// Clears the slot of a node.
    /// The caller must ensure a directory has no children.
    pub fn remove(table: &mut NodeTable, id: NodeId) -> Result<()> {
        let slot = table.slot_of(id)?;
        table.slots.deallocate(slot)?;
        table.nodes[slot] = Node::new_zeroed();
        table.generations[slot] = table.generations[slot].wrapping_add(1);
        log::debug!("released slot {}", slot);
        Ok(())
    }
}

/// The fixed pool of node slots.
pub struct NodeTable {
    nodes: [Node; CAPACITY],
    generations: [u32; CAPACITY],
    slots: BitmapAllocator,
}

impl NodeTable {
    /// The slot reserved for the root directory.
    pub const ROOT_SLOT: SlotIdx = 0;

    /// Constructs a table managing `capacity` slots with the root directory installed.
    ///
    /// # Panics
    /// Panics if:
    /// - `capacity` is zero or larger than `CAPACITY`
    pub fn new(capacity: usize) -> Self {
        let mut table = Self {
            nodes: <[Node; CAPACITY]>::new_zeroed(),
            generations: [0; CAPACITY],
            slots: BitmapAllocator::new(capacity),
        };
        table.install_root();
        table
    }

    /// Clears every slot and reinstalls the root directory.
    /// Handles issued before the reset become stale.
    pub fn reset(&mut self) {
        for slot in self.slots.allocated() {
            self.generations[slot] = self.generations[slot].wrapping_add(1);
        }
        self.nodes = <[Node; CAPACITY]>::new_zeroed();
        self.slots = BitmapAllocator::new(self.slots.capacity());
        self.install_root();
    }

    fn install_root(&mut self) {
        self.slots
            .allocate_at(Self::ROOT_SLOT)
            .expect("root slot must be free");
        self.nodes[Self::ROOT_SLOT] = Node::new(NodeKind::Dir, None, NodeName::root());
    }

    /// Returns a handle to the root directory.
    pub fn root(&self) -> NodeId {
        self.id_of(Self::ROOT_SLOT)
    }

    /// Returns a handle to the node currently occupying `slot`.
    pub(crate) fn id_of(&self, slot: SlotIdx) -> NodeId {
        NodeId::new(slot, self.generations[slot])
    }

    /// Checks whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        let slot = id.slot();
        self.slots.is_allocated(slot) && self.generations[slot] == id.generation
    }

    /// Validates a handle, returning its slot.
    pub fn slot_of(&self, id: NodeId) -> Result<SlotIdx> {
        if self.contains(id) {
            Ok(id.slot())
        } else {
            Err(Error::NotFound)
        }
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        let slot = self.slot_of(id)?;
        Ok(&self.nodes[slot])
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let slot = self.slot_of(id)?;
        Ok(&mut self.nodes[slot])
    }

    /// Returns the node in a live slot.
    pub(crate) fn node_at(&self, slot: SlotIdx) -> &Node {
        debug_assert!(self.slots.is_allocated(slot), "slot {} is free", slot);
        &self.nodes[slot]
    }

    /// Returns an iterator over live slots and their nodes, in slot order.
    pub fn live(&self) -> impl Iterator<Item = (SlotIdx, &Node)> + '_ {
        self.slots.allocated().map(|slot| (slot, &self.nodes[slot]))
    }

    /// Finds the child of the directory at `parent` with given name.
    /// This is a linear scan over the arena.
    pub fn find_child(&self, parent: SlotIdx, name: &str) -> Option<SlotIdx> {
        self.live()
            .find(|(_, node)| node.parent() == Some(parent) && node.name.matches(name))
            .map(|(slot, _)| slot)
    }

    /// Checks whether any live node has `parent` as its parent.
    pub fn has_children(&self, parent: SlotIdx) -> bool {
        self.live().any(|(_, node)| node.parent() == Some(parent))
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Returns the number of free slots.
    pub fn available(&self) -> usize {
        self.slots.available()
    }

    /// Returns the number of live slots, root included.
    pub fn used(&self) -> usize {
        self.capacity() - self.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(name: &str) -> NodeName {
        NodeName::try_from(name).unwrap()
    }

    #[test]
    fn test_new_installs_root() {
        let table = NodeTable::new(4);
        let root = table.get(table.root()).unwrap();
        assert!(root.is_dir());
        assert_eq!(root.parent(), None);
        assert_eq!(table.used(), 1);
    }

    #[test]
    fn test_parent_roundtrip() {
        let node = Node::new(NodeKind::File, Some(0), name("a"));
        assert_eq!(node.parent(), Some(0));
        let node = Node::new(NodeKind::File, Some(CAPACITY - 1), name("a"));
        assert_eq!(node.parent(), Some(CAPACITY - 1));
    }

    #[test]
    fn test_create_and_remove() {
        let mut table = NodeTable::new(4);
        let id = Node::create(&mut table, NodeKind::File, NodeTable::ROOT_SLOT, name("a")).unwrap();
        assert_eq!(id.slot(), 1);
        assert_eq!(table.find_child(NodeTable::ROOT_SLOT, "a"), Some(1));

        Node::remove(&mut table, id).unwrap();
        assert!(!table.contains(id));
        assert_eq!(table.find_child(NodeTable::ROOT_SLOT, "a"), None);
        assert!(matches!(Node::remove(&mut table, id), Err(Error::NotFound)));
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut table = NodeTable::new(4);
        let old = Node::create(&mut table, NodeKind::File, NodeTable::ROOT_SLOT, name("a")).unwrap();
        Node::remove(&mut table, old).unwrap();

        let new = Node::create(&mut table, NodeKind::File, NodeTable::ROOT_SLOT, name("b")).unwrap();
        assert_eq!(old.slot(), new.slot());
        assert_ne!(old, new);
        assert!(matches!(table.get(old), Err(Error::NotFound)));
        assert!(table.get(new).is_ok());
    }

    #[test]
    fn test_create_full() {
        let mut table = NodeTable::new(2);
        Node::create(&mut table, NodeKind::File, NodeTable::ROOT_SLOT, name("a")).unwrap();
        assert!(matches!(
            Node::create(&mut table, NodeKind::File, NodeTable::ROOT_SLOT, name("b")),
            Err(Error::CapacityExceeded)
        ));
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut table = NodeTable::new(4);
        let root = table.root();
        let id = Node::create(&mut table, NodeKind::Dir, NodeTable::ROOT_SLOT, name("a")).unwrap();

        table.reset();

        assert!(!table.contains(root));
        assert!(!table.contains(id));
        assert!(table.contains(table.root()));
        assert_eq!(table.used(), 1);
    }

    #[test]
    fn test_set_content() {
        let mut node = Node::new(NodeKind::File, Some(0), name("a"));
        node.set_content(b"hello world").unwrap();
        node.set_content(b"bye").unwrap();
        assert_eq!(node.content(), b"bye");

        let too_long = [0xAB; CONTENT_CAPACITY + 1];
        assert!(matches!(
            node.set_content(&too_long),
            Err(Error::CapacityExceeded)
        ));
        assert_eq!(node.content(), b"bye");

        node.set_content(&too_long[..CONTENT_CAPACITY]).unwrap();
        assert_eq!(node.content().len(), CONTENT_CAPACITY);
    }
}
