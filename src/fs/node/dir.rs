use super::*;

/// How many bytes a node name occupies, including one reserved slot.
pub const NAME_CAPACITY: usize = 16;

/// How long a node name can be.
pub const NAME_MAX_LEN: usize = NAME_CAPACITY - 1;

/// Represents the name of a node.
/// Guaranteed to be valid UTF-8, non-empty for every node but the root.
#[repr(C)]
#[derive(Clone, Copy)]
#[derive(FromZeros)]
pub struct NodeName {
    len: u8,
    bytes: [u8; NAME_CAPACITY],
}

impl NodeName {
    /// Returns the name of the root directory.
    pub fn root() -> Self {
        Self::new_zeroed()
    }

    /// Returns the node name as `&str`.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..usize::from(self.len)]).expect("'name' is valid UTF-8")
    }

    /// Checks whether the name equals `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.as_str() == name
    }
}

impl<'a> TryFrom<&'a str> for NodeName {
    type Error = Error;

    fn try_from(name: &'a str) -> Result<Self> {
        if name.is_empty() || name.len() > NAME_MAX_LEN {
            return Err(Error::InvalidName);
        }

        if name.contains('\0') {
            return Err(Error::InvalidName);
        }

        if name.contains(crate::fs::path::SEPARATOR) {
            return Err(Error::InvalidName);
        }

        if name == crate::fs::path::ITSELF || name == crate::fs::path::PARENT {
            return Err(Error::InvalidName);
        }

        let mut node_name = Self::new_zeroed();
        node_name.bytes[..name.len()].copy_from_slice(name.as_bytes());
        node_name.len = name.len() as u8;
        Ok(node_name)
    }
}

impl core::fmt::Debug for NodeName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.as_str(), f)
    }
}

pub struct Dir;

impl Dir {
    /// Validates that `id` is a live directory, returning its slot.
    pub fn check(table: &NodeTable, id: NodeId) -> Result<SlotIdx> {
        let node = table.get(id)?;
        if !node.is_dir() {
            return Err(Error::NotADirectory);
        }
        Ok(id.slot())
    }

    pub fn create(table: &mut NodeTable, parent: NodeId, name: &str) -> Result<NodeId> {
        let name = NodeName::try_from(name)?;
        let parent = Dir::check(table, parent)?;

        if table.find_child(parent, name.as_str()).is_some() {
            return Err(Error::AlreadyExists);
        }

        Node::create(table, NodeKind::Dir, parent, name)
    }

    pub fn remove(table: &mut NodeTable, parent: NodeId, name: &str) -> Result<NodeId> {
        let name = NodeName::try_from(name)?;
        let parent = Dir::check(table, parent)?;

        let slot = table.find_child(parent, name.as_str()).ok_or(Error::NotFound)?;
        if !table.node_at(slot).is_dir() {
            return Err(Error::NotADirectory);
        }

        if !Dir::is_empty(table, slot) {
            return Err(Error::NotEmpty);
        }

        let id = table.id_of(slot);
        Node::remove(table, id)?;
        Ok(id)
    }

    pub fn is_empty(table: &NodeTable, slot: SlotIdx) -> bool {
        !table.has_children(slot)
    }

    /// Lists the children of a directory in slot order.
    pub fn list(table: &NodeTable, id: NodeId) -> Result<Children<'_>> {
        let parent = Dir::check(table, id)?;
        Ok(Children {
            table,
            parent,
            cursor: 0,
        })
    }
}

/// An iterator over the children of a directory, in slot order.
#[derive(Clone)]
pub struct Children<'a> {
    table: &'a NodeTable,
    parent: SlotIdx,
    cursor: SlotIdx,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let (slot, _) = self
            .table
            .live()
            .find(|&(slot, node)| slot >= self.cursor && node.parent() == Some(self.parent))?;
        self.cursor = slot + 1;
        Some(self.table.id_of(slot))
    }
}
