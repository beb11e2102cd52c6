
pub mod error;
pub mod node;
pub mod path;

pub use error::{Error, Result};
pub use node::{NodeId, NodeKind};
pub use path::ResolvedParent;

use crate::{
    arena::CAPACITY,
    fs::{
        node::{
            Node, NodeTable,
            dir::{Children, Dir},
            file::File,
        },
        path::{Ancestors, Path},
    },
};

/// Name of the file seeded at initialization.
pub const README_NAME: &str = "readme.txt";

/// Content of the file seeded at initialization.
pub const README_CONTENT: &[u8] = b"Welcome to ramvfs!\n";

/// An in-memory filesystem over a fixed arena of nodes.
///
/// Every operation either succeeds or leaves the arena as it was.
pub struct Vfs {
    table: NodeTable,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs {
    /// Creates a filesystem with the root directory and the seeded readme.
    pub fn new() -> Self {
        let mut vfs = Self::with_capacity(CAPACITY);
        vfs.seed();
        vfs
    }

    /// Creates a filesystem of `capacity` slots holding only the root directory.
    ///
    /// # Panics
    /// Panics if:
    /// - `capacity` is zero or larger than `CAPACITY`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: NodeTable::new(capacity),
        }
    }

    /// Resets the arena, reinstalls the root directory and seeds the readme.
    /// Handles issued before the reset become stale.
    pub fn reset(&mut self) {
        self.table.reset();
        self.seed();
    }

    fn seed(&mut self) {
        if let Err(err) = self.write(README_NAME, README_CONTENT) {
            log::warn!("failed to seed {}: {:?}", README_NAME, err);
        }
        log::info!(
            "initialized filesystem with {} of {} slots in use",
            self.table.used(),
            self.table.capacity()
        );
    }

    /// Returns a handle to the root directory.
    pub fn root(&self) -> NodeId {
        self.table.root()
    }

    /// Checks whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.table.contains(id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.table.get(id)
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        self.node(id).map(|node| node.kind)
    }

    pub fn is_directory(&self, id: NodeId) -> Result<bool> {
        self.node(id).map(Node::is_dir)
    }

    /// Returns the name of a node. The root's name is empty.
    pub fn name_of(&self, id: NodeId) -> Result<&str> {
        self.node(id).map(|node| node.name.as_str())
    }

    pub fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        let node = self.node(id)?;
        Ok(node.parent().map(|slot| self.table.id_of(slot)))
    }

    /// Returns the size of a file in bytes.
    pub fn node_size(&self, id: NodeId) -> Result<usize> {
        File::size(&self.table, id)
    }

    /// Returns the content of a file.
    pub fn content(&self, id: NodeId) -> Result<&[u8]> {
        File::read(&self.table, id)
    }

    /// Finds the child of `parent` with given name.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Result<NodeId> {
        let parent = Dir::check(&self.table, parent)?;
        self.table
            .find_child(parent, name)
            .map(|slot| self.table.id_of(slot))
            .ok_or(Error::NotFound)
    }

    /// Walks `path` to an existing node, starting at `start` for relative paths.
    pub fn resolve(&self, path: &str, start: NodeId) -> Result<NodeId> {
        Path::resolve(&self.table, path, start)
    }

    /// Walks `path` to the existing directory holding its final component.
    pub fn resolve_parent<'a>(&self, path: &'a str, start: NodeId) -> Result<ResolvedParent<'a>> {
        Path::resolve_parent(&self.table, path, start)
    }

    /// Returns an iterator from `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> Result<Ancestors<'_>> {
        Path::ancestors(&self.table, id)
    }

    /// Returns the absolute path of `id`.
    pub fn path_of(&self, id: NodeId) -> Result<String> {
        Path::path_of(&self.table, id)
    }

    pub fn create_directory(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        Dir::create(&mut self.table, parent, name)
    }

    /// Removes an empty directory.
    pub fn remove_directory(&mut self, parent: NodeId, name: &str) -> Result<()> {
        Dir::remove(&mut self.table, parent, name).map(|_| ())
    }

    /// Writes a file, creating it if it does not exist.
    pub fn write_file(&mut self, parent: NodeId, name: &str, data: &[u8]) -> Result<NodeId> {
        File::write(&mut self.table, parent, name, data)
    }

    pub fn read_file(&self, parent: NodeId, name: &str) -> Result<&[u8]> {
        let id = File::find(&self.table, parent, name)?;
        File::read(&self.table, id)
    }

    pub fn remove_file(&mut self, parent: NodeId, name: &str) -> Result<()> {
        File::remove(&mut self.table, parent, name).map(|_| ())
    }

    /// Returns the children of a directory in slot order.
    pub fn children(&self, parent: NodeId) -> Result<Children<'_>> {
        Dir::list(&self.table, parent)
    }

    pub fn list_count(&self, parent: NodeId) -> Result<usize> {
        self.children(parent).map(Iterator::count)
    }

    pub fn list_at(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        self.children(parent)?.nth(index).ok_or(Error::NotFound)
    }

    /// Returns the number of node slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of free node slots.
    pub fn available(&self) -> usize {
        self.table.available()
    }

    /// Returns the number of live nodes other than the root.
    pub fn count(&self) -> usize {
        self.table.used() - 1
    }

    /// Returns the name of the `index`th live node other than the root, in slot order.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.table
            .live()
            .filter(|(slot, _)| *slot != NodeTable::ROOT_SLOT)
            .nth(index)
            .map(|(_, node)| node.name.as_str())
    }

    /// Writes a file in the root directory.
    pub fn write(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let root = self.root();
        self.write_file(root, name, data).map(|_| ())
    }

    /// Reads a file in the root directory.
    pub fn read(&self, name: &str) -> Result<&[u8]> {
        self.read_file(self.root(), name)
    }

    /// Removes a file in the root directory.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let root = self.root();
        self.remove_file(root, name)
    }

    /// Returns the size of a file in the root directory.
    pub fn size(&self, name: &str) -> Result<usize> {
        self.read(name).map(<[u8]>::len)
    }
}
