//! Path splitting and resolution.
//!
//! Paths are walked component by component without recursion or allocation. A leading
//! separator starts the walk at the root, otherwise it starts at a given directory.

use crate::{
    arena::{CAPACITY, SlotIdx},
    fs::{
        error::{Error, Result},
        node::{NodeId, NodeTable, dir::Dir, dir::NodeName},
    },
};

/// Path component separator.
pub const SEPARATOR: char = '/';

/// The component naming the current directory.
pub const ITSELF: &str = ".";

/// The component naming the parent directory.
pub const PARENT: &str = "..";

/// Checks whether a path starts at the root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// An iterator over the components of a path.
/// Runs of separators are skipped, so no component is ever empty.
#[derive(Debug, Clone)]
pub struct Components<'a> {
    path: &'a str,
    offset: usize,
}

impl<'a> Components<'a> {
    pub fn new(path: &'a str) -> Self {
        Self { path, offset: 0 }
    }

    /// Returns the byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the part of the path that has not been consumed yet.
    pub fn rest(&self) -> &'a str {
        &self.path[self.offset..]
    }

    /// Moves the cursor back to the start of the path.
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

impl<'a> Iterator for Components<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let trimmed = self.rest().trim_start_matches(SEPARATOR);
        if trimmed.is_empty() {
            self.offset = self.path.len();
            return None;
        }

        let start = self.path.len() - trimmed.len();
        let len = trimmed.find(SEPARATOR).unwrap_or(trimmed.len());
        self.offset = start + len;
        Some(&self.path[start..self.offset])
    }
}

/// The existing parent directory of a path's final component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParent<'a> {
    pub parent: NodeId,
    pub leaf: &'a str,
}

pub struct Path;

impl Path {
    /// Walks `path` to an existing node.
    /// An empty path resolves to `start`.
    pub fn resolve(table: &NodeTable, path: &str, start: NodeId) -> Result<NodeId> {
        let mut curr = Path::start(table, path, start)?;
        for component in Components::new(path) {
            curr = Path::step(table, curr, component)?;
        }
        log::trace!("resolved {:?} to slot {}", path, curr.slot());
        Ok(curr)
    }

    /// Walks `path` to the existing directory that holds its final component.
    /// The final component itself need not exist.
    pub fn resolve_parent<'a>(
        table: &NodeTable,
        path: &'a str,
        start: NodeId,
    ) -> Result<ResolvedParent<'a>> {
        // A trailing separator leaves no leaf to name.
        if path.ends_with(SEPARATOR) {
            return Err(Error::InvalidName);
        }

        let mut curr = Path::start(table, path, start)?;
        let mut components = Components::new(path);
        let mut leaf = components.next().ok_or(Error::InvalidName)?;
        for next in components {
            curr = Path::step(table, curr, leaf)?;
            Dir::check(table, curr)?;
            leaf = next;
        }

        NodeName::try_from(leaf)?;
        Dir::check(table, curr)?;

        log::trace!(
            "resolved parent of {:?} to slot {}, leaf {:?}",
            path,
            curr.slot(),
            leaf
        );
        Ok(ResolvedParent { parent: curr, leaf })
    }

    fn start(table: &NodeTable, path: &str, start: NodeId) -> Result<NodeId> {
        if is_absolute(path) {
            Ok(table.root())
        } else {
            table.get(start)?;
            Ok(start)
        }
    }

    fn step(table: &NodeTable, curr: NodeId, component: &str) -> Result<NodeId> {
        match component {
            ITSELF => Ok(curr),
            // The root is its own parent for walking purposes.
            PARENT => Ok(table
                .get(curr)?
                .parent()
                .map_or(curr, |slot| table.id_of(slot))),
            name => table
                .find_child(curr.slot(), name)
                .map(|slot| table.id_of(slot))
                .ok_or(Error::NotFound),
        }
    }

    /// Returns an iterator from `id` up to the root, both included.
    pub fn ancestors(table: &NodeTable, id: NodeId) -> Result<Ancestors<'_>> {
        let slot = table.slot_of(id)?;
        Ok(Ancestors {
            table,
            next: Some(slot),
        })
    }

    /// Returns the absolute path of `id`.
    pub fn path_of(table: &NodeTable, id: NodeId) -> Result<String> {
        let mut walk: [SlotIdx; CAPACITY] = [0; CAPACITY];
        let mut depth = 0;
        for (entry, ancestor) in walk.iter_mut().zip(Path::ancestors(table, id)?) {
            *entry = ancestor.slot();
            depth += 1;
        }

        // The last entry is the root.
        let names = &walk[..depth - 1];
        if names.is_empty() {
            return Ok(SEPARATOR.to_string());
        }

        let mut path = String::new();
        for &slot in names.iter().rev() {
            path.push(SEPARATOR);
            path.push_str(table.node_at(slot).name.as_str());
        }
        Ok(path)
    }
}

/// An iterator over a node and its ancestors.
#[derive(Clone)]
pub struct Ancestors<'a> {
    table: &'a NodeTable,
    next: Option<SlotIdx>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let slot = self.next?;
        self.next = self.table.node_at(slot).parent();
        Some(self.table.id_of(slot))
    }
}
