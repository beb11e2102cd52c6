use super::*;

/// How many bytes of content a file can hold.
pub const CONTENT_CAPACITY: usize = 128;

pub struct File;

impl File {
    /// Writes `data` into the file `name` under `parent`, creating the file if it does not exist.
    pub fn write(table: &mut NodeTable, parent: NodeId, name: &str, data: &[u8]) -> Result<NodeId> {
        let name = NodeName::try_from(name)?;
        let parent = Dir::check(table, parent)?;

        if data.len() > CONTENT_CAPACITY {
            return Err(Error::CapacityExceeded);
        }

        let id = match table.find_child(parent, name.as_str()) {
            Some(slot) if table.node_at(slot).is_dir() => return Err(Error::IsADirectory),
            Some(slot) => table.id_of(slot),
            None => Node::create(table, NodeKind::File, parent, name)?,
        };

        table.get_mut(id)?.set_content(data)?;
        log::debug!("wrote {} bytes to slot {}", data.len(), id.slot());
        Ok(id)
    }

    /// Returns the content of the file `id`.
    pub fn read(table: &NodeTable, id: NodeId) -> Result<&[u8]> {
        let node = table.get(id)?;
        if node.is_dir() {
            return Err(Error::IsADirectory);
        }
        Ok(node.content())
    }

    /// Returns the size of the file `id` in bytes.
    pub fn size(table: &NodeTable, id: NodeId) -> Result<usize> {
        File::read(table, id).map(<[u8]>::len)
    }

    /// Finds the file `name` under `parent`.
    pub fn find(table: &NodeTable, parent: NodeId, name: &str) -> Result<NodeId> {
        let parent = Dir::check(table, parent)?;
        let slot = table.find_child(parent, name).ok_or(Error::NotFound)?;
        if table.node_at(slot).is_dir() {
            return Err(Error::IsADirectory);
        }
        Ok(table.id_of(slot))
    }

    pub fn remove(table: &mut NodeTable, parent: NodeId, name: &str) -> Result<NodeId> {
        let name = NodeName::try_from(name)?;
        let id = File::find(table, parent, name.as_str())?;
        Node::remove(table, id)?;
        Ok(id)
    }
}
