//! A line-oriented command interpreter over the filesystem.

#[cfg(test)]
mod tests;

use std::io::{self, Write};

use crate::fs::{self, NodeId, NodeKind, ResolvedParent, Vfs};

const HELP: &str = "\
help                    show this help
about                   show the shell version
ls [path]               list a directory
cat <path>              print a file
touch <path>            create an empty file
rm <path>               remove a file
echo <text> [> <path>]  print text or write it to a file
stat <path>             show node details
df                      show node usage
pwd                     print the current directory
cd [path]               change the current directory
mkdir <path>            create a directory
rmdir <path>            remove an empty directory
exit                    leave the shell";

const ABOUT: &str = concat!("ramvfs shell ", env!("CARGO_PKG_VERSION"));

/// What the caller should do after a line has been executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug)]
enum ShellError {
    Io(io::Error),
    Fs(fs::Error),
    MissingOperand,
}

impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<fs::Error> for ShellError {
    fn from(err: fs::Error) -> Self {
        Self::Fs(err)
    }
}

type Result<T> = core::result::Result<T, ShellError>;

/// Shell state between lines.
pub struct Shell {
    cwd: NodeId,
}

impl Shell {
    pub fn new(vfs: &Vfs) -> Self {
        Self { cwd: vfs.root() }
    }

    /// Returns the current directory.
    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    /// Executes one command line, writing its output to `out`.
    /// Command failures are reported on `out`; only failures of `out` itself are returned.
    pub fn execute<W: Write>(&mut self, vfs: &mut Vfs, line: &str, out: &mut W) -> io::Result<Flow> {
        if !vfs.contains(self.cwd) {
            log::warn!("current directory was removed, returning to root");
            self.cwd = vfs.root();
        }

        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let res = match command {
            "" => Ok(()),
            "exit" => return Ok(Flow::Exit),
            "help" => writeln!(out, "{}", HELP).map_err(ShellError::from),
            "about" => writeln!(out, "{}", ABOUT).map_err(ShellError::from),
            "ls" => self.ls(vfs, arg, out),
            "cat" => self.cat(vfs, arg, out),
            "touch" => self.touch(vfs, arg),
            "rm" => self.rm(vfs, arg),
            "echo" => self.echo(vfs, arg, out),
            "stat" => self.stat(vfs, arg, out),
            "df" => Shell::df(vfs, out),
            "pwd" => self.pwd(vfs, out),
            "cd" => self.cd(vfs, arg),
            "mkdir" => self.mkdir(vfs, arg),
            "rmdir" => self.rmdir(vfs, arg),
            command => {
                writeln!(out, "{}: command not found", command)?;
                Ok(())
            }
        };

        match res {
            Ok(()) => {}
            Err(ShellError::Io(err)) => return Err(err),
            Err(ShellError::Fs(err)) => {
                log::debug!("{} {:?} failed: {:?}", command, arg, err);
                let target = error_target(command, arg);
                writeln!(
                    out,
                    "{}: {}: {}",
                    command,
                    target,
                    io::Error::from_raw_os_error(err.into())
                )?;
            }
            Err(ShellError::MissingOperand) => writeln!(out, "{}: missing operand", command)?,
        }
        Ok(Flow::Continue)
    }

    fn resolve_parent<'a>(&self, vfs: &Vfs, path: &'a str) -> Result<ResolvedParent<'a>> {
        if path.is_empty() {
            return Err(ShellError::MissingOperand);
        }
        Ok(vfs.resolve_parent(path, self.cwd)?)
    }

    fn resolve(&self, vfs: &Vfs, path: &str) -> Result<NodeId> {
        if path.is_empty() {
            return Err(ShellError::MissingOperand);
        }
        Ok(vfs.resolve(path, self.cwd)?)
    }

    fn ls<W: Write>(&self, vfs: &Vfs, path: &str, out: &mut W) -> Result<()> {
        let id = vfs.resolve(path, self.cwd)?;
        if !vfs.is_directory(id)? {
            writeln!(out, "{}", vfs.name_of(id)?)?;
            return Ok(());
        }

        for child in vfs.children(id)? {
            let name = vfs.name_of(child)?;
            match vfs.kind(child)? {
                NodeKind::Dir => writeln!(out, "{}/", name)?,
                NodeKind::File => writeln!(out, "{}", name)?,
            }
        }
        Ok(())
    }

    fn cat<W: Write>(&self, vfs: &Vfs, path: &str, out: &mut W) -> Result<()> {
        let id = self.resolve(vfs, path)?;
        let data = vfs.content(id)?;
        out.write_all(data)?;
        if !data.is_empty() && !data.ends_with(b"\n") {
            writeln!(out)?;
        }
        Ok(())
    }

    fn touch(&self, vfs: &mut Vfs, path: &str) -> Result<()> {
        let ResolvedParent { parent, leaf } = self.resolve_parent(vfs, path)?;
        match vfs.find_child(parent, leaf) {
            Ok(_) => Ok(()),
            Err(fs::Error::NotFound) => {
                vfs.write_file(parent, leaf, b"")?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn rm(&self, vfs: &mut Vfs, path: &str) -> Result<()> {
        let ResolvedParent { parent, leaf } = self.resolve_parent(vfs, path)?;
        Ok(vfs.remove_file(parent, leaf)?)
    }

    fn echo<W: Write>(&self, vfs: &mut Vfs, arg: &str, out: &mut W) -> Result<()> {
        let Some((text, path)) = arg.split_once('>') else {
            writeln!(out, "{}", arg)?;
            return Ok(());
        };

        let path = path.trim();
        // Only one redirect per line.
        if path.contains('>') {
            return Err(fs::Error::InvalidName.into());
        }

        let mut data = text.trim().as_bytes().to_vec();
        data.push(b'\n');
        let ResolvedParent { parent, leaf } = self.resolve_parent(vfs, path)?;
        vfs.write_file(parent, leaf, &data)?;
        Ok(())
    }

    fn stat<W: Write>(&self, vfs: &Vfs, path: &str, out: &mut W) -> Result<()> {
        let id = self.resolve(vfs, path)?;
        writeln!(out, "  Path: {}", vfs.path_of(id)?)?;
        match vfs.kind(id)? {
            NodeKind::Dir => {
                writeln!(out, "  Type: directory")?;
                writeln!(out, "  Entries: {}", vfs.list_count(id)?)?;
            }
            NodeKind::File => {
                writeln!(out, "  Type: file")?;
                writeln!(out, "  Size: {}", vfs.node_size(id)?)?;
            }
        }
        writeln!(out, "  Slot: {}", id.slot())?;
        Ok(())
    }

    fn df<W: Write>(vfs: &Vfs, out: &mut W) -> Result<()> {
        let used = vfs.capacity() - vfs.available();
        writeln!(
            out,
            "Nodes: {}/{} used, {} free",
            used,
            vfs.capacity(),
            vfs.available()
        )?;
        Ok(())
    }

    fn pwd<W: Write>(&self, vfs: &Vfs, out: &mut W) -> Result<()> {
        writeln!(out, "{}", vfs.path_of(self.cwd)?)?;
        Ok(())
    }

    fn cd(&mut self, vfs: &Vfs, path: &str) -> Result<()> {
        if path.is_empty() {
            self.cwd = vfs.root();
            return Ok(());
        }

        let id = vfs.resolve(path, self.cwd)?;
        if !vfs.is_directory(id)? {
            return Err(fs::Error::NotADirectory.into());
        }
        self.cwd = id;
        Ok(())
    }

    fn mkdir(&self, vfs: &mut Vfs, path: &str) -> Result<()> {
        let ResolvedParent { parent, leaf } = self.resolve_parent(vfs, path)?;
        vfs.create_directory(parent, leaf)?;
        Ok(())
    }

    fn rmdir(&self, vfs: &mut Vfs, path: &str) -> Result<()> {
        let ResolvedParent { parent, leaf } = self.resolve_parent(vfs, path)?;
        Ok(vfs.remove_directory(parent, leaf)?)
    }
}

/// Returns the argument an error message should name.
fn error_target<'a>(command: &str, arg: &'a str) -> &'a str {
    match (command, arg.split_once('>')) {
        ("echo", Some((_, path))) => path.trim(),
        _ => arg,
    }
}
