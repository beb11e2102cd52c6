use crate::arena;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Arena(arena::Error),

    // Name
    InvalidName,

    // Lookup
    NotFound,
    AlreadyExists,

    // Dir
    NotEmpty,
    IsADirectory,
    NotADirectory,

    // Slot or content bounds
    CapacityExceeded,
}

impl From<arena::Error> for Error {
    fn from(err: arena::Error) -> Self {
        match err {
            arena::Error::Full => Self::CapacityExceeded,
            err => Self::Arena(err),
        }
    }
}

impl From<Error> for libc::c_int {
    fn from(err: Error) -> Self {
        match err {
            Error::Arena(err) => err.into(),
            Error::InvalidName => libc::EINVAL,
            Error::NotFound => libc::ENOENT,
            Error::AlreadyExists => libc::EEXIST,
            Error::NotEmpty => libc::ENOTEMPTY,
            Error::IsADirectory => libc::EISDIR,
            Error::NotADirectory => libc::ENOTDIR,
            Error::CapacityExceeded => libc::ENOSPC,
        }
    }
}
