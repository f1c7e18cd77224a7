//! Error taxonomy shared by every command adapter.
//!
//! The teacher's tools report failure with a small `utils::error(bin, msg)
//! -> !` helper that prints one line to stderr and exits `1`; this crate
//! follows the same shape but needs the exit code itself to carry meaning
//! (spec: the process exit code *is* the errno), so [`Error::exit_code`]
//! maps each variant to the matching `libc` constant instead of always
//! exiting `1`.

use std::fmt;
use std::io;
use std::process::exit;

/// A fallible outcome from a core filesystem operation.
#[derive(Debug)]
pub enum Error {
    /// A required path, parent directory, or external file does not exist.
    NotFound,
    /// A path required to be absent already exists.
    AlreadyExists,
    /// A path required to be a regular file is a directory.
    IsADirectory,
    /// No free inode, or insufficient free blocks for the requested budget.
    NoSpace,
    /// The image file could not be opened, read, or written back.
    Io(io::Error),
}

impl Error {
    /// The process exit code for this error, per the command-line surface
    /// (the numeric value of the underlying error code).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound => libc::ENOENT,
            Self::AlreadyExists => libc::EEXIST,
            Self::IsADirectory => libc::EISDIR,
            Self::NoSpace => libc::ENOSPC,
            Self::Io(_) => libc::EIO,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(fmt, "No such file or directory"),
            Self::AlreadyExists => write!(fmt, "File exists"),
            Self::IsADirectory => write!(fmt, "Is a directory"),
            Self::NoSpace => write!(fmt, "No space left on device"),
            Self::Io(e) => write!(fmt, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Prints `{bin}: {err}` to stderr and exits with `err`'s matching code.
/// Every command adapter's `main` funnels its `Result::Err` branch through
/// this, mirroring `utils::error` in the teacher.
pub fn die(bin: &str, err: &Error) -> ! {
    eprintln!("{bin}: {err}");
    exit(err.exit_code());
}
