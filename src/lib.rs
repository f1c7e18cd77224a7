//! Library backing the `list`, `make-directory`, `copy-in`, `hard-link`,
//! and `remove` binaries, editing a revision-0 ext2 image (1 KiB blocks,
//! single block group) in place.
//!
//! Layered bottom-up: [`session`] owns the raw image; [`bitmap`] and
//! [`path`] are small leaf utilities; [`resolver`], [`alloc`], [`dirent`],
//! and [`filewriter`] build the filesystem operations; [`ops`] composes
//! those into one function per command, which the binaries call directly.

pub mod alloc;
mod bytes;
pub mod dirent;
pub mod error;
pub mod filewriter;
pub mod layout;
pub mod ops;
pub mod path;
pub mod resolver;
pub mod session;

pub mod bitmap;

#[cfg(test)]
mod testutil;

pub use error::Error;
pub use session::Session;
