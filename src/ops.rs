//! One function per command, each composing a small number of library
//! operations. The five binaries under `src/bin/` are thin wrappers around
//! these — argv parsing and error-to-exit-code translation only.

use crate::alloc::{alloc_file, dealloc_file};
use crate::dirent::{self, entry_name, init_directory_block, Entries};
use crate::error::Error;
use crate::filewriter::write_file;
use crate::layout::{BLOCK_SIZE, FT_DIR, FT_REG_FILE, S_IFDIR, S_IFREG};
use crate::path::{segments, split_parent};
use crate::resolver::{resolve, resolve_entry};
use crate::session::Session;
use std::fs::File;

/// Lists `path`'s contents: its own final segment if it names a regular
/// file, or every live directory-entry name in on-disk order otherwise.
pub fn list(session: &Session, path: &str) -> Result<Vec<String>, Error> {
    let inum = resolve(session, path)?;
    let inode = session.inode(inum);
    if inode.is_reg() {
        let name = segments(path).last().unwrap_or(path);
        return Ok(vec![name.to_string()]);
    }
    let ptrs = inode.direct_block_ptrs;
    Ok(Entries::new(session, ptrs)
        .filter(|e| e.inode != 0)
        .map(|e| String::from_utf8_lossy(entry_name(&e, session.block(e.block_num))).into_owned())
        .collect())
}

/// Creates a new, empty directory at `path`.
pub fn make_directory(session: &mut Session, path: &str) -> Result<(), Error> {
    if resolve(session, path).is_ok() {
        return Err(Error::AlreadyExists);
    }
    let (parent_path, name) = split_parent(path).ok_or(Error::AlreadyExists)?;
    let parent = resolve(session, &parent_path)?;
    if !session.inode(parent).is_dir() {
        return Err(Error::NotFound);
    }

    let inum = alloc_file(session, BLOCK_SIZE as u32, S_IFDIR)?;
    let ptrs = session.inode(inum).direct_block_ptrs;
    let block_num = ptrs[0];
    init_directory_block(session, block_num, inum, parent);
    // one link from ".", one from the entry about to be inserted in the
    // parent; alloc_file already counted the latter.
    session.inode_mut(inum).hard_links_count = 2;

    dirent::insert(session, parent, inum, name, FT_DIR)?;
    session.inode_mut(parent).hard_links_count += 1;
    Ok(())
}

/// Copies the external file at `native_path` into the image at
/// `image_path`.
pub fn copy_in(session: &mut Session, native_path: &str, image_path: &str) -> Result<(), Error> {
    let mut native = File::open(native_path).map_err(|_| Error::NotFound)?;
    let len = native.metadata().map_err(|_| Error::NotFound)?.len();

    if resolve(session, image_path).is_ok() {
        return Err(Error::AlreadyExists);
    }
    let (parent_path, name) = split_parent(image_path).ok_or(Error::AlreadyExists)?;
    let parent = resolve(session, &parent_path)?;
    if !session.inode(parent).is_dir() {
        return Err(Error::NotFound);
    }

    let inum = alloc_file(session, len as u32, S_IFREG)?;
    write_file(session, inum, &mut native, len as usize)?;
    dirent::insert(session, parent, inum, name, FT_REG_FILE)?;
    Ok(())
}

/// Adds a second name, `new_path`, for the regular file at `target`.
pub fn hard_link(session: &mut Session, target: &str, new_path: &str) -> Result<(), Error> {
    let target_entry = resolve_entry(session, target)?;
    let target_inum = target_entry.inode;
    if !session.inode(target_inum).is_reg() {
        return Err(Error::IsADirectory);
    }
    if resolve(session, new_path).is_ok() {
        return Err(Error::AlreadyExists);
    }
    let (parent_path, name) = split_parent(new_path).ok_or(Error::AlreadyExists)?;
    let parent = resolve(session, &parent_path)?;
    if !session.inode(parent).is_dir() {
        return Err(Error::NotFound);
    }

    let links = session.inode(target_inum).hard_links_count;
    session.inode_mut(target_inum).hard_links_count = links + 1;
    dirent::insert(session, parent, target_inum, name, FT_REG_FILE)?;
    Ok(())
}

/// Unlinks the regular file at `path`, deallocating it once its last name
/// is gone.
pub fn remove(session: &mut Session, path: &str) -> Result<(), Error> {
    let entry = resolve_entry(session, path)?;
    let inum = entry.inode;
    if !session.inode(inum).is_reg() {
        return Err(Error::IsADirectory);
    }
    let (parent_path, name) = split_parent(path).ok_or(Error::NotFound)?;
    let parent = resolve(session, &parent_path)?;

    let removed = dirent::remove(session, parent, name)?;
    let links = session.inode(removed).hard_links_count - 1;
    session.inode_mut(removed).hard_links_count = links;
    if links == 0 {
        dealloc_file(session, removed);
        session.free_inode(removed);
    }
    Ok(())
}
