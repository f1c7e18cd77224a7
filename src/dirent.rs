//! Directory-entry insertion, removal, and the scan primitive both share.
//!
//! Grounded on `ext2_utils.c`'s `add_dir_entry`/`rm_dir_entry` and the
//! block/record walk duplicated across `ext2_ls.c`/`ext2_mkdir.c`, unified
//! here into one traversal every caller (list, insert, remove, resolve)
//! builds on.

use crate::bytes::{read_u16, read_u32, write_u16, write_u32};
use crate::error::Error;
use crate::layout::{round_up, DIRECT_PTRS, DIR_ENTRY_HEADER_SIZE};
use crate::session::Session;

/// One directory-entry record as read off disk, plus where it lives.
#[derive(Clone, Copy)]
pub struct RawEntry {
    pub block_num: u32,
    pub offset: usize,
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    pub file_type: u8,
}

impl RawEntry {
    /// This record's actual (unpadded-to-slack) size.
    pub fn actual_size(&self) -> usize {
        actual_size(self.name_len as usize)
    }
}

/// The padded size of a record header plus a name of length `name_len`.
pub fn actual_size(name_len: usize) -> usize {
    round_up(DIR_ENTRY_HEADER_SIZE + name_len, 4)
}

fn read_record(block: &[u8], offset: usize) -> RawEntry {
    RawEntry {
        block_num: 0,
        offset,
        inode: read_u32(block, offset),
        rec_len: read_u16(block, offset + 4),
        name_len: block[offset + 6],
        file_type: block[offset + 7],
    }
}

/// Reads the name of `entry` out of `block`.
pub fn entry_name<'a>(entry: &RawEntry, block: &'a [u8]) -> &'a [u8] {
    let start = entry.offset + DIR_ENTRY_HEADER_SIZE;
    &block[start..start + entry.name_len as usize]
}

/// Lazily walks every record of every direct-pointer block of a directory
/// inode, in on-disk order: pointer 0 first, then pointer 1, and so on,
/// each scanned start to end.
pub struct Entries<'a> {
    session: &'a Session,
    ptrs: [u32; DIRECT_PTRS],
    ptr_idx: usize,
    offset: usize,
}

impl<'a> Entries<'a> {
    pub fn new(session: &'a Session, ptrs: [u32; DIRECT_PTRS]) -> Self {
        Self {
            session,
            ptrs,
            ptr_idx: 0,
            offset: 0,
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = RawEntry;

    fn next(&mut self) -> Option<RawEntry> {
        loop {
            if self.ptr_idx >= DIRECT_PTRS {
                return None;
            }
            let ptr = self.ptrs[self.ptr_idx];
            if ptr == 0 || self.offset >= crate::layout::BLOCK_SIZE {
                self.ptr_idx += 1;
                self.offset = 0;
                continue;
            }
            let block = self.session.block(ptr);
            let mut entry = read_record(block, self.offset);
            entry.block_num = ptr;
            self.offset += entry.rec_len as usize;
            return Some(entry);
        }
    }
}

pub(crate) fn write_record(block: &mut [u8], offset: usize, inode: u32, rec_len: u16, name: &[u8], file_type: u8) {
    write_u32(block, offset, inode);
    write_u16(block, offset + 4, rec_len);
    block[offset + 6] = name.len() as u8;
    block[offset + 7] = file_type;
    let start = offset + DIR_ENTRY_HEADER_SIZE;
    block[start..start + name.len()].copy_from_slice(name);
}

/// Zeroes `block_num` and writes a fresh `.`/`..` pair into it: `.`
/// referencing `self_inum`, `..` referencing `parent_inum` and extending
/// to the block boundary. Used both when a directory is created and to
/// build the fixture image tests open.
pub fn init_directory_block(session: &mut Session, block_num: u32, self_inum: u32, parent_inum: u32) {
    let block = session.block_mut(block_num);
    block.fill(0);
    let dot_len = actual_size(1) as u16;
    write_record(block, 0, self_inum, dot_len, b".", crate::layout::FT_DIR);
    let dotdot_len = (crate::layout::BLOCK_SIZE as u16) - dot_len;
    write_record(block, dot_len as usize, parent_inum, dotdot_len, b"..", crate::layout::FT_DIR);
}

/// Inserts `(child_inum, name)` into the directory `parent_inum` refers to.
///
/// Scans every existing block across all twelve direct pointers for slack
/// large enough to hold the new record before falling back to allocating a
/// fresh block in the first free direct-pointer slot. A directory whose
/// twelve direct pointers are all in use, none with enough slack, has no
/// room left for another entry; this is the "undefined" case the
/// directory-entry manager's design leaves to callers to avoid, surfaced
/// here as [`Error::NoSpace`] rather than left undefined.
pub fn insert(
    session: &mut Session,
    parent_inum: u32,
    child_inum: u32,
    name: &str,
    file_type: u8,
) -> Result<(), Error> {
    let name_bytes = name.as_bytes();
    let needed = actual_size(name_bytes.len());
    let ptrs = session.inode(parent_inum).direct_block_ptrs;

    for &ptr in ptrs.iter() {
        if ptr == 0 {
            continue;
        }
        let mut offset = 0usize;
        while offset < crate::layout::BLOCK_SIZE {
            let (rec_len, actual) = {
                let block = session.block(ptr);
                let entry = read_record(block, offset);
                (entry.rec_len as usize, entry.actual_size())
            };
            let slack = rec_len - actual;
            if slack >= needed {
                let new_offset = offset + actual;
                let block = session.block_mut(ptr);
                write_u16(block, offset + 4, actual as u16);
                write_record(block, new_offset, child_inum, slack as u16, name_bytes, file_type);
                return Ok(());
            }
            offset += rec_len;
        }
    }

    let free_idx = ptrs.iter().position(|&p| p == 0).ok_or(Error::NoSpace)?;
    let new_block = session.alloc_block().ok_or(Error::NoSpace)?;
    {
        let block = session.block_mut(new_block);
        block.fill(0);
        write_record(block, 0, child_inum, crate::layout::BLOCK_SIZE as u16, name_bytes, file_type);
    }
    let mut ptrs = ptrs;
    ptrs[free_idx] = new_block;
    let inode = session.inode_mut(parent_inum);
    inode.direct_block_ptrs = ptrs;
    inode.used_sectors += 2;
    inode.size_low += crate::layout::BLOCK_SIZE as u32;
    Ok(())
}

/// Removes the entry named `target_name` from the directory `parent_inum`
/// refers to, merging its record length into its predecessor's. Returns
/// the removed entry's inode number.
///
/// A record with no predecessor in its block (the block's first record)
/// has no record to merge into; it is tombstoned in place by zeroing its
/// inode field instead. None of the commands built on this ever hit that
/// path, since the first entry of a populated directory block is always
/// `.`, which is never removed.
pub fn remove(session: &mut Session, parent_inum: u32, target_name: &str) -> Result<u32, Error> {
    let ptrs = session.inode(parent_inum).direct_block_ptrs;
    let target = target_name.as_bytes();

    for &ptr in ptrs.iter() {
        if ptr == 0 {
            continue;
        }
        let mut offset = 0usize;
        let mut prev_offset: Option<usize> = None;
        while offset < crate::layout::BLOCK_SIZE {
            let entry = read_record(session.block(ptr), offset);
            let matches = entry.inode != 0 && entry_name(&entry, session.block(ptr)) == target;
            if matches {
                let removed = entry.inode;
                match prev_offset {
                    Some(prev) => {
                        let prev_len = read_u16(session.block(ptr), prev + 4);
                        write_u16(session.block_mut(ptr), prev + 4, prev_len + entry.rec_len);
                    }
                    None => {
                        write_u32(session.block_mut(ptr), offset, 0);
                    }
                }
                return Ok(removed);
            }
            prev_offset = Some(offset);
            offset += entry.rec_len as usize;
        }
    }
    Err(Error::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture_image;

    #[test]
    fn insert_then_scan_finds_entry() {
        let mut session = fixture_image();
        let root = crate::layout::ROOT_INODE;
        let child = session.alloc_inode().unwrap();
        insert(&mut session, root, child, "a", crate::layout::FT_DIR).unwrap();
        let ptrs = session.inode(root).direct_block_ptrs;
        let names: Vec<String> = Entries::new(&session, ptrs)
            .filter(|e| e.inode != 0)
            .map(|e| String::from_utf8(entry_name(&e, session.block(e.block_num)).to_vec()).unwrap())
            .collect();
        assert!(names.contains(&"a".to_string()));
    }

    #[test]
    fn remove_tombstones_by_merging_into_predecessor() {
        let mut session = fixture_image();
        let root = crate::layout::ROOT_INODE;
        let child = session.alloc_inode().unwrap();
        insert(&mut session, root, child, "a", crate::layout::FT_DIR).unwrap();
        let removed = remove(&mut session, root, "a").unwrap();
        assert_eq!(removed, child);
        let ptrs = session.inode(root).direct_block_ptrs;
        let names: Vec<u32> = Entries::new(&session, ptrs).map(|e| e.inode).collect();
        assert!(!names.contains(&child));
    }

    #[test]
    fn remove_missing_name_fails() {
        let mut session = fixture_image();
        let root = crate::layout::ROOT_INODE;
        assert!(matches!(remove(&mut session, root, "missing"), Err(Error::NotFound)));
    }
}
