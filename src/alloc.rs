//! Inode and block reservation/release.
//!
//! Grounded on `ext2_utils.c`'s `alloc_file`/`dealloc_file`, with the
//! deallocator's direct-pointer walk widened to cover all twelve slots
//! unconditionally (the original stops once a zero pointer is seen, which
//! misses a legitimate hole at index zero).

use crate::bytes::{read_u32, write_u32};
use crate::error::Error;
use crate::layout::{ceil_division, Inode, DIRECT_PTRS, PTRS_PER_BLOCK};
use crate::session::Session;

/// Data blocks plus (if needed) one singly-indirect table, for a file of
/// `size` bytes.
pub fn block_budget(size: usize) -> usize {
    let data_blocks = ceil_division(size, crate::layout::BLOCK_SIZE);
    data_blocks + if data_blocks > DIRECT_PTRS { 1 } else { 0 }
}

/// Reserves an inode plus its direct and (if needed) indirect data blocks
/// for a file of `size` bytes and `mode`. Returns the new inode number.
pub fn alloc_file(session: &mut Session, size: u32, mode: u16) -> Result<u32, Error> {
    let data_blocks = ceil_division(size as usize, crate::layout::BLOCK_SIZE);
    let needs_indirect = data_blocks > DIRECT_PTRS;
    let total_blocks = data_blocks + if needs_indirect { 1 } else { 0 };

    if (session.free_blocks_count() as usize) < total_blocks {
        return Err(Error::NoSpace);
    }
    let inum = session.alloc_inode().ok_or(Error::NoSpace)?;

    let mut inode = Inode::zeroed();
    inode.mode = mode;
    inode.size_low = size;
    inode.hard_links_count = 1;

    let mut ptrs = [0u32; DIRECT_PTRS];
    for slot in ptrs.iter_mut().take(data_blocks.min(DIRECT_PTRS)) {
        *slot = session.alloc_block().ok_or(Error::NoSpace)?;
    }
    inode.direct_block_ptrs = ptrs;

    if needs_indirect {
        let indirect = session.alloc_block().ok_or(Error::NoSpace)?;
        let extra = data_blocks - DIRECT_PTRS;
        let blk = session.block_mut(indirect);
        for slot in blk.chunks_mut(4) {
            slot.copy_from_slice(&0u32.to_le_bytes());
        }
        for i in 0..extra {
            let b = session.alloc_block().ok_or(Error::NoSpace)?;
            write_u32(session.block_mut(indirect), i * 4, b);
        }
        inode.singly_indirect_block_ptr = indirect;
    }

    inode.used_sectors = (total_blocks as u32) * 2;
    *session.inode_mut(inum) = inode;
    Ok(inum)
}

/// Releases every data block owned by `inum` (direct pointers, the
/// indirect table's entries, and the indirect table itself), zeroing the
/// inode's pointers and size. Does not free the inode number itself —
/// removal only does that once the link count has reached zero.
pub fn dealloc_file(session: &mut Session, inum: u32) {
    let ptrs = session.inode(inum).direct_block_ptrs;
    for p in ptrs {
        if p != 0 {
            session.free_block(p);
        }
    }

    let indirect = session.inode(inum).singly_indirect_block_ptr;
    if indirect != 0 {
        let entries: Vec<u32> = {
            let blk = session.block(indirect);
            (0..PTRS_PER_BLOCK).map(|i| read_u32(blk, i * 4)).collect()
        };
        for e in entries {
            if e != 0 {
                session.free_block(e);
            }
        }
        session.free_block(indirect);
    }

    let inode = session.inode_mut(inum);
    inode.direct_block_ptrs = [0; DIRECT_PTRS];
    inode.singly_indirect_block_ptr = 0;
    inode.size_low = 0;
    inode.used_sectors = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_fits_in_direct_pointers() {
        assert_eq!(block_budget(1), 1);
        assert_eq!(block_budget(1024), 1);
        assert_eq!(block_budget(1025), 2);
        assert_eq!(block_budget(12 * 1024), 12);
    }

    #[test]
    fn budget_needs_indirect_table() {
        assert_eq!(block_budget(13 * 1024), 14);
    }
}
