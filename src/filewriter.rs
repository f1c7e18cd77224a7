//! Streams bytes from an external source into a reserved inode's blocks.
//!
//! Grounded on `ext2_cp.c`'s write loop, generalized to take any `impl
//! Read` rather than only a native `File` (spec supplement), so the same
//! routine backs both `copy-in` and tests that write from an in-memory
//! `Cursor`.

use crate::bytes::read_u32;
use crate::layout::{BLOCK_SIZE, PTRS_PER_BLOCK};
use crate::session::Session;
use std::io::{self, Read};

/// Fills `inum`'s already-reserved blocks (direct, then indirect) with up
/// to `len` bytes read from `src`. The final block written is only
/// partially overwritten when `len` is not a multiple of [`BLOCK_SIZE`];
/// the rest of its previous content is left untouched.
pub fn write_file(session: &mut Session, inum: u32, mut src: impl Read, len: usize) -> io::Result<()> {
    let direct_ptrs = session.inode(inum).direct_block_ptrs;
    let indirect_ptr = session.inode(inum).singly_indirect_block_ptr;
    let mut remaining = len;

    for ptr in direct_ptrs {
        if remaining == 0 || ptr == 0 {
            break;
        }
        let chunk = remaining.min(BLOCK_SIZE);
        src.read_exact(&mut session.block_mut(ptr)[..chunk])?;
        remaining -= chunk;
    }

    if remaining > 0 && indirect_ptr != 0 {
        let entries: Vec<u32> = {
            let blk = session.block(indirect_ptr);
            (0..PTRS_PER_BLOCK).map(|i| read_u32(blk, i * 4)).collect()
        };
        for ptr in entries {
            if remaining == 0 || ptr == 0 {
                break;
            }
            let chunk = remaining.min(BLOCK_SIZE);
            src.read_exact(&mut session.block_mut(ptr)[..chunk])?;
            remaining -= chunk;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::alloc_file;
    use crate::layout::S_IFREG;
    use crate::testutil::fixture_image;
    use std::io::Cursor;

    #[test]
    fn writes_into_direct_blocks_only() {
        let mut session = fixture_image();
        let data = vec![7u8; 1500];
        let inum = alloc_file(&mut session, data.len() as u32, S_IFREG).unwrap();
        write_file(&mut session, inum, Cursor::new(&data), data.len()).unwrap();
        let ptrs = session.inode(inum).direct_block_ptrs;
        assert_eq!(&session.block(ptrs[0])[..BLOCK_SIZE], &data[..BLOCK_SIZE]);
        assert_eq!(&session.block(ptrs[1])[..500], &data[BLOCK_SIZE..]);
    }

    #[test]
    fn writes_through_the_indirect_table() {
        let mut session = fixture_image();
        let size = 13 * 1024;
        let data = vec![3u8; size];
        let inum = alloc_file(&mut session, size as u32, S_IFREG).unwrap();
        write_file(&mut session, inum, Cursor::new(&data), size).unwrap();
        let indirect = session.inode(inum).singly_indirect_block_ptr;
        assert_ne!(indirect, 0);
        let last_block = read_u32(session.block(indirect), 0);
        assert_eq!(&session.block(last_block)[..1024], &data[12 * 1024..]);
    }
}
