//! Absolute path resolution against the image.
//!
//! Grounded on `ext2_utils.c`'s `get_inode_index`-by-path walk: from the
//! root inode, each path segment is looked up in the current directory's
//! blocks before advancing, restarting the per-directory scan from direct
//! pointer 0 on every match (the original never matches a name spanning
//! two blocks, a quirk this crate's design keeps rather than "fixes").

use crate::dirent::{entry_name, Entries, RawEntry};
use crate::error::Error;
use crate::path::{segments, split_parent};
use crate::layout::ROOT_INODE;
use crate::session::Session;

/// Resolves `path` to its terminal inode number.
pub fn resolve(session: &Session, path: &str) -> Result<u32, Error> {
    if path == "/" {
        return Ok(ROOT_INODE);
    }
    let mut current = ROOT_INODE;
    for seg in segments(path) {
        if !session.inode(current).is_dir() {
            return Err(Error::NotFound);
        }
        let ptrs = session.inode(current).direct_block_ptrs;
        let found = Entries::new(session, ptrs).find(|e| {
            e.inode != 0 && entry_name(e, session.block(e.block_num)) == seg.as_bytes()
        });
        current = found.ok_or(Error::NotFound)?.inode;
    }
    Ok(current)
}

/// Resolves `path` to the directory entry record naming it, rather than
/// its inode — the record also carries the block and offset it lives at,
/// used by hard-link to read off the target's inode number and by remove
/// to locate the record to delete.
pub fn resolve_entry(session: &Session, path: &str) -> Result<RawEntry, Error> {
    let (parent_path, name) = split_parent(path).ok_or(Error::NotFound)?;
    let parent = resolve(session, &parent_path)?;
    if !session.inode(parent).is_dir() {
        return Err(Error::NotFound);
    }
    let ptrs = session.inode(parent).direct_block_ptrs;
    Entries::new(session, ptrs)
        .find(|e| e.inode != 0 && entry_name(e, session.block(e.block_num)) == name.as_bytes())
        .ok_or(Error::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirent::insert;
    use crate::testutil::fixture_image;

    #[test]
    fn root_resolves_directly() {
        let session = fixture_image();
        assert_eq!(resolve(&session, "/").unwrap(), ROOT_INODE);
    }

    #[test]
    fn missing_top_level_path_fails() {
        let session = fixture_image();
        assert!(matches!(resolve(&session, "/nope"), Err(Error::NotFound)));
    }

    #[test]
    fn resolves_freshly_inserted_entry() {
        let mut session = fixture_image();
        let child = session.alloc_inode().unwrap();
        insert(&mut session, ROOT_INODE, child, "a", crate::layout::FT_DIR).unwrap();
        assert_eq!(resolve(&session, "/a").unwrap(), child);
    }

    #[test]
    fn resolve_entry_returns_the_record() {
        let mut session = fixture_image();
        let child = session.alloc_inode().unwrap();
        insert(&mut session, ROOT_INODE, child, "a", crate::layout::FT_DIR).unwrap();
        let entry = resolve_entry(&session, "/a").unwrap();
        assert_eq!(entry.inode, child);
    }
}
