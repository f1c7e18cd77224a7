//! Owns the in-memory image and hands out typed views over it.
//!
//! `mkfs`'s `Ext2Factory` talks to the image through `Seek`/`read_exact`/
//! `write_all` on a `File` plus ad hoc `unsafe { slice::from_raw_parts }`
//! casts of `#[repr(C, packed)]` structs. This crate reads the whole image
//! into one owned buffer up front instead (spec: typed views over a single
//! owned byte buffer, not a raw `mmap`), and reuses the same cast-based
//! approach to get typed references into it.

use crate::bitmap::{Bitmap, Kind};
use crate::layout::{GroupDescriptor, Inode, Superblock, BLOCK_SIZE, IMAGE_SIZE, INODE_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Byte offset of block number `b` (1-based) from the start of the image.
///
/// Block numbering leaves the image's first [`BLOCK_SIZE`] bytes
/// unaddressed (the unmanaged boot block, block 0), matching the real
/// on-disk convention of starting data at the block immediately after it —
/// the superblock itself is "block 1" by this numbering, at byte offset
/// `BLOCK_SIZE`.
pub const fn block_offset(b: u32) -> usize {
    b as usize * BLOCK_SIZE
}

/// An open disk image: the backing file plus a full in-memory copy of its
/// contents.
pub struct Session {
    path: PathBuf,
    file: File,
    buf: Vec<u8>,
}

/// Casts `size_of::<T>()` bytes at `offset` in `buf` to `&T`.
///
/// # Safety
/// The caller must ensure `offset + size_of::<T>() <= buf.len()` and that
/// the bytes at that range are a valid `T`. Every caller in this crate
/// derives `offset` from the image's own metadata, which is assumed to
/// describe a well-formed ext2 image.
unsafe fn view<T>(buf: &[u8], offset: usize) -> &T {
    &*(buf[offset..].as_ptr() as *const T)
}

/// Mutable counterpart of [`view`].
///
/// # Safety
/// Same requirements as [`view`].
unsafe fn view_mut<T>(buf: &mut [u8], offset: usize) -> &mut T {
    &mut *(buf[offset..].as_mut_ptr() as *mut T)
}

impl Session {
    /// Opens `path`, reading the entire image into memory.
    ///
    /// The image must be exactly [`IMAGE_SIZE`] bytes; anything else is
    /// treated as an I/O error, since this tool neither resizes nor
    /// fabricates a new image.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        let len = file.metadata()?.len();
        if len != IMAGE_SIZE as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected a {IMAGE_SIZE}-byte image, found {len} bytes"),
            ));
        }
        let mut buf = vec![0u8; IMAGE_SIZE];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut buf)?;
        Ok(Self { path, file, buf })
    }

    /// Writes the in-memory image back to the backing file.
    pub fn flush(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.buf)?;
        self.file.flush()
    }

    /// The path this image was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn superblock(&self) -> &Superblock {
        unsafe { view(&self.buf, BLOCK_SIZE) }
    }

    pub fn superblock_mut(&mut self) -> &mut Superblock {
        unsafe { view_mut(&mut self.buf, BLOCK_SIZE) }
    }

    pub fn group_desc(&self) -> &GroupDescriptor {
        unsafe { view(&self.buf, 2 * BLOCK_SIZE) }
    }

    pub fn group_desc_mut(&mut self) -> &mut GroupDescriptor {
        unsafe { view_mut(&mut self.buf, 2 * BLOCK_SIZE) }
    }

    /// The inode bitmap, one byte per eight inodes.
    pub fn inode_bitmap(&self) -> &[u8] {
        let addr = self.group_desc().inode_usage_bitmap_addr;
        &self.buf[block_offset(addr)..block_offset(addr) + BLOCK_SIZE]
    }

    pub fn inode_bitmap_mut(&mut self) -> &mut [u8] {
        let addr = self.group_desc().inode_usage_bitmap_addr;
        let off = block_offset(addr);
        &mut self.buf[off..off + BLOCK_SIZE]
    }

    /// The block bitmap, one byte per eight blocks.
    pub fn block_bitmap(&self) -> &[u8] {
        let addr = self.group_desc().block_usage_bitmap_addr;
        &self.buf[block_offset(addr)..block_offset(addr) + BLOCK_SIZE]
    }

    pub fn block_bitmap_mut(&mut self) -> &mut [u8] {
        let addr = self.group_desc().block_usage_bitmap_addr;
        let off = block_offset(addr);
        &mut self.buf[off..off + BLOCK_SIZE]
    }

    fn inode_offset(&self, inum: u32) -> usize {
        let table = self.group_desc().inode_table_start_addr;
        block_offset(table) + (inum as usize - 1) * INODE_SIZE
    }

    pub fn inode(&self, inum: u32) -> &Inode {
        let off = self.inode_offset(inum);
        unsafe { view(&self.buf, off) }
    }

    pub fn inode_mut(&mut self, inum: u32) -> &mut Inode {
        let off = self.inode_offset(inum);
        unsafe { view_mut(&mut self.buf, off) }
    }

    /// The raw bytes of data block `b` (1-based).
    pub fn block(&self, b: u32) -> &[u8] {
        let off = block_offset(b);
        &self.buf[off..off + BLOCK_SIZE]
    }

    pub fn block_mut(&mut self, b: u32) -> &mut [u8] {
        let off = block_offset(b);
        &mut self.buf[off..off + BLOCK_SIZE]
    }

    /// The superblock's free-block counter.
    pub fn free_blocks_count(&self) -> u32 {
        self.superblock().total_unallocated_blocks
    }

    /// The superblock's free-inode counter.
    pub fn free_inodes_count(&self) -> u32 {
        self.superblock().total_unallocated_inodes
    }

    fn adjust_free_inodes(&mut self, delta: i32) {
        let sb = self.superblock_mut();
        let v = sb.total_unallocated_inodes;
        sb.total_unallocated_inodes = (v as i64 + delta as i64) as u32;
    }

    fn adjust_free_blocks(&mut self, delta: i32) {
        let sb = self.superblock_mut();
        let v = sb.total_unallocated_blocks;
        sb.total_unallocated_blocks = (v as i64 + delta as i64) as u32;
    }

    /// The lowest-numbered free inode, without reserving it.
    pub fn find_free_inode(&mut self) -> Option<u32> {
        let total = self.superblock().total_inodes;
        Bitmap::new(self.inode_bitmap_mut(), Kind::Inode, total).find_lowest_free()
    }

    /// The lowest-numbered free block, without reserving it.
    pub fn find_free_block(&mut self) -> Option<u32> {
        let total = self.superblock().total_blocks;
        Bitmap::new(self.block_bitmap_mut(), Kind::Block, total).find_lowest_free()
    }

    /// Finds and marks the lowest-numbered free inode, decrementing the
    /// superblock's free-inode counter.
    pub fn alloc_inode(&mut self) -> Option<u32> {
        let n = self.find_free_inode()?;
        let total = self.superblock().total_inodes;
        Bitmap::new(self.inode_bitmap_mut(), Kind::Inode, total).mark(n);
        self.adjust_free_inodes(-1);
        Some(n)
    }

    /// Finds and marks the lowest-numbered free block, decrementing the
    /// superblock's free-block counter.
    pub fn alloc_block(&mut self) -> Option<u32> {
        let n = self.find_free_block()?;
        let total = self.superblock().total_blocks;
        Bitmap::new(self.block_bitmap_mut(), Kind::Block, total).mark(n);
        self.adjust_free_blocks(-1);
        Some(n)
    }

    /// Clears inode `n`'s bitmap bit and increments the free-inode counter.
    pub fn free_inode(&mut self, n: u32) {
        let total = self.superblock().total_inodes;
        Bitmap::new(self.inode_bitmap_mut(), Kind::Inode, total).unmark(n);
        self.adjust_free_inodes(1);
    }

    /// Clears block `n`'s bitmap bit and increments the free-block counter.
    pub fn free_block(&mut self, n: u32) {
        let total = self.superblock().total_blocks;
        Bitmap::new(self.block_bitmap_mut(), Kind::Block, total).unmark(n);
        self.adjust_free_blocks(1);
    }
}
