//! Builds a small, valid rev-0 image in a temp file for tests to open,
//! rather than shelling out to a real `mkfs` (this crate doesn't implement
//! filesystem creation; it only edits existing images).
//!
//! Layout: block 1 superblock, block 2 group descriptor, block 3 block
//! bitmap, block 4 inode bitmap, blocks 5-20 the 128-entry inode table,
//! block 21 the root directory's sole data block, blocks 22-128 free.

use crate::dirent;
use crate::layout::{
    GroupDescriptor, Inode, Superblock, BLOCK_SIZE, EXT2_SIGNATURE, IMAGE_SIZE, S_IFDIR,
};
use crate::session::Session;
use std::fs::File;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

const BLOCK_BITMAP_BLOCK: u32 = 3;
const INODE_BITMAP_BLOCK: u32 = 4;
const INODE_TABLE_START: u32 = 5;
const ROOT_DATA_BLOCK: u32 = 21;
const TOTAL_INODES: u32 = 128;
// Block numbering is 1-based starting at the block *after* the image's
// leading 1 KiB (the unmanaged boot block), so only `IMAGE_SIZE / BLOCK_SIZE
// - 1` blocks are addressable, matching real ext2's `s_first_data_block = 1`
// convention for 1 KiB block sizes.
const TOTAL_BLOCKS: u32 = (IMAGE_SIZE / BLOCK_SIZE) as u32 - 1;
const USED_BLOCKS: u32 = 21;
const RESERVED_INODES: u32 = 10;

fn set_bit(bits: &mut [u8], n: u32) {
    let idx = (n - 1) as usize;
    bits[idx / 8] |= 1 << (idx % 8);
}

fn temp_path() -> std::path::PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("ext2tools-fixture-{}-{n}.img", std::process::id()))
}

/// Returns a freshly opened [`Session`] over a valid, minimal rev-0 image
/// whose root directory already contains `.` and `..`.
pub(crate) fn fixture_image() -> Session {
    let path = temp_path();
    {
        let mut f = File::create(&path).unwrap();
        f.write_all(&vec![0u8; IMAGE_SIZE]).unwrap();
    }
    let mut session = Session::open(&path).unwrap();

    *session.superblock_mut() = Superblock {
        total_inodes: TOTAL_INODES,
        total_blocks: TOTAL_BLOCKS,
        superuser_blocks: 0,
        total_unallocated_blocks: TOTAL_BLOCKS - USED_BLOCKS,
        total_unallocated_inodes: TOTAL_INODES - RESERVED_INODES,
        superblock_block_number: 1,
        block_size_log: 0,
        fragment_size_log: 0,
        blocks_per_group: TOTAL_BLOCKS,
        fragments_per_group: TOTAL_BLOCKS,
        inodes_per_group: TOTAL_INODES,
        last_mount_timestamp: 0,
        last_write_timestamp: 0,
        mount_count_since_fsck: 0,
        mount_count_before_fsck: u16::MAX,
        signature: EXT2_SIGNATURE,
        fs_state: 1,
        error_action: 1,
        minor_version: 0,
        last_fsck_timestamp: 0,
        fsck_interval: 0,
        os_id: 0,
        major_version: 0,
        uid_reserved: 0,
        gid_reserved: 0,
        first_non_reserved_inode: 11,
        inode_size: 128,
        superblock_group: 0,
        optional_features: 0,
        required_features: 0,
        write_required_features: 0,
        filesystem_id: [0; 16],
        volume_name: [0; 16],
        last_mount_path: [0; 64],
        compression_algorithms: 0,
        files_preallocate_count: 0,
        directories_preallocate_count: 0,
        _unused: 0,
        journal_id: [0; 16],
        journal_inode: 0,
        journal_device: 0,
        orphan_inode_head: 0,
        _padding: [0; 788],
    };

    *session.group_desc_mut() = GroupDescriptor {
        block_usage_bitmap_addr: BLOCK_BITMAP_BLOCK,
        inode_usage_bitmap_addr: INODE_BITMAP_BLOCK,
        inode_table_start_addr: INODE_TABLE_START,
        unallocated_blocks_number: (TOTAL_BLOCKS - USED_BLOCKS) as u16,
        unallocated_inodes_number: (TOTAL_INODES - RESERVED_INODES) as u16,
        directories_number: 1,
        _padding: [0; 14],
    };

    {
        let bits = session.block_bitmap_mut();
        for n in 1..=USED_BLOCKS {
            set_bit(bits, n);
        }
    }
    {
        let bits = session.inode_bitmap_mut();
        for n in 1..=RESERVED_INODES {
            set_bit(bits, n);
        }
    }

    let mut root = Inode::zeroed();
    root.mode = S_IFDIR;
    root.size_low = BLOCK_SIZE as u32;
    root.hard_links_count = 2;
    root.used_sectors = 2;
    let mut ptrs = [0u32; crate::layout::DIRECT_PTRS];
    ptrs[0] = ROOT_DATA_BLOCK;
    root.direct_block_ptrs = ptrs;
    *session.inode_mut(crate::layout::ROOT_INODE) = root;

    dirent::init_directory_block(
        &mut session,
        ROOT_DATA_BLOCK,
        crate::layout::ROOT_INODE,
        crate::layout::ROOT_INODE,
    );

    session
}
