//! On-disk structures for a revision-0 ext2 filesystem, 1 KiB blocks, single
//! block group.
//!
//! These mirror the real on-disk layout byte-for-byte so that a [`Session`]
//! can treat a region of its buffer as one of these types directly, the way
//! `mkfs`'s `ext2::Superblock`/`BlockGroupDescriptor`/`INode` do.
//!
//! [`Session`]: crate::session::Session

/// Size of a block, in bytes. This tool only ever operates on 1 KiB-block
/// images.
pub const BLOCK_SIZE: usize = 1024;
/// Size of the whole image, in bytes: one block group's worth of metadata
/// and data, nothing more.
pub const IMAGE_SIZE: usize = 128 * 1024;
/// Number of direct block pointers in an inode.
pub const DIRECT_PTRS: usize = 12;
/// Number of 32-bit pointers that fit in one indirect block.
pub const PTRS_PER_BLOCK: usize = BLOCK_SIZE / 4;
/// Inode number of the root directory.
pub const ROOT_INODE: u32 = 2;
/// First inode number not reserved for filesystem bookkeeping.
pub const FIRST_NON_RESERVED_INODE: u32 = 11;
/// Size of a single on-disk inode record, in bytes.
pub const INODE_SIZE: usize = 128;

/// The ext2 signature, found in a valid superblock.
pub const EXT2_SIGNATURE: u16 = 0xef53;

/// Inode mode bit: regular file.
pub const S_IFREG: u16 = 0x8000;
/// Inode mode bit: directory.
pub const S_IFDIR: u16 = 0x4000;
/// Inode mode mask isolating the file-type bits.
pub const S_IFMT: u16 = 0xf000;

/// Directory entry type hint: unknown.
pub const FT_UNKNOWN: u8 = 0;
/// Directory entry type hint: regular file.
pub const FT_REG_FILE: u8 = 1;
/// Directory entry type hint: directory.
pub const FT_DIR: u8 = 2;

/// The header size of a directory entry record, before the name bytes.
pub const DIR_ENTRY_HEADER_SIZE: usize = 8;

/// Rounds `n` up to the next multiple of `align` (`align` a power of two).
pub const fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

/// Rounds `a / b` up to the nearest integer.
pub const fn ceil_division(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// The ext2 superblock. Lives at a fixed offset of [`BLOCK_SIZE`] bytes into
/// the image and occupies exactly one block.
///
/// Field layout follows the on-disk format exactly (packed, little-endian on
/// every platform this tool is built for); this crate does not attempt to
/// support big-endian hosts, matching the original implementation's use of
/// raw pointer casts over the image.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct Superblock {
    pub total_inodes: u32,
    pub total_blocks: u32,
    pub superuser_blocks: u32,
    pub total_unallocated_blocks: u32,
    pub total_unallocated_inodes: u32,
    pub superblock_block_number: u32,
    pub block_size_log: u32,
    pub fragment_size_log: u32,
    pub blocks_per_group: u32,
    pub fragments_per_group: u32,
    pub inodes_per_group: u32,
    pub last_mount_timestamp: u32,
    pub last_write_timestamp: u32,
    pub mount_count_since_fsck: u16,
    pub mount_count_before_fsck: u16,
    pub signature: u16,
    pub fs_state: u16,
    pub error_action: u16,
    pub minor_version: u16,
    pub last_fsck_timestamp: u32,
    pub fsck_interval: u32,
    pub os_id: u32,
    pub major_version: u32,
    pub uid_reserved: u16,
    pub gid_reserved: u16,

    // Revision-1 fields. This tool only ever sees revision-0 images
    // (spec'd: single group, fixed 128-byte inode), so it reads these but
    // never relies on them varying.
    pub first_non_reserved_inode: u32,
    pub inode_size: u16,
    pub superblock_group: u16,
    pub optional_features: u32,
    pub required_features: u32,
    pub write_required_features: u32,
    pub filesystem_id: [u8; 16],
    pub volume_name: [u8; 16],
    pub last_mount_path: [u8; 64],
    pub compression_algorithms: u32,
    pub files_preallocate_count: u8,
    pub directories_preallocate_count: u8,
    pub(crate) _unused: u16,
    pub journal_id: [u8; 16],
    pub journal_inode: u32,
    pub journal_device: u32,
    pub orphan_inode_head: u32,

    pub(crate) _padding: [u8; 788],
}

const _: () = assert!(core::mem::size_of::<Superblock>() == BLOCK_SIZE);

impl Superblock {
    /// Returns whether the signature field identifies this as an ext2
    /// superblock.
    pub fn is_valid(&self) -> bool {
        let sig = self.signature;
        sig == EXT2_SIGNATURE
    }
}

/// The (only) block group descriptor. Occupies the block immediately after
/// the superblock's block.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct GroupDescriptor {
    pub block_usage_bitmap_addr: u32,
    pub inode_usage_bitmap_addr: u32,
    pub inode_table_start_addr: u32,
    pub unallocated_blocks_number: u16,
    pub unallocated_inodes_number: u16,
    pub directories_number: u16,
    pub(crate) _padding: [u8; 14],
}

const _: () = assert!(core::mem::size_of::<GroupDescriptor>() == 32);

/// A single 128-byte inode record.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct Inode {
    pub mode: u16,
    pub uid: u16,
    pub size_low: u32,
    pub ctime: u32,
    pub mtime: u32,
    pub atime: u32,
    pub dtime: u32,
    pub gid: u16,
    pub hard_links_count: u16,
    /// Number of 512-byte sectors used by this inode (`2 * total_blocks`
    /// for a 1 KiB-block filesystem).
    pub used_sectors: u32,
    pub flags: u32,
    pub os_specific_0: u32,
    pub direct_block_ptrs: [u32; DIRECT_PTRS],
    pub singly_indirect_block_ptr: u32,
    pub doubly_indirect_block_ptr: u32,
    pub triply_indirect_block_ptr: u32,
    pub generation: u32,
    pub extended_attributes_block: u32,
    pub size_high: u32,
    pub fragment_addr: u32,
    pub os_specific_1: [u8; 12],
}

const _: () = assert!(core::mem::size_of::<Inode>() == INODE_SIZE);

impl Inode {
    /// An all-zero inode record: unused mode, zero size, no links, every
    /// pointer clear. Every field is a plain integer or byte array, so the
    /// all-zero bit pattern is always valid.
    pub fn zeroed() -> Self {
        unsafe { core::mem::zeroed() }
    }

    /// Returns the file-type bits of the mode field.
    pub fn file_type(&self) -> u16 {
        let mode = self.mode;
        mode & S_IFMT
    }

    pub fn is_dir(&self) -> bool {
        self.file_type() == S_IFDIR
    }

    pub fn is_reg(&self) -> bool {
        self.file_type() == S_IFREG
    }

    /// Returns the file size in bytes (low 32 bits only: this tool never
    /// produces or expects files large enough to need `size_high`).
    pub fn size(&self) -> u32 {
        self.size_low
    }
}
