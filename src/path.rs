//! Byte-slice path splitting, with no allocation.
//!
//! Grounded on `ext2_utils.c`'s `get_pdir_name`/`pathname_final`, which
//! copy the parent prefix and final segment into freshly allocated
//! strings; this version returns indices into the caller's own slice
//! instead (spec: redefine path utilities on byte slices with explicit
//! length, no allocation).

/// An absolute path split into segments, skipping empty ones (so `//a//b/`
/// yields `["a", "b"]`).
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Splits `path` into its parent directory path and final segment.
///
/// `path` must be absolute. Returns `None` for `/` itself, which has no
/// parent. The original source derives the parent by scanning from an
/// out-of-bounds index when the path lacks a leading `/`; this crate
/// instead requires the command adapters to reject non-absolute paths
/// before they ever reach here.
pub fn split_parent(path: &str) -> Option<(String, &str)> {
    debug_assert!(path.starts_with('/'), "path must be absolute: {path}");
    let last = segments(path).last()?;
    let end = {
        let start = path.rfind(last).expect("segment came from this path");
        start
    };
    let mut parent_end = end;
    while parent_end > 1 && path.as_bytes()[parent_end - 1] == b'/' {
        parent_end -= 1;
    }
    let parent = if parent_end <= 1 {
        "/".to_string()
    } else {
        path[..parent_end].to_string()
    };
    Some((parent, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_skips_empty() {
        let v: Vec<_> = segments("/a//b/").collect();
        assert_eq!(v, vec!["a", "b"]);
    }

    #[test]
    fn root_has_no_parent() {
        assert_eq!(split_parent("/"), None);
    }

    #[test]
    fn top_level_parent_is_root() {
        let (parent, name) = split_parent("/a").unwrap();
        assert_eq!(parent, "/");
        assert_eq!(name, "a");
    }

    #[test]
    fn nested_parent() {
        let (parent, name) = split_parent("/a/b/c").unwrap();
        assert_eq!(parent, "/a/b");
        assert_eq!(name, "c");
    }
}
