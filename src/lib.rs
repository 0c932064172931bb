use std::sync::OnceLock;

use crate::pool::SlicePool;

pub mod free_list;
pub mod pool;
pub mod size_class;

pub const DEFAULT_MIN_SIZE: usize = 1;
pub const DEFAULT_MAX_SIZE: usize = 1 << 20;

static DEFAULT_POOL: OnceLock<SlicePool<u8>> = OnceLock::new();

/// Process-wide byte pool behind [`get`]/[`put`], built on first use
/// with the default size range.
pub fn default_pool() -> &'static SlicePool<u8> {
    DEFAULT_POOL.get_or_init(|| SlicePool::new(DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE).unwrap())
}

pub fn get(size: usize) -> Vec<u8> {
    default_pool().get(size)
}

pub fn put(buf: Vec<u8>) {
    default_pool().put(buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_layout() {
        assert_eq!(default_pool().class_count(), 21);
        assert_eq!(default_pool().class_sizes().last(), Some(&DEFAULT_MAX_SIZE));
    }

    #[test]
    fn test_default_pool_round_trip() {
        let mut buf = get(100);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 100);
        buf.resize(100, 0);
        put(buf);
        let buf = get(100);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 100);
    }

    #[test]
    fn test_default_pool_oversize() {
        let buf = get(DEFAULT_MAX_SIZE + 1);
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), DEFAULT_MAX_SIZE + 1);
        put(buf);
    }
}
