use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::{
    free_list::{FreeList, PoolStats},
    size_class,
};

/// Buffers kept per class before further returns are dropped.
pub const MAX_CACHED_PER_CLASS: usize = 64;

#[derive(Debug, Clone, Error)]
pub enum NewPoolError {
    #[error("invalid param")]
    InvalidParam,
}

/// Pool of reusable `Vec<T>` buffers binned into doubling size classes.
///
/// Each class caches buffers whose capacity falls between its own
/// capacity and the next class's. All operations are safe for any
/// number of concurrent callers and never block.
pub struct SlicePool<T> {
    sizes: Vec<usize>,
    classes: Vec<FreeList<Vec<T>>>,
    oversize_allocs: AtomicUsize,
    undersize_drops: AtomicUsize,
}
impl<T> SlicePool<T> {
    /// Classes double from `min_size` up to the first capacity
    /// `>= max_size`. Fails when `min_size` is zero or the range is
    /// inverted.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self, NewPoolError> {
        if min_size == 0 || max_size < min_size {
            return Err(NewPoolError::InvalidParam);
        }
        let sizes = size_class::class_sizes(min_size, max_size);
        let classes = sizes
            .iter()
            .map(|&cap| FreeList::new(MAX_CACHED_PER_CLASS, move || Vec::with_capacity(cap)))
            .collect();
        Ok(Self {
            sizes,
            classes,
            oversize_allocs: AtomicUsize::new(0),
            undersize_drops: AtomicUsize::new(0),
        })
    }

    pub fn class_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn class_sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// An empty buffer of capacity `>= size`, reusing a cached one when
    /// the matching class has any. Requests beyond the largest class
    /// bypass the pool and are sized exactly.
    pub fn get(&self, size: usize) -> Vec<T> {
        let Some(class) = size_class::fit_class(&self.sizes, size) else {
            self.oversize_allocs.fetch_add(1, Ordering::Relaxed);
            return Vec::with_capacity(size);
        };
        let mut buf = self.classes[class].take();
        buf.clear();
        buf
    }

    /// Shelve `buf` for reuse under the class its capacity files into.
    ///
    /// Buffers smaller than the smallest class are dropped; buffers
    /// beyond the largest class fold into the top class. Retention is
    /// best-effort: a full class drops the buffer.
    pub fn put(&self, mut buf: Vec<T>) {
        let Some(class) = size_class::home_class(&self.sizes, buf.capacity()) else {
            self.undersize_drops.fetch_add(1, Ordering::Relaxed);
            return;
        };
        buf.clear();
        self.classes[class].store(buf);
    }

    /// Like [`get`](Self::get), but the buffer returns to the pool on
    /// drop.
    pub fn get_scoped(&self, size: usize) -> PooledSlice<'_, T> {
        PooledSlice {
            pool: self,
            buf: Some(self.get(size)),
        }
    }

    /// Counter totals across all classes.
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            misses: self.oversize_allocs.load(Ordering::Relaxed),
            drops: self.undersize_drops.load(Ordering::Relaxed),
            ..PoolStats::default()
        };
        for class in &self.classes {
            let s = class.stats();
            stats.size += s.size;
            stats.hits += s.hits;
            stats.misses += s.misses;
            stats.returns += s.returns;
            stats.drops += s.drops;
        }
        stats
    }
}
impl<T> core::fmt::Debug for SlicePool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlicePool")
            .field("sizes", &self.sizes)
            .field("classes", &self.classes)
            .finish_non_exhaustive()
    }
}

/// Buffer borrowed from a [`SlicePool`], returned to it on drop.
pub struct PooledSlice<'a, T> {
    pool: &'a SlicePool<T>,
    buf: Option<Vec<T>>,
}
impl<T> PooledSlice<'_, T> {
    /// Detach the buffer so it is not returned to the pool.
    pub fn take(mut self) -> Vec<T> {
        self.buf.take().unwrap()
    }
}
impl<T> std::ops::Deref for PooledSlice<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        self.buf.as_ref().unwrap()
    }
}
impl<T> std::ops::DerefMut for PooledSlice<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_mut().unwrap()
    }
}
impl<T> Drop for PooledSlice<'_, T> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.put(buf);
        }
    }
}
