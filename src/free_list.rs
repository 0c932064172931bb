use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::queue::ArrayQueue;

/// Thread-safe cache of reusable values with a factory for misses.
///
/// The cache is bounded and lossy: storing into a full cache drops the
/// value instead of blocking.
pub struct FreeList<T> {
    slots: ArrayQueue<T>,
    new: Box<dyn Fn() -> T + Send + Sync>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    returns: AtomicUsize,
    drops: AtomicUsize,
}
impl<T> FreeList<T> {
    /// `slots` must be nonzero.
    pub fn new(slots: usize, new: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            slots: ArrayQueue::new(slots),
            new: Box::new(new),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            returns: AtomicUsize::new(0),
            drops: AtomicUsize::new(0),
        }
    }

    pub fn try_take(&self) -> Option<T> {
        match self.slots.pop() {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// A cached value, or a fresh one from the factory on a miss.
    pub fn take(&self) -> T {
        match self.try_take() {
            Some(value) => value,
            None => (self.new)(),
        }
    }

    /// Returns `false` when the cache was full and `value` was dropped.
    pub fn store(&self, value: T) -> bool {
        match self.slots.push(value) {
            Ok(()) => {
                self.returns.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(_) => {
                self.drops.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            size: self.slots.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}
impl<T> core::fmt::Debug for FreeList<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FreeList")
            .field("len", &self.slots.len())
            .field("slots", &self.slots.capacity())
            .finish_non_exhaustive()
    }
}

/// Counter snapshot. Monitoring only; counters are relaxed and carry no
/// ordering guarantees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolStats {
    /// Values currently cached.
    pub size: usize,
    /// Takes served from the cache.
    pub hits: usize,
    /// Takes that found the cache empty.
    pub misses: usize,
    /// Stores accepted into the cache.
    pub returns: usize,
    /// Stores discarded.
    pub drops: usize,
}
impl PoolStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.;
        }
        self.hits as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_miss_invokes_factory() {
        let list = FreeList::new(4, || Vec::<u8>::with_capacity(8));
        let buf = list.take();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 8);
        let stats = list.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_store_then_take() {
        let list = FreeList::new(4, Vec::<u8>::new);
        let mut buf = Vec::with_capacity(16);
        buf.push(7);
        let ptr = buf.as_ptr();
        assert!(list.store(buf));
        assert_eq!(list.len(), 1);
        let buf = list.take();
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(buf, vec![7]);
        assert_eq!(list.stats().hits, 1);
        assert!(list.is_empty());
        assert!(list.try_take().is_none());
        assert_eq!(list.stats().misses, 1);
    }

    #[test]
    fn test_store_drops_when_full() {
        let list = FreeList::new(1, Vec::<u8>::new);
        assert!(list.store(vec![1]));
        assert!(!list.store(vec![2]));
        let stats = list.stats();
        assert_eq!(stats.returns, 1);
        assert_eq!(stats.drops, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_hit_rate() {
        let list = FreeList::new(2, Vec::<u8>::new);
        assert_eq!(list.stats().hit_rate(), 0.);
        let buf = list.take();
        list.store(buf);
        let _ = list.take();
        assert_eq!(list.stats().hit_rate(), 0.5);
    }
}
