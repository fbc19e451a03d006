//! The embedding runtime's managed heap, seen from outside.
//!
//! Collection is the host's business. This module only defines the narrow
//! "collect, then tell me how much is live" interface the `gc_collect`
//! operation drives, plus an allocator-backed heap for hosts whose managed
//! memory is the Rust heap itself.

use serde::Serialize;
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

/// The host runtime's collector.
pub trait HostCollector {
    /// Runs a full collection cycle and returns once it has finished.
    fn collect_full(&mut self);

    /// Bytes currently held by the managed heap.
    fn heap_bytes(&self) -> usize;
}

impl<C: HostCollector + ?Sized> HostCollector for &mut C {
    fn collect_full(&mut self) {
        (**self).collect_full()
    }

    fn heap_bytes(&self) -> usize {
        (**self).heap_bytes()
    }
}

/// Live managed heap right after a forced collection, in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GcReport(pub f64);

impl GcReport {
    pub fn from_bytes(bytes: usize) -> Self {
        GcReport(bytes as f64 / 1024.0)
    }

    pub fn kilobytes(self) -> f64 {
        self.0
    }
}

static ALLOCATED_BYTES: AtomicUsize = AtomicUsize::new(0);

/// A `GlobalAlloc` wrapper counting the bytes currently allocated.
///
/// ```rust,ignore
/// #[global_allocator]
/// static GLOBAL: CountingAllocator = CountingAllocator::new(std::alloc::System);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingAllocator<A = System> {
    inner: A,
}

impl<A> CountingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            ALLOCATED_BYTES.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
        ALLOCATED_BYTES.fetch_sub(layout.size(), Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            let old_size = layout.size();
            if new_size > old_size {
                ALLOCATED_BYTES.fetch_add(new_size - old_size, Ordering::Relaxed);
            } else {
                ALLOCATED_BYTES.fetch_sub(old_size - new_size, Ordering::Relaxed);
            }
        }
        new_ptr
    }
}

/// Heap of a host with deterministic deallocation: nothing to sweep, and the
/// live size is whatever [`CountingAllocator`] has outstanding.
///
/// Reports zero unless a `CountingAllocator` is installed as the global
/// allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllocatorHeap;

impl HostCollector for AllocatorHeap {
    fn collect_full(&mut self) {}

    fn heap_bytes(&self) -> usize {
        ALLOCATED_BYTES.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_converts_bytes_to_kilobytes() {
        assert_eq!(GcReport::from_bytes(3 * 1024).kilobytes(), 3.0);
        assert_eq!(GcReport::from_bytes(512).kilobytes(), 0.5);
    }

    #[test]
    fn counting_allocator_tracks_outstanding_bytes() {
        let allocator = CountingAllocator::new(System);
        let layout = Layout::from_size_align(4096, 8).unwrap();
        let before = AllocatorHeap.heap_bytes();
        let ptr = unsafe { allocator.alloc(layout) };
        assert!(!ptr.is_null());
        // Other test threads use the system allocator directly, so only this
        // block moves the counter.
        assert_eq!(AllocatorHeap.heap_bytes(), before + 4096);
        unsafe { allocator.dealloc(ptr, layout) };
        assert_eq!(AllocatorHeap.heap_bytes(), before);
    }
}
