//! Zero-initialised, 64-byte aligned element buffer

use super::{ALIGNMENT, padded_len};
use crate::dtype::Element;
use crate::error::{Error, Result};
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Heap buffer aligned to [`ALIGNMENT`] bytes with explicit trailing padding
///
/// The allocation holds `padded_len::<T>(len)` elements, all of them zeroed at
/// creation. `Deref` exposes the first `len` (logical) elements; the padded
/// tail is reachable through [`AlignedBuffer::padded`] and
/// [`AlignedBuffer::padded_mut`], so lane-wide kernels never have to touch
/// memory outside what was allocated.
pub struct AlignedBuffer<T: Element> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
}

// SAFETY: AlignedBuffer uniquely owns its allocation, like Vec<T>.
unsafe impl<T: Element> Send for AlignedBuffer<T> {}
// SAFETY: shared access only hands out &[T].
unsafe impl<T: Element> Sync for AlignedBuffer<T> {}

impl<T: Element> AlignedBuffer<T> {
    /// Allocate a zeroed buffer of `len` logical elements
    pub fn zeros(len: usize) -> Result<Self> {
        let capacity = padded_len::<T>(len)?;
        if capacity == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len: 0,
                capacity: 0,
            });
        }

        let layout = Self::layout(capacity)?;
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc_zeroed(layout) } as *mut T;
        let ptr = NonNull::new(raw).ok_or(Error::OutOfMemory {
            size: layout.size(),
        })?;

        Ok(Self { ptr, len, capacity })
    }

    /// Allocate a buffer holding a copy of `data`
    pub fn from_slice(data: &[T]) -> Result<Self> {
        let mut buf = Self::zeros(data.len())?;
        buf.copy_from_slice(data);
        Ok(buf)
    }

    fn layout(capacity: usize) -> Result<Layout> {
        let size = capacity
            .checked_mul(std::mem::size_of::<T>())
            .ok_or_else(|| {
                Error::invalid_argument("len", format!("{capacity} elements overflow usize"))
            })?;
        Layout::from_size_align(size, ALIGNMENT)
            .map_err(|e| Error::invalid_argument("len", e.to_string()))
    }

    /// Number of logical elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no logical elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated elements, including padding
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All allocated elements, including the zeroed padding
    #[inline]
    pub fn padded(&self) -> &[T] {
        // SAFETY: ptr is valid (or dangling with capacity 0) for `capacity` initialised elements.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }

    /// Mutable view of all allocated elements, including padding
    #[inline]
    pub fn padded_mut(&mut self) -> &mut [T] {
        // SAFETY: as in `padded`, and &mut self guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }

    /// Raw pointer to the first element
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }
}

impl<T: Element> Deref for AlignedBuffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.padded()[..self.len]
    }
}

impl<T: Element> DerefMut for AlignedBuffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        let len = self.len;
        &mut self.padded_mut()[..len]
    }
}

impl<T: Element> Clone for AlignedBuffer<T> {
    fn clone(&self) -> Self {
        let mut copy = match Self::zeros(self.len) {
            Ok(buf) => buf,
            Err(_) => {
                let size = self.capacity * std::mem::size_of::<T>();
                std::alloc::handle_alloc_error(
                    Layout::from_size_align(size, ALIGNMENT).unwrap_or(Layout::new::<T>()),
                )
            }
        };
        copy.padded_mut().copy_from_slice(self.padded());
        copy
    }
}

impl<T: Element> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if self.capacity == 0 {
            return;
        }
        if let Ok(layout) = Self::layout(self.capacity) {
            // SAFETY: allocated in `zeros` with this exact layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

impl<T: Element> fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("data", &self.deref())
            .finish()
    }
}
