// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared, bulk-constructed element storage.
//!
//! Two front ends over the same scheme (allocate, construct every slot, hand
//! out an `Arc`, destroy + free when the last holder drops):
//!
//! - [`allocate_and_construct_shared`]: statically typed, derefs to `[T]`.
//! - [`allocate_and_construct_shared_elements`]: driven only by a
//!   [`DataType`], through its `construct`/`destroy` operations.
//!
//! Requests that cannot be satisfied (layout overflow, more than
//! `MAX_ALLOCATION_BYTES`, allocator returning null) fail with
//! [`Error::AllocationFailed`]; nothing is partially constructed.

use crate::buffer::{IterationBufferKind, IterationBufferPointer};
use crate::config::MAX_ALLOCATION_BYTES;
use crate::descriptor::{DataType, DataTypeOperations};
use crate::element::ElementType;
use crate::error::{Error, Result};
use std::alloc::{self, Layout};
use std::mem;
use std::ops::Deref;
use std::ptr::{self, NonNull};
use std::sync::Arc;

/// How freshly allocated slots are initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementInitialization {
    /// Construct each slot with `Default`.
    #[default]
    DefaultInit,
    /// Zero the whole allocation (padding included), then construct.
    ValueInit,
}

fn allocation_failed(count: usize, element_size: usize) -> Error {
    Error::AllocationFailed {
        count,
        element_size,
    }
}

fn array_layout(count: usize, size: usize, alignment: usize) -> Result<Layout> {
    let bytes = size
        .checked_mul(count)
        .filter(|bytes| *bytes <= MAX_ALLOCATION_BYTES)
        .ok_or_else(|| allocation_failed(count, size))?;
    Layout::from_size_align(bytes, alignment).map_err(|_| allocation_failed(count, size))
}

/// Raw allocation; zero-sized layouts get a dangling, aligned pointer.
fn raw_allocate(layout: Layout, init: ElementInitialization, count: usize, size: usize) -> Result<NonNull<u8>> {
    if layout.size() == 0 {
        // Alignment is a non-zero power of two, so this address is non-null and aligned.
        return NonNull::new(layout.align() as *mut u8).ok_or_else(|| allocation_failed(count, size));
    }
    // SAFETY: layout has non-zero size.
    let pointer = unsafe {
        match init {
            ElementInitialization::DefaultInit => alloc::alloc(layout),
            ElementInitialization::ValueInit => alloc::alloc_zeroed(layout),
        }
    };
    NonNull::new(pointer).ok_or_else(|| {
        log::debug!(
            "[alloc] allocator refused {} bytes ({} x {})",
            layout.size(),
            count,
            size
        );
        allocation_failed(count, size)
    })
}

/// # Safety
///
/// `pointer` must come from `raw_allocate` with the same layout.
unsafe fn raw_deallocate(pointer: NonNull<u8>, layout: Layout) {
    if layout.size() != 0 {
        alloc::dealloc(pointer.as_ptr(), layout);
    }
}

/// Frees a raw allocation if construction unwinds.
struct AllocationGuard {
    pointer: NonNull<u8>,
    layout: Layout,
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        // SAFETY: came from `raw_allocate` with this layout; no live slots remain.
        unsafe { raw_deallocate(self.pointer, self.layout) };
    }
}

struct OwnedElements<T> {
    pointer: NonNull<T>,
    len: usize,
    layout: Layout,
}

// SAFETY: OwnedElements uniquely owns its slots, like Box<[T]>.
unsafe impl<T: Send> Send for OwnedElements<T> {}
unsafe impl<T: Sync> Sync for OwnedElements<T> {}

impl<T> Drop for OwnedElements<T> {
    fn drop(&mut self) {
        // SAFETY: the first `len` slots are constructed; Arc runs this exactly once.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.pointer.as_ptr(), self.len));
            raw_deallocate(self.pointer.cast(), self.layout);
        }
    }
}

/// Reference-counted array of `T` built by [`allocate_and_construct_shared`].
pub struct SharedElements<T> {
    inner: Arc<OwnedElements<T>>,
}

impl<T> Clone for SharedElements<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedElements<T> {
    /// Mutable access while this is the only holder.
    pub fn get_mut(&mut self) -> Option<&mut [T]> {
        let inner = Arc::get_mut(&mut self.inner)?;
        // SAFETY: unique holder; slots are initialized.
        Some(unsafe { std::slice::from_raw_parts_mut(inner.pointer.as_ptr(), inner.len) })
    }

    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<T> Deref for SharedElements<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: slots are initialized and live as long as the Arc.
        unsafe { std::slice::from_raw_parts(self.inner.pointer.as_ptr(), self.inner.len) }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SharedElements<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Allocates and constructs `count` contiguous elements of `T`.
///
/// ```rust
/// use datatype::{allocate_and_construct_shared, ElementInitialization};
///
/// let zeros = allocate_and_construct_shared::<i32>(2, ElementInitialization::ValueInit).unwrap();
/// assert_eq!(&*zeros, &[0, 0]);
/// ```
pub fn allocate_and_construct_shared<T: ElementType>(
    count: usize,
    init: ElementInitialization,
) -> Result<SharedElements<T>> {
    let size = std::mem::size_of::<T>();
    let layout = array_layout(count, size, std::mem::align_of::<T>())?;
    let pointer = raw_allocate(layout, init, count, size)?.cast::<T>();
    // `len` counts constructed slots, so an unwinding `T::default()` drops
    // exactly those and frees the storage.
    let mut owned = OwnedElements {
        pointer,
        len: 0,
        layout,
    };
    for index in 0..count {
        // SAFETY: index < count, slot is allocated and uninitialized.
        unsafe { ptr::write(pointer.as_ptr().add(index), T::default()) };
        owned.len += 1;
    }
    Ok(SharedElements {
        inner: Arc::new(owned),
    })
}

struct ErasedElements {
    data_type: DataType,
    operations: &'static DataTypeOperations,
    pointer: NonNull<u8>,
    len: usize,
    layout: Layout,
}

// SAFETY: element types are Send + Sync (ElementType bound); the storage is
// owned exclusively by this record.
unsafe impl Send for ErasedElements {}
unsafe impl Sync for ErasedElements {}

impl Drop for ErasedElements {
    fn drop(&mut self) {
        // SAFETY: `len` slots of `data_type` were constructed at `pointer`.
        unsafe {
            (self.operations.destroy[IterationBufferKind::Contiguous])(
                ptr::null_mut(),
                self.len,
                IterationBufferPointer::contiguous(self.pointer.as_ptr()),
                None,
            );
            raw_deallocate(self.pointer, self.layout);
        }
    }
}

/// Reference-counted, type-erased element array.
#[derive(Clone)]
pub struct SharedErasedElements {
    inner: Arc<ErasedElements>,
}

impl SharedErasedElements {
    pub fn data_type(&self) -> DataType {
        self.inner.data_type
    }

    pub fn len(&self) -> usize {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Address of element 0. Writing through it is the caller's business
    /// (other holders may be reading).
    pub fn as_ptr(&self) -> *mut u8 {
        self.inner.pointer.as_ptr()
    }

    /// Contiguous buffer pointer over the whole array.
    pub fn buffer_pointer(&self) -> IterationBufferPointer {
        IterationBufferPointer::contiguous(self.as_ptr())
    }

    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Typed view, when `T` is the element type.
    pub fn as_slice<T: ElementType>(&self) -> Option<&[T]> {
        if !self.inner.data_type.matches::<T>() {
            return None;
        }
        // SAFETY: same type, slots initialized, lifetime tied to the Arc.
        Some(unsafe {
            std::slice::from_raw_parts(self.inner.pointer.as_ptr().cast::<T>(), self.inner.len)
        })
    }
}

impl std::fmt::Debug for SharedErasedElements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedErasedElements")
            .field("data_type", &self.inner.data_type)
            .field("len", &self.inner.len)
            .finish()
    }
}

/// Allocates and constructs `count` elements of a runtime data type.
pub fn allocate_and_construct_shared_elements(
    count: usize,
    init: ElementInitialization,
    data_type: DataType,
) -> Result<SharedErasedElements> {
    let operations = data_type.operations().ok_or(Error::InvalidDataType)?;
    let layout = array_layout(count, operations.size, operations.alignment)?;
    let pointer = raw_allocate(layout, init, count, operations.size)?;
    // `construct` drops its own partial work on unwind; the guard frees the storage.
    let guard = AllocationGuard { pointer, layout };
    // SAFETY: `count` uninitialized slots of this type at `pointer`.
    unsafe {
        (operations.construct[IterationBufferKind::Contiguous])(
            ptr::null_mut(),
            count,
            IterationBufferPointer::contiguous(pointer.as_ptr()),
            None,
        );
    }
    mem::forget(guard);
    Ok(SharedErasedElements {
        inner: Arc::new(ErasedElements {
            data_type,
            operations,
            pointer,
            len: count,
            layout,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::descriptor_of;

    #[test]
    fn test_layout_overflow_is_reported() {
        assert_eq!(
            array_layout(usize::MAX, 8, 8),
            Err(Error::AllocationFailed {
                count: usize::MAX,
                element_size: 8
            })
        );
        assert!(array_layout(MAX_ALLOCATION_BYTES / 4 + 1, 4, 4).is_err());
    }

    #[test]
    fn test_zero_count() {
        let empty = allocate_and_construct_shared::<String>(0, ElementInitialization::DefaultInit)
            .expect("empty allocation");
        assert!(empty.is_empty());
        let erased = allocate_and_construct_shared_elements(
            0,
            ElementInitialization::ValueInit,
            descriptor_of::<f64>(),
        )
        .expect("empty erased allocation");
        assert!(erased.is_empty());
    }

    #[test]
    fn test_unspecified_rejected() {
        let result = allocate_and_construct_shared_elements(
            4,
            ElementInitialization::DefaultInit,
            DataType::default(),
        );
        assert!(matches!(result, Err(Error::InvalidDataType)));
    }

    #[test]
    fn test_get_mut_requires_unique_holder() {
        let mut first =
            allocate_and_construct_shared::<u16>(3, ElementInitialization::DefaultInit).expect("alloc");
        first.get_mut().expect("unique")[1] = 7;
        let second = first.clone();
        assert_eq!(second.holders(), 2);
        assert!(first.get_mut().is_none());
        assert_eq!(&*second, &[0, 7, 0]);
    }
}
