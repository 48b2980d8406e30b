// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Buffer iteration: how a logical run of elements maps onto memory.
//!
//! A bulk call addresses `count` elements through one
//! [`IterationBufferPointer`] per participating buffer. The
//! [`IterationBufferKind`] of the call decides which fields are used:
//!
//! ```text
//! Contiguous : addr(i) = pointer + i * element_size
//! Strided    : addr(i) = pointer + i * byte_stride        (stride may be 0,
//!                                                          negative or smaller
//!                                                          than the element)
//! Indexed    : addr(i) = pointer + byte_offsets[i]
//! ```
//!
//! Nothing here knows the element type; the element size is passed in by the
//! generated elementwise functions.

use std::ptr;

/// Addressing mode of a bulk elementwise call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IterationBufferKind {
    Contiguous = 0,
    Strided = 1,
    Indexed = 2,
}

impl IterationBufferKind {
    /// Number of kinds (size of every dispatch table).
    pub const COUNT: usize = 3;

    pub const ALL: [IterationBufferKind; Self::COUNT] =
        [Self::Contiguous, Self::Strided, Self::Indexed];
}

/// Base address plus addressing parameters for one buffer of a bulk call.
///
/// The pointer is untyped and carries no lifetime: whoever builds it keeps the
/// memory (and the offset list for `Indexed`) alive for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct IterationBufferPointer {
    /// Address of element 0 (or the origin for indexed offsets).
    pub pointer: *mut u8,
    /// Byte distance between consecutive elements (`Strided` only).
    pub byte_stride: isize,
    /// One byte offset per element (`Indexed` only).
    pub byte_offsets: *const isize,
}

impl IterationBufferPointer {
    /// Pointer for a `Contiguous` call.
    pub fn contiguous(pointer: *mut u8) -> Self {
        Self {
            pointer,
            byte_stride: 0,
            byte_offsets: ptr::null(),
        }
    }

    /// Pointer for a `Strided` call.
    pub fn strided(pointer: *mut u8, byte_stride: isize) -> Self {
        Self {
            pointer,
            byte_stride,
            byte_offsets: ptr::null(),
        }
    }

    /// Pointer for an `Indexed` call; `byte_offsets` must outlive the call and
    /// hold at least `count` entries.
    pub fn indexed(pointer: *mut u8, byte_offsets: &[isize]) -> Self {
        Self {
            pointer,
            byte_stride: 0,
            byte_offsets: byte_offsets.as_ptr(),
        }
    }

    /// Strided pointer over a typed slice, stride given in elements.
    pub fn from_slice_strided<T>(slice: &mut [T], element_stride: isize) -> Self {
        Self::strided(
            slice.as_mut_ptr().cast(),
            element_stride * std::mem::size_of::<T>() as isize,
        )
    }
}

/// Compile-time selection of the addressing rule, one impl per kind.
///
/// Elementwise functions are generic over this trait so that each
/// `(type, kind)` pair is its own monomorphized function.
pub trait BufferAccess {
    const KIND: IterationBufferKind;

    /// Address of element `index`.
    ///
    /// # Safety
    ///
    /// `buffer` must describe at least `index + 1` addressable elements of
    /// `element_size` bytes.
    unsafe fn element(buffer: IterationBufferPointer, index: usize, element_size: usize) -> *mut u8;
}

/// `Contiguous` addressing.
pub struct ContiguousAccess;
/// `Strided` addressing.
pub struct StridedAccess;
/// `Indexed` addressing.
pub struct IndexedAccess;

impl BufferAccess for ContiguousAccess {
    const KIND: IterationBufferKind = IterationBufferKind::Contiguous;

    #[inline]
    unsafe fn element(buffer: IterationBufferPointer, index: usize, element_size: usize) -> *mut u8 {
        buffer.pointer.add(index * element_size)
    }
}

impl BufferAccess for StridedAccess {
    const KIND: IterationBufferKind = IterationBufferKind::Strided;

    #[inline]
    unsafe fn element(buffer: IterationBufferPointer, index: usize, _element_size: usize) -> *mut u8 {
        buffer.pointer.offset(index as isize * buffer.byte_stride)
    }
}

impl BufferAccess for IndexedAccess {
    const KIND: IterationBufferKind = IterationBufferKind::Indexed;

    #[inline]
    unsafe fn element(buffer: IterationBufferPointer, index: usize, _element_size: usize) -> *mut u8 {
        buffer.pointer.offset(*buffer.byte_offsets.add(index))
    }
}

/// Half-open address range `[start, end)` touched by `count` elements.
///
/// # Safety
///
/// Same contract as [`BufferAccess::element`] for every index below `count`.
pub(crate) unsafe fn byte_span<A: BufferAccess>(
    buffer: IterationBufferPointer,
    count: usize,
    element_size: usize,
) -> (usize, usize) {
    if count == 0 || element_size == 0 {
        return (0, 0);
    }
    match A::KIND {
        IterationBufferKind::Contiguous => {
            let start = buffer.pointer as usize;
            (start, start + count * element_size)
        }
        IterationBufferKind::Strided => {
            let first = buffer.pointer as usize;
            let last = A::element(buffer, count - 1, element_size) as usize;
            (first.min(last), first.max(last) + element_size)
        }
        IterationBufferKind::Indexed => {
            let mut low = usize::MAX;
            let mut high = 0usize;
            for index in 0..count {
                let addr = A::element(buffer, index, element_size) as usize;
                low = low.min(addr);
                high = high.max(addr);
            }
            (low, high + element_size)
        }
    }
}

/// True when the address ranges of two buffers intersect.
///
/// # Safety
///
/// See [`byte_span`].
pub(crate) unsafe fn spans_overlap<A: BufferAccess>(
    a: IterationBufferPointer,
    b: IterationBufferPointer,
    count: usize,
    element_size: usize,
) -> bool {
    let (a_start, a_end) = byte_span::<A>(a, count, element_size);
    let (b_start, b_end) = byte_span::<A>(b, count, element_size);
    a_start < a_end && b_start < b_end && a_start < b_end && b_start < a_end
}
