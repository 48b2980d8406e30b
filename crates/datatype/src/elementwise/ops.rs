// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic bodies of the descriptor operations.
//!
//! Each function is instantiated per `(T, A)` pair and coerced to
//! [`ElementwiseFn1`](super::ElementwiseFn1) / [`ElementwiseFn2`](super::ElementwiseFn2).
//!
//! Slots need not be aligned: a strided byte stride may be any value,
//! including one smaller than the element or not a multiple of its
//! alignment. Aligned slots are accessed in place; misaligned ones through
//! `read_unaligned` / `write_unaligned` on a bitwise copy.
//!
//! # Safety (all functions)
//!
//! Every buffer must address `count` slots of `T`. `construct` expects
//! uninitialized slots; every other operation expects initialized ones.
//! `destroy` leaves them uninitialized.

use crate::buffer::{spans_overlap, BufferAccess, IterationBufferPointer};
use crate::element::ElementType;
use crate::error::Error;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ptr;

#[inline]
unsafe fn slot<T, A: BufferAccess>(buffer: IterationBufferPointer, index: usize) -> *mut T {
    A::element(buffer, index, mem::size_of::<T>()).cast::<T>()
}

#[inline]
fn is_aligned<T>(pointer: *const T) -> bool {
    pointer as usize % mem::align_of::<T>() == 0
}

/// Runs `f` on the value at `pointer`, aligned or not.
#[inline]
unsafe fn with_ref<T, R>(pointer: *const T, f: impl FnOnce(&T) -> R) -> R {
    if is_aligned(pointer) {
        return f(&*pointer);
    }
    // The copy shares ownership with the slot; it must never be dropped.
    let copy = ManuallyDrop::new(ptr::read_unaligned(pointer));
    f(&copy)
}

/// Replaces the initialized value at `pointer`, returning the old one.
#[inline]
unsafe fn replace<T>(pointer: *mut T, value: T) -> T {
    if is_aligned(pointer) {
        return mem::replace(&mut *pointer, value);
    }
    let old = ptr::read_unaligned(pointer);
    ptr::write_unaligned(pointer, value);
    old
}

/// Drops the first `initialized` slots if construction unwinds.
struct ConstructGuard<T, A: BufferAccess> {
    dest: IterationBufferPointer,
    initialized: usize,
    _marker: PhantomData<fn() -> (T, A)>,
}

impl<T, A: BufferAccess> Drop for ConstructGuard<T, A> {
    fn drop(&mut self) {
        for index in 0..self.initialized {
            // SAFETY: slots below `initialized` were written by `construct`.
            unsafe { drop(ptr::read_unaligned(slot::<T, A>(self.dest, index))) };
        }
    }
}

/// Writes `T::default()` into uninitialized slots.
///
/// If `T::default()` panics, the slots already written are dropped again
/// before unwinding continues.
pub(crate) unsafe fn construct<T: ElementType, A: BufferAccess>(
    _context: *mut (),
    count: usize,
    dest: IterationBufferPointer,
    _status: Option<&mut Option<Error>>,
) -> usize {
    let mut guard = ConstructGuard::<T, A> {
        dest,
        initialized: 0,
        _marker: PhantomData,
    };
    for index in 0..count {
        ptr::write_unaligned(slot::<T, A>(dest, index), T::default());
        guard.initialized += 1;
    }
    mem::forget(guard);
    count
}

/// Drops slots in place; no-op for types without drop glue.
pub(crate) unsafe fn destroy<T: ElementType, A: BufferAccess>(
    _context: *mut (),
    count: usize,
    dest: IterationBufferPointer,
    _status: Option<&mut Option<Error>>,
) -> usize {
    if !mem::needs_drop::<T>() {
        return count;
    }
    for index in 0..count {
        let pointer = slot::<T, A>(dest, index);
        if is_aligned(pointer) {
            ptr::drop_in_place(pointer);
        } else {
            drop(ptr::read_unaligned(pointer));
        }
    }
    count
}

/// Assigns `T::default()` to initialized slots.
pub(crate) unsafe fn initialize<T: ElementType, A: BufferAccess>(
    _context: *mut (),
    count: usize,
    dest: IterationBufferPointer,
    _status: Option<&mut Option<Error>>,
) -> usize {
    for index in 0..count {
        drop(replace(slot::<T, A>(dest, index), T::default()));
    }
    count
}

/// `dest[i] = source[i].clone()`.
///
/// When the two address spans intersect, all source values are cloned into a
/// staging vector before the first write, so no slot is read after it has
/// been overwritten.
pub(crate) unsafe fn copy_assign<T: ElementType, A: BufferAccess>(
    _context: *mut (),
    count: usize,
    source: IterationBufferPointer,
    dest: IterationBufferPointer,
    _status: Option<&mut Option<Error>>,
) -> usize {
    if spans_overlap::<A>(source, dest, count, mem::size_of::<T>()) {
        let staged: Vec<T> = (0..count)
            .map(|index| with_ref(slot::<T, A>(source, index), T::clone))
            .collect();
        for (index, value) in staged.into_iter().enumerate() {
            drop(replace(slot::<T, A>(dest, index), value));
        }
        return count;
    }
    for index in 0..count {
        let value = with_ref(slot::<T, A>(source, index), T::clone);
        drop(replace(slot::<T, A>(dest, index), value));
    }
    count
}

/// `dest[i] = take(source[i])`; sources are left holding `T::default()`.
///
/// Overlapping spans are staged like [`copy_assign`].
pub(crate) unsafe fn move_assign<T: ElementType, A: BufferAccess>(
    _context: *mut (),
    count: usize,
    source: IterationBufferPointer,
    dest: IterationBufferPointer,
    _status: Option<&mut Option<Error>>,
) -> usize {
    if spans_overlap::<A>(source, dest, count, mem::size_of::<T>()) {
        let staged: Vec<T> = (0..count)
            .map(|index| replace(slot::<T, A>(source, index), T::default()))
            .collect();
        for (index, value) in staged.into_iter().enumerate() {
            drop(replace(slot::<T, A>(dest, index), value));
        }
        return count;
    }
    for index in 0..count {
        let value = replace(slot::<T, A>(source, index), T::default());
        drop(replace(slot::<T, A>(dest, index), value));
    }
    count
}

/// Index of the first `a[i] != b[i]`, or `count`.
pub(crate) unsafe fn compare_equal<T: ElementType, A: BufferAccess>(
    _context: *mut (),
    count: usize,
    a: IterationBufferPointer,
    b: IterationBufferPointer,
    _status: Option<&mut Option<Error>>,
) -> usize {
    for index in 0..count {
        let equal = with_ref(slot::<T, A>(a, index), |left| {
            with_ref(slot::<T, A>(b, index), |right| left == right)
        });
        if !equal {
            return index;
        }
    }
    count
}

/// Renders one element.
pub(crate) unsafe fn append_to_string<T: ElementType>(out: &mut String, element: *const u8) {
    with_ref(element.cast::<T>(), |value| ElementType::append_to_string(value, out));
}
