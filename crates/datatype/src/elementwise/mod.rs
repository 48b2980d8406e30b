// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased elementwise functions.
//!
//! Every bulk primitive shares one signature per arity:
//!
//! ```text
//! (context, count, buffer [, buffer], status) -> elements processed
//! ```
//!
//! and is stored as a plain function pointer per [`IterationBufferKind`].
//! The pointers are produced by instantiating the generic bodies in
//! [`ops`] for a concrete element type, once, when the descriptor is built.
//! After that the caller needs no type information at all.

pub(crate) mod ops;

use crate::buffer::{IterationBufferKind, IterationBufferPointer};
use crate::error::Error;
use std::ops::Index;

/// Single-buffer elementwise function.
///
/// `context` is operation-specific (null for the descriptor operations, a
/// cursor for the codec functions). `status` receives the error when the
/// function stops early; the return value is the number of elements
/// processed before stopping.
pub type ElementwiseFn1 = unsafe fn(
    context: *mut (),
    count: usize,
    buffer: IterationBufferPointer,
    status: Option<&mut Option<Error>>,
) -> usize;

/// Two-buffer elementwise function (`source`/`a` first, `dest`/`b` second).
pub type ElementwiseFn2 = unsafe fn(
    context: *mut (),
    count: usize,
    first: IterationBufferPointer,
    second: IterationBufferPointer,
    status: Option<&mut Option<Error>>,
) -> usize;

/// Appends the rendering of the element at the given address.
pub type AppendToStringFn = unsafe fn(out: &mut String, element: *const u8);

/// Dispatch table: one function per buffer kind.
#[derive(Clone, Copy)]
pub struct ElementwiseFunction<F> {
    functions: [F; IterationBufferKind::COUNT],
}

impl<F: Copy> ElementwiseFunction<F> {
    /// Table from functions in `IterationBufferKind::ALL` order.
    pub const fn from_kinds(functions: [F; IterationBufferKind::COUNT]) -> Self {
        Self { functions }
    }

    pub fn get(&self, kind: IterationBufferKind) -> F {
        self.functions[kind as usize]
    }
}

impl<F> Index<IterationBufferKind> for ElementwiseFunction<F> {
    type Output = F;

    fn index(&self, kind: IterationBufferKind) -> &F {
        &self.functions[kind as usize]
    }
}

impl<F> std::fmt::Debug for ElementwiseFunction<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementwiseFunction").finish_non_exhaustive()
    }
}

/// Stores `error` in the status sink, if the caller supplied one.
pub(crate) fn report(status: Option<&mut Option<Error>>, error: Error) {
    if let Some(slot) = status {
        *slot = Some(error);
    }
}

/// Builds an [`ElementwiseFunction`] by instantiating a generic body
/// `$body::<T, Access>` for each buffer kind.
macro_rules! elementwise_function {
    ($module:ident :: $body:ident, $elem:ty, $fn_ty:ty) => {
        $crate::elementwise::ElementwiseFunction::<$fn_ty>::from_kinds([
            $module::$body::<$elem, $crate::buffer::ContiguousAccess> as $fn_ty,
            $module::$body::<$elem, $crate::buffer::StridedAccess> as $fn_ty,
            $module::$body::<$elem, $crate::buffer::IndexedAccess> as $fn_ty,
        ])
    };
}
pub(crate) use elementwise_function;
