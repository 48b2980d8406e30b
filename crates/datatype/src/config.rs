// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data type configuration - single source of truth.
//!
//! Every table size, textual sentinel and platform-width rule used by the
//! crate lives here. **Never hardcode these elsewhere!**
//!
//! # Platform widths
//!
//! C `long` is 4 bytes on LLP64 targets (Windows) and 8 bytes on LP64 targets.
//! Rust already resolves `c_long` to `i32` or `i64`, so both paths land on the
//! same descriptor as the fixed-width type. `isize`/`usize` follow the pointer
//! width. The ids below spell the rule out for code that maps foreign type
//! tags (e.g. NumPy `NPY_LONG`) without a Rust type in hand.

use crate::id::DataTypeId;
use std::os::raw::{c_long, c_ulong};

/// Diagnostic rendering of the invalid (default) descriptor. Not a name.
pub const UNSPECIFIED_NAME: &str = "<unspecified>";

/// Number of built-in data type ids (`DataTypeId::Custom` excluded).
pub const NUM_DATA_TYPE_IDS: usize = 19;

/// Largest byte size the allocation helpers will request.
///
/// Mirrors the `Layout` limit; anything above fails with
/// `Error::AllocationFailed` before reaching the allocator.
pub const MAX_ALLOCATION_BYTES: usize = isize::MAX as usize;

/// Upper bound of a LEB128 length prefix for a `u64` (codec).
pub const VARINT_MAX_BYTES: usize = 10;

/// Largest trivially-copyable built-in element (complex128), in bytes.
pub const MAX_TRIVIAL_ELEMENT_SIZE: usize = 16;

/// Fixed-width id that C `long` canonicalizes to on this target.
pub const C_LONG_ID: DataTypeId = signed_id_for_width(std::mem::size_of::<c_long>());

/// Fixed-width id that C `unsigned long` canonicalizes to on this target.
pub const C_ULONG_ID: DataTypeId = unsigned_id_for_width(std::mem::size_of::<c_ulong>());

/// Fixed-width id that `isize` canonicalizes to on this target.
pub const ISIZE_ID: DataTypeId = signed_id_for_width(std::mem::size_of::<isize>());

/// Fixed-width id that `usize` canonicalizes to on this target.
pub const USIZE_ID: DataTypeId = unsigned_id_for_width(std::mem::size_of::<usize>());

const fn signed_id_for_width(bytes: usize) -> DataTypeId {
    match bytes {
        1 => DataTypeId::Int8,
        2 => DataTypeId::Int16,
        4 => DataTypeId::Int32,
        _ => DataTypeId::Int64,
    }
}

const fn unsigned_id_for_width(bytes: usize) -> DataTypeId {
    match bytes {
        1 => DataTypeId::Uint8,
        2 => DataTypeId::Uint16,
        4 => DataTypeId::Uint32,
        _ => DataTypeId::Uint64,
    }
}
