// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # datatype - Runtime element type descriptors
//!
//! A [`DataType`] is a one-pointer, `Copy` handle describing an element type
//! at runtime: its size, alignment, canonical name and a table of bulk
//! operations (construct, destroy, initialize, copy, move, compare, render).
//! Generic array code can store and move elements of any registered type
//! without knowing the type statically.
//!
//! ## Quick Start
//!
//! ```rust
//! use datatype::{descriptor_of, parse_data_type, static_cast, DataTypeId};
//!
//! let float32 = descriptor_of::<f32>();
//! assert_eq!(float32.id(), DataTypeId::Float32);
//! assert_eq!(parse_data_type("float32").unwrap(), float32);
//!
//! let typed = static_cast::<f32>(float32).unwrap();
//! assert_eq!(typed.size(), 4);
//! assert!(static_cast::<i32>(float32).is_err());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                      Typed layer (cast, alloc)                      |
//! |   StaticDataType<T> | static_cast | allocate_and_construct_shared   |
//! +---------------------------------------------------------------------+
//! |                     Descriptor layer (descriptor)                   |
//! |   DataType -> &'static DataTypeOperations                           |
//! +---------------------------------------------------------------------+
//! |                      Registry (registry, id)                        |
//! |   built-in table | custom cache | name index                        |
//! +---------------------------------------------------------------------+
//! |                 Elementwise kernels (elementwise, buffer)           |
//! |   contiguous | strided | indexed       unaligned codecs (unaligned) |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DataType`] | Type-erased descriptor, compared by identity |
//! | [`DataTypeId`] | Tag of the 19 built-in element types |
//! | [`ElementType`] | Trait every describable element type implements |
//! | [`StaticDataType`] | Zero-sized typed counterpart of a descriptor |
//! | [`IterationBufferPointer`] | Base address plus layout for elementwise calls |
//!
//! ## Features
//!
//! - `serde` (default): descriptors serialize as their canonical name.

pub mod alloc;
pub mod buffer;
pub mod cast;
pub mod config;
pub mod cursor;
pub mod descriptor;
pub mod element;
pub mod elementwise;
pub mod error;
pub mod id;
pub mod interop;
pub mod registry;
pub mod unaligned;

pub use alloc::{
    allocate_and_construct_shared, allocate_and_construct_shared_elements, ElementInitialization,
    SharedElements, SharedErasedElements,
};
pub use buffer::{IterationBufferKind, IterationBufferPointer};
pub use cast::{static_cast, static_cast_as, static_cast_unchecked, Checked, StaticDataType, Unchecked};
pub use descriptor::{DataType, DataTypeOperations, TypeToken};
pub use element::{
    Byte, ByteString, Char, Complex128, Complex64, ElementType, Float16, Json, Ustring,
};
pub use elementwise::{AppendToStringFn, ElementwiseFn1, ElementwiseFn2, ElementwiseFunction};
pub use error::{Error, Result};
pub use id::DataTypeId;
pub use interop::{data_type_from_numpy_type_num, numpy_type_num};
pub use registry::{
    builtin_data_types, descriptor_of, lookup_by_id, lookup_by_name, parse_data_type, register,
};
pub use unaligned::{decode_elements, encode_elements, unaligned_functions, Endian};
