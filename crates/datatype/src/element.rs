// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Element types: the statically-typed side of the type-erasure boundary.
//!
//! Implementing [`ElementType`] is what makes a Rust type usable as an array
//! element. The built-in kinds below resolve to their built-in descriptor by
//! type identity; every other type gets a `Custom` descriptor minted on first
//! use, whatever its layout.
//!
//! | id | Rust type |
//! |----|-----------|
//! | `bool` | `bool` |
//! | `byte` | [`Byte`] |
//! | `char` | [`Char`] |
//! | `int8`..`uint64` | `i8`..`u64` (also `isize`/`usize`, by width) |
//! | `float16` | [`Float16`] (`half::f16`) |
//! | `float32`/`float64` | `f32`/`f64` |
//! | `complex64`/`complex128` | [`Complex64`]/[`Complex128`] (`num_complex`) |
//! | `string` | [`ByteString`] (`Vec<u8>`) |
//! | `ustring` | [`Ustring`] (`String`) |
//! | `json` | [`Json`] (`serde_json::Value`) |

use crate::descriptor::DataType;
use std::fmt::{self, Write};

/// A type that can be stored in and manipulated through a [`DataType`].
///
/// The bounds are exactly what the generated elementwise operations need:
/// `Default` (construct/initialize), `Clone` (copy), `PartialEq` (compare),
/// `Debug` (fallback rendering).
///
/// Implementing the trait cannot bind a type to a built-in descriptor: the
/// registry matches built-ins by [`TypeToken`](crate::descriptor::TypeToken),
/// so a custom type always gets its own record.
///
/// ```rust
/// use datatype::{descriptor_of, DataTypeId, ElementType};
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Rgb { r: u8, g: u8, b: u8 }
///
/// impl ElementType for Rgb {}
///
/// let dtype = descriptor_of::<Rgb>();
/// assert_eq!(dtype.id(), DataTypeId::Custom);
/// assert_eq!(dtype.size(), 3);
/// ```
pub trait ElementType: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Name used for custom descriptors (built-ins use their canonical name).
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Appends a human-readable rendering; diagnostic only.
    fn append_to_string(&self, out: &mut String) {
        let _ = write!(out, "{:?}", self);
    }

    /// Canonical descriptor for this type. Identity checks inside the crate
    /// go through [`descriptor_of`](crate::registry::descriptor_of) directly.
    fn data_type() -> DataType {
        crate::registry::descriptor_of::<Self>()
    }
}

/// Opaque byte (`byte` data type), distinct from `uint8`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Byte(pub u8);

/// Single 8-bit character (`char` data type).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Char(pub u8);

pub type Float16 = half::f16;
pub type Complex64 = num_complex::Complex<f32>;
pub type Complex128 = num_complex::Complex<f64>;
/// Arbitrary byte string (`string` data type).
pub type ByteString = Vec<u8>;
/// UTF-8 string (`ustring` data type).
pub type Ustring = String;
pub type Json = serde_json::Value;

/// Built-in impl whose rendering is the type's `Display`.
macro_rules! impl_display_element {
    ($($type:ty),+) => {
        $(impl ElementType for $type {
            fn append_to_string(&self, out: &mut String) {
                let _ = write!(out, "{}", self);
            }
        })+
    };
}

impl_display_element!(bool, i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);
impl_display_element!(Float16, f32, f64, Complex64, Complex128, Ustring, Json);

impl ElementType for Byte {
    fn append_to_string(&self, out: &mut String) {
        let _ = write!(out, "{}", self.0);
    }
}

impl ElementType for Char {
    fn append_to_string(&self, out: &mut String) {
        out.push(char::from(self.0));
    }
}

impl ElementType for ByteString {
    fn append_to_string(&self, out: &mut String) {
        out.push_str(&String::from_utf8_lossy(self));
    }
}
