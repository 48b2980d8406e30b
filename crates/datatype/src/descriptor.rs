// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The `DataType` descriptor: an identity-comparable handle to a `'static`
//! operation table.
//!
//! # Layout
//!
//! ```text
//! DataType (Copy, one pointer)
//! +-- Option<&'static DataTypeOperations>   None = unspecified sentinel
//!
//! DataTypeOperations (immutable, never freed)
//! +-- id / size / alignment / name / token
//! +-- construct, destroy, initialize        [fn; 3]  (one per buffer kind)
//! +-- copy_assign, move_assign, compare_equal [fn; 3]
//! +-- append_to_string                       fn
//! ```
//!
//! Equality and hashing use the address of the operation table, so two
//! handles are equal only when they come from the same registration.

use crate::buffer::{IterationBufferKind, IterationBufferPointer};
use crate::config::UNSPECIFIED_NAME;
use crate::element::ElementType;
use crate::elementwise::{
    elementwise_function, ops, AppendToStringFn, ElementwiseFn1, ElementwiseFn2,
    ElementwiseFunction,
};
use crate::error::{Error, Result};
use crate::id::DataTypeId;
use std::any::TypeId;
use std::hash::{Hash, Hasher};
use std::ptr;

/// Opaque per-type identity, independent of any name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken(TypeId);

impl TypeToken {
    pub fn of<T: 'static>() -> Self {
        Self(TypeId::of::<T>())
    }
}

/// Layout and generated operations of one concrete element type.
#[derive(Debug)]
pub struct DataTypeOperations {
    pub id: DataTypeId,
    /// `size_of::<T>()`.
    pub size: usize,
    /// `align_of::<T>()` (power of two).
    pub alignment: usize,
    /// Canonical name for built-ins, `ElementType::type_name()` otherwise.
    pub name: &'static str,
    pub token: TypeToken,
    pub construct: ElementwiseFunction<ElementwiseFn1>,
    pub destroy: ElementwiseFunction<ElementwiseFn1>,
    pub initialize: ElementwiseFunction<ElementwiseFn1>,
    pub copy_assign: ElementwiseFunction<ElementwiseFn2>,
    pub move_assign: ElementwiseFunction<ElementwiseFn2>,
    pub compare_equal: ElementwiseFunction<ElementwiseFn2>,
    pub append_to_string: AppendToStringFn,
}

impl DataTypeOperations {
    /// Instantiates the operation table for `T`.
    pub(crate) fn of<T: ElementType>(id: DataTypeId, name: &'static str) -> Self {
        Self {
            id,
            size: std::mem::size_of::<T>(),
            alignment: std::mem::align_of::<T>(),
            name,
            token: TypeToken::of::<T>(),
            construct: elementwise_function!(ops::construct, T, ElementwiseFn1),
            destroy: elementwise_function!(ops::destroy, T, ElementwiseFn1),
            initialize: elementwise_function!(ops::initialize, T, ElementwiseFn1),
            copy_assign: elementwise_function!(ops::copy_assign, T, ElementwiseFn2),
            move_assign: elementwise_function!(ops::move_assign, T, ElementwiseFn2),
            compare_equal: elementwise_function!(ops::compare_equal, T, ElementwiseFn2),
            append_to_string: ops::append_to_string::<T> as AppendToStringFn,
        }
    }
}

/// Runtime element type descriptor.
///
/// `DataType::default()` is the unspecified sentinel: `valid()` is false, it
/// renders as `<unspecified>` and equals only another sentinel.
///
/// ```rust
/// use datatype::{descriptor_of, DataType};
///
/// let int32 = descriptor_of::<i32>();
/// assert_eq!(int32, descriptor_of::<i32>());
/// assert_ne!(int32, descriptor_of::<f32>());
/// assert_eq!(int32.name(), "int32");
/// assert!(!DataType::default().valid());
/// ```
#[derive(Clone, Copy, Default)]
pub struct DataType(Option<&'static DataTypeOperations>);

impl DataType {
    pub(crate) fn from_static(operations: &'static DataTypeOperations) -> Self {
        Self(Some(operations))
    }

    pub fn valid(self) -> bool {
        self.0.is_some()
    }

    /// Operation table (`None` for the sentinel).
    pub fn operations(self) -> Option<&'static DataTypeOperations> {
        self.0
    }

    /// Built-in id; `Custom` for custom types and the sentinel.
    pub fn id(self) -> DataTypeId {
        self.0.map_or(DataTypeId::Custom, |ops| ops.id)
    }

    /// Element size in bytes (0 for the sentinel).
    pub fn size(self) -> usize {
        self.0.map_or(0, |ops| ops.size)
    }

    /// Element alignment in bytes (0 for the sentinel).
    pub fn alignment(self) -> usize {
        self.0.map_or(0, |ops| ops.alignment)
    }

    pub fn name(self) -> &'static str {
        self.0.map_or(UNSPECIFIED_NAME, |ops| ops.name)
    }

    pub fn token(self) -> Option<TypeToken> {
        self.0.map(|ops| ops.token)
    }

    /// True when this is the canonical descriptor of `T`.
    pub fn matches<T: ElementType>(self) -> bool {
        self == crate::registry::descriptor_of::<T>()
    }

    /// Default-constructs `count` contiguous elements at `dest`.
    ///
    /// # Safety
    ///
    /// `dest` must point to `count` uninitialized, aligned slots of this type.
    pub unsafe fn construct(self, count: usize, dest: *mut u8) -> Result<usize> {
        let ops = self.0.ok_or(Error::InvalidDataType)?;
        Ok((ops.construct[IterationBufferKind::Contiguous])(
            ptr::null_mut(),
            count,
            IterationBufferPointer::contiguous(dest),
            None,
        ))
    }

    /// Destroys `count` contiguous elements at `dest`.
    ///
    /// # Safety
    ///
    /// `dest` must point to `count` initialized, aligned elements of this type;
    /// they are uninitialized afterwards.
    pub unsafe fn destroy(self, count: usize, dest: *mut u8) -> Result<usize> {
        let ops = self.0.ok_or(Error::InvalidDataType)?;
        Ok((ops.destroy[IterationBufferKind::Contiguous])(
            ptr::null_mut(),
            count,
            IterationBufferPointer::contiguous(dest),
            None,
        ))
    }

    /// Appends the rendering of the element at `element` to `out`.
    ///
    /// # Safety
    ///
    /// `element` must point to an initialized, aligned element of this type.
    pub unsafe fn append_to_string(self, out: &mut String, element: *const u8) -> Result<()> {
        let ops = self.0.ok_or(Error::InvalidDataType)?;
        (ops.append_to_string)(out, element);
        Ok(())
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => ptr::eq(a, b),
            _ => false,
        }
    }
}

impl Eq for DataType {}

impl Hash for DataType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let addr = self.0.map_or(0usize, |ops| ops as *const DataTypeOperations as usize);
        state.write_usize(addr);
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Debug for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DataType({})", self.name())
    }
}

impl std::str::FromStr for DataType {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        crate::registry::parse_data_type(name)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if !self.valid() {
            return Err(serde::ser::Error::custom(
                "unspecified data type has no serialized form",
            ));
        }
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DataType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let name = <String as serde::Deserialize>::deserialize(deserializer)?;
        crate::registry::parse_data_type(&name).map_err(serde::de::Error::custom)
    }
}
