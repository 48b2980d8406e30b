// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recovering a statically-typed view from an erased [`DataType`].
//!
//! - [`static_cast`]: checked, returns [`Error::InvalidCast`] on mismatch.
//! - [`static_cast_unchecked`]: the caller vouches for the type. With
//!   `debug_assertions` the identity check still runs and panics with
//!   "StaticCast is not valid"; in release builds it is compiled out.
//! - [`static_cast_as`]: the same two paths selected by a marker type
//!   ([`Checked`] / [`Unchecked`]) for generic callers.
//!
//! The unspecified sentinel is compatible with every type: casting it yields
//! the target's canonical descriptor.

use crate::descriptor::DataType;
use crate::element::ElementType;
use crate::error::{Error, Result};
use crate::id::DataTypeId;
use crate::registry::descriptor_of;
use std::fmt;
use std::marker::PhantomData;

/// Statically-typed data type handle for `T`.
///
/// Zero-sized; converts to the erased [`DataType`] with `From`/`into()`.
pub struct StaticDataType<T>(PhantomData<fn() -> T>);

impl<T: ElementType> StaticDataType<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    pub fn data_type(self) -> DataType {
        descriptor_of::<T>()
    }

    pub fn id(self) -> DataTypeId {
        self.data_type().id()
    }

    pub fn name(self) -> &'static str {
        self.data_type().name()
    }

    pub fn size(self) -> usize {
        std::mem::size_of::<T>()
    }

    pub fn alignment(self) -> usize {
        std::mem::align_of::<T>()
    }
}

impl<T> Clone for StaticDataType<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StaticDataType<T> {}

impl<T: ElementType> Default for StaticDataType<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ElementType> fmt::Debug for StaticDataType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StaticDataType({})", self.name())
    }
}

impl<T: ElementType> From<StaticDataType<T>> for DataType {
    fn from(value: StaticDataType<T>) -> Self {
        value.data_type()
    }
}

impl<T: ElementType> PartialEq<DataType> for StaticDataType<T> {
    fn eq(&self, other: &DataType) -> bool {
        self.data_type() == *other
    }
}

impl<T: ElementType> PartialEq<StaticDataType<T>> for DataType {
    fn eq(&self, other: &StaticDataType<T>) -> bool {
        *self == other.data_type()
    }
}

/// Checked cast: `data_type` must be `T`'s descriptor or the sentinel.
pub fn static_cast<T: ElementType>(data_type: DataType) -> Result<StaticDataType<T>> {
    let target = descriptor_of::<T>();
    if !data_type.valid() || data_type == target {
        return Ok(StaticDataType::new());
    }
    Err(Error::InvalidCast {
        from: data_type.name().to_string(),
        to: target.name().to_string(),
    })
}

/// Unchecked cast: debug builds verify and panic, release builds trust.
#[inline]
pub fn static_cast_unchecked<T: ElementType>(data_type: DataType) -> StaticDataType<T> {
    debug_assert!(
        !data_type.valid() || data_type == descriptor_of::<T>(),
        "StaticCast is not valid: {} as {}",
        data_type,
        descriptor_of::<T>()
    );
    StaticDataType::new()
}

/// Cast mode selected at the type level.
pub trait CastChecking {
    type Output<T: ElementType>;

    fn cast<T: ElementType>(data_type: DataType) -> Self::Output<T>;
}

/// Mode marker: verify and return a `Result`.
#[derive(Debug, Clone, Copy)]
pub struct Checked;

/// Mode marker: trust the caller.
#[derive(Debug, Clone, Copy)]
pub struct Unchecked;

impl CastChecking for Checked {
    type Output<T: ElementType> = Result<StaticDataType<T>>;

    fn cast<T: ElementType>(data_type: DataType) -> Self::Output<T> {
        static_cast::<T>(data_type)
    }
}

impl CastChecking for Unchecked {
    type Output<T: ElementType> = StaticDataType<T>;

    fn cast<T: ElementType>(data_type: DataType) -> Self::Output<T> {
        static_cast_unchecked::<T>(data_type)
    }
}

/// `static_cast_as::<T, Checked>(d)` / `static_cast_as::<T, Unchecked>(d)`.
pub fn static_cast_as<T: ElementType, C: CastChecking>(data_type: DataType) -> C::Output<T> {
    C::cast::<T>(data_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_mismatch_message() {
        let err = static_cast::<i32>(descriptor_of::<f32>()).expect_err("float32 is not int32");
        assert_eq!(
            err.to_string(),
            "Cannot cast data type of float32 to data type of int32"
        );
    }

    #[test]
    fn test_checked_match() {
        let typed = static_cast::<u32>(descriptor_of::<u32>()).expect("same type");
        assert_eq!(typed, descriptor_of::<u32>());
        assert_eq!(typed.size(), 4);
        assert_eq!(typed.id(), DataTypeId::Uint32);
    }

    #[test]
    fn test_unspecified_casts_to_anything() {
        let typed = static_cast::<i32>(DataType::default()).expect("sentinel is compatible");
        assert_eq!(DataType::from(typed), descriptor_of::<i32>());
    }

    #[test]
    fn test_unchecked_match_is_noop() {
        let typed = static_cast_unchecked::<u32>(descriptor_of::<u32>());
        assert_eq!(typed.data_type(), descriptor_of::<u32>());
        let typed = static_cast_as::<u32, Unchecked>(descriptor_of::<u32>());
        assert_eq!(typed.name(), "uint32");
    }

    #[test]
    fn test_mode_selected_checked() {
        let result = static_cast_as::<i64, Checked>(descriptor_of::<f64>());
        assert!(matches!(result, Err(Error::InvalidCast { .. })));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "StaticCast is not valid")]
    fn test_unchecked_mismatch_panics_in_debug() {
        let _ = static_cast_unchecked::<u32>(descriptor_of::<f32>());
    }
}
