// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NumPy dtype type-number mapping.
//!
//! Maps descriptors to the stable `NPY_TYPES` numbering and back. Platform
//! `long` / `unsigned long` resolve through [`C_LONG_ID`] / [`C_ULONG_ID`], so
//! `NPY_LONG` means `int32` on LLP64 targets and `int64` on LP64 targets.

use crate::config::{C_LONG_ID, C_ULONG_ID};
use crate::descriptor::DataType;
use crate::error::{Error, Result};
use crate::id::DataTypeId;
use crate::registry::lookup_by_id;

/// `NPY_TYPES` numbers.
pub mod npy {
    pub const BOOL: i32 = 0;
    pub const BYTE: i32 = 1;
    pub const UBYTE: i32 = 2;
    pub const SHORT: i32 = 3;
    pub const USHORT: i32 = 4;
    pub const INT: i32 = 5;
    pub const UINT: i32 = 6;
    pub const LONG: i32 = 7;
    pub const ULONG: i32 = 8;
    pub const LONGLONG: i32 = 9;
    pub const ULONGLONG: i32 = 10;
    pub const FLOAT: i32 = 11;
    pub const DOUBLE: i32 = 12;
    pub const LONGDOUBLE: i32 = 13;
    pub const CFLOAT: i32 = 14;
    pub const CDOUBLE: i32 = 15;
    pub const CLONGDOUBLE: i32 = 16;
    pub const OBJECT: i32 = 17;
    pub const STRING: i32 = 18;
    pub const UNICODE: i32 = 19;
    pub const VOID: i32 = 20;
    pub const DATETIME: i32 = 21;
    pub const TIMEDELTA: i32 = 22;
    pub const HALF: i32 = 23;
    /// Number of built-in type numbers.
    pub const NTYPES: i32 = 24;
}

fn type_num_for_id(id: DataTypeId) -> Option<i32> {
    let type_num = match id {
        DataTypeId::Bool => npy::BOOL,
        DataTypeId::Byte => npy::VOID,
        DataTypeId::Char => npy::STRING,
        DataTypeId::Int8 => npy::BYTE,
        DataTypeId::Uint8 => npy::UBYTE,
        DataTypeId::Int16 => npy::SHORT,
        DataTypeId::Uint16 => npy::USHORT,
        DataTypeId::Int32 => npy::INT,
        DataTypeId::Uint32 => npy::UINT,
        DataTypeId::Int64 => npy::LONGLONG,
        DataTypeId::Uint64 => npy::ULONGLONG,
        DataTypeId::Float16 => npy::HALF,
        DataTypeId::Float32 => npy::FLOAT,
        DataTypeId::Float64 => npy::DOUBLE,
        DataTypeId::Complex64 => npy::CFLOAT,
        DataTypeId::Complex128 => npy::CDOUBLE,
        // Variable-length values live in object arrays.
        DataTypeId::String | DataTypeId::Ustring | DataTypeId::Json => npy::OBJECT,
        DataTypeId::Custom => return None,
    };
    Some(type_num)
}

fn id_for_type_num(type_num: i32) -> Option<DataTypeId> {
    let id = match type_num {
        npy::BOOL => DataTypeId::Bool,
        npy::BYTE => DataTypeId::Int8,
        npy::UBYTE => DataTypeId::Uint8,
        npy::SHORT => DataTypeId::Int16,
        npy::USHORT => DataTypeId::Uint16,
        npy::INT => DataTypeId::Int32,
        npy::UINT => DataTypeId::Uint32,
        npy::LONG => C_LONG_ID,
        npy::ULONG => C_ULONG_ID,
        npy::LONGLONG => DataTypeId::Int64,
        npy::ULONGLONG => DataTypeId::Uint64,
        npy::FLOAT => DataTypeId::Float32,
        npy::DOUBLE => DataTypeId::Float64,
        npy::CFLOAT => DataTypeId::Complex64,
        npy::CDOUBLE => DataTypeId::Complex128,
        npy::OBJECT => DataTypeId::Json,
        npy::STRING => DataTypeId::Char,
        npy::VOID => DataTypeId::Byte,
        npy::HALF => DataTypeId::Float16,
        _ => return None,
    };
    Some(id)
}

/// NumPy type number of `data_type`, or `None` when there is no counterpart
/// (custom types, the unspecified sentinel).
pub fn numpy_type_num(data_type: DataType) -> Option<i32> {
    if !data_type.valid() {
        return None;
    }
    type_num_for_id(data_type.id())
}

/// Like [`numpy_type_num`], failing with [`Error::NoNumpyDtype`].
pub fn numpy_type_num_or_err(data_type: DataType) -> Result<i32> {
    numpy_type_num(data_type).ok_or_else(|| Error::NoNumpyDtype {
        name: data_type.name().to_string(),
    })
}

/// Descriptor for a NumPy type number, or `None` for numbers without a
/// counterpart (`LONGDOUBLE`, `UNICODE`, `DATETIME`, out of range, ...).
pub fn data_type_from_numpy_type_num(type_num: i32) -> Option<DataType> {
    id_for_type_num(type_num).and_then(lookup_by_id)
}

/// Like [`data_type_from_numpy_type_num`], failing with
/// [`Error::NoDataTypeForNumpy`].
pub fn data_type_from_numpy_type_num_or_err(type_num: i32) -> Result<DataType> {
    data_type_from_numpy_type_num(type_num).ok_or(Error::NoDataTypeForNumpy { type_num })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{builtin_data_types, descriptor_of};

    #[test]
    fn test_builtins_map_forward() {
        for data_type in builtin_data_types() {
            assert!(numpy_type_num(*data_type).is_some(), "{}", data_type);
        }
        assert_eq!(numpy_type_num(descriptor_of::<i8>()), Some(npy::BYTE));
        assert_eq!(numpy_type_num(descriptor_of::<i64>()), Some(npy::LONGLONG));
        assert_eq!(numpy_type_num(DataType::default()), None);
    }

    #[test]
    fn test_long_follows_platform() {
        let long = data_type_from_numpy_type_num(npy::LONG).expect("long maps");
        assert_eq!(long.size(), std::mem::size_of::<std::os::raw::c_long>());
        let ulong = data_type_from_numpy_type_num(npy::ULONG).expect("ulong maps");
        assert_eq!(ulong.size(), std::mem::size_of::<std::os::raw::c_ulong>());
    }

    #[test]
    fn test_unmapped_type_numbers() {
        for type_num in [
            npy::LONGDOUBLE,
            npy::CLONGDOUBLE,
            npy::UNICODE,
            npy::DATETIME,
            npy::TIMEDELTA,
            npy::NTYPES,
            -1,
        ] {
            assert_eq!(data_type_from_numpy_type_num(type_num), None);
        }
        assert_eq!(
            data_type_from_numpy_type_num_or_err(npy::UNICODE),
            Err(Error::NoDataTypeForNumpy { type_num: 19 })
        );
    }

    #[test]
    fn test_custom_has_no_dtype() {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Pixel(u16);
        impl crate::element::ElementType for Pixel {}

        let err = numpy_type_num_or_err(descriptor_of::<Pixel>()).unwrap_err();
        assert!(matches!(err, Error::NoNumpyDtype { .. }));
    }
}
