// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte-order and codec functions for the built-in data types.
//!
//! These complement the descriptor operations for chunk encoding paths where
//! element memory is not aligned and may need a byte-order swap. They use the
//! same elementwise signature and buffer kinds as the descriptor operations.
//!
//! | function | trivial types | string / ustring / json |
//! |----------|---------------|-------------------------|
//! | `swap_endian_inplace` | per scalar unit (`None` for 1-byte types) | `None` |
//! | `swap_endian` | copy with swap (= `copy` for 1-byte types) | `None` |
//! | `copy` | unaligned byte copy | `None` |
//! | `write_*_endian` | raw bytes, native or swapped | varint length + bytes (JSON text for json) |
//! | `read_*_endian` | inverse of write, validates `bool` | inverse of write, validates UTF-8 / JSON |
//!
//! For `write_*` the `context` is a [`WriteCursor`]; for `read_*` a [`ReadCursor`].

use crate::buffer::{IterationBufferKind, IterationBufferPointer};
use crate::config::NUM_DATA_TYPE_IDS;
use crate::cursor::{ReadCursor, WriteCursor};
use crate::descriptor::DataType;
use crate::element::{
    Byte, ByteString, Char, Complex128, Complex64, ElementType, Float16, Json, Ustring,
};
use crate::elementwise::{elementwise_function, ElementwiseFn1, ElementwiseFn2, ElementwiseFunction};
use crate::error::{Error, Result};
use crate::id::DataTypeId;
use std::sync::OnceLock;

/// Byte order of encoded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    #[cfg(target_endian = "little")]
    pub const NATIVE: Endian = Endian::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Endian = Endian::Big;
}

/// Codec and byte-order functions of one built-in data type.
#[derive(Debug)]
pub struct UnalignedDataTypeFunctions {
    /// In-place swap; `None` when no conversion is needed or possible.
    pub swap_endian_inplace: Option<ElementwiseFunction<ElementwiseFn1>>,
    /// Copy with swap (source, dest); equals `copy` for 1-byte types.
    pub swap_endian: Option<ElementwiseFunction<ElementwiseFn2>>,
    /// Unaligned copy (source, dest); `None` for non-trivial types.
    pub copy: Option<ElementwiseFunction<ElementwiseFn2>>,
    pub write_native_endian: ElementwiseFunction<ElementwiseFn1>,
    pub write_swapped_endian: ElementwiseFunction<ElementwiseFn1>,
    pub read_native_endian: ElementwiseFunction<ElementwiseFn1>,
    pub read_swapped_endian: ElementwiseFunction<ElementwiseFn1>,
}

/// Trivially-copyable element whose bytes are its value.
pub(crate) trait PlainElement: ElementType + Copy {
    /// Width of the scalar unit whose byte order is swapped.
    const SWAP_UNIT: usize;

    /// Whether `bytes` (native order) form a valid value.
    fn valid_bytes(_bytes: &[u8]) -> bool {
        true
    }
}

macro_rules! impl_plain {
    ($unit:expr => $($type:ty),+) => {
        $(impl PlainElement for $type {
            const SWAP_UNIT: usize = $unit;
        })+
    };
}

impl_plain!(1 => Byte, Char, i8, u8);
impl_plain!(2 => i16, u16, Float16);
impl_plain!(4 => i32, u32, f32, Complex64);
impl_plain!(8 => i64, u64, f64, Complex128);

impl PlainElement for bool {
    const SWAP_UNIT: usize = 1;

    fn valid_bytes(bytes: &[u8]) -> bool {
        bytes.iter().all(|byte| *byte <= 1)
    }
}

/// Element with a length-delimited canonical encoding.
pub(crate) trait EncodedElement: ElementType {
    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<()>;
    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self>;
}

impl EncodedElement for ByteString {
    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<()> {
        cursor.write_length_delimited(self);
        Ok(())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(cursor.read_length_delimited()?.to_vec())
    }
}

impl EncodedElement for Ustring {
    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<()> {
        cursor.write_length_delimited(self.as_bytes());
        Ok(())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self> {
        let start = cursor.offset();
        let bytes = cursor.read_length_delimited()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::Decode {
            offset: start,
            reason: "invalid UTF-8 in ustring".into(),
        })
    }
}

impl EncodedElement for Json {
    fn encode(&self, cursor: &mut WriteCursor<'_>) -> Result<()> {
        let text = serde_json::to_vec(self).map_err(|e| Error::Encode {
            reason: e.to_string(),
        })?;
        cursor.write_length_delimited(&text);
        Ok(())
    }

    fn decode(cursor: &mut ReadCursor<'_>) -> Result<Self> {
        let start = cursor.offset();
        let bytes = cursor.read_length_delimited()?;
        serde_json::from_slice(bytes).map_err(|e| Error::Decode {
            offset: start,
            reason: format!("invalid json: {}", e),
        })
    }
}

mod plain {
    use super::PlainElement;
    use crate::buffer::{spans_overlap, BufferAccess, IterationBufferPointer};
    use crate::config::MAX_TRIVIAL_ELEMENT_SIZE;
    use crate::cursor::{ReadCursor, WriteCursor};
    use crate::elementwise::report;
    use crate::error::{Error, Result};
    use std::{mem, ptr, slice};

    fn swap_units<T: PlainElement>(bytes: &mut [u8]) {
        for unit in bytes.chunks_mut(T::SWAP_UNIT) {
            unit.reverse();
        }
    }

    pub(crate) unsafe fn swap_endian_inplace<T: PlainElement, A: BufferAccess>(
        _context: *mut (),
        count: usize,
        buffer: IterationBufferPointer,
        _status: Option<&mut Option<Error>>,
    ) -> usize {
        let size = mem::size_of::<T>();
        for index in 0..count {
            swap_units::<T>(slice::from_raw_parts_mut(A::element(buffer, index, size), size));
        }
        count
    }

    pub(crate) unsafe fn swap_endian<T: PlainElement, A: BufferAccess>(
        _context: *mut (),
        count: usize,
        source: IterationBufferPointer,
        dest: IterationBufferPointer,
        _status: Option<&mut Option<Error>>,
    ) -> usize {
        let size = mem::size_of::<T>();
        let mut scratch = [0u8; MAX_TRIVIAL_ELEMENT_SIZE];
        for index in 0..count {
            let element = &mut scratch[..size];
            ptr::copy_nonoverlapping(A::element(source, index, size), element.as_mut_ptr(), size);
            swap_units::<T>(element);
            ptr::copy_nonoverlapping(element.as_ptr(), A::element(dest, index, size), size);
        }
        count
    }

    pub(crate) unsafe fn copy<T: PlainElement, A: BufferAccess>(
        _context: *mut (),
        count: usize,
        source: IterationBufferPointer,
        dest: IterationBufferPointer,
        _status: Option<&mut Option<Error>>,
    ) -> usize {
        let size = mem::size_of::<T>();
        if spans_overlap::<A>(source, dest, count, size) {
            let mut staged = Vec::with_capacity(count * size);
            for index in 0..count {
                staged.extend_from_slice(slice::from_raw_parts(A::element(source, index, size), size));
            }
            for (index, element) in staged.chunks(size).enumerate() {
                ptr::copy_nonoverlapping(element.as_ptr(), A::element(dest, index, size), size);
            }
            return count;
        }
        for index in 0..count {
            ptr::copy_nonoverlapping(A::element(source, index, size), A::element(dest, index, size), size);
        }
        count
    }

    pub(crate) unsafe fn write_native_endian<T: PlainElement, A: BufferAccess>(
        context: *mut (),
        count: usize,
        source: IterationBufferPointer,
        _status: Option<&mut Option<Error>>,
    ) -> usize {
        let cursor = &mut *context.cast::<WriteCursor<'_>>();
        let size = mem::size_of::<T>();
        for index in 0..count {
            cursor.write_bytes(slice::from_raw_parts(A::element(source, index, size), size));
        }
        count
    }

    pub(crate) unsafe fn write_swapped_endian<T: PlainElement, A: BufferAccess>(
        context: *mut (),
        count: usize,
        source: IterationBufferPointer,
        _status: Option<&mut Option<Error>>,
    ) -> usize {
        let cursor = &mut *context.cast::<WriteCursor<'_>>();
        let size = mem::size_of::<T>();
        for index in 0..count {
            cursor.write_swapped(slice::from_raw_parts(A::element(source, index, size), size), T::SWAP_UNIT);
        }
        count
    }

    unsafe fn read<T: PlainElement, A: BufferAccess>(
        context: *mut (),
        count: usize,
        dest: IterationBufferPointer,
        status: Option<&mut Option<Error>>,
        swapped: bool,
    ) -> usize {
        let cursor = &mut *context.cast::<ReadCursor<'_>>();
        let size = mem::size_of::<T>();
        let mut scratch = [0u8; MAX_TRIVIAL_ELEMENT_SIZE];
        for index in 0..count {
            let offset = cursor.offset();
            let bytes: Result<&[u8]> = cursor.read_bytes(size);
            let bytes = match bytes {
                Ok(bytes) => bytes,
                Err(error) => {
                    report(status, error);
                    return index;
                }
            };
            let element = &mut scratch[..size];
            element.copy_from_slice(bytes);
            if swapped {
                swap_units::<T>(element);
            }
            if !T::valid_bytes(element) {
                report(
                    status,
                    Error::Decode {
                        offset,
                        reason: format!("invalid {} value", crate::registry::descriptor_of::<T>()),
                    },
                );
                return index;
            }
            ptr::copy_nonoverlapping(element.as_ptr(), A::element(dest, index, size), size);
        }
        count
    }

    pub(crate) unsafe fn read_native_endian<T: PlainElement, A: BufferAccess>(
        context: *mut (),
        count: usize,
        dest: IterationBufferPointer,
        status: Option<&mut Option<Error>>,
    ) -> usize {
        read::<T, A>(context, count, dest, status, false)
    }

    pub(crate) unsafe fn read_swapped_endian<T: PlainElement, A: BufferAccess>(
        context: *mut (),
        count: usize,
        dest: IterationBufferPointer,
        status: Option<&mut Option<Error>>,
    ) -> usize {
        read::<T, A>(context, count, dest, status, true)
    }
}

mod encoded {
    use super::EncodedElement;
    use crate::buffer::{BufferAccess, IterationBufferPointer};
    use crate::cursor::{ReadCursor, WriteCursor};
    use crate::elementwise::report;
    use crate::error::Error;
    use std::mem;

    pub(crate) unsafe fn write<T: EncodedElement, A: BufferAccess>(
        context: *mut (),
        count: usize,
        source: IterationBufferPointer,
        status: Option<&mut Option<Error>>,
    ) -> usize {
        let cursor = &mut *context.cast::<WriteCursor<'_>>();
        for index in 0..count {
            let element = &*A::element(source, index, mem::size_of::<T>()).cast::<T>();
            if let Err(error) = element.encode(cursor) {
                report(status, error);
                return index;
            }
        }
        count
    }

    pub(crate) unsafe fn read<T: EncodedElement, A: BufferAccess>(
        context: *mut (),
        count: usize,
        dest: IterationBufferPointer,
        status: Option<&mut Option<Error>>,
    ) -> usize {
        let cursor = &mut *context.cast::<ReadCursor<'_>>();
        for index in 0..count {
            match T::decode(cursor) {
                Ok(value) => *A::element(dest, index, mem::size_of::<T>()).cast::<T>() = value,
                Err(error) => {
                    report(status, error);
                    return index;
                }
            }
        }
        count
    }
}

fn plain_functions<T: PlainElement>() -> UnalignedDataTypeFunctions {
    let copy = elementwise_function!(plain::copy, T, ElementwiseFn2);
    let write_native = elementwise_function!(plain::write_native_endian, T, ElementwiseFn1);
    let read_native = elementwise_function!(plain::read_native_endian, T, ElementwiseFn1);
    if T::SWAP_UNIT == 1 {
        return UnalignedDataTypeFunctions {
            swap_endian_inplace: None,
            swap_endian: Some(copy),
            copy: Some(copy),
            write_native_endian: write_native,
            write_swapped_endian: write_native,
            read_native_endian: read_native,
            read_swapped_endian: read_native,
        };
    }
    UnalignedDataTypeFunctions {
        swap_endian_inplace: Some(elementwise_function!(plain::swap_endian_inplace, T, ElementwiseFn1)),
        swap_endian: Some(elementwise_function!(plain::swap_endian, T, ElementwiseFn2)),
        copy: Some(copy),
        write_native_endian: write_native,
        write_swapped_endian: elementwise_function!(plain::write_swapped_endian, T, ElementwiseFn1),
        read_native_endian: read_native,
        read_swapped_endian: elementwise_function!(plain::read_swapped_endian, T, ElementwiseFn1),
    }
}

fn encoded_functions<T: EncodedElement>() -> UnalignedDataTypeFunctions {
    let write = elementwise_function!(encoded::write, T, ElementwiseFn1);
    let read = elementwise_function!(encoded::read, T, ElementwiseFn1);
    UnalignedDataTypeFunctions {
        swap_endian_inplace: None,
        swap_endian: None,
        copy: None,
        write_native_endian: write,
        write_swapped_endian: write,
        read_native_endian: read,
        read_swapped_endian: read,
    }
}

static UNALIGNED_FUNCTIONS: OnceLock<[UnalignedDataTypeFunctions; NUM_DATA_TYPE_IDS]> =
    OnceLock::new();

fn unaligned_table() -> &'static [UnalignedDataTypeFunctions; NUM_DATA_TYPE_IDS] {
    UNALIGNED_FUNCTIONS.get_or_init(|| {
        // Order must follow DataTypeId::BUILTIN.
        [
            plain_functions::<bool>(),
            plain_functions::<Byte>(),
            plain_functions::<Char>(),
            plain_functions::<i8>(),
            plain_functions::<u8>(),
            plain_functions::<i16>(),
            plain_functions::<u16>(),
            plain_functions::<i32>(),
            plain_functions::<u32>(),
            plain_functions::<i64>(),
            plain_functions::<u64>(),
            plain_functions::<Float16>(),
            plain_functions::<f32>(),
            plain_functions::<f64>(),
            plain_functions::<Complex64>(),
            plain_functions::<Complex128>(),
            encoded_functions::<ByteString>(),
            encoded_functions::<Ustring>(),
            encoded_functions::<Json>(),
        ]
    })
}

/// Functions for a built-in id (`None` for `Custom`).
pub fn unaligned_functions(id: DataTypeId) -> Option<&'static UnalignedDataTypeFunctions> {
    id.index().map(|index| &unaligned_table()[index])
}

fn functions_for(data_type: DataType) -> Result<&'static UnalignedDataTypeFunctions> {
    if !data_type.valid() {
        return Err(Error::InvalidDataType);
    }
    unaligned_functions(data_type.id()).ok_or_else(|| {
        Error::Unsupported(format!("no element codec for data type {}", data_type))
    })
}

/// Appends `count` encoded elements read from `source` to `out`.
///
/// # Safety
///
/// `source` must address `count` initialized, aligned elements of `data_type`
/// using `kind`.
pub unsafe fn encode_elements(
    data_type: DataType,
    endian: Endian,
    kind: IterationBufferKind,
    count: usize,
    source: IterationBufferPointer,
    out: &mut Vec<u8>,
) -> Result<usize> {
    let functions = functions_for(data_type)?;
    let write = if endian == Endian::NATIVE {
        functions.write_native_endian[kind]
    } else {
        functions.write_swapped_endian[kind]
    };
    let mut cursor = WriteCursor::new(out);
    let mut status = None;
    let written = write(
        (&mut cursor as *mut WriteCursor<'_>).cast(),
        count,
        source,
        Some(&mut status),
    );
    match status {
        Some(error) if written < count => Err(error),
        _ => Ok(written),
    }
}

/// Decodes `count` elements from `input` into `dest`; returns the number of
/// input bytes consumed.
///
/// # Safety
///
/// `dest` must address `count` initialized, aligned elements of `data_type`
/// using `kind`.
pub unsafe fn decode_elements(
    data_type: DataType,
    endian: Endian,
    kind: IterationBufferKind,
    count: usize,
    dest: IterationBufferPointer,
    input: &[u8],
) -> Result<usize> {
    let functions = functions_for(data_type)?;
    let read = if endian == Endian::NATIVE {
        functions.read_native_endian[kind]
    } else {
        functions.read_swapped_endian[kind]
    };
    let mut cursor = ReadCursor::new(input);
    let mut status = None;
    let decoded = read(
        (&mut cursor as *mut ReadCursor<'_>).cast(),
        count,
        dest,
        Some(&mut status),
    );
    if decoded < count {
        return Err(status.unwrap_or_else(|| Error::Decode {
            offset: cursor.offset(),
            reason: format!("decoded {} of {} elements", decoded, count),
        }));
    }
    Ok(cursor.offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::descriptor_of;

    #[test]
    fn test_table_shape() {
        let uint8 = unaligned_functions(DataTypeId::Uint8).expect("built-in");
        assert!(uint8.swap_endian_inplace.is_none());
        assert!(uint8.swap_endian.is_some());

        let int32 = unaligned_functions(DataTypeId::Int32).expect("built-in");
        assert!(int32.swap_endian_inplace.is_some());

        let json = unaligned_functions(DataTypeId::Json).expect("built-in");
        assert!(json.copy.is_none());
        assert!(json.swap_endian.is_none());

        assert!(unaligned_functions(DataTypeId::Custom).is_none());

        for id in DataTypeId::BUILTIN {
            let functions = unaligned_functions(id).expect("built-in");
            assert_eq!(functions.copy.is_some(), id.is_trivial(), "{}", id);
        }
    }

    #[test]
    fn test_swap_inplace_complex() {
        let mut values = [Complex64::new(1.0, -2.0)];
        let swap = unaligned_functions(DataTypeId::Complex64)
            .and_then(|f| f.swap_endian_inplace)
            .expect("complex64 swaps");
        unsafe {
            let buffer = IterationBufferPointer::contiguous(values.as_mut_ptr().cast());
            swap[IterationBufferKind::Contiguous](std::ptr::null_mut(), 1, buffer, None);
            assert_eq!(values[0].re.to_bits(), 1.0f32.to_bits().swap_bytes());
            assert_eq!(values[0].im.to_bits(), (-2.0f32).to_bits().swap_bytes());
            swap[IterationBufferKind::Contiguous](std::ptr::null_mut(), 1, buffer, None);
        }
        assert_eq!(values[0], Complex64::new(1.0, -2.0));
    }

    #[test]
    fn test_big_endian_encoding() {
        let mut values = [0x0102_0304u32, 0x0A0B_0C0Du32];
        let mut out = Vec::new();
        let written = unsafe {
            encode_elements(
                descriptor_of::<u32>(),
                Endian::Big,
                IterationBufferKind::Contiguous,
                2,
                IterationBufferPointer::contiguous(values.as_mut_ptr().cast()),
                &mut out,
            )
        }
        .expect("encode");
        assert_eq!(written, 2);
        assert_eq!(out, [1, 2, 3, 4, 0x0A, 0x0B, 0x0C, 0x0D]);
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let mut flags = [false; 2];
        let result = unsafe {
            decode_elements(
                descriptor_of::<bool>(),
                Endian::NATIVE,
                IterationBufferKind::Contiguous,
                2,
                IterationBufferPointer::contiguous(flags.as_mut_ptr().cast()),
                &[1, 7],
            )
        };
        assert!(matches!(result, Err(Error::Decode { offset: 1, .. })));
        assert_eq!(flags, [true, false]);
    }

    #[test]
    fn test_custom_unsupported() {
        #[derive(Debug, Default, Clone, PartialEq)]
        struct Opaque(u8);
        impl ElementType for Opaque {}

        let mut out = Vec::new();
        let mut value = Opaque(1);
        let result = unsafe {
            encode_elements(
                descriptor_of::<Opaque>(),
                Endian::NATIVE,
                IterationBufferKind::Contiguous,
                1,
                IterationBufferPointer::contiguous((&mut value as *mut Opaque).cast()),
                &mut out,
            )
        };
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }
}
