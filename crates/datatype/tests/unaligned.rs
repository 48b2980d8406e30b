// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unreadable_literal)] // Test constants

//! Element codec tests: native and swapped byte order, variable-length types.

use datatype::{
    allocate_and_construct_shared_elements, builtin_data_types, decode_elements, descriptor_of,
    encode_elements, unaligned_functions, Complex128, DataTypeId, ElementInitialization,
    ElementType, Endian, Error, Float16, IterationBufferKind, IterationBufferPointer, Json,
};
use std::ptr;

fn encode<T: ElementType>(values: &mut [T], endian: Endian) -> Vec<u8> {
    let mut out = Vec::new();
    let written = unsafe {
        encode_elements(
            descriptor_of::<T>(),
            endian,
            IterationBufferKind::Contiguous,
            values.len(),
            IterationBufferPointer::contiguous(values.as_mut_ptr().cast()),
            &mut out,
        )
    }
    .expect("encode");
    assert_eq!(written, values.len());
    out
}

fn decode<T: ElementType>(bytes: &[u8], count: usize, endian: Endian) -> Result<Vec<T>, Error> {
    let mut values = vec![T::default(); count];
    let consumed = unsafe {
        decode_elements(
            descriptor_of::<T>(),
            endian,
            IterationBufferKind::Contiguous,
            count,
            IterationBufferPointer::contiguous(values.as_mut_ptr().cast()),
            bytes,
        )
    }?;
    assert_eq!(consumed, bytes.len());
    Ok(values)
}

#[test]
fn test_random_integers_round_trip() {
    let mut rng = fastrand::Rng::with_seed(0x5EED);
    let mut values: Vec<i64> = (0..64).map(|_| rng.i64(..)).collect();
    for endian in [Endian::Little, Endian::Big] {
        let bytes = encode(&mut values, endian);
        assert_eq!(bytes.len(), 64 * 8);
        assert_eq!(decode::<i64>(&bytes, 64, endian), Ok(values.clone()));
    }
}

#[test]
fn test_swapped_layout_matches_std() {
    let mut values = [0x1122u16, 0x3344];
    assert_eq!(encode(&mut values, Endian::Big), [0x11, 0x22, 0x33, 0x44]);
    assert_eq!(encode(&mut values, Endian::Little), [0x22, 0x11, 0x44, 0x33]);

    let mut halves = [Float16::from_f32(1.5)];
    let expected = Float16::from_f32(1.5).to_be_bytes();
    assert_eq!(encode(&mut halves, Endian::Big), expected);
}

#[test]
fn test_complex_swaps_each_component() {
    let mut values = [Complex128::new(1.25, -8.0)];
    let mut expected = 1.25f64.to_be_bytes().to_vec();
    expected.extend_from_slice(&(-8.0f64).to_be_bytes());
    let bytes = encode(&mut values, Endian::Big);
    assert_eq!(bytes, expected);
    assert_eq!(decode::<Complex128>(&bytes, 1, Endian::Big), Ok(values.to_vec()));
}

#[test]
fn test_strings_length_delimited() {
    let mut values = vec![String::from("hé"), String::new()];
    let bytes = encode(&mut values, Endian::Big);
    assert_eq!(bytes, [3, b'h', 0xC3, 0xA9, 0]);
    assert_eq!(decode::<String>(&bytes, 2, Endian::Little), Ok(values));

    let invalid = [2u8, 0xFF, 0xFE];
    assert!(matches!(
        decode::<String>(&invalid, 1, Endian::NATIVE),
        Err(Error::Decode { offset: 0, .. })
    ));
}

#[test]
fn test_json_round_trip() {
    let mut values: Vec<Json> = vec![serde_json::json!({"k": [1, 2]}), Json::Null];
    let bytes = encode(&mut values, Endian::NATIVE);
    assert_eq!(decode::<Json>(&bytes, 2, Endian::NATIVE), Ok(values));

    let mut broken = vec![3u8];
    broken.extend_from_slice(b"{x}");
    assert!(decode::<Json>(&broken, 1, Endian::NATIVE).is_err());
}

#[test]
fn test_truncated_input() {
    let err = decode::<u32>(&[1, 2, 3, 4, 5], 2, Endian::NATIVE).unwrap_err();
    assert!(matches!(err, Error::Decode { offset: 4, .. }));
}

#[test]
fn test_unaligned_copy() {
    let copy = unaligned_functions(DataTypeId::Float64)
        .and_then(|functions| functions.copy)
        .expect("float64 copies");
    let mut source = [0u8; 17];
    source[1..9].copy_from_slice(&2.5f64.to_ne_bytes());
    source[9..17].copy_from_slice(&(-1.0f64).to_ne_bytes());
    let mut dest = [0u8; 19];
    unsafe {
        copy[IterationBufferKind::Contiguous](
            ptr::null_mut(),
            2,
            IterationBufferPointer::contiguous(source.as_mut_ptr().add(1)),
            IterationBufferPointer::contiguous(dest.as_mut_ptr().add(3)),
            None,
        );
    }
    assert_eq!(&dest[3..19], &source[1..17]);
}

#[test]
fn test_every_builtin_round_trips() {
    const COUNT: usize = 3;
    for data_type in builtin_data_types().iter().copied() {
        let source =
            allocate_and_construct_shared_elements(COUNT, ElementInitialization::ValueInit, data_type)
                .expect("allocation");
        let target =
            allocate_and_construct_shared_elements(COUNT, ElementInitialization::DefaultInit, data_type)
                .expect("allocation");
        let ops = data_type.operations().expect("built-in");
        for endian in [Endian::Little, Endian::Big] {
            let mut bytes = Vec::new();
            unsafe {
                encode_elements(
                    data_type,
                    endian,
                    IterationBufferKind::Contiguous,
                    COUNT,
                    source.buffer_pointer(),
                    &mut bytes,
                )
                .expect("encode");
                decode_elements(
                    data_type,
                    endian,
                    IterationBufferKind::Contiguous,
                    COUNT,
                    target.buffer_pointer(),
                    &bytes,
                )
                .expect("decode");
                let equal = (ops.compare_equal[IterationBufferKind::Contiguous])(
                    ptr::null_mut(),
                    COUNT,
                    source.buffer_pointer(),
                    target.buffer_pointer(),
                    None,
                );
                assert_eq!(equal, COUNT, "{} {:?}", data_type, endian);
            }
        }
    }
}
