// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unreadable_literal)] // Test constants

//! Shared allocation tests.

use datatype::{
    allocate_and_construct_shared, allocate_and_construct_shared_elements, descriptor_of,
    DataType, ElementInitialization, ElementType, Error, IterationBufferKind,
};
use std::cell::Cell;
use std::panic;
use std::sync::{Arc, Barrier};

#[test]
fn test_oversized_request_fails() {
    let result = allocate_and_construct_shared::<i32>(0xFFFFFFFFFFFFFFF, ElementInitialization::DefaultInit);
    assert!(matches!(
        result,
        Err(Error::AllocationFailed {
            element_size: 4,
            ..
        })
    ));

    let erased = allocate_and_construct_shared_elements(
        usize::MAX,
        ElementInitialization::ValueInit,
        descriptor_of::<u64>(),
    );
    assert!(matches!(erased, Err(Error::AllocationFailed { .. })));
}

#[test]
fn test_value_init_zeroes() {
    let values = allocate_and_construct_shared::<f64>(16, ElementInitialization::ValueInit)
        .expect("small allocation");
    assert_eq!(values.len(), 16);
    assert!(values.iter().all(|v| *v == 0.0));
}

#[test]
fn test_zero_count() {
    let empty = allocate_and_construct_shared::<String>(0, ElementInitialization::DefaultInit)
        .expect("empty allocation");
    assert!(empty.is_empty());
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Holder(Option<Arc<i32>>);

impl ElementType for Holder {}

#[test]
fn test_elements_dropped_with_last_holder() {
    let shared = Arc::new(7);
    let mut elements = allocate_and_construct_shared::<Holder>(3, ElementInitialization::DefaultInit)
        .expect("allocation");
    {
        let slots = elements.get_mut().expect("unique holder");
        for slot in slots.iter_mut() {
            *slot = Holder(Some(Arc::clone(&shared)));
        }
    }
    assert_eq!(Arc::strong_count(&shared), 4);

    let second = elements.clone();
    assert_eq!(elements.holders(), 2);
    assert!(elements.get_mut().is_none());
    drop(elements);
    assert_eq!(Arc::strong_count(&shared), 4);
    drop(second);
    assert_eq!(Arc::strong_count(&shared), 1);
}

#[test]
fn test_erased_allocation() {
    let data_type = descriptor_of::<String>();
    let elements =
        allocate_and_construct_shared_elements(4, ElementInitialization::DefaultInit, data_type)
            .expect("allocation");
    assert_eq!(elements.data_type(), data_type);
    assert_eq!(elements.len(), 4);
    assert_eq!(elements.as_ptr() as usize % data_type.alignment(), 0);

    let ops = data_type.operations().expect("valid");
    let mut source = vec![String::from("left"), String::from("right")];
    unsafe {
        (ops.copy_assign[IterationBufferKind::Contiguous])(
            std::ptr::null_mut(),
            2,
            datatype::IterationBufferPointer::contiguous(source.as_mut_ptr().cast()),
            elements.buffer_pointer(),
            None,
        );
    }
    let view = elements.as_slice::<String>().expect("same type");
    assert_eq!(view, ["left", "right", "", ""]);
    assert!(elements.as_slice::<u32>().is_none());

    let unspecified =
        allocate_and_construct_shared_elements(1, ElementInitialization::DefaultInit, DataType::default());
    assert_eq!(unspecified.unwrap_err(), Error::InvalidDataType);
}

#[test]
fn test_concurrent_release_frees_once() {
    let shared = Arc::new(11);
    let mut elements = allocate_and_construct_shared::<Holder>(4, ElementInitialization::DefaultInit)
        .expect("allocation");
    for slot in elements.get_mut().expect("unique holder") {
        *slot = Holder(Some(Arc::clone(&shared)));
    }
    let clones: Vec<_> = (0..8).map(|_| elements.clone()).collect();
    drop(elements);
    assert_eq!(Arc::strong_count(&shared), 5);

    let barrier = Barrier::new(clones.len());
    crossbeam::scope(|scope| {
        for clone in clones {
            let barrier = &barrier;
            scope.spawn(move |_| {
                assert!(clone.iter().all(|holder| holder.0.is_some()));
                barrier.wait();
                drop(clone);
            });
        }
    })
    .expect("scope");
    assert_eq!(Arc::strong_count(&shared), 1);
}

thread_local! {
    static DEFAULTS_LEFT: Cell<usize> = const { Cell::new(usize::MAX) };
    static FLAKY_DROPS: Cell<usize> = const { Cell::new(0) };
}

/// Element whose `Default` panics once the per-thread budget runs out.
#[derive(Debug, Clone, PartialEq)]
struct Flaky(u32);

impl Default for Flaky {
    fn default() -> Self {
        DEFAULTS_LEFT.with(|left| {
            let remaining = left.get();
            assert!(remaining > 0, "default budget exhausted");
            left.set(remaining - 1);
        });
        Flaky(1)
    }
}

impl Drop for Flaky {
    fn drop(&mut self) {
        FLAKY_DROPS.with(|drops| drops.set(drops.get() + 1));
    }
}

impl ElementType for Flaky {}

fn arm_flaky(budget: usize) {
    DEFAULTS_LEFT.with(|left| left.set(budget));
    FLAKY_DROPS.with(|drops| drops.set(0));
}

#[test]
fn test_panicking_default_drops_constructed_prefix() {
    arm_flaky(2);
    let result = panic::catch_unwind(|| {
        allocate_and_construct_shared::<Flaky>(5, ElementInitialization::DefaultInit)
    });
    assert!(result.is_err());
    assert_eq!(FLAKY_DROPS.with(Cell::get), 2);

    arm_flaky(3);
    let result = panic::catch_unwind(|| {
        allocate_and_construct_shared_elements(
            5,
            ElementInitialization::ValueInit,
            descriptor_of::<Flaky>(),
        )
    });
    assert!(result.is_err());
    assert_eq!(FLAKY_DROPS.with(Cell::get), 3);
    arm_flaky(usize::MAX);
}
