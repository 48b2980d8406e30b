// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide data type registry.
//!
//! # Architecture
//!
//! ```text
//! BUILTINS (OnceLock, populated on first access)
//! +-- [DataTypeOperations; NUM_DATA_TYPE_IDS]   indexed by DataTypeId
//!
//! BUILTIN_TOKENS (OnceLock<HashMap>)
//! +-- TypeToken -> DataType                      built-ins + isize/usize aliases
//!
//! CUSTOM (OnceLock<DashMap>)
//! +-- TypeToken -> &'static DataTypeOperations  minted on first descriptor_of::<T>()
//!
//! NAMES (OnceLock<RwLock<HashMap>>)
//! +-- name -> DataType                           custom types bound by register::<T>()
//! ```
//!
//! # Thread Safety
//!
//! - Built-ins: `OnceLock` runs the population exactly once, before any lookup
//!   can observe the table.
//! - Custom descriptors: minted inside the `DashMap` entry, so concurrent
//!   first use of a type yields a single record (first caller wins).
//! - Names: append-only `RwLock` (many readers, rare writers).
//!
//! Records are leaked on purpose: a descriptor lives for the whole process.

use crate::config::{ISIZE_ID, NUM_DATA_TYPE_IDS, USIZE_ID};
use crate::descriptor::{DataType, DataTypeOperations, TypeToken};
use crate::element::{
    Byte, ByteString, Char, Complex128, Complex64, ElementType, Float16, Json, Ustring,
};
use crate::error::{Error, Result};
use crate::id::DataTypeId;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;

static BUILTINS: OnceLock<[DataTypeOperations; NUM_DATA_TYPE_IDS]> = OnceLock::new();
static BUILTIN_DATA_TYPES: OnceLock<[DataType; NUM_DATA_TYPE_IDS]> = OnceLock::new();
static BUILTIN_TOKENS: OnceLock<HashMap<TypeToken, DataType>> = OnceLock::new();
static CUSTOM: OnceLock<DashMap<TypeToken, &'static DataTypeOperations>> = OnceLock::new();
static NAMES: OnceLock<RwLock<HashMap<&'static str, DataType>>> = OnceLock::new();

fn builtin_operations<T: ElementType>(id: DataTypeId) -> DataTypeOperations {
    DataTypeOperations::of::<T>(id, id.canonical_name().unwrap_or_default())
}

fn builtins() -> &'static [DataTypeOperations; NUM_DATA_TYPE_IDS] {
    BUILTINS.get_or_init(|| {
        log::debug!(
            "[registry] populating {} built-in data types",
            NUM_DATA_TYPE_IDS
        );
        // Order must follow DataTypeId::BUILTIN.
        [
            builtin_operations::<bool>(DataTypeId::Bool),
            builtin_operations::<Byte>(DataTypeId::Byte),
            builtin_operations::<Char>(DataTypeId::Char),
            builtin_operations::<i8>(DataTypeId::Int8),
            builtin_operations::<u8>(DataTypeId::Uint8),
            builtin_operations::<i16>(DataTypeId::Int16),
            builtin_operations::<u16>(DataTypeId::Uint16),
            builtin_operations::<i32>(DataTypeId::Int32),
            builtin_operations::<u32>(DataTypeId::Uint32),
            builtin_operations::<i64>(DataTypeId::Int64),
            builtin_operations::<u64>(DataTypeId::Uint64),
            builtin_operations::<Float16>(DataTypeId::Float16),
            builtin_operations::<f32>(DataTypeId::Float32),
            builtin_operations::<f64>(DataTypeId::Float64),
            builtin_operations::<Complex64>(DataTypeId::Complex64),
            builtin_operations::<Complex128>(DataTypeId::Complex128),
            builtin_operations::<ByteString>(DataTypeId::String),
            builtin_operations::<Ustring>(DataTypeId::Ustring),
            builtin_operations::<Json>(DataTypeId::Json),
        ]
    })
}

fn custom_cache() -> &'static DashMap<TypeToken, &'static DataTypeOperations> {
    CUSTOM.get_or_init(DashMap::new)
}

fn name_index() -> &'static RwLock<HashMap<&'static str, DataType>> {
    NAMES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// All built-in descriptors, in `DataTypeId` order.
pub fn builtin_data_types() -> &'static [DataType] {
    BUILTIN_DATA_TYPES.get_or_init(|| {
        let table = builtins();
        std::array::from_fn(|index| DataType::from_static(&table[index]))
    })
}

/// Token index over the built-in table, plus the platform-width aliases
/// (`isize`, `usize`) that share a fixed-width record.
fn builtin_tokens() -> &'static HashMap<TypeToken, DataType> {
    BUILTIN_TOKENS.get_or_init(|| {
        let mut tokens: HashMap<TypeToken, DataType> = builtins()
            .iter()
            .map(|operations| (operations.token, DataType::from_static(operations)))
            .collect();
        for (token, id) in [
            (TypeToken::of::<isize>(), ISIZE_ID),
            (TypeToken::of::<usize>(), USIZE_ID),
        ] {
            if let Some(data_type) = lookup_by_id(id) {
                tokens.insert(token, data_type);
            }
        }
        tokens
    })
}

/// Canonical descriptor of `T`. Repeated calls return identical handles.
///
/// Resolution is by type token only: a type gets a built-in record when it
/// is that built-in (or a platform-width alias of it), and its own custom
/// record otherwise.
pub fn descriptor_of<T: ElementType>() -> DataType {
    match builtin_tokens().get(&TypeToken::of::<T>()) {
        Some(data_type) => *data_type,
        None => custom_descriptor::<T>(),
    }
}

fn custom_descriptor<T: ElementType>() -> DataType {
    let token = TypeToken::of::<T>();
    let cache = custom_cache();
    if let Some(hit) = cache.get(&token) {
        return DataType::from_static(*hit);
    }
    let entry = cache.entry(token).or_insert_with(|| {
        log::debug!(
            "[registry] minting custom data type {} (size={}, align={})",
            T::type_name(),
            std::mem::size_of::<T>(),
            std::mem::align_of::<T>()
        );
        let leaked: &'static DataTypeOperations = Box::leak(Box::new(
            DataTypeOperations::of::<T>(DataTypeId::Custom, T::type_name()),
        ));
        leaked
    });
    DataType::from_static(*entry)
}

/// Binds `T`'s name in the name index so `lookup_by_name` can find it.
///
/// Idempotent for the same type. Fails with [`Error::DuplicateName`] when the
/// name belongs to a built-in or to another registered type.
pub fn register<T: ElementType>() -> Result<DataType> {
    let data_type = descriptor_of::<T>();
    let name = data_type.name();

    if let Some(id) = DataTypeId::from_name(name) {
        if data_type.id() == id {
            return Ok(data_type);
        }
        log::warn!("[registry] {} collides with built-in name", name);
        return Err(Error::DuplicateName {
            name: name.to_string(),
        });
    }

    let mut names = name_index().write();
    match names.get(name) {
        Some(existing) if *existing == data_type => Ok(data_type),
        Some(_) => {
            log::warn!(
                "[registry] rejecting {}: name already registered to another type",
                name
            );
            Err(Error::DuplicateName {
                name: name.to_string(),
            })
        }
        None => {
            log::debug!("[registry] registered custom data type {}", name);
            names.insert(name, data_type);
            Ok(data_type)
        }
    }
}

/// Descriptor for a canonical (or registered custom) name.
pub fn lookup_by_name(name: &str) -> Option<DataType> {
    if let Some(id) = DataTypeId::from_name(name) {
        return lookup_by_id(id);
    }
    name_index().read().get(name).copied()
}

/// Descriptor for a built-in id; `None` for `DataTypeId::Custom`.
pub fn lookup_by_id(id: DataTypeId) -> Option<DataType> {
    id.index().map(|index| builtin_data_types()[index])
}

/// Boundary form of [`lookup_by_name`]: unknown names become
/// [`Error::UnknownName`] carrying the rejected input.
pub fn parse_data_type(name: &str) -> Result<DataType> {
    lookup_by_name(name).ok_or_else(|| Error::UnknownName(name.to_string()))
}
