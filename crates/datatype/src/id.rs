// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Closed enumeration of built-in element kinds.

use crate::config::NUM_DATA_TYPE_IDS;

/// Built-in data type id.
///
/// Every variant except `Custom` names exactly one built-in descriptor.
/// `Custom` is shared by all user-defined element types and is never a
/// registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DataTypeId {
    Bool = 0,
    Byte,
    Char,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float16,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Ustring,
    Json,
    Custom,
}

/// Canonical names, indexed by `DataTypeId as usize`.
const CANONICAL_NAMES: [&str; NUM_DATA_TYPE_IDS] = [
    "bool",
    "byte",
    "char",
    "int8",
    "uint8",
    "int16",
    "uint16",
    "int32",
    "uint32",
    "int64",
    "uint64",
    "float16",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "string",
    "ustring",
    "json",
];

impl DataTypeId {
    /// All built-in ids in table order.
    pub const BUILTIN: [DataTypeId; NUM_DATA_TYPE_IDS] = [
        Self::Bool,
        Self::Byte,
        Self::Char,
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Int64,
        Self::Uint64,
        Self::Float16,
        Self::Float32,
        Self::Float64,
        Self::Complex64,
        Self::Complex128,
        Self::String,
        Self::Ustring,
        Self::Json,
    ];

    /// Position in the built-in table (`None` for `Custom`).
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Custom => None,
            other => Some(other as usize),
        }
    }

    pub const fn is_builtin(self) -> bool {
        !matches!(self, Self::Custom)
    }

    /// Canonical name of a built-in id.
    pub const fn canonical_name(self) -> Option<&'static str> {
        match self.index() {
            Some(index) => Some(CANONICAL_NAMES[index]),
            None => None,
        }
    }

    /// Inverse of [`canonical_name`](Self::canonical_name).
    pub fn from_name(name: &str) -> Option<Self> {
        CANONICAL_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| Self::BUILTIN[index])
    }

    /// True for element types whose values are plain bytes (no heap state).
    pub const fn is_trivial(self) -> bool {
        !matches!(
            self,
            Self::String | Self::Ustring | Self::Json | Self::Custom
        )
    }
}

impl std::fmt::Display for DataTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name().unwrap_or("custom"))
    }
}
