// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the registry, casting, allocation and codec layers.

/// Errors returned by data type operations.
///
/// "Not found" conditions are usually reported as `Option::None` by the
/// lookup functions; the variants below are produced by the boundary wrappers
/// that must explain what was rejected.
///
/// # Example
///
/// ```rust
/// use datatype::{parse_data_type, Error};
///
/// match parse_data_type("int33") {
///     Err(Error::UnknownName(name)) => assert_eq!(name, "int33"),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// No data type is registered under this name.
    UnknownName(String),
    /// A different concrete type already owns this name.
    DuplicateName { name: String },
    /// The operation requires a valid (non-sentinel) data type.
    InvalidDataType,

    // ========================================================================
    // Cast Errors
    // ========================================================================
    /// Checked static cast failed (canonical names of both sides).
    InvalidCast { from: String, to: String },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Storage for `count` elements of `element_size` bytes cannot be provided.
    AllocationFailed { count: usize, element_size: usize },

    // ========================================================================
    // Foreign Interop Errors
    // ========================================================================
    /// The data type has no NumPy dtype counterpart.
    NoNumpyDtype { name: String },
    /// The NumPy type number has no data type counterpart.
    NoDataTypeForNumpy { type_num: i32 },

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// The data type does not support the requested operation.
    Unsupported(String),
    /// Element decoding failed at the given input offset.
    Decode { offset: usize, reason: String },
    /// Element encoding failed.
    Encode { reason: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Lookup
            Error::UnknownName(name) => write!(f, "No data type with name: {:?}", name),
            Error::DuplicateName { name } => write!(
                f,
                "Data type name {:?} is already registered to a different type",
                name
            ),
            Error::InvalidDataType => write!(f, "Data type is unspecified"),
            // Cast
            Error::InvalidCast { from, to } => write!(
                f,
                "Cannot cast data type of {} to data type of {}",
                from, to
            ),
            // Resource
            Error::AllocationFailed {
                count,
                element_size,
            } => write!(
                f,
                "Allocation failed: {} elements of {} bytes",
                count, element_size
            ),
            // Foreign interop
            Error::NoNumpyDtype { name } => write!(
                f,
                "No NumPy dtype corresponding to data type: {:?}",
                name
            ),
            Error::NoDataTypeForNumpy { type_num } => write!(
                f,
                "No data type corresponding to NumPy type number: {}",
                type_num
            ),
            // Codec
            Error::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::Decode { offset, reason } => {
                write!(f, "Decode failed at offset {}: {}", offset, reason)
            }
            Error::Encode { reason } => write!(f, "Encode failed: {}", reason),
        }
    }
}

impl std::error::Error for Error {}

/// Convenient alias for results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
