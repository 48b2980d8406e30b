// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors used as the `context` of the element codec functions.

use crate::config::VARINT_MAX_BYTES;
use crate::error::{Error, Result};

/// Appending cursor over a growable buffer (writes never fail).
pub struct WriteCursor<'a> {
    buffer: &'a mut Vec<u8>,
}

impl<'a> WriteCursor<'a> {
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self { buffer }
    }

    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Writes `data` with every `unit`-byte group reversed.
    pub fn write_swapped(&mut self, data: &[u8], unit: usize) {
        for chunk in data.chunks(unit.max(1)) {
            self.buffer.extend(chunk.iter().rev());
        }
    }

    /// Unsigned LEB128.
    pub fn write_varint(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return;
            }
            self.buffer.push(byte | 0x80);
        }
    }

    /// Varint length prefix followed by the bytes.
    pub fn write_length_delimited(&mut self, data: &[u8]) {
        self.write_varint(data.len() as u64);
        self.write_bytes(data);
    }
}

/// Bounds-checked reading cursor.
pub struct ReadCursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn decode_error(&self, reason: impl Into<String>) -> Error {
        Error::Decode {
            offset: self.offset,
            reason: reason.into(),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.decode_error("unexpected end of buffer"));
        }
        let bytes = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for index in 0..VARINT_MAX_BYTES {
            let byte = *self
                .buffer
                .get(self.offset)
                .ok_or_else(|| self.decode_error("unexpected end of varint"))?;
            self.offset += 1;
            let shift = 7 * index as u32;
            if index == VARINT_MAX_BYTES - 1 && byte > 1 {
                return Err(self.decode_error("varint overflows u64"));
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(self.decode_error("varint too long"))
    }

    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| self.decode_error("length exceeds usize"))?;
        self.read_bytes(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_boundaries() {
        let mut buffer = Vec::new();
        let mut writer = WriteCursor::new(&mut buffer);
        for value in [0u64, 127, 128, 300, u64::MAX] {
            writer.write_varint(value);
        }
        assert_eq!(&buffer[..4], &[0x00, 0x7F, 0x80, 0x01]);

        let mut reader = ReadCursor::new(&buffer);
        for expected in [0u64, 127, 128, 300, u64::MAX] {
            assert_eq!(reader.read_varint().expect("varint"), expected);
        }
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_input() {
        let mut reader = ReadCursor::new(&[0x05, b'a', b'b']);
        let err = reader.read_length_delimited().expect_err("needs 5 bytes");
        assert!(matches!(err, Error::Decode { offset: 1, .. }));

        let mut reader = ReadCursor::new(&[0x80]);
        assert!(reader.read_varint().is_err());
    }

    #[test]
    fn test_write_swapped() {
        let mut buffer = Vec::new();
        WriteCursor::new(&mut buffer).write_swapped(&[1, 2, 3, 4, 5, 6, 7, 8], 4);
        assert_eq!(buffer, [4, 3, 2, 1, 8, 7, 6, 5]);
    }
}
