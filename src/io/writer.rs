// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Primitive encoding of Guitar Pro scalars and strings.

use std::borrow::Cow;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use encoding_rs::Encoding;
use tracing::warn;

use super::location::{Located, Location};
use super::VERSION_SLOT;
use crate::error::{GpError, Result};
use crate::format::Version;

/// Little-endian writer over any byte sink
pub struct GpWriter<'a> {
    inner: &'a mut dyn Write,
    encoding: &'static Encoding,
    tag: String,
    format: Version,
    location: Location,
}

impl<'a> GpWriter<'a> {
    /// Create a new writer encoding text with `encoding`
    pub fn new(inner: &'a mut dyn Write, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            tag: String::new(),
            format: Version::default(),
            location: Location::default(),
        }
    }

    /// Format version being written
    pub fn version(&self) -> Version {
        self.format
    }

    /// Version tag emitted at the start of the file
    pub fn version_tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn set_version(&mut self, tag: &str, version: Version) {
        self.tag = tag.to_string();
        self.format = version;
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.inner.write_i8(value)?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.inner.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.inner.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.inner.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.inner.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    /// Emit `count` zero bytes for a reserved run
    pub fn placeholder(&mut self, count: usize) -> Result<()> {
        self.inner.write_all(&vec![0u8; count])?;
        Ok(())
    }

    fn encode<'s>(&self, text: &'s str) -> Cow<'s, [u8]> {
        let (bytes, _, lossy) = self.encoding.encode(text);
        if lossy {
            warn!(
                location = %self.location,
                encoding = self.encoding.name(),
                "text {:?} is not representable and was replaced",
                text
            );
        }
        bytes
    }

    fn length_byte(length: usize, limit: usize) -> Result<u8> {
        if length > limit {
            return Err(GpError::malformed(format!(
                "string of {length} bytes does not fit a {limit}-byte slot"
            )));
        }
        u8::try_from(length).map_err(|_| GpError::malformed(format!("string of {length} bytes is too long")))
    }

    /// Length byte followed by the text padded to a `size`-byte slot
    pub fn write_byte_size_string(&mut self, text: &str, size: usize) -> Result<()> {
        let bytes = self.encode(text);
        let length = Self::length_byte(bytes.len(), size)?;
        self.write_u8(length)?;
        self.inner.write_all(&bytes)?;
        self.placeholder(size - bytes.len())
    }

    /// `i32` length followed by the text
    pub fn write_int_size_string(&mut self, text: &str) -> Result<()> {
        let bytes = self.encode(text);
        let length = i32::try_from(bytes.len())
            .map_err(|_| GpError::malformed(format!("string of {} bytes is too long", bytes.len())))?;
        self.write_i32(length)?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    /// `i32` holding length + 1, then the length byte and the text
    pub fn write_int_byte_size_string(&mut self, text: &str) -> Result<()> {
        let bytes = self.encode(text);
        let length = Self::length_byte(bytes.len(), u8::MAX as usize)?;
        self.write_i32(i32::from(length) + 1)?;
        self.write_u8(length)?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    /// Version tag in the 30-byte header slot
    pub fn write_version(&mut self, tag: &str) -> Result<()> {
        self.write_byte_size_string(tag, VERSION_SLOT)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl Located for GpWriter<'_> {
    const ACTION: &'static str = "writing";

    fn location(&self) -> &Location {
        &self.location
    }

    fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::GpReader;
    use encoding_rs::WINDOWS_1252;

    fn written(f: impl FnOnce(&mut GpWriter) -> Result<()>) -> Vec<u8> {
        let mut out = Vec::new();
        let mut io = GpWriter::new(&mut out, WINDOWS_1252);
        f(&mut io).unwrap();
        out
    }

    #[test]
    fn test_write_scalars() {
        let out = written(|io| {
            io.write_i8(-1)?;
            io.write_i16(0x1234)?;
            io.write_i32(-2)
        });
        assert_eq!(out, vec![0xff, 0x34, 0x12, 0xfe, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_byte_size_string_slot() {
        for size in [3usize, 4, 40] {
            let out = written(|io| io.write_byte_size_string("abc", size));
            assert_eq!(out.len(), size + 1);
            assert_eq!(out[0], 3);
            assert!(out[4..].iter().all(|&b| b == 0));

            let mut data: &[u8] = &out;
            let mut io = GpReader::new(&mut data, WINDOWS_1252);
            assert_eq!(io.read_byte_size_string(size).unwrap(), "abc");
        }
    }

    #[test]
    fn test_byte_size_string_too_long_for_slot() {
        let mut out = Vec::new();
        let mut io = GpWriter::new(&mut out, WINDOWS_1252);
        let err = io.write_byte_size_string("abcdef", 4).unwrap_err();
        assert!(matches!(err, GpError::MalformedStructure(_)));
        drop(io);
        assert!(out.is_empty());
    }

    #[test]
    fn test_int_byte_size_prefix_off_by_one() {
        for length in 0..=255usize {
            let text = "x".repeat(length);
            let out = written(|io| io.write_int_byte_size_string(&text));
            assert_eq!(i32::from_le_bytes([out[0], out[1], out[2], out[3]]), length as i32 + 1);
            assert_eq!(out[4] as usize, length);
            assert_eq!(out.len(), 5 + length);

            let mut data: &[u8] = &out;
            let mut io = GpReader::new(&mut data, WINDOWS_1252);
            assert_eq!(io.read_int_byte_size_string().unwrap(), text);
        }
    }

    #[test]
    fn test_int_byte_size_string_over_255_bytes() {
        let mut out = Vec::new();
        let mut io = GpWriter::new(&mut out, WINDOWS_1252);
        assert!(io.write_int_byte_size_string(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_int_size_string() {
        let out = written(|io| io.write_int_size_string("hey"));
        assert_eq!(out, vec![3, 0, 0, 0, b'h', b'e', b'y']);
    }

    #[test]
    fn test_text_encoding_counts_encoded_bytes() {
        let out = written(|io| io.write_int_byte_size_string("caf\u{e9}"));
        assert_eq!(out[4], 4);
        assert_eq!(out[8], 0xe9);
    }
}
