// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Primitive decoding of Guitar Pro scalars and strings.

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::Encoding;
use tracing::warn;

use super::location::{Located, Location};
use super::VERSION_SLOT;
use crate::error::{GpError, Result};
use crate::format::Version;
use crate::models::WireEnum;

/// Elements of a repeated read, plus the error that stopped it early.
#[derive(Debug)]
pub struct Repeated<T> {
    items: Vec<T>,
    error: Option<GpError>,
}

impl<T> Repeated<T> {
    /// All elements, failing if any read failed
    pub fn complete(self) -> Result<Vec<T>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.items),
        }
    }

    /// The elements read before the input ran out.
    ///
    /// Only a short read is forgiven; other errors still fail.
    pub fn lenient(self) -> Result<Vec<T>> {
        match self.error {
            Some(error) if !error.is_truncated() => Err(error),
            _ => Ok(self.items),
        }
    }
}

/// Caller-side default for reads that may run past the end of input.
pub trait OrTruncated<T> {
    fn or_truncated(self, default: T) -> Result<T>;
}

impl<T> OrTruncated<T> for Result<T> {
    fn or_truncated(self, default: T) -> Result<T> {
        match self {
            Err(error) if error.is_truncated() => Ok(default),
            other => other,
        }
    }
}

/// Little-endian reader over any byte source
pub struct GpReader<'a> {
    inner: &'a mut dyn Read,
    encoding: &'static Encoding,
    version: Option<String>,
    format: Version,
    location: Location,
}

impl<'a> GpReader<'a> {
    /// Create a new reader decoding text with `encoding`
    pub fn new(inner: &'a mut dyn Read, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            version: None,
            format: Version::default(),
            location: Location::default(),
        }
    }

    /// Format version the stream is being decoded as
    pub fn version(&self) -> Version {
        self.format
    }

    pub(crate) fn set_version(&mut self, version: Version) {
        self.format = version;
    }

    /// Fill `buf` completely or report how much was available
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(GpError::TruncatedInput {
                        needed: buf.len(),
                        available: filled,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_i16(&buf))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_i32(&buf))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_f32(&buf))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(LittleEndian::read_f64(&buf))
    }

    /// Read a non-negative `i32` count
    pub fn read_count(&mut self, what: &str) -> Result<usize> {
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| GpError::malformed(format!("negative {what} count {count}")))
    }

    /// Run `f` up to `count` times, stopping at the first failure
    pub fn read_repeated<T>(&mut self, count: usize, mut f: impl FnMut(&mut Self) -> Result<T>) -> Repeated<T> {
        let mut items = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            match f(self) {
                Ok(item) => items.push(item),
                Err(error) => {
                    return Repeated {
                        items,
                        error: Some(error),
                    }
                }
            }
        }
        Repeated { items, error: None }
    }

    /// Consume `count` reserved bytes
    pub fn skip(&mut self, count: usize) -> Result<()> {
        let copied = io::copy(&mut (&mut *self.inner).take(count as u64), &mut io::sink())?;
        if (copied as usize) < count {
            return Err(GpError::TruncatedInput {
                needed: count,
                available: copied as usize,
            });
        }
        Ok(())
    }

    fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut *self.inner).take(count as u64).read_to_end(&mut bytes)?;
        if bytes.len() < count {
            return Err(GpError::TruncatedInput {
                needed: count,
                available: bytes.len(),
            });
        }
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> String {
        self.encoding.decode_without_bom_handling(bytes).0.into_owned()
    }

    /// Length byte plus a slot; `None` means the slot is exactly the length
    fn read_slot_string(&mut self, slot: Option<usize>) -> Result<String> {
        let length = self.read_u8()? as usize;
        let count = match slot {
            Some(size) if length > size => {
                return Err(GpError::malformed(format!(
                    "string length {length} exceeds its {size}-byte slot"
                )))
            }
            Some(size) => size,
            None => length,
        };
        let bytes = self.read_bytes(count)?;
        Ok(self.decode(&bytes[..length]))
    }

    /// Length byte followed by a fixed `size`-byte slot
    pub fn read_byte_size_string(&mut self, size: usize) -> Result<String> {
        self.read_slot_string(Some(size))
    }

    /// `i32` length followed by exactly that many bytes
    pub fn read_int_size_string(&mut self) -> Result<String> {
        let length = self.read_i32()?;
        let length = usize::try_from(length)
            .map_err(|_| GpError::malformed(format!("negative string length {length}")))?;
        let bytes = self.read_bytes(length)?;
        Ok(self.decode(&bytes))
    }

    /// `i32` holding length + 1, then a byte-size string in that slot
    pub fn read_int_byte_size_string(&mut self) -> Result<String> {
        let size = i64::from(self.read_i32()?) - 1;
        let slot = usize::try_from(size).ok().filter(|&size| size > 0);
        self.read_slot_string(slot)
    }

    /// Version tag in the 30-byte header slot, read once
    pub fn read_version(&mut self) -> Result<String> {
        if let Some(version) = &self.version {
            return Ok(version.clone());
        }
        let version = self.read_byte_size_string(VERSION_SLOT)?;
        self.version = Some(version.clone());
        Ok(version)
    }

    /// Map a raw value onto an enum, warning when it is not listed
    pub fn wire<E: WireEnum>(&self, raw: E::Raw) -> E {
        let value = E::from_raw(raw);
        if !value.is_known() {
            warn!(location = %self.location, value = %raw, "unknown {} value", E::NAME);
        }
        value
    }

    pub fn read_enum<E: WireEnum<Raw = u8>>(&mut self) -> Result<E> {
        let raw = self.read_u8()?;
        Ok(self.wire(raw))
    }

    pub fn read_signed_enum<E: WireEnum<Raw = i8>>(&mut self) -> Result<E> {
        let raw = self.read_i8()?;
        Ok(self.wire(raw))
    }
}

impl Located for GpReader<'_> {
    const ACTION: &'static str = "reading";

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
    use crate::models::NoteType;
    use encoding_rs::WINDOWS_1252;

    fn reader<'a, 'b: 'a>(bytes: &'a mut &'b [u8]) -> GpReader<'a> {
        GpReader::new(bytes, WINDOWS_1252)
    }

    #[test]
    fn test_read_scalars() {
        let mut data: &[u8] = &[0xff, 0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0x00, 0x00, 0x80, 0x3f];
        let mut io = reader(&mut data);
        assert_eq!(io.read_i8().unwrap(), -1);
        assert!(io.read_bool().unwrap());
        assert_eq!(io.read_i16().unwrap(), 0x1234);
        assert_eq!(io.read_i32().unwrap(), 0x1234_5678);
        assert_eq!(io.read_f32().unwrap(), 1.0);
    }

    #[test]
    fn test_truncated_without_default() {
        let mut data: &[u8] = &[0x01, 0x02];
        let mut io = reader(&mut data);
        let err = io.read_i32().unwrap_err();
        assert!(matches!(err, GpError::TruncatedInput { needed: 4, available: 2 }));
    }

    #[test]
    fn test_truncated_with_default() {
        let mut data: &[u8] = &[0x01, 0x02];
        let mut io = reader(&mut data);
        assert_eq!(io.read_i32().or_truncated(-1).unwrap(), -1);
        assert_eq!(io.read_u8().or_truncated(7).unwrap(), 7);
    }

    #[test]
    fn test_repeated_lenient_keeps_prefix() {
        let mut data: &[u8] = &[1, 0, 2, 0, 3];
        let mut io = reader(&mut data);
        let values = io.read_repeated(3, |io| io.read_i16()).lenient().unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_repeated_complete_fails_on_short_read() {
        let mut data: &[u8] = &[1, 0];
        let mut io = reader(&mut data);
        let result = io.read_repeated(2, |io| io.read_i16()).complete();
        assert!(result.unwrap_err().is_truncated());
    }

    #[test]
    fn test_byte_size_string_ignores_padding() {
        let mut data: &[u8] = &[3, b'a', b'b', b'c', 0xaa, 0xbb, b'!'];
        let mut io = reader(&mut data);
        assert_eq!(io.read_byte_size_string(5).unwrap(), "abc");
        assert_eq!(io.read_u8().unwrap(), b'!');
    }

    #[test]
    fn test_byte_size_string_longer_than_slot() {
        let mut data: &[u8] = &[6, b'a', b'b', b'c'];
        let mut io = reader(&mut data);
        let err = io.read_byte_size_string(3).unwrap_err();
        assert!(matches!(err, GpError::MalformedStructure(_)));
    }

    #[test]
    fn test_int_byte_size_string() {
        let mut data: &[u8] = &[4, 0, 0, 0, 3, b'a', b'b', b'c', 1, 0, 0, 0, 0];
        let mut io = reader(&mut data);
        assert_eq!(io.read_int_byte_size_string().unwrap(), "abc");
        assert_eq!(io.read_int_byte_size_string().unwrap(), "");
    }

    #[test]
    fn test_int_size_string_negative_length() {
        let mut data: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let mut io = reader(&mut data);
        assert!(matches!(
            io.read_int_size_string(),
            Err(GpError::MalformedStructure(_))
        ));
    }

    #[test]
    fn test_windows_1252_text() {
        let mut data: &[u8] = &[2, 0x45, 0xe9];
        let mut io = reader(&mut data);
        assert_eq!(io.read_byte_size_string(2).unwrap(), "E\u{e9}");
    }

    #[test]
    fn test_version_is_cached() {
        let mut bytes = vec![24u8];
        bytes.extend_from_slice(b"FICHIER GUITAR PRO v3.00");
        bytes.resize(31, 0);
        bytes.push(9);
        let mut data: &[u8] = &bytes;
        let mut io = reader(&mut data);
        assert_eq!(io.read_version().unwrap(), "FICHIER GUITAR PRO v3.00");
        assert_eq!(io.read_version().unwrap(), "FICHIER GUITAR PRO v3.00");
        assert_eq!(io.read_u8().unwrap(), 9);
    }

    #[test]
    fn test_skip_past_end() {
        let mut data: &[u8] = &[0, 0];
        let mut io = reader(&mut data);
        assert!(io.skip(3).unwrap_err().is_truncated());
    }

    #[test]
    fn test_unknown_enum_value_is_kept() {
        let mut data: &[u8] = &[];
        let io = reader(&mut data);
        let kind: NoteType = io.wire(9);
        assert_eq!(kind, NoteType::Unknown(9));
    }
}
