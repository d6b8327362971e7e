//! Primitive readers shared by both stream formats
//!
//! `RecordReader` wraps any `Read` and tracks the byte offset so errors can
//! point at the failing field. Every reader fails with `TruncatedInput` when
//! the stream ends before the field is complete.

use super::error::{DecodeError, DecodeResult};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read};

/// Forward-only cursor over a layout byte stream
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn fail(&self, err: io::Error, what: &'static str) -> DecodeError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::TruncatedInput { offset: self.offset, what }
        } else {
            DecodeError::Io { offset: self.offset, source: err }
        }
    }

    /// Read one byte, returning `None` on a clean end of stream.
    /// Only meaningful at record boundaries.
    pub fn try_read_u8(&mut self) -> DecodeResult<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.fail(e, "record tag")),
            }
        }
    }

    fn read_u8_for(&mut self, what: &'static str) -> DecodeResult<u8> {
        let value = self.inner.read_u8().map_err(|e| self.fail(e, what))?;
        self.offset += 1;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        self.read_u8_for("u8")
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        let value = self.inner.read_u16::<BigEndian>().map_err(|e| self.fail(e, "u16"))?;
        self.offset += 2;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        let value = self.inner.read_i32::<BigEndian>().map_err(|e| self.fail(e, "i32"))?;
        self.offset += 4;
        Ok(value)
    }

    /// Excess-64, base-16 real: 1 sign bit, 7 exponent bits, 56 mantissa bits
    pub fn read_packed_real(&mut self) -> DecodeResult<f64> {
        let mut bytes = [0u8; 8];
        self.inner.read_exact(&mut bytes).map_err(|e| self.fail(e, "packed real"))?;
        self.offset += 8;
        Ok(packed_real_from_bytes(bytes))
    }

    /// Read `length` bytes as text, cut at the first NUL
    pub fn read_fixed_string(&mut self, length: usize) -> DecodeResult<String> {
        let mut bytes = vec![0u8; length];
        self.inner.read_exact(&mut bytes).map_err(|e| self.fail(e, "string"))?;
        self.offset += length as u64;
        if let Some(nul) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(nul);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Continuation-bit varint, most significant group first
    pub fn read_var_uint(&mut self) -> DecodeResult<u64> {
        let start = self.offset;
        let mut byte = self.read_u8_for("varuint")?;
        let mut value = u64::from(byte & 0x7F);
        while byte & 0x80 != 0 {
            byte = self.read_u8_for("varuint")?;
            if value > (u64::MAX >> 7) {
                return Err(DecodeError::malformed(start, "varuint exceeds 64 bits"));
            }
            value = (value << 7) | u64::from(byte & 0x7F);
        }
        Ok(value)
    }

    /// Varuint with the sign carried in bit 0
    pub fn read_var_signed(&mut self) -> DecodeResult<i64> {
        let raw = self.read_var_uint()?;
        let magnitude = (raw >> 1) as i64;
        Ok(if raw & 1 != 0 { -magnitude } else { magnitude })
    }

    /// Consume exactly `count` bytes
    pub fn skip(&mut self, count: u64) -> DecodeResult<()> {
        let copied = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())
            .map_err(|e| self.fail(e, "skipped payload"))?;
        self.offset += copied;
        if copied < count {
            return Err(DecodeError::TruncatedInput { offset: self.offset, what: "skipped payload" });
        }
        Ok(())
    }
}

pub(crate) fn packed_real_from_bytes(bytes: [u8; 8]) -> f64 {
    let negative = bytes[0] & 0x80 != 0;
    let exponent = i32::from(bytes[0] & 0x7F) - 64;
    let mantissa = bytes[1..].iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    let value = mantissa as f64 / (1u64 << 56) as f64 * 16f64.powi(exponent);
    if negative { -value } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> RecordReader<&[u8]> {
        RecordReader::new(bytes)
    }

    #[test]
    fn test_fixed_width_big_endian() {
        let mut r = reader(&[0x12, 0x34, 0x56, 0xFF, 0xFF, 0xFF, 0xFE, 0x07]);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u8().unwrap(), 0x56);
        assert_eq!(r.read_i32().unwrap(), -2);
        assert_eq!(r.offset(), 7);
        assert_eq!(r.try_read_u8().unwrap(), Some(0x07));
        assert_eq!(r.try_read_u8().unwrap(), None);
    }

    #[test]
    fn test_truncated_fixed_width() {
        let mut r = reader(&[0x00, 0x01, 0x02]);
        let err = r.read_i32().unwrap_err();
        assert!(err.is_truncated(), "unexpected error: {err}");
    }

    #[test]
    fn test_packed_real_known_values() {
        // 1e-3 and 1e-9 as written by common layout tools
        let milli = [0x3E, 0x41, 0x89, 0x37, 0x4B, 0xC6, 0xA7, 0xEF];
        let nano = [0x39, 0x44, 0xB8, 0x2F, 0xA0, 0x9B, 0x5A, 0x54];
        assert!((packed_real_from_bytes(milli) - 1e-3).abs() < 1e-15);
        assert!((packed_real_from_bytes(nano) - 1e-9).abs() < 1e-21);

        // 1.0 = 1/16 * 16^1, negative sign bit
        assert_eq!(packed_real_from_bytes([0x41, 0x10, 0, 0, 0, 0, 0, 0]), 1.0);
        assert_eq!(packed_real_from_bytes([0xC1, 0x10, 0, 0, 0, 0, 0, 0]), -1.0);
        assert_eq!(packed_real_from_bytes([0; 8]), 0.0);
    }

    #[test]
    fn test_fixed_string_trims_at_nul() {
        let mut r = reader(b"TOP\0\0\0rest");
        assert_eq!(r.read_fixed_string(6).unwrap(), "TOP");
        assert_eq!(r.read_fixed_string(4).unwrap(), "rest");
    }

    #[test]
    fn test_var_uint_high_group_first() {
        assert_eq!(reader(&[0x05]).read_var_uint().unwrap(), 5);
        // 0x81 0x00 -> (1 << 7) | 0
        assert_eq!(reader(&[0x81, 0x00]).read_var_uint().unwrap(), 128);
        assert_eq!(reader(&[0x82, 0xFF, 0x7F]).read_var_uint().unwrap(), (2 << 14) | (0x7F << 7) | 0x7F);
    }

    #[test]
    fn test_var_uint_truncated_and_overflow() {
        assert!(reader(&[0x81]).read_var_uint().unwrap_err().is_truncated());
        let too_long = [0xFF; 11];
        let mut bytes = too_long.to_vec();
        bytes.push(0x00);
        assert!(matches!(
            reader(&bytes).read_var_uint(),
            Err(DecodeError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_var_signed_low_sign_bit() {
        assert_eq!(reader(&[0x0A]).read_var_signed().unwrap(), 5);
        assert_eq!(reader(&[0x0B]).read_var_signed().unwrap(), -5);
        assert_eq!(reader(&[0x00]).read_var_signed().unwrap(), 0);
    }

    #[test]
    fn test_skip_exact_and_short() {
        let mut r = reader(&[1, 2, 3, 4]);
        r.skip(3).unwrap();
        assert_eq!(r.read_u8().unwrap(), 4);

        let mut short = reader(&[1, 2]);
        assert!(short.skip(3).unwrap_err().is_truncated());
    }
}
