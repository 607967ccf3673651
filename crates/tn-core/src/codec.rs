//! Binary codec primitives shared by every on-disk format.
//!
//! * Integers use unsigned LEB128 varints ([`WriteExt::write_varint`]).
//! * Strings are framed as `[i64 LE byte length][UTF-16LE code units]`.
//! * Floats are written as raw little-endian bits so they round-trip exactly.
//!
//! The traits are blanket-implemented for every `std::io::Read` / `Write`,
//! so tiles and indexes serialize straight into files or `Vec<u8>` buffers.

use std::io::{Read, Write};

use crate::attributes::Attribute;
use crate::error::{CoreError, CoreResult};

/// A varint longer than this cannot encode a `u64`.
const MAX_VARINT_BYTES: usize = 10;

/// Strings longer than this are treated as corrupt input.
const MAX_STRING_BYTES: i64 = 1 << 24;

pub trait WriteExt: Write {
    fn write_varint(&mut self, mut value: u64) -> CoreResult<()> {
        let mut buf = [0u8; MAX_VARINT_BYTES];
        let mut len = 0;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                buf[len] = byte;
                len += 1;
                break;
            }
            buf[len] = byte | 0x80;
            len += 1;
        }
        self.write_all(&buf[..len])?;
        Ok(())
    }

    fn write_u8(&mut self, value: u8) -> CoreResult<()> {
        self.write_all(&[value])?;
        Ok(())
    }

    fn write_f32(&mut self, value: f32) -> CoreResult<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_f64(&mut self, value: f64) -> CoreResult<()> {
        self.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> CoreResult<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_all(&((units.len() * 2) as i64).to_le_bytes())?;
        for unit in units {
            self.write_all(&unit.to_le_bytes())?;
        }
        Ok(())
    }

    /// `[varint count]` followed by `count` key/value string pairs.
    fn write_attributes(&mut self, attributes: &[Attribute]) -> CoreResult<()> {
        self.write_varint(attributes.len() as u64)?;
        for (key, value) in attributes {
            self.write_string(key)?;
            self.write_string(value)?;
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteExt for W {}

pub trait ReadExt: Read {
    fn read_varint(&mut self) -> CoreResult<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CoreError::InvalidData("varint exceeds 64 bits".into()))
    }

    /// Read a varint that must fit a `u32`.
    fn read_varint_u32(&mut self) -> CoreResult<u32> {
        let value = self.read_varint()?;
        u32::try_from(value)
            .map_err(|_| CoreError::InvalidData(format!("value {value} does not fit u32")))
    }

    fn read_u8(&mut self) -> CoreResult<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_f32(&mut self) -> CoreResult<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn read_f64(&mut self) -> CoreResult<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    fn read_string(&mut self) -> CoreResult<String> {
        let mut len_buf = [0u8; 8];
        self.read_exact(&mut len_buf)?;
        let len = i64::from_le_bytes(len_buf);
        if !(0..=MAX_STRING_BYTES).contains(&len) || len % 2 != 0 {
            return Err(CoreError::InvalidData(format!("invalid string length {len}")));
        }

        let mut bytes = vec![0u8; len as usize];
        self.read_exact(&mut bytes)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units)
            .map_err(|e| CoreError::InvalidData(format!("invalid UTF-16 string: {e}")))
    }

    fn read_attributes(&mut self) -> CoreResult<Vec<Attribute>> {
        let count = self.read_varint()? as usize;
        let mut attributes = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = self.read_string()?;
            let value = self.read_string()?;
            attributes.push((key, value));
        }
        Ok(attributes)
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Fail with `InvalidData` unless `found` is the one supported version.
pub fn expect_version(what: &'static str, found: u64, supported: u64) -> CoreResult<()> {
    if found != supported {
        return Err(CoreError::UnknownVersion { what, found, supported });
    }
    Ok(())
}
