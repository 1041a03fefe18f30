use crate::error::{ClassError, Result};

/// Sequential big-endian reader over an in-memory class file.
///
/// Every read is bounds checked; running off the end yields
/// [`ClassError::UnexpectedEof`] instead of a panic.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn read_u1(&mut self) -> Result<u8> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    pub fn read_u2(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u4(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i4(&mut self) -> Result<i32> {
        Ok(self.read_u4()? as i32)
    }

    pub fn read_u8(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Borrows the next `len` bytes and advances past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassError::UnexpectedEof {
                offset: self.pos,
                wanted: len,
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a length-prefixed modified UTF-8 string (`CONSTANT_Utf8_info`).
    pub fn read_utf(&mut self) -> Result<String> {
        let len = self.read_u2()? as usize;
        let bytes = self.take(len)?;
        decode_modified_utf8(bytes)
    }
}

/// Decodes the JVM's modified UTF-8: `0xC0 0x80` encodes NUL and
/// supplementary characters arrive as surrogate pairs. Unpaired surrogates are
/// replaced rather than rejected since class files may legally carry them.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if bytes.is_ascii() {
        return Ok(bytes.iter().map(|b| *b as char).collect());
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if byte & 0x80 == 0 {
            units.push(byte as u16);
            i += 1;
        } else if byte & 0xE0 == 0xC0 {
            let byte2 = *bytes
                .get(i + 1)
                .ok_or_else(|| ClassError::invalid("truncated 2-byte utf8 sequence"))?;
            if byte2 & 0xC0 != 0x80 {
                return Err(ClassError::invalid("invalid 2-byte utf8 sequence"));
            }
            units.push((((byte & 0x1F) as u16) << 6) | ((byte2 & 0x3F) as u16));
            i += 2;
        } else if byte & 0xF0 == 0xE0 {
            let (Some(byte2), Some(byte3)) = (bytes.get(i + 1), bytes.get(i + 2)) else {
                return Err(ClassError::invalid("truncated 3-byte utf8 sequence"));
            };
            if byte2 & 0xC0 != 0x80 || byte3 & 0xC0 != 0x80 {
                return Err(ClassError::invalid("invalid 3-byte utf8 sequence"));
            }
            units.push(
                (((byte & 0x0F) as u16) << 12)
                    | (((byte2 & 0x3F) as u16) << 6)
                    | ((byte3 & 0x3F) as u16),
            );
            i += 3;
        } else {
            return Err(ClassError::invalid(format!(
                "invalid utf8 leading byte 0x{byte:02x}"
            )));
        }
    }

    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}
