use crate::error::{PamError, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};

/// Little-endian byte sink with save/restore cursor semantics, used to
/// backpatch fields whose value is only known after later data is written.
///
/// `reserve(offset)` remembers the current position and jumps to `offset`;
/// `restore()` returns to the position saved by the matching `reserve`.
/// Calls nest with stack discipline.
#[derive(Debug, Default)]
pub struct PamWriter {
    cursor: Cursor<Vec<u8>>,
    saved: Vec<u64>,
}

impl PamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    /// Save the current position and move the cursor to `offset`.
    pub fn reserve(&mut self, offset: u64) -> Result<()> {
        self.saved.push(self.cursor.position());
        self.cursor.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Return to the position saved by the innermost `reserve`.
    ///
    /// # Panics
    /// If there is no matching `reserve`.
    pub fn restore(&mut self) -> Result<()> {
        let pos = self
            .saved
            .pop()
            .expect("PamWriter::restore called without a matching reserve");
        self.cursor.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Overwrite the byte at `offset` without moving the cursor.
    pub fn patch_u8(&mut self, offset: u64, v: u8) -> Result<()> {
        self.reserve(offset)?;
        self.write_u8(v)?;
        self.restore()
    }

    /// Overwrite the u16 at `offset` without moving the cursor.
    pub fn patch_u16(&mut self, offset: u64, v: u16) -> Result<()> {
        self.reserve(offset)?;
        self.write_u16(v)?;
        self.restore()
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.cursor.write_u8(v)?;
        Ok(())
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(v as u8)
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.cursor.write_u16::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        self.cursor.write_i16::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.cursor.write_u32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.cursor.write_i32::<LittleEndian>(v)?;
        Ok(())
    }

    /// A byte, or `0xFF` followed by a u16 once `v` reaches 255.
    pub fn write_escaped_count(&mut self, v: usize) -> Result<()> {
        if v >= u8::MAX as usize {
            self.write_u8(u8::MAX)?;
            self.write_u16(u16_field(v, "count")?)
        } else {
            self.write_u8(v as u8)
        }
    }

    /// u16 length in UTF-16 units, then each character's UTF-8 bytes.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_u16(u16_field(s.encode_utf16().count(), "string length")?)?;
        self.cursor.write_all(s.as_bytes())?;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

/// Narrow a size to a u16 field, or fail instead of truncating.
pub fn u16_field(v: usize, what: &str) -> Result<u16> {
    u16::try_from(v).map_err(|_| {
        PamError::InvalidData(format!("{what} {v} exceeds the u16 range of the format"))
    })
}
