//! Byte streams handed to container implementations

use std::io::{Cursor, Write};

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::container::ContainerError;

/// Read side: a cursor over the handle's input bytes
pub type ReadStream<'a> = Cursor<&'a [u8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

/// Bounded, endian-aware writer over a caller-provided buffer.
///
/// Writing past the end fails with [`ContainerError::OutOfSpace`] instead of
/// growing; the buffer growth writer relies on that to retry with more room.
#[derive(Debug)]
pub struct WriteStream<'a> {
    cursor: Cursor<&'a mut [u8]>,
    endianness: Endianness,
}

impl<'a> WriteStream<'a> {
    pub fn new(buffer: &'a mut [u8], endianness: Endianness) -> Self {
        Self {
            cursor: Cursor::new(buffer),
            endianness,
        }
    }

    /// Bytes written so far
    #[inline]
    pub fn pos(&self) -> usize {
        self.cursor.position() as usize
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cursor.get_ref().len()
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), ContainerError> {
        if pos > self.capacity() {
            return Err(ContainerError::OutOfSpace {
                needed: pos,
                available: self.capacity(),
            });
        }
        self.cursor.set_position(pos as u64);
        Ok(())
    }

    fn ensure(&self, len: usize) -> Result<(), ContainerError> {
        let needed = self.pos() + len;
        if needed > self.capacity() {
            return Err(ContainerError::OutOfSpace {
                needed,
                available: self.capacity(),
            });
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ContainerError> {
        self.ensure(bytes.len())?;
        self.cursor.write_all(bytes)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), ContainerError> {
        self.ensure(1)?;
        self.cursor.write_u8(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), ContainerError> {
        self.ensure(2)?;
        match self.endianness {
            Endianness::Big => self.cursor.write_u16::<BigEndian>(value)?,
            Endianness::Little => self.cursor.write_u16::<LittleEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), ContainerError> {
        self.ensure(4)?;
        match self.endianness {
            Endianness::Big => self.cursor.write_u32::<BigEndian>(value)?,
            Endianness::Little => self.cursor.write_u32::<LittleEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), ContainerError> {
        self.write_u32(value as u32)
    }
}
