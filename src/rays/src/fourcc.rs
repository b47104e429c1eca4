//! Four-character chunk tags

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A chunk tag, stored big-endian so `"CASt"` is `0x43415374`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub u32);

impl FourCC {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    #[inline]
    pub const fn bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for FourCC {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<FourCC> for u32 {
    fn from(tag: FourCC) -> Self {
        tag.0
    }
}

impl FromStr for FourCC {
    type Err = Error;

    /// Parse a tag from exactly four single-byte characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidFourCC(s.to_string()))?;
        Ok(Self::new(bytes))
    }
}

/// Printable ASCII is shown as-is, everything else as a C-style escape.
impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.bytes() {
            match byte {
                b'"' => f.write_str("\\\"")?,
                b'\\' => f.write_str("\\\\")?,
                0x08 => f.write_str("\\b")?,
                0x0c => f.write_str("\\f")?,
                b'\n' => f.write_str("\\n")?,
                b'\r' => f.write_str("\\r")?,
                b'\t' => f.write_str("\\t")?,
                0x0b => f.write_str("\\v")?,
                0x20..=0x7f => write!(f, "{}", byte as char)?,
                _ => write!(f, "\\x{:02X}", byte)?,
            }
        }
        Ok(())
    }
}
