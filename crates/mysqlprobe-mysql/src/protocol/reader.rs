//! Bounds-checked cursor over packet bytes.
//!
//! Every read either advances the cursor and returns the bytes, or leaves
//! the cursor untouched and returns [`Insufficient`]. Callers decide
//! whether running out of data is fatal.

use std::fmt;

/// Not enough bytes remain for the requested read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insufficient {
    /// A fixed-size read needed more bytes than remain.
    Short { needed: usize, remaining: usize },
    /// No terminator byte before the end of the data.
    Unterminated,
}

impl fmt::Display for Insufficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insufficient::Short { needed, remaining } => {
                write!(f, "needed {needed} bytes, {remaining} remaining")
            }
            Insufficient::Unterminated => write!(f, "unterminated string"),
        }
    }
}

impl std::error::Error for Insufficient {}

/// A reader for MySQL protocol data.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    /// Create a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Get remaining bytes in the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Check if we've reached the end of the data.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current offset from the start of the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], Insufficient> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(Insufficient::Short {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Take a fixed-size array.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], Insufficient> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, Insufficient> {
        self.take_array::<1>().map(|[b]| b)
    }

    /// Read a u16 (little-endian).
    pub fn read_u16_le(&mut self) -> Result<u16, Insufficient> {
        self.take_array().map(u16::from_le_bytes)
    }

    /// Read a u32 (little-endian).
    pub fn read_u32_le(&mut self) -> Result<u32, Insufficient> {
        self.take_array().map(u32::from_le_bytes)
    }

    /// Take bytes up to `terminator`, consuming the terminator itself.
    ///
    /// The returned slice excludes the terminator. Without a terminator the
    /// cursor does not move.
    pub fn take_until(&mut self, terminator: u8) -> Result<&'a [u8], Insufficient> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let end = rest
            .iter()
            .position(|&b| b == terminator)
            .ok_or(Insufficient::Unterminated)?;
        self.pos += end + 1;
        Ok(&rest[..end])
    }

    /// Read a null-terminated string, lossily decoded as UTF-8.
    pub fn read_null_string(&mut self) -> Result<String, Insufficient> {
        self.take_until(0)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Skip exactly `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), Insufficient> {
        self.take(n).map(|_| ())
    }

    /// Skip up to `n` bytes, stopping at the end of the data.
    ///
    /// Returns the number of bytes skipped.
    pub fn skip_clamped(&mut self, n: usize) -> usize {
        let skipped = n.min(self.remaining());
        self.pos += skipped;
        skipped
    }
}
