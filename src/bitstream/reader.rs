use dsi_bitstream::impls::BufBitReader;
use dsi_bitstream::traits::{BitRead, WordRead, LE};

use crate::bitstream::BitReader;
use crate::error::{EntropyError, Result};

/// A [`WordRead`] backend serving little-endian 32-bit words out of a byte slice.
///
/// The last word is zero-padded and reads past the end keep returning zero, so that
/// lookups near the end of the input can peek a full table width.
#[derive(Debug, Clone)]
pub struct ByteWordReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteWordReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }
}

impl WordRead for ByteWordReader<'_> {
    type Word = u32;
    type Error = std::io::Error;

    fn read_word(&mut self) -> std::io::Result<u32> {
        let mut bytes = [0_u8; 4];
        let start = self.position.min(self.data.len());
        let end = self.position.saturating_add(4).min(self.data.len());

        bytes[..end - start].copy_from_slice(&self.data[start..end]);
        self.position = self.position.saturating_add(4);
        Ok(u32::from_le_bytes(bytes))
    }
}

/// An in-memory, LSB-first bit reader over a byte slice.
pub struct BitStreamReader<'a> {
    backend: BufBitReader<LE, ByteWordReader<'a>>,

    /// The number of bits consumed so far.
    position: u64,

    /// The number of bits in the input.
    len_bits: u64,
}

impl<'a> BitStreamReader<'a> {
    /// The widest peek supported, bounded by the backend's word size.
    const MAX_PEEK: usize = 32;

    pub fn new(data: &'a [u8]) -> Self {
        Self {
            backend: BufBitReader::new(ByteWordReader::new(data)),
            position: 0,
            len_bits: data.len() as u64 * 8,
        }
    }

    /// The number of bits left in the input.
    pub fn remaining(&self) -> u64 {
        self.len_bits - self.position
    }

    fn ensure_available(&self, n: usize) -> Result<()> {
        if n as u64 > self.remaining() {
            return Err(EntropyError::EndOfStream {
                requested: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }
}

impl BitReader for BitStreamReader<'_> {
    fn read_bits(&mut self, n: usize) -> Result<u64> {
        if n == 0 {
            return Ok(0);
        }
        if n > 64 {
            return Err(EntropyError::InvalidBitCount(n));
        }
        self.ensure_available(n)?;

        let value = self.backend.read_bits(n)?;
        self.position += n as u64;
        Ok(value)
    }

    fn show_bits(&mut self, n: usize) -> Result<u64> {
        if n == 0 {
            return Ok(0);
        }
        if n > Self::MAX_PEEK {
            return Err(EntropyError::InvalidBitCount(n));
        }
        Ok(u64::from(self.backend.peek_bits(n)?))
    }

    fn skip_bits(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.ensure_available(n)?;

        self.backend.skip_bits(n)?;
        self.position += n as u64;
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.position >= self.len_bits
    }

    fn bits_read(&self) -> u64 {
        self.position
    }
}
