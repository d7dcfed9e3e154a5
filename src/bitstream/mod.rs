//! Bit-level input consumed by the entropy decoder.
//!
//! The decoder never owns its input: every parsing and decoding call borrows a
//! [`BitReader`] mutably for its duration. [`BitStreamReader`] is the in-memory
//! implementation, reading bits least significant first as JPEG XL mandates.

pub mod reader;

pub use reader::{BitStreamReader, ByteWordReader};

use crate::error::{EntropyError, Result};

/// A `(bias, width)` pair of a `U32` field: the value is `bias + read_bits(width)`.
pub type U32Distr = (u32, usize);

/// The primitives the entropy decoder needs from a bit source.
pub trait BitReader {
    /// Reads `n` bits (at most 64) as an unsigned integer, first bit in the least significant position.
    fn read_bits(&mut self, n: usize) -> Result<u64>;

    /// Returns the next `n` bits (at most 32) without consuming them. Bits past the end
    /// of the input read as zero.
    fn show_bits(&mut self, n: usize) -> Result<u64>;

    /// Consumes `n` bits, usually after a [`show_bits`](Self::show_bits).
    fn skip_bits(&mut self, n: usize) -> Result<()>;

    /// Whether every bit of the input has been consumed.
    fn at_end(&self) -> bool;

    /// The number of bits consumed so far.
    fn bits_read(&self) -> u64;

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Reads a `U8` field: a zero flag means 0, otherwise a 3-bit width `w` follows,
    /// giving 1 when `w == 0` and `(1 << w) + read_bits(w)` otherwise.
    fn read_u8(&mut self) -> Result<u32> {
        if !self.read_bool()? {
            return Ok(0);
        }
        let width = self.read_bits(3)? as usize;
        if width == 0 {
            return Ok(1);
        }
        Ok((1 << width) + self.read_bits(width)? as u32)
    }

    /// Reads a `U32` field: two selector bits pick one of the four distributions.
    fn read_u32(&mut self, distrs: [U32Distr; 4]) -> Result<u32> {
        let (bias, width) = distrs[self.read_bits(2)? as usize];
        Ok(bias.wrapping_add(self.read_bits(width)? as u32))
    }

    /// Reads an IEEE 754 binary16 value. Infinities and NaNs are rejected.
    fn read_f16(&mut self) -> Result<f32> {
        let bits = self.read_bits(16)? as u32;
        let mantissa = bits & 0x3FF;
        let biased_exp = (bits >> 10) & 0x1F;
        let sign = (bits >> 15) & 1;

        if biased_exp == 31 {
            return Err(EntropyError::InvalidFloat16);
        }
        if biased_exp == 0 {
            let magnitude = mantissa as f32 / 16_777_216.0;
            return Ok(if sign == 1 { -magnitude } else { magnitude });
        }

        Ok(f32::from_bits(
            (sign << 31) | ((biased_exp + 127 - 15) << 23) | (mantissa << 13),
        ))
    }
}
