//! Hybrid integer configurations.
//!
//! A cluster decodes small values directly as tokens. Tokens at or above
//! `1 << split_exponent` carry the position of the value's most significant bit,
//! plus `msb_in_token` bits right below it and `lsb_in_token` low bits; the bits
//! in between are read raw from the stream.

use crate::bitstream::BitReader;
use crate::error::{EntropyError, Result};
use crate::utils::ceil_log1p;
use crate::{Symbol, Token};

/// The most extra bits a single token may ask for.
const MAX_EXTRA_BITS: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HybridIntegerConfig {
    pub split_exponent: u32,
    pub msb_in_token: u32,
    pub lsb_in_token: u32,
}

impl HybridIntegerConfig {
    pub fn new(split_exponent: u32, msb_in_token: u32, lsb_in_token: u32) -> Result<Self> {
        if split_exponent >= Symbol::BITS {
            return Err(EntropyError::HybridConfig("splitExponent is too large"));
        }
        if msb_in_token + lsb_in_token > split_exponent {
            return Err(EntropyError::HybridConfig("msbInToken + lsbInToken is too large"));
        }
        Ok(Self {
            split_exponent,
            msb_in_token,
            lsb_in_token,
        })
    }

    /// Parses a configuration for an alphabet of `1 << log_alphabet_size` tokens.
    pub fn read<R: BitReader>(reader: &mut R, log_alphabet_size: u32) -> Result<Self> {
        let split_exponent = reader.read_bits(ceil_log1p(log_alphabet_size as u64))? as u32;
        if split_exponent > log_alphabet_size {
            return Err(EntropyError::HybridConfig("splitExponent is too large"));
        }
        if split_exponent == log_alphabet_size {
            return Self::new(split_exponent, 0, 0);
        }

        let msb_in_token = reader.read_bits(ceil_log1p(split_exponent as u64))? as u32;
        if msb_in_token > split_exponent {
            return Err(EntropyError::HybridConfig("msbInToken is too large"));
        }
        let lsb_in_token =
            reader.read_bits(ceil_log1p((split_exponent - msb_in_token) as u64))? as u32;

        Self::new(split_exponent, msb_in_token, lsb_in_token)
    }

    /// Expands `token` into the integer it stands for, reading its extra bits from `reader`.
    pub fn expand<R: BitReader>(&self, reader: &mut R, token: Token) -> Result<Symbol> {
        let split = 1_u32 << self.split_exponent;
        if token < split {
            return Ok(token);
        }

        let in_token = self.msb_in_token + self.lsb_in_token;
        let n = (self.split_exponent - in_token) as u64 + ((token - split) >> in_token) as u64;
        if n > MAX_EXTRA_BITS as u64 {
            return Err(EntropyError::HybridOverflow { token, bits: n as u32 });
        }

        let low = token & ((1 << self.lsb_in_token) - 1);
        let high = ((token >> self.lsb_in_token) & ((1 << self.msb_in_token) - 1))
            | (1 << self.msb_in_token);
        let extra = reader.read_bits(n as usize)?;

        let value = ((((high as u64) << n) | extra) << self.lsb_in_token) | low as u64;
        Ok(value as Symbol)
    }
}
