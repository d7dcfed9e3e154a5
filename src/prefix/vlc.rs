use std::borrow::Cow;

use crate::bitstream::BitReader;
use crate::error::{EntropyError, Result};

/// The code space every complete prefix code saturates, in units of `2^-32`.
const CODE_SPACE: u64 = 1 << 32;

/// What a lookup slot decodes to: the symbol and how many bits its code really uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VlcEntry {
    pub symbol: u16,
    pub length: u8,
}

impl VlcEntry {
    pub const fn new(symbol: u16, length: u8) -> Self {
        Self { symbol, length }
    }
}

/// A single-level lookup table for a canonical prefix code whose codes are read
/// least significant bit first.
///
/// The table is indexed by the next `bits` bits of the stream. Every code of
/// length `l` occupies the `1 << (bits - l)` slots that share its bit-reversed
/// prefix.
#[derive(Clone, Debug)]
pub struct VlcTable {
    bits: u32,
    entries: Cow<'static, [VlcEntry]>,
}

impl VlcTable {
    /// Wraps a precomputed table of `1 << bits` entries.
    pub const fn fixed(bits: u32, entries: &'static [VlcEntry]) -> Self {
        Self {
            bits,
            entries: Cow::Borrowed(entries),
        }
    }

    /// A zero-bit table always decoding `symbol`.
    pub fn single(symbol: u16) -> Self {
        Self {
            bits: 0,
            entries: Cow::Owned(vec![VlcEntry::new(symbol, 0)]),
        }
    }

    /// Builds the table of a canonical code from its code lengths.
    ///
    /// Codes are assigned in the order of `lengths`, which must therefore be sorted
    /// by length. A zero length marks an unused symbol, a negative length reserves
    /// code space without assigning it. The `i`-th length belongs to `symbols[i]`,
    /// or to symbol `i` when `symbols` is `None`.
    pub fn with_symbols(bits: u32, lengths: &[i32], symbols: Option<&[u16]>) -> Result<Self> {
        let mut code: u64 = 0;
        let mut codes = Vec::with_capacity(lengths.len());

        for (index, &length) in lengths.iter().enumerate() {
            let length = match length {
                0 => continue,
                l if l > 0 => {
                    let symbol = symbols.map_or(index as u16, |symbols| symbols[index]);
                    codes.push((code, VlcEntry::new(symbol, l as u8)));
                    l as u32
                }
                l => l.unsigned_abs(),
            };
            if length > 32 {
                return Err(EntropyError::TableTooSmall { length, bits });
            }

            code += 1 << (32 - length);
            if code > CODE_SPACE {
                return Err(EntropyError::TooManyCodes);
            }
        }
        if code != CODE_SPACE {
            return Err(EntropyError::NotEnoughCodes);
        }

        let mut entries = vec![VlcEntry::default(); 1 << bits];
        for (code, entry) in codes {
            let length = entry.length as u32;
            if length > bits {
                return Err(EntropyError::TableTooSmall { length, bits });
            }

            let mut index = (code as u32).reverse_bits() as usize;
            for _ in 0..1 << (bits - length) {
                let slot = entries.get_mut(index).ok_or(EntropyError::ConflictingCodes)?;
                if (slot.length > 0 || slot.symbol > 0) && *slot != entry {
                    return Err(EntropyError::ConflictingCodes);
                }
                *slot = entry;
                index += 1 << length;
            }
        }

        Ok(Self {
            bits,
            entries: Cow::Owned(entries),
        })
    }

    /// Decodes one symbol, consuming exactly the bits of its code.
    #[inline(always)]
    pub fn read<R: BitReader>(&self, reader: &mut R) -> Result<u16> {
        let entry = self.entries[reader.show_bits(self.bits as usize)? as usize];
        reader.skip_bits(entry.length as usize)?;
        Ok(entry.symbol)
    }

    /// The width, in bits, of the lookup index.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn entries(&self) -> &[VlcEntry] {
        &self.entries
    }
}
