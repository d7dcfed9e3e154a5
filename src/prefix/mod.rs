//! Prefix-coded (Brotli-style) symbol distributions.

pub mod vlc;

pub use vlc::{VlcEntry, VlcTable};

use log::trace;

use crate::bitstream::BitReader;
use crate::error::{EntropyError, Result};
use crate::utils::ceil_log1p;
use crate::Token;

/// The width of the lookup table of the code length code.
const LEVEL1_BITS: u32 = 5;

/// The width of the lookup table of the symbol code.
const LEVEL2_BITS: u32 = 15;

/// Code length code symbol repeating the previous nonzero length.
const REPEAT_PREVIOUS: u16 = 16;

/// Code length code symbol repeating a zero length.
const REPEAT_ZERO: u16 = 17;

/// The code length assumed before any nonzero one has been read.
const INITIAL_REPEAT_LENGTH: u16 = 8;

/// The order in which the code lengths of the code length code are transmitted.
const CODE_LENGTH_ORDER: [usize; 18] = [1, 2, 3, 4, 0, 5, 17, 6, 16, 7, 8, 9, 10, 11, 12, 13, 14, 15];

const fn e(symbol: u16, length: u8) -> VlcEntry {
    VlcEntry::new(symbol, length)
}

/// The fixed code of the code lengths of the code length code.
static LEVEL0_CODES: VlcTable = VlcTable::fixed(4, &LEVEL0_ENTRIES);

#[rustfmt::skip]
const LEVEL0_ENTRIES: [VlcEntry; 16] = [
    e(0, 2), e(4, 2), e(3, 2), e(2, 3), e(0, 2), e(4, 2), e(3, 2), e(1, 4),
    e(0, 2), e(4, 2), e(3, 2), e(2, 3), e(0, 2), e(4, 2), e(3, 2), e(5, 4),
];

/// A distribution decoded with a canonical prefix code.
#[derive(Clone, Debug)]
pub struct PrefixDistribution {
    alphabet_size: usize,
    table: VlcTable,
}

impl PrefixDistribution {
    /// Parses the prefix code of an alphabet of `alphabet_size` symbols.
    pub fn read<R: BitReader>(reader: &mut R, alphabet_size: usize) -> Result<Self> {
        if alphabet_size <= 1 {
            return Ok(Self {
                alphabet_size,
                table: VlcTable::single(0),
            });
        }

        let hskip = reader.read_bits(2)? as usize;
        let table = if hskip == 1 {
            read_simple(reader, alphabet_size)?
        } else {
            read_complex(reader, alphabet_size, hskip)?
        };

        Ok(Self {
            alphabet_size,
            table,
        })
    }

    #[inline(always)]
    pub fn read_symbol<R: BitReader>(&self, reader: &mut R) -> Result<Token> {
        Ok(self.table.read(reader)? as Token)
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    pub fn table(&self) -> &VlcTable {
        &self.table
    }
}

/// Reads a code of at most four symbols with an implied shape.
fn read_simple<R: BitReader>(reader: &mut R, alphabet_size: usize) -> Result<VlcTable> {
    let num_symbols = reader.read_bits(2)? as usize + 1;
    let symbol_bits = ceil_log1p(alphabet_size as u64 - 1);

    let mut symbols = [0_u16; 4];
    for i in 0..num_symbols {
        let symbol = reader.read_bits(symbol_bits)?;
        if symbol as usize >= alphabet_size || symbols[..i].contains(&(symbol as u16)) {
            return Err(EntropyError::InvalidPrefixSymbol(symbol as u32));
        }
        symbols[i] = symbol as u16;
    }

    let (bits, lengths): (u32, &[i32]) = match num_symbols {
        1 => return Ok(VlcTable::single(symbols[0])),
        2 => {
            symbols[..2].sort_unstable();
            (1, &[1, 1])
        }
        3 => {
            symbols[1..3].sort_unstable();
            (2, &[1, 2, 2])
        }
        _ => {
            if reader.read_bool()? {
                symbols[2..4].sort_unstable();
                (3, &[1, 2, 3, 3])
            } else {
                symbols.sort_unstable();
                (2, &[2, 2, 2, 2])
            }
        }
    };

    VlcTable::with_symbols(bits, lengths, Some(&symbols[..num_symbols]))
}

/// Sorts code lengths by length, ties broken by symbol, as canonical codes are assigned.
fn canonical_order(lengths: &[u16]) -> (Vec<i32>, Vec<u16>) {
    let mut symbols = (0..lengths.len()).map(|symbol| symbol as u16).collect::<Vec<_>>();
    symbols.sort_by_key(|&symbol| lengths[symbol as usize]);
    let sorted = symbols.iter().map(|&symbol| lengths[symbol as usize] as i32).collect();
    (sorted, symbols)
}

/// Reads a two-level code: first the code of the code lengths, then the code lengths.
fn read_complex<R: BitReader>(reader: &mut R, alphabet_size: usize, hskip: usize) -> Result<VlcTable> {
    let mut level1_lengths = [0_u16; 18];
    let mut total = 0;
    let mut num_codes = 0;

    for &symbol in &CODE_LENGTH_ORDER[hskip..] {
        let length = LEVEL0_CODES.read(reader)?;
        level1_lengths[symbol] = length;
        if length != 0 {
            total += 32 >> length;
            num_codes += 1;
        }
        if total >= 32 {
            break;
        }
    }
    if (total != 32 && num_codes >= 2) || num_codes < 1 {
        return Err(EntropyError::InvalidLevel1Prefix);
    }

    let level1 = if num_codes == 1 {
        let symbol = level1_lengths.iter().position(|&length| length != 0).unwrap_or(0);
        VlcTable::single(symbol as u16)
    } else {
        let (lengths, symbols) = canonical_order(&level1_lengths);
        VlcTable::with_symbols(LEVEL1_BITS, &lengths, Some(&symbols))?
    };

    let mut level2_lengths = vec![0_u16; alphabet_size];
    let mut total = 0_u32;
    let mut num_zeros = 0;
    let mut prev = INITIAL_REPEAT_LENGTH;
    let mut prev_repeat = 0;
    let mut prev_zero = 0;

    let mut i = 0;
    while i < alphabet_size {
        let code = level1.read(reader)?;
        match code {
            REPEAT_PREVIOUS => {
                let mut extra = 3 + reader.read_bits(2)? as usize;
                if prev_repeat > 0 {
                    extra = 4 * (prev_repeat - 2) - prev_repeat + extra;
                }
                let run = level2_lengths
                    .get_mut(i..i + extra)
                    .ok_or(EntropyError::InvalidLevel2Prefix)?;
                run.fill(prev);

                total += (32768 >> prev) * extra as u32;
                i += extra;
                prev_repeat += extra;
                prev_zero = 0;
            }
            REPEAT_ZERO => {
                let mut extra = 3 + reader.read_bits(3)? as usize;
                if prev_zero > 0 {
                    extra = 8 * (prev_zero - 2) - prev_zero + extra;
                }
                if i + extra > alphabet_size {
                    return Err(EntropyError::InvalidLevel2Prefix);
                }

                i += extra;
                num_zeros += extra;
                prev_zero += extra;
                prev_repeat = 0;
            }
            length => {
                level2_lengths[i] = length;
                if length != 0 {
                    total += 32768 >> length;
                    prev = length;
                } else {
                    num_zeros += 1;
                }
                i += 1;
                prev_repeat = 0;
                prev_zero = 0;
            }
        }
        if total >= 32768 {
            num_zeros += alphabet_size - i;
            break;
        }
    }
    if total != 32768 && num_zeros < alphabet_size - 1 {
        return Err(EntropyError::InvalidLevel2Prefix);
    }

    let mut used = level2_lengths.iter().enumerate().filter(|&(_, &length)| length != 0);
    match (used.next(), used.next()) {
        (None, _) => Err(EntropyError::InvalidLevel2Prefix),
        (Some((symbol, _)), None) => Ok(VlcTable::single(symbol as u16)),
        _ => {
            trace!("complex prefix code: {} symbols, {} unused", alphabet_size, num_zeros);
            let (lengths, symbols) = canonical_order(&level2_lengths);
            VlcTable::with_symbols(LEVEL2_BITS, &lengths, Some(&symbols))
        }
    }
}
