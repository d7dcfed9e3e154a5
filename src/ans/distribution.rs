use log::trace;

use crate::ans::{AliasTable, AnsState};
use crate::bitstream::BitReader;
use crate::error::{EntropyError, Result};
use crate::prefix::vlc::{VlcEntry, VlcTable};
use crate::{Freq, Token, ANS_LOG_TAB_SIZE, ANS_TAB_SIZE};

/// The log-count escape announcing a run of symbols repeating the previous frequency.
const RLE_LOG_COUNT: u8 = 13;

/// The largest shift a general distribution may declare.
const MAX_SHIFT: u64 = 13;

const fn e(symbol: u16, length: u8) -> VlcEntry {
    VlcEntry::new(symbol, length)
}

/// The fixed prefix code of the log-counts of a general distribution.
static LOG_COUNT_CODES: VlcTable = VlcTable::fixed(7, &LOG_COUNT_ENTRIES);

#[rustfmt::skip]
const LOG_COUNT_ENTRIES: [VlcEntry; 128] = [
    e(10, 3), e(12, 7), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
    e(10, 3), e(0, 5), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
    e(10, 3), e(11, 6), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
    e(10, 3), e(0, 5), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
    e(10, 3), e(13, 7), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
    e(10, 3), e(0, 5), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
    e(10, 3), e(11, 6), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
    e(10, 3), e(0, 5), e(7, 3), e(3, 4), e(6, 3), e(8, 3), e(9, 3), e(5, 4),
    e(10, 3), e(4, 4), e(7, 3), e(1, 4), e(6, 3), e(8, 3), e(9, 3), e(2, 4),
];

/// A symbol distribution decoded with ANS.
///
/// Frequencies are quantized to 12 bits: they always sum to exactly 4096.
#[derive(Clone, Debug)]
pub struct AnsDistribution {
    alphabet_size: usize,
    log_alphabet_size: u32,

    /// One frequency per table bucket; entries past the alphabet are zero.
    frequencies: Box<[Freq]>,

    alias: AliasTable,
}

impl AnsDistribution {
    /// Parses a distribution whose alias table has `1 << log_alphabet_size` buckets.
    pub fn read<R: BitReader>(reader: &mut R, log_alphabet_size: u32) -> Result<Self> {
        let frequencies = if reader.read_bool()? {
            if reader.read_bool()? {
                Self::read_dual_peak(reader, log_alphabet_size)?
            } else {
                Self::read_single_peak(reader, log_alphabet_size)?
            }
        } else if reader.read_bool()? {
            Self::read_flat(reader, log_alphabet_size)?
        } else {
            Self::read_general(reader, log_alphabet_size)?
        };

        Ok(Self::from_frequencies(frequencies, log_alphabet_size))
    }

    /// Builds a distribution from frequencies already known to sum to 4096.
    pub fn from_frequencies(mut frequencies: Vec<Freq>, log_alphabet_size: u32) -> Self {
        let alphabet_size = frequencies.len();
        let alias = AliasTable::new(&frequencies, log_alphabet_size);
        frequencies.resize(alphabet_size.max(1 << log_alphabet_size), 0);

        trace!(
            "ANS distribution: {} symbols, {} buckets",
            alphabet_size,
            1 << log_alphabet_size
        );

        Self {
            alphabet_size,
            log_alphabet_size,
            frequencies: frequencies.into_boxed_slice(),
            alias,
        }
    }

    /// Decodes the next symbol, advancing `state` and renormalizing it from the stream.
    #[inline(always)]
    pub fn read_symbol<R: BitReader>(&self, reader: &mut R, state: &mut AnsState) -> Result<Token> {
        let current = state.load(reader)?;
        let (symbol, offset) = self.alias.lookup(current & (ANS_TAB_SIZE - 1));

        let mut next = self.frequencies[symbol] as u32 * (current >> ANS_LOG_TAB_SIZE) + offset;
        if next & 0xFFFF_0000 == 0 {
            next = (next << 16) | reader.read_bits(16)? as u32;
        }
        state.set(next);

        Ok(symbol as Token)
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    pub fn log_alphabet_size(&self) -> u32 {
        self.log_alphabet_size
    }

    /// The frequency of every symbol of the alphabet.
    pub fn frequencies(&self) -> &[Freq] {
        &self.frequencies[..self.alphabet_size]
    }

    pub fn alias_table(&self) -> &AliasTable {
        &self.alias
    }

    fn check_alphabet_size(alphabet_size: usize, log_alphabet_size: u32) -> Result<()> {
        let capacity = 1 << log_alphabet_size;
        if alphabet_size > capacity {
            return Err(EntropyError::AlphabetSize {
                size: alphabet_size,
                capacity,
            });
        }
        Ok(())
    }

    fn read_dual_peak<R: BitReader>(reader: &mut R, log_alphabet_size: u32) -> Result<Vec<Freq>> {
        let first = reader.read_u8()? as usize;
        let second = reader.read_u8()? as usize;
        if first == second {
            return Err(EntropyError::OverlappingDualPeak);
        }

        let alphabet_size = 1 + first.max(second);
        Self::check_alphabet_size(alphabet_size, log_alphabet_size)?;

        let mut frequencies = vec![0; alphabet_size];
        frequencies[first] = reader.read_bits(ANS_LOG_TAB_SIZE as usize)? as Freq;
        frequencies[second] = ANS_TAB_SIZE as Freq - frequencies[first];
        Ok(frequencies)
    }

    fn read_single_peak<R: BitReader>(reader: &mut R, log_alphabet_size: u32) -> Result<Vec<Freq>> {
        let symbol = reader.read_u8()? as usize;
        Self::check_alphabet_size(symbol + 1, log_alphabet_size)?;

        let mut frequencies = vec![0; symbol + 1];
        frequencies[symbol] = ANS_TAB_SIZE as Freq;
        Ok(frequencies)
    }

    fn read_flat<R: BitReader>(reader: &mut R, log_alphabet_size: u32) -> Result<Vec<Freq>> {
        let alphabet_size = 1 + reader.read_u8()? as usize;
        Self::check_alphabet_size(alphabet_size, log_alphabet_size)?;

        let share = ANS_TAB_SIZE as usize / alphabet_size;
        let remainder = ANS_TAB_SIZE as usize % alphabet_size;
        Ok((0..alphabet_size)
            .map(|symbol| (share + usize::from(symbol < remainder)) as Freq)
            .collect())
    }

    fn read_general<R: BitReader>(reader: &mut R, log_alphabet_size: u32) -> Result<Vec<Freq>> {
        let mut len = 0;
        while len < 3 && reader.read_bool()? {
            len += 1;
        }
        let shift = (reader.read_bits(len)? | 1 << len) - 1;
        if shift > MAX_SHIFT {
            return Err(EntropyError::ShiftTooLarge(shift));
        }

        let alphabet_size = 3 + reader.read_u8()? as usize;
        Self::check_alphabet_size(alphabet_size, log_alphabet_size)?;

        let mut log_counts = vec![0_u8; alphabet_size];
        let mut same = vec![0_usize; alphabet_size];
        let mut omit_log = -1;
        let mut omit_pos = None;

        let mut i = 0;
        while i < alphabet_size {
            log_counts[i] = LOG_COUNT_CODES.read(reader)? as u8;
            if log_counts[i] == RLE_LOG_COUNT {
                let run = reader.read_u8()? as usize;
                same[i] = run + 5;
                i += run + 4;
                continue;
            }
            // the first maximum wins
            if log_counts[i] as i32 > omit_log {
                omit_log = log_counts[i] as i32;
                omit_pos = Some(i);
            }
            i += 1;
        }

        let omit_pos = match omit_pos {
            Some(pos) if log_counts.get(pos + 1) != Some(&RLE_LOG_COUNT) => pos,
            _ => return Err(EntropyError::InvalidOmitPosition),
        };

        let mut frequencies = vec![0 as Freq; alphabet_size];
        let mut total: u32 = 0;
        let mut num_same = 0;
        let mut prev = 0;

        for i in 0..alphabet_size {
            if same[i] != 0 {
                num_same = same[i] - 1;
                prev = if i > 0 { frequencies[i - 1] } else { 0 };
            }

            if num_same != 0 {
                frequencies[i] = prev;
                num_same -= 1;
            } else {
                let log_count = log_counts[i] as u32;
                if i == omit_pos || log_count == 0 {
                    continue;
                }
                frequencies[i] = if log_count == 1 {
                    1
                } else {
                    let bitcount = (shift as i32 - ((13 - log_count as i32) >> 1))
                        .clamp(0, log_count as i32 - 1) as u32;
                    let extra = reader.read_bits(bitcount as usize)? as Freq;
                    (1 << (log_count - 1)) + (extra << (log_count - 1 - bitcount))
                };
            }
            total += frequencies[i] as u32;
        }

        if total > ANS_TAB_SIZE {
            return Err(EntropyError::FrequencyOverflow(total));
        }
        frequencies[omit_pos] = (ANS_TAB_SIZE - total) as Freq;
        Ok(frequencies)
    }
}
