/*
 * Utility functions used by the tests to craft entropy-coded streams.
 *
 */
#![allow(dead_code)]

use std::fs::File;
use std::io::BufWriter;

use anyhow::Result;
use dsi_bitstream::impls::{BufBitWriter, WordAdapter};
use dsi_bitstream::traits::{BitWrite, LE};
use jxl_entropy::ans::AnsDistribution;
use jxl_entropy::{ANS_FINAL_STATE, ANS_LOG_TAB_SIZE};
use rand::prelude::SmallRng;
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

/// The prefix code, `(value, length)`, of each log-count of a general ANS distribution.
const LOG_COUNT_CODES: [(u64, usize); 14] = [
    (17, 5),
    (11, 4),
    (15, 4),
    (3, 4),
    (9, 4),
    (7, 4),
    (4, 3),
    (2, 3),
    (5, 3),
    (6, 3),
    (0, 3),
    (33, 6),
    (1, 7),
    (65, 7),
];

/// The fixed code, `(value, length)`, of each code length of a level 1 prefix code.
const LEVEL0_CODES: [(u64, usize); 6] = [(0, 2), (7, 4), (3, 3), (2, 2), (1, 2), (15, 4)];

/// The order in which the lengths of a level 1 prefix code are written.
const CODE_LENGTH_ORDER: [usize; 18] = [1, 2, 3, 4, 0, 5, 17, 6, 16, 7, 8, 9, 10, 11, 12, 13, 14, 15];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Returns `len` random symbols below `alphabet_size`.
pub fn random_symbols(seed: u64, len: usize, alphabet_size: u32) -> Vec<u32> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..alphabet_size)).collect()
}

/// Writes a bitstream, least significant bit first, into a temporary file.
pub struct BitWriter {
    file: NamedTempFile,
    writer: BufBitWriter<LE, WordAdapter<u32, BufWriter<File>>>,
}

impl BitWriter {
    pub fn new() -> Result<Self> {
        let file = NamedTempFile::new()?;
        let writer = BufBitWriter::new(WordAdapter::new(BufWriter::new(file.reopen()?)));
        Ok(Self { file, writer })
    }

    pub fn bits(&mut self, value: u64, n: usize) -> Result<&mut Self> {
        if n > 0 {
            self.writer.write_bits(value, n)?;
        }
        Ok(self)
    }

    pub fn flag(&mut self, value: bool) -> Result<&mut Self> {
        self.bits(value as u64, 1)
    }

    /// Writes a `U8` field.
    pub fn u8_field(&mut self, value: u32) -> Result<&mut Self> {
        match value {
            0 => self.flag(false),
            1 => self.flag(true)?.bits(0, 3),
            _ => {
                let width = value.ilog2() as usize;
                self.flag(true)?
                    .bits(width as u64, 3)?
                    .bits((value - (1 << width)) as u64, width)
            }
        }
    }

    /// Writes a `U32` field through the distribution selected by `selector`.
    pub fn u32_field(&mut self, selector: u64, value: u64, width: usize) -> Result<&mut Self> {
        self.bits(selector, 2)?.bits(value, width)
    }

    /// Writes a hybrid integer configuration for an alphabet of `1 << log_alphabet_size` tokens.
    pub fn hybrid_config(&mut self, log_alphabet_size: u32, split: u32, msb: u32, lsb: u32) -> Result<&mut Self> {
        self.bits(split as u64, bit_length(log_alphabet_size as u64))?;
        if split == log_alphabet_size {
            return Ok(self);
        }
        self.bits(msb as u64, bit_length(split as u64))?
            .bits(lsb as u64, bit_length((split - msb) as u64))
    }

    pub fn single_peak(&mut self, symbol: u32) -> Result<&mut Self> {
        self.flag(true)?.flag(false)?.u8_field(symbol)
    }

    pub fn dual_peak(&mut self, first: u32, second: u32, first_freq: u64) -> Result<&mut Self> {
        self.flag(true)?.flag(true)?.u8_field(first)?.u8_field(second)?.bits(first_freq, 12)
    }

    pub fn flat(&mut self, alphabet_size: u32) -> Result<&mut Self> {
        self.flag(false)?.flag(true)?.u8_field(alphabet_size - 1)
    }

    /// Writes a general distribution with full precision (shift 13), run-length
    /// coding runs of at least four repeated frequencies.
    pub fn general(&mut self, frequencies: &[u16]) -> Result<&mut Self> {
        let log_counts = frequencies
            .iter()
            .map(|&freq| bit_length(freq as u64))
            .collect::<Vec<_>>();
        let max = log_counts.iter().copied().max().unwrap_or(0);
        let omit = log_counts.iter().position(|&c| c == max).unwrap_or(0);

        // not simple, not flat, shift 13
        self.flag(false)?.flag(false)?.bits(0b111, 3)?.bits(6, 3)?;
        self.u8_field(frequencies.len() as u32 - 3)?;

        let mut explicit = Vec::new();
        let mut i = 0;
        while i < frequencies.len() {
            if i > 0 && i - 1 != omit {
                let run = frequencies[i..]
                    .iter()
                    .take_while(|&&freq| freq == frequencies[i - 1])
                    .count()
                    .min(259);
                if run >= 4 {
                    let (code, len) = LOG_COUNT_CODES[13];
                    self.bits(code, len)?.u8_field(run as u32 - 4)?;
                    i += run;
                    continue;
                }
            }
            let (code, len) = LOG_COUNT_CODES[log_counts[i]];
            self.bits(code, len)?;
            explicit.push(i);
            i += 1;
        }

        for i in explicit {
            let c = log_counts[i];
            if i != omit && c > 1 {
                self.bits(frequencies[i] as u64 - (1 << (c - 1)), c - 1)?;
            }
        }
        Ok(self)
    }

    /// Writes the prefix code of one log-count of a general distribution; 13 is
    /// the run-length escape.
    pub fn log_count(&mut self, log_count: usize) -> Result<&mut Self> {
        let (code, len) = LOG_COUNT_CODES[log_count];
        self.bits(code, len)
    }

    /// Writes a complex prefix code: the lengths of the code length code, in
    /// transmission order up to a saturated budget, then `level2` as
    /// `(code length symbol, extra bits, extra bits width)` triples.
    pub fn complex_prefix(&mut self, level1: &[u32; 18], level2: &[(usize, u64, usize)]) -> Result<&mut Self> {
        self.bits(0, 2)?;
        let mut total = 0;
        for &symbol in &CODE_LENGTH_ORDER {
            let (code, len) = LEVEL0_CODES[level1[symbol] as usize];
            self.bits(code, len)?;
            if level1[symbol] != 0 {
                total += 32 >> level1[symbol];
            }
            if total >= 32 {
                break;
            }
        }
        for &(symbol, extra, width) in level2 {
            let (code, len) = canonical_code(level1, symbol);
            self.bits(code, len)?.bits(extra, width)?;
        }
        Ok(self)
    }

    /// Writes the canonical code of `symbol` among the code `lengths`.
    pub fn code(&mut self, lengths: &[u32], symbol: usize) -> Result<&mut Self> {
        let (code, len) = canonical_code(lengths, symbol);
        self.bits(code, len)
    }

    /// Flushes the stream and returns its bytes, zero-padded to a whole word.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.writer.flush()?;
        drop(self.writer);
        Ok(std::fs::read(self.file.path())?)
    }
}

/// Number of bits needed to represent `x`.
pub fn bit_length(x: u64) -> usize {
    (u64::BITS - x.leading_zeros()) as usize
}

/// The canonical code of `symbol`, as the value to write least significant bit
/// first, and its length.
pub fn canonical_code(lengths: &[u32], symbol: usize) -> (u64, usize) {
    let mut symbols = (0..lengths.len())
        .filter(|&s| lengths[s] != 0)
        .collect::<Vec<_>>();
    symbols.sort_by_key(|&s| lengths[s]);

    let mut code: u64 = 0;
    let mut prev_len = 0;
    for s in symbols {
        code <<= lengths[s] - prev_len;
        prev_len = lengths[s];
        if s == symbol {
            let len = lengths[s] as usize;
            return ((code.reverse_bits() >> (64 - len)), len);
        }
        code += 1;
    }
    panic!("symbol {symbol} has no code");
}

/// Encodes ANS symbols backwards, so that they decode forwards.
pub struct AnsEncoder {
    frequencies: Vec<u32>,
    /// For each symbol, the table slot of each of its offsets.
    slots: Vec<Vec<u32>>,
}

/// An ANS-coded payload: the state the decoder loads, then for each symbol the
/// 16-bit chunk read right after it, if any.
pub struct AnsPayload {
    pub initial_state: u32,
    pub chunks: Vec<Option<u16>>,
}

impl AnsEncoder {
    pub fn new(distribution: &AnsDistribution) -> Self {
        let frequencies = distribution
            .frequencies()
            .iter()
            .map(|&freq| freq as u32)
            .collect::<Vec<_>>();
        let mut slots = frequencies
            .iter()
            .map(|&freq| vec![0; freq as usize])
            .collect::<Vec<_>>();
        for index in 0..1 << ANS_LOG_TAB_SIZE {
            let (symbol, offset) = distribution.alias_table().lookup(index);
            slots[symbol][offset as usize] = index;
        }
        Self { frequencies, slots }
    }

    /// Encodes `steps`, each a symbol with the encoder of its distribution.
    pub fn encode(steps: &[(&AnsEncoder, u32)]) -> AnsPayload {
        let mut state = ANS_FINAL_STATE;
        let mut chunks = vec![None; steps.len()];

        for (i, &(encoder, symbol)) in steps.iter().enumerate().rev() {
            let freq = encoder.frequencies[symbol as usize];
            if state as u64 >= (freq as u64) << 20 {
                chunks[i] = Some(state as u16);
                state >>= 16;
            }
            let slot = encoder.slots[symbol as usize][(state % freq) as usize];
            state = ((state / freq) << ANS_LOG_TAB_SIZE) | slot;
        }

        AnsPayload {
            initial_state: state,
            chunks,
        }
    }
}

impl AnsPayload {
    /// Writes the payload of symbols that need no extra bits.
    pub fn write(&self, writer: &mut BitWriter) -> Result<()> {
        writer.bits(self.initial_state as u64, 32)?;
        for chunk in self.chunks.iter().flatten() {
            writer.bits(*chunk as u64, 16)?;
        }
        Ok(())
    }
}
