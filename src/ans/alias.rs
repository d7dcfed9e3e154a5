use crate::{Freq, ANS_LOG_TAB_SIZE};

/// An alias table mapping the low 12 bits of the ANS state to a symbol and the
/// offset of the state within that symbol's slots, in constant time.
///
/// The 4096 slots are split into `1 << log_alphabet_size` buckets of equal size.
/// Bucket `i` starts with `cutoffs[i]` slots belonging to symbol `i`; the rest of
/// the bucket is lent to `symbols[i]`.
#[derive(Clone, Debug)]
pub struct AliasTable {
    log_bucket_size: u32,
    symbols: Box<[u16]>,
    cutoffs: Box<[u16]>,
    offsets: Box<[i32]>,
}

impl AliasTable {
    /// Builds the table of a distribution whose frequencies sum to 4096.
    pub fn new(frequencies: &[Freq], log_alphabet_size: u32) -> Self {
        let log_bucket_size = ANS_LOG_TAB_SIZE - log_alphabet_size;
        let bucket_size = 1_i32 << log_bucket_size;
        let table_size = 1_usize << log_alphabet_size;

        if let Some(unique) = frequencies
            .iter()
            .position(|&freq| freq as u32 == 1 << ANS_LOG_TAB_SIZE)
        {
            return Self {
                log_bucket_size,
                symbols: vec![unique as u16; table_size].into_boxed_slice(),
                cutoffs: vec![0; table_size].into_boxed_slice(),
                offsets: (0..table_size as i32).map(|i| i * bucket_size).collect(),
            };
        }

        let mut symbols = vec![0_u16; table_size];
        let mut cutoffs = vec![0_i32; table_size];
        let mut offsets = vec![0_i32; table_size];
        let mut overfull = Vec::new();
        let mut underfull = Vec::new();

        for (symbol, &freq) in frequencies.iter().enumerate().take(table_size) {
            cutoffs[symbol] = freq as i32;
            if cutoffs[symbol] > bucket_size {
                overfull.push(symbol);
            } else if cutoffs[symbol] < bucket_size {
                underfull.push(symbol);
            }
        }
        underfull.extend(frequencies.len().min(table_size)..table_size);

        while let Some(over) = overfull.pop() {
            let Some(under) = underfull.pop() else {
                break;
            };
            cutoffs[over] -= bucket_size - cutoffs[under];
            symbols[under] = over as u16;
            offsets[under] = cutoffs[over];

            if cutoffs[over] < bucket_size {
                underfull.push(over);
            } else if cutoffs[over] > bucket_size {
                overfull.push(over);
            }
        }

        for bucket in 0..table_size {
            if cutoffs[bucket] == bucket_size {
                symbols[bucket] = bucket as u16;
                offsets[bucket] = 0;
                cutoffs[bucket] = 0;
            } else {
                offsets[bucket] -= cutoffs[bucket];
            }
        }

        Self {
            log_bucket_size,
            symbols: symbols.into_boxed_slice(),
            cutoffs: cutoffs.into_iter().map(|cutoff| cutoff as u16).collect(),
            offsets: offsets.into_boxed_slice(),
        }
    }

    /// Resolves the low 12 bits of a state to `(symbol, offset)`, where `offset` is
    /// the rank of the slot among the slots of `symbol`.
    #[inline(always)]
    pub fn lookup(&self, index: u32) -> (usize, u32) {
        let bucket = (index >> self.log_bucket_size) as usize;
        let pos = index & ((1 << self.log_bucket_size) - 1);

        if pos >= self.cutoffs[bucket] as u32 {
            (
                self.symbols[bucket] as usize,
                (self.offsets[bucket] + pos as i32) as u32,
            )
        } else {
            (bucket, pos)
        }
    }

    pub fn log_bucket_size(&self) -> u32 {
        self.log_bucket_size
    }

    pub fn cutoffs(&self) -> &[u16] {
        &self.cutoffs
    }

    pub fn symbols(&self) -> &[u16] {
        &self.symbols
    }
}
