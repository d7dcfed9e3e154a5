//! Error types for the entropy decoding engine.

use thiserror::Error;

/// Everything that can go wrong while parsing or decoding an entropy-coded stream.
///
/// Errors are never recovered locally: a malformed cluster, distribution or
/// prefix table makes the whole stream undecodable.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// The bit reader ran past the end of its input.
    #[error("unexpected end of stream: {requested} bits requested, {available} available")]
    EndOfStream { requested: usize, available: u64 },

    /// A read or peek asked for more bits than the primitive supports.
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),

    /// A binary16 value encoded an infinity or a NaN.
    #[error("illegal infinite/NaN float16")]
    InvalidFloat16,

    /// The declared alphabet does not fit in the distribution table.
    #[error("illegal alphabet size: {size} (table holds {capacity})")]
    AlphabetSize { size: usize, capacity: usize },

    /// The two symbols of a dual peak distribution are the same.
    #[error("overlapping dual peak distribution")]
    OverlappingDualPeak,

    /// The shift of a general ANS distribution is above 13.
    #[error("distribution shift {0} is larger than 13")]
    ShiftTooLarge(u64),

    /// The symbol whose frequency is inferred is missing or precedes a run-length escape.
    #[error("invalid omit position")]
    InvalidOmitPosition,

    /// The explicit frequencies of a general ANS distribution exceed the table size.
    #[error("distribution frequencies sum to {0}, above 4096")]
    FrequencyOverflow(u32),

    /// The code length code of a complex prefix code is not a complete code.
    #[error("invalid level 1 prefix codes")]
    InvalidLevel1Prefix,

    /// The symbol code lengths of a complex prefix code are not a complete code.
    #[error("invalid level 2 prefix codes")]
    InvalidLevel2Prefix,

    /// A simple prefix code names a symbol outside its alphabet or names a symbol twice.
    #[error("invalid simple prefix code symbol {0}")]
    InvalidPrefixSymbol(u32),

    /// A hybrid integer configuration violates `msb + lsb <= split_exponent`.
    #[error("invalid hybrid integer configuration: {0}")]
    HybridConfig(&'static str),

    /// Expanding a token would need more than 32 extra bits.
    #[error("hybrid integer token {token} needs {bits} extra bits")]
    HybridOverflow { token: u32, bits: u32 },

    /// The cluster map uses more clusters than allowed.
    #[error("too many clusters: {clusters} (maximum {max})")]
    TooManyClusters { clusters: usize, max: usize },

    /// A move-to-front index falls outside the 256 slots of the transform.
    #[error("move-to-front index {0} out of range")]
    MtfIndex(u32),

    /// The nested stream of a cluster map did not end in its final state.
    #[error("nested distribution did not end in its final state")]
    NestedFinalState,

    /// The code space of a prefix table is oversubscribed.
    #[error("too many VLC codes")]
    TooManyCodes,

    /// The code space of a prefix table is not saturated.
    #[error("not enough VLC codes")]
    NotEnoughCodes,

    /// Two different codes claim the same table slot.
    #[error("illegal VLC codes")]
    ConflictingCodes,

    /// A code is longer than the lookup table is wide.
    #[error("VLC table size too small: code length {length} above {bits} bits")]
    TableTooSmall { length: u32, bits: u32 },

    /// A stream was asked for with no distributions.
    #[error("number of distributions must be positive")]
    NoDistributions,

    /// A nested stream tried to enable LZ77.
    #[error("nested distributions cannot use LZ77")]
    Lz77Disallowed,

    /// The context passed to the stream is not covered by its cluster map.
    #[error("context {context} out of range ({contexts} contexts)")]
    ContextOutOfRange { context: usize, contexts: usize },

    /// The cluster map points to a distribution that does not exist.
    #[error("cluster {cluster} out of range ({clusters} distributions)")]
    ClusterOutOfRange { cluster: usize, clusters: usize },

    /// The underlying word reader failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for entropy decoding.
pub type Result<T> = std::result::Result<T, EntropyError>;
