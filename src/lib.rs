//! Entropy decoding for JPEG XL codestreams.
//!
//! An [`EntropyStream`] is parsed from a [`BitReader`] and then decodes integers,
//! each under a context: the context selects a cluster, whose distribution (ANS or
//! prefix coded) yields a token that is expanded as a hybrid integer or, with
//! LZ77 enabled, starts a copy of previously decoded integers.

pub mod ans;
pub mod bitstream;
pub mod error;
pub mod hybrid;
pub mod prefix;
pub mod stream;
pub mod utils;

pub use bitstream::{BitReader, BitStreamReader};
pub use error::{EntropyError, Result};
pub use hybrid::HybridIntegerConfig;
pub use stream::{Distribution, EntropyStream};

/// The type of the integers a stream decodes, after hybrid integer expansion.
pub type Symbol = u32;

/// The type of the raw tokens a distribution decodes.
pub type Token = u32;

/// The type representing the state of the ANS decoder.
pub type State = u32;

/// The type representing the frequencies of the symbols. Frequencies are quantized
/// to 12 bits, so they always fit in 16.
pub type Freq = u16;

/// Log2 of the number of slots the ANS frequencies are quantized to.
pub const ANS_LOG_TAB_SIZE: u32 = 12;

/// The number of slots the ANS frequencies are quantized to.
pub const ANS_TAB_SIZE: u32 = 1 << ANS_LOG_TAB_SIZE;

/// The state every ANS encoder starts from, and so every decoder must end in.
pub const ANS_FINAL_STATE: State = 0x13_0000;
