//! Alias-table ANS distributions and the decoder state they share.

pub mod alias;
pub mod distribution;

pub use alias::AliasTable;
pub use distribution::AnsDistribution;

use crate::bitstream::BitReader;
use crate::error::Result;
use crate::{State, ANS_FINAL_STATE};

/// The running state of the ANS decoder.
///
/// A stream owns exactly one state and lends it to its distributions for each
/// decoded symbol. The state is loaded from the first 32 bits the first time an
/// ANS distribution decodes a symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnsState {
    state: State,
    initialized: bool,
}

impl AnsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state, if a symbol has been decoded with it.
    pub fn get(&self) -> Option<State> {
        self.initialized.then_some(self.state)
    }

    /// Whether the state matches the value every encoder starts from.
    ///
    /// A stream that never used ANS is trivially in its final state.
    pub fn is_final(&self) -> bool {
        !self.initialized || self.state == ANS_FINAL_STATE
    }

    /// Returns the current state, reading it from the stream on first use.
    #[inline(always)]
    pub(crate) fn load<R: BitReader>(&mut self, reader: &mut R) -> Result<State> {
        if !self.initialized {
            self.state = reader.read_bits(32)? as State;
            self.initialized = true;
        }
        Ok(self.state)
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, state: State) {
        self.state = state;
    }
}
